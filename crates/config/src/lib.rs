use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use asana_api::ClientConfig;
use serde::Deserialize;
use tracing::debug;

/// Represents the full CLI configuration stored on disk. Profiles are kept
/// sorted by name.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Load configuration from the provided path or the default config file.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Config::default_path);

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config file at {}", path.display()))?;

        serde_yaml::from_str(&raw)
            .with_context(|| format!("Malformed YAML in config file {}", path.display()))
    }

    /// Returns the requested profile, else `default_profile`, else the first
    /// profile by name.
    pub fn resolve_profile<'a>(
        &'a self,
        requested: Option<&'a str>,
    ) -> Option<(&'a str, &'a Profile)> {
        if let Some(name) = requested {
            self.profiles.get(name).map(|profile| (name, profile))
        } else if let Some(default_name) = self.default_profile.as_deref() {
            self.profiles
                .get(default_name)
                .map(|profile| (default_name, profile))
        } else if let Some((name, profile)) = self.profiles.iter().next() {
            Some((name.as_str(), profile))
        } else {
            None
        }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".asana-cli");
        path.push("config.yaml");
        path
    }
}

/// One Asana account setup. Everything is optional so a profile may hold
/// only default ids while the API key comes from the environment.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Profile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Profile {
    /// Build the client configuration for this profile using `api_key`.
    pub fn client_config(&self, api_key: impl Into<String>) -> ClientConfig {
        let mut config = ClientConfig::new(api_key)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(workspace_id) = &self.workspace_id {
            config = config.with_workspace(workspace_id.clone());
        }
        if let Some(project_id) = &self.project_id {
            config = config.with_project(project_id.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }

        config
    }
}
