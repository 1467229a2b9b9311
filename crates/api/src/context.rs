use std::time::Duration;

use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials and default ids shared by every call made through one client.
///
/// The workspace and project ids are substituted whenever a resource method
/// is called without an explicit id. Empty strings count as "not given",
/// both here and in method arguments.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_key: String,
    pub workspace_id: Option<String>,
    pub project_id: Option<String>,
    pub timeout: Duration,
    pub base_url: String,
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            workspace_id: None,
            project_id: None,
            timeout: DEFAULT_TIMEOUT,
            base_url: DEFAULT_BASE_URL.to_string(),
            accept_invalid_certs: false,
        }
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Skip TLS certificate and hostname verification. Only meant for
    /// proxies with self-signed certificates.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn default_workspace(&self) -> Option<&str> {
        non_empty(self.workspace_id.as_deref())
    }

    pub fn default_project(&self) -> Option<&str> {
        non_empty(self.project_id.as_deref())
    }

    /// The explicit workspace id, or the configured default.
    pub fn workspace_or<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        resolve(explicit, self.default_workspace(), "workspace")
    }

    /// The explicit project id, or the configured default.
    pub fn project_or<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        resolve(explicit, self.default_project(), "project")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn resolve<'a>(
    explicit: Option<&'a str>,
    fallback: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str> {
    non_empty(explicit)
        .or(fallback)
        .ok_or(ApiError::MissingContext { field })
}
