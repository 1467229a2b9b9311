use std::fs;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};

use crate::error::{ApiError, Result};

/// Multipart field name Asana expects for attachments.
pub const FILE_FIELD: &str = "file";

/// A local file read into memory, ready to be sent as a multipart part.
#[derive(Debug, Clone)]
pub struct Upload {
    file_name: String,
    media_type: String,
    content: Vec<u8>,
}

impl Upload {
    /// Read `path` for upload. A leading `@` (curl-style file reference) is
    /// stripped before the file is opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = strip_marker(path.as_ref());
        let content = fs::read(&path).map_err(|source| ApiError::FileNotReadable {
            path: path.clone(),
            source,
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();
        let media_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        Ok(Self {
            file_name,
            media_type,
            content,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn into_form(self) -> Result<Form> {
        let part = Part::bytes(self.content)
            .file_name(self.file_name)
            .mime_str(&self.media_type)
            .map_err(|e| ApiError::InvalidPayload(format!("invalid media type: {e}")))?;
        Ok(Form::new().part(FILE_FIELD, part))
    }
}

fn strip_marker(path: &Path) -> PathBuf {
    path.to_str()
        .and_then(|s| s.strip_prefix('@'))
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf())
}
