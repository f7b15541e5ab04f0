use std::fmt;

use async_trait::async_trait;

use super::file::FileCandidate;

pub const GENERIC_UPLOAD_FAILURE: &str = "Upload failed";

/// Failed batch submission. Carries the server supplied message when there
/// was one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    message: Option<String>,
}

impl UploadFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn generic() -> Self {
        Self { message: None }
    }

    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(GENERIC_UPLOAD_FAILURE)
    }
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for UploadFailure {}

/// Endpoint accepting every queued file in one request.
#[async_trait]
pub trait BatchUploader: Send + Sync {
    async fn upload(&self, files: &[FileCandidate]) -> Result<(), UploadFailure>;
}
