use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value as Json;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::upload::{BatchUploader, FileCandidate, UploadFailure};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const UPLOAD_FAILED: &str = "Failed to upload resumes";
const DELETE_FAILED: &str = "Failed to delete resume";
const LIST_FAILED: &str = "Failed to fetch resumes";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    #[error("Could not read {name}: {source}")]
    File {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// A stored resume as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResumeSummary {
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Pull the `detail` field out of an error body. Non-string details are
/// rendered as JSON, anything unparsable yields the fallback.
fn error_detail(body: &str, fallback: &str) -> String {
    let detail = serde_json::from_str::<Json>(body)
        .ok()
        .and_then(|json| json.get("detail").cloned());
    match detail {
        Some(Json::String(s)) if !s.trim().is_empty() => s,
        Some(Json::Null) | Some(Json::String(_)) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Client of the resume service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hrview/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/resumes{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response, fallback: &str) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_detail(&body, fallback),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_resumes(&self) -> Result<Vec<ResumeSummary>, ApiError> {
        let response = self.http.get(self.endpoint("")).send().await?;
        let response = Self::check(response, LIST_FAILED).await?;
        let resumes: Vec<ResumeSummary> = response.json().await?;
        debug!("Server holds {} resumes", resumes.len());
        Ok(resumes)
    }

    /// Names of the resumes already stored. Errors are logged and produce an
    /// empty list so that opening the upload queue never fails.
    pub async fn existing_file_names(&self) -> Vec<String> {
        match self.list_resumes().await {
            Ok(resumes) => resumes.into_iter().map(|r| r.file_name).collect(),
            Err(e) => {
                error!("Error fetching existing resumes: {e}");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_resume(&self, id: &str) -> Result<(), ApiError> {
        let response = self.http.delete(self.endpoint(&format!("/{id}"))).send().await?;
        Self::check(response, DELETE_FAILED).await?;
        info!("Deleted resume {id}");
        Ok(())
    }

    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn upload_resumes(&self, files: &[FileCandidate]) -> Result<(), ApiError> {
        let mut form = Form::new();
        for file in files {
            let bytes = file.read_bytes().await.map_err(|source| ApiError::File {
                name: file.name.clone(),
                source,
            })?;
            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)?;
            form = form.part("files", part);
        }
        let response = self.http.post(self.endpoint("/bulk")).multipart(form).send().await?;
        Self::check(response, UPLOAD_FAILED).await?;
        info!("Server accepted {} resumes", files.len());
        Ok(())
    }
}

#[async_trait]
impl BatchUploader for ApiClient {
    async fn upload(&self, files: &[FileCandidate]) -> Result<(), UploadFailure> {
        self.upload_resumes(files)
            .await
            .map_err(|e| UploadFailure::new(e.user_message()))
    }
}
