use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;
use tracing_error::SpanTrace;

use crate::api::ApiError;
use crate::upload::file::{MIME_DOCX, MIME_PDF};
use crate::upload::queue::{DEFAULT_PAGE_SIZE, MAX_FILE_SIZE, MAX_QUEUE_SIZE};

pub const MIB: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Loading failed: {message}\n{span_trace}")]
    LoadingFailed { message: String, span_trace: SpanTrace },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Unknown file type: {}", .0.display())]
    UnknownFileType(PathBuf),

    #[error("Invalid path {path}: {message}")]
    InvalidPath { path: String, message: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Could not set up logging: {0}")]
    Logging(String),
}

impl HrError {
    pub fn loading_failed(message: impl Into<String>) -> Self {
        HrError::LoadingFailed {
            message: message.into(),
            span_trace: SpanTrace::capture(),
        }
    }
}

/// Initial table settings.
#[derive(Debug, Clone, Setters)]
pub struct TableConfig {
    pub page_size: usize,
    pub hidden_columns: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 15,
            hidden_columns: Vec::new(),
        }
    }
}

/// Limits of the resume upload queue.
#[derive(Debug, Clone, Setters)]
pub struct UploadConfig {
    pub max_queue_size: usize,
    pub max_file_size: u64,
    pub page_size: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_queue_size: MAX_QUEUE_SIZE,
            max_file_size: MAX_FILE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            allowed_mime_types: vec![MIME_PDF.to_string(), MIME_DOCX.to_string()],
        }
    }
}

/// Settings of the terminal front end.
#[derive(Debug, Clone, Setters)]
pub struct HrConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub status_message_timeout: u64,
}

impl Default for HrConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 32,
            status_message_timeout: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ToggleSort,
    ToggleSortMulti,
    ClearSort,
    HideColumn,
    ShowAllColumns,
    EditFilter,
    ClearFilter,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
hrview key bindings

  q            quit
  ?            toggle this help
  left/right   select column
  n / PgDn     next page
  p / PgUp     previous page
  g / G        first / last page
  s            sort by selected column (none, ascending, descending)
  S            add selected column as extra sort key
  x            clear sort
  h            hide selected column
  v            show all columns
  /            edit search filter (Enter keeps, Esc reverts)
  c            clear search filter
";
