#![forbid(unsafe_code)]

pub mod api;
pub mod domain;
pub mod loader;
pub mod pagination;

pub mod table {
    pub mod column;
    pub mod engine;
    pub mod state;
    pub mod value;

    pub use column::{Column, ColumnFilter};
    pub use engine::{ColumnHeader, ColumnToggle, TableEngine, ViewModel, ViewRow, derive};
    pub use state::{SortDirection, SortKey, ViewState};
    pub use value::Value;
}

pub mod upload {
    pub mod file;
    pub mod preview;
    pub mod queue;
    pub mod uploader;

    pub use file::{FileCandidate, FileSource, MIME_DOCX, MIME_PDF};
    pub use preview::{ObjectUrlHost, Preview, PreviewError, PreviewHost, PreviewUrl, TempDirPreviewHost};
    pub use queue::{
        AddReport, EntryView, PreviewAction, QueueSnapshot, Rejection, SubmitBatch, SubmitOutcome,
        SubmitPhase, SubmitRefused, UploadEntry, UploadQueue,
    };
    pub use uploader::{BatchUploader, UploadFailure};
}

// Terminal front end
pub mod controller;
pub mod inputter;
pub mod model;
pub mod ui;

pub use domain::{HrError, TableConfig, UploadConfig};
pub use pagination::Pagination;
pub use table::TableEngine;
pub use upload::UploadQueue;
