// File: ./src/error.rs
use chrono::NaiveDate;
use thiserror::Error;

/// Failures reported by a calendar backend.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar server is not configured")]
    Offline,
    #[error("calendar storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("CalDAV request failed: {0}")]
    Dav(String),
    #[error("event already exists: {0}")]
    Conflict(String),
    #[error("calendar rejected the request: {0}")]
    Rejected(String),
}

/// Failures of a whole pipeline run, surfaced through `OperationResult`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("calendar write access denied: {reason}")]
    AuthorizationDenied {
        reason: String,
        #[source]
        source: Option<CalendarError>,
    },
    #[error("failed to save event #{index} ({date}): {source}")]
    EventSaveFailed {
        index: usize,
        date: NaiveDate,
        #[source]
        source: CalendarError,
    },
    #[error("cannot read document {document}: {reason}")]
    UnparsableDocument { document: String, reason: String },
}

impl PipelineError {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            reason: reason.into(),
            source: None,
        }
    }
}
