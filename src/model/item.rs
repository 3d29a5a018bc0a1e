// File: ./src/model/item.rs
use crate::error::PipelineError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of every generated event.
pub const EVENT_DURATION_SECS: i64 = 3600;

/// How a matched `M/D/YY` token with a two-digit year is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearPolicy {
    /// 00-68 map to 2000-2068, 69-99 map to 1969-1999.
    #[default]
    Century,
    /// Only four-digit years are accepted; two-digit tokens are dropped.
    FourDigitOnly,
}

/// A calendar date found in a document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDate {
    pub date: NaiveDate,
    /// The matched token, e.g. `"5/1/2024"`.
    pub token: String,
    /// Byte offset of the token in the source text.
    pub offset: usize,
}

impl ExtractedDate {
    /// Events start at local midnight of the extracted day.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }
}

/// One event to be handed to a calendar backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    pub uid: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EventRequest {
    pub fn new(title: &str, date: &ExtractedDate) -> Self {
        let start = date.start();
        Self {
            uid: Uuid::new_v4().to_string(),
            title: title.to_string(),
            start,
            end: start + Duration::seconds(EVENT_DURATION_SECS),
        }
    }
}

/// Terminal value of a pipeline run.
#[derive(Debug)]
pub struct OperationResult {
    pub success: bool,
    pub error: Option<PipelineError>,
    /// Events saved before the run finished or stopped.
    pub created: usize,
}

impl OperationResult {
    pub fn succeeded(created: usize) -> Self {
        Self {
            success: true,
            error: None,
            created,
        }
    }

    pub fn failed(error: PipelineError, created: usize) -> Self {
        Self {
            success: false,
            error: Some(error),
            created,
        }
    }

    pub fn into_result(self) -> Result<usize, PipelineError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.created),
        }
    }
}
