pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod materializer;
pub mod model;
pub mod pdf;
pub mod pipeline;
pub mod storage;

pub use error::{CalendarError, PipelineError};
pub use materializer::materialize_events;
pub use model::{EventRequest, ExtractedDate, OperationResult, extract_dates};
pub use pdf::DocumentSource;
pub use pipeline::process_document;
