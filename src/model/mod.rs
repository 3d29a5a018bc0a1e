// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod adapter;
pub mod item;
pub mod parser;

pub use item::{EventRequest, ExtractedDate, OperationResult, YearPolicy};
pub use parser::{DateExtractor, extract_dates};
