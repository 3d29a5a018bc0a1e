// File: ./src/pdf.rs
// Plain-text extraction from PDF documents
use crate::error::PipelineError;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Where a document comes from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Path(std::path::PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl DocumentSource {
    pub fn name(&self) -> String {
        match self {
            DocumentSource::Path(p) => p.display().to_string(),
            DocumentSource::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn read_text(&self) -> Result<String, PipelineError> {
        match self {
            DocumentSource::Path(p) => extract_text_from_path(p),
            DocumentSource::Bytes { name, data } => text_from_mem(name, data),
        }
    }
}

fn unparsable(document: &str, reason: impl std::fmt::Display) -> PipelineError {
    PipelineError::UnparsableDocument {
        document: document.to_string(),
        reason: reason.to_string(),
    }
}

pub fn extract_text_from_path(path: &Path) -> Result<String, PipelineError> {
    let name = path.display().to_string();
    let doc = Document::load(path).map_err(|e| unparsable(&name, e))?;
    Ok(page_text(&doc))
}

pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<String, PipelineError> {
    text_from_mem("<memory>", bytes)
}

fn text_from_mem(name: &str, bytes: &[u8]) -> Result<String, PipelineError> {
    let doc = Document::load_mem(bytes).map_err(|e| unparsable(name, e))?;
    Ok(page_text(&doc))
}

/// Concatenates the text of every page in page order. Pages without
/// extractable text (scans, broken content streams) contribute nothing.
fn page_text(doc: &Document) -> String {
    let mut full_text = String::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => full_text.push_str(&text),
            Err(e) => warn!(page = page_number, error = %e, "no text on page"),
        }
    }
    debug!(chars = full_text.len(), "extracted document text");
    full_text
}
