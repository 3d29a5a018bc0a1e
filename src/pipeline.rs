// File: ./src/pipeline.rs
use crate::calendar::CalendarService;
use crate::materializer::materialize_events;
use crate::model::{DateExtractor, OperationResult};
use crate::pdf::DocumentSource;
use tracing::info;

/// Reads `source`, finds its dates and creates one event per date.
pub async fn process_document<S>(
    source: &DocumentSource,
    title: &str,
    service: &S,
) -> OperationResult
where
    S: CalendarService + ?Sized,
{
    process_document_with(&DateExtractor::default(), source, title, service).await
}

/// Same as [`process_document`] with an explicit two-digit year policy.
pub async fn process_document_with<S>(
    extractor: &DateExtractor,
    source: &DocumentSource,
    title: &str,
    service: &S,
) -> OperationResult
where
    S: CalendarService + ?Sized,
{
    let text = match source.read_text() {
        Ok(t) => t,
        Err(e) => return OperationResult::failed(e, 0),
    };
    let dates = extractor.extract(&text);
    info!(document = %source.name(), found = dates.len(), "extracted dates");
    materialize_events(service, &dates, title).await
}
