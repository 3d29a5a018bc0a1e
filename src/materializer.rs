// File: ./src/materializer.rs
// Turns extracted dates into saved calendar events
use crate::calendar::CalendarService;
use crate::error::PipelineError;
use crate::model::{EventRequest, ExtractedDate, OperationResult};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeState {
    Idle,
    RequestingAuthorization,
    SavingEvents,
    Failed,
    Succeeded,
}

struct Run {
    state: MaterializeState,
}

impl Run {
    fn new() -> Self {
        Self {
            state: MaterializeState::Idle,
        }
    }

    fn advance(&mut self, next: MaterializeState) {
        debug!(from = ?self.state, to = ?next, "materializer state");
        self.state = next;
    }

    fn fail(mut self, error: PipelineError, created: usize) -> OperationResult {
        self.advance(MaterializeState::Failed);
        warn!(%error, created, "materializing events failed");
        OperationResult::failed(error, created)
    }
}

/// Creates one event per date, in order, on the service's default calendar.
///
/// Write access is requested before anything is saved. The first failing save
/// stops the batch; events saved before it are left in place. Nothing is
/// deduplicated, so running twice on the same dates creates every event twice.
pub async fn materialize_events<S>(
    service: &S,
    dates: &[ExtractedDate],
    title: &str,
) -> OperationResult
where
    S: CalendarService + ?Sized,
{
    let mut run = Run::new();

    run.advance(MaterializeState::RequestingAuthorization);
    match service.request_write_access().await {
        Ok(true) => {}
        Ok(false) => return run.fail(PipelineError::denied("access was refused"), 0),
        Err(e) => {
            let error = PipelineError::AuthorizationDenied {
                reason: e.to_string(),
                source: Some(e),
            };
            return run.fail(error, 0);
        }
    }

    let calendar = match service.default_calendar().await {
        Ok(c) => c,
        Err(e) => {
            let error = PipelineError::AuthorizationDenied {
                reason: format!("no default calendar: {}", e),
                source: Some(e),
            };
            return run.fail(error, 0);
        }
    };

    run.advance(MaterializeState::SavingEvents);
    let mut created = 0;
    for (index, date) in dates.iter().enumerate() {
        let event = EventRequest::new(title, date);
        if let Err(source) = service.save(&event, &calendar).await {
            let error = PipelineError::EventSaveFailed {
                index,
                date: date.date,
                source,
            };
            return run.fail(error, created);
        }
        created += 1;
        info!(date = %date.date, calendar = %calendar.name, "event saved");
    }

    run.advance(MaterializeState::Succeeded);
    OperationResult::succeeded(created)
}
