// File: ./src/calendar/memory.rs
use crate::calendar::{CalendarHandle, CalendarService};
use crate::error::CalendarError;
use crate::model::EventRequest;
use async_trait::async_trait;
use std::sync::Mutex;

pub const MEMORY_CALENDAR_HREF: &str = "memory://default";

/// Keeps events in memory. Used for dry runs.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    events: Mutex<Vec<EventRequest>>,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EventRequest> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CalendarService for MemoryCalendar {
    async fn request_write_access(&self) -> Result<bool, CalendarError> {
        Ok(true)
    }

    async fn default_calendar(&self) -> Result<CalendarHandle, CalendarError> {
        Ok(CalendarHandle {
            name: "Memory".to_string(),
            href: MEMORY_CALENDAR_HREF.to_string(),
        })
    }

    async fn save(
        &self,
        event: &EventRequest,
        _calendar: &CalendarHandle,
    ) -> Result<(), CalendarError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| CalendarError::Rejected("memory calendar poisoned".to_string()))?;
        events.push(event.clone());
        Ok(())
    }
}
