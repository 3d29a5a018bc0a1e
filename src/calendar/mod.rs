// File: ./src/calendar/mod.rs
// Calendar backends the materializer can write to
pub mod caldav;
pub mod local;
pub mod memory;

use crate::error::CalendarError;
use crate::model::EventRequest;
use async_trait::async_trait;

pub use caldav::CalDavCalendar;
pub use local::LocalCalendar;
pub use memory::MemoryCalendar;

/// Destination calendar resolved by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarHandle {
    pub name: String,
    /// Backend-specific location: a directory path, a CalDAV collection href...
    pub href: String,
}

/// An external calendar that can store events.
///
/// `request_write_access` may wait on the user or a remote server and must be
/// called before any `save`. `Ok(false)` means access was refused.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn request_write_access(&self) -> Result<bool, CalendarError>;

    async fn default_calendar(&self) -> Result<CalendarHandle, CalendarError>;

    async fn save(&self, event: &EventRequest, calendar: &CalendarHandle)
    -> Result<(), CalendarError>;
}
