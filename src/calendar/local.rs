// File: ./src/calendar/local.rs
// A calendar stored as a directory of .ics files
use crate::calendar::{CalendarHandle, CalendarService};
use crate::error::CalendarError;
use crate::model::EventRequest;
use crate::storage::LocalStorage;
use async_trait::async_trait;
use directories::ProjectDirs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const LOCAL_CALENDAR_NAME: &str = "Local";

#[derive(Debug, Clone)]
pub struct LocalCalendar {
    dir: PathBuf,
}

impl LocalCalendar {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_dir>/calendar`, if the platform has a data directory.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "pdfcal", "pdfcal").map(|proj| proj.data_dir().join("calendar"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn storage_error(e: anyhow::Error) -> CalendarError {
    match e.downcast::<io::Error>() {
        Ok(io_err) => CalendarError::Io(io_err),
        Err(other) => CalendarError::Rejected(other.to_string()),
    }
}

#[async_trait]
impl CalendarService for LocalCalendar {
    async fn request_write_access(&self) -> Result<bool, CalendarError> {
        let granted = LocalStorage::ensure_writable_dir(&self.dir).map_err(storage_error)?;
        if !granted {
            warn!(dir = %self.dir.display(), "calendar directory is not writable");
        }
        Ok(granted)
    }

    async fn default_calendar(&self) -> Result<CalendarHandle, CalendarError> {
        Ok(CalendarHandle {
            name: LOCAL_CALENDAR_NAME.to_string(),
            href: self.dir.display().to_string(),
        })
    }

    async fn save(
        &self,
        event: &EventRequest,
        calendar: &CalendarHandle,
    ) -> Result<(), CalendarError> {
        let path = Path::new(&calendar.href).join(event.filename());
        let ics = event.to_ics();

        let written = LocalStorage::with_lock(&path, || {
            if path.exists() {
                anyhow::bail!(CalendarError::Conflict(event.filename()));
            }
            LocalStorage::atomic_write(&path, &ics)
        });
        // The lock file is only needed while writing, whatever the outcome.
        let _ = std::fs::remove_file(path.with_extension("lock"));

        written.map_err(|e| match e.downcast::<CalendarError>() {
            Ok(cal_err) => cal_err,
            Err(other) => storage_error(other),
        })?;
        debug!(path = %path.display(), "wrote event");
        Ok(())
    }
}
