// File: ./src/config.rs
use crate::calendar::{CalDavCalendar, CalendarService, LocalCalendar};
use crate::model::YearPolicy;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// A directory of .ics files
    #[default]
    Local,
    /// A CalDAV server
    Caldav,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Title given to every created event
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub backend: Backend,

    /// Directory for the local backend; defaults to the platform data dir
    #[serde(default)]
    pub calendar_dir: Option<PathBuf>,

    // CalDAV
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub allow_insecure_certs: bool,
    /// Calendar name or href; discovered from the server when unset
    #[serde(default)]
    pub default_calendar: Option<String>,

    #[serde(default)]
    pub two_digit_years: YearPolicy,
}

fn default_title() -> String {
    "Event Title".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: default_title(),
            backend: Backend::default(),
            calendar_dir: None,
            url: String::new(),
            username: String::new(),
            password: String::new(),
            allow_insecure_certs: false,
            default_calendar: None,
            two_digit_years: YearPolicy::default(),
        }
    }
}

impl Config {
    pub fn get_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "pdfcal", "pdfcal").map(|proj| proj.config_dir().join("config.toml"))
    }

    /// Loads the user config; a missing file means defaults.
    pub fn load() -> Result<Self> {
        match Self::get_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Builds the calendar backend this config points at.
    pub fn calendar_service(&self) -> Result<Box<dyn CalendarService>> {
        match self.backend {
            Backend::Local => {
                let dir = match &self.calendar_dir {
                    Some(d) => d.clone(),
                    None => LocalCalendar::default_dir()
                        .context("No data directory available; set calendar_dir")?,
                };
                Ok(Box::new(LocalCalendar::new(dir)))
            }
            Backend::Caldav => {
                if self.url.is_empty() {
                    anyhow::bail!("backend = \"caldav\" requires a url");
                }
                let mut cal = CalDavCalendar::new(
                    &self.url,
                    &self.username,
                    &self.password,
                    self.allow_insecure_certs,
                )?;
                if let Some(name) = &self.default_calendar {
                    cal = cal.with_calendar(name.clone());
                }
                Ok(Box::new(cal))
            }
        }
    }
}
