// File: ./src/cli.rs
// Command-line front end: pick a PDF, report success or failure
use crate::calendar::{LocalCalendar, MemoryCalendar};
use crate::config::{Backend, Config};
use crate::model::{DateExtractor, YearPolicy};
use crate::pdf::DocumentSource;
use crate::pipeline::process_document_with;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pdfcal")]
#[command(about = "Create calendar events for every date found in a PDF")]
pub struct Cli {
    /// PDF document to scan
    pub pdf: PathBuf,

    /// Event title (overrides the config file)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Path to the TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Calendar backend (overrides the config file)
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Directory of .ics files for the local backend
    #[arg(long)]
    pub calendar_dir: Option<PathBuf>,

    /// Drop M/D/YY tokens instead of inferring the century
    #[arg(long)]
    pub four_digit_years: bool,

    /// Print the dates that would be used and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print dates as JSON (with --list)
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Run the whole pipeline against an in-memory calendar
    #[arg(long)]
    pub dry_run: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdfcal=info"));
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(title) = &cli.title {
        config.title = title.clone();
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(dir) = &cli.calendar_dir {
        config.calendar_dir = Some(dir.clone());
    }
    if cli.four_digit_years {
        config.two_digit_years = YearPolicy::FourDigitOnly;
    }
    Ok(config)
}

pub async fn run() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let extractor = DateExtractor::new(config.two_digit_years);
    let source = DocumentSource::Path(cli.pdf.clone());

    if cli.list {
        let text = source.read_text()?;
        let dates = extractor.extract(&text);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&dates)?);
        } else {
            for d in &dates {
                println!("{}  ({} at byte {})", d.date, d.token, d.offset);
            }
        }
        return Ok(());
    }

    let result = if cli.dry_run {
        let memory = MemoryCalendar::new();
        let result = process_document_with(&extractor, &source, &config.title, &memory).await;
        for ev in memory.events() {
            println!("{}  {} -> {}", ev.title, ev.start, ev.end);
        }
        result
    } else {
        let service = config.calendar_service()?;
        process_document_with(&extractor, &source, &config.title, &*service).await
    };

    match result.into_result() {
        Ok(created) => {
            println!("Success: {} event(s) added to calendar", created);
            if config.backend == Backend::Local
                && !cli.dry_run
                && let Some(dir) = config.calendar_dir.clone().or_else(LocalCalendar::default_dir)
            {
                println!("Calendar directory: {}", dir.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: Failed to add events to calendar: {}", e);
            std::process::exit(1);
        }
    }
}
