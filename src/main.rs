//! CLI entry point for the vacancy statistics tool.
//!
//! Reads a CSV export of job postings, aggregates salaries by year and by area,
//! and writes the results to the console, a spreadsheet and chart data.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::ffi::OsStr;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use vacancy_stats::output::{OutputMode, write_chart, write_console, write_spreadsheet};
use vacancy_stats::report::Report;
use vacancy_stats::{Dataset, RowPolicy, TitleFilter};

#[derive(Parser)]
#[command(name = "vacancy_stats")]
#[command(about = "Salary statistics by year and by city from a vacancies CSV", long_about = None)]
struct Cli {
    /// Path to the vacancies CSV file (prompted for if omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Profession to filter by; matched as a case-sensitive substring of the title
    #[arg(short, long)]
    profession: Option<String>,

    /// Output mode: "статистика" for console and spreadsheet, anything else for spreadsheet and chart
    #[arg(short, long)]
    mode: Option<String>,

    /// Directory to write the spreadsheet and chart files into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// What to do with rows whose salary or date cannot be parsed
    #[arg(long, value_enum, default_value_t = InvalidRows::Strict)]
    invalid_rows: InvalidRows,
}

#[derive(Clone, Copy, ValueEnum)]
enum InvalidRows {
    /// Stop at the first such row
    Strict,
    /// Log and skip such rows
    Skip,
}

impl From<InvalidRows> for RowPolicy {
    fn from(value: InvalidRows) -> Self {
        match value {
            InvalidRows::Strict => RowPolicy::Strict,
            InvalidRows::Skip => RowPolicy::Skip,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/vacancy_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("vacancy_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let file = match cli.file {
        Some(file) => file,
        None => PathBuf::from(prompt("Введите название файла: ")?),
    };
    let profession = match cli.profession {
        Some(profession) => profession,
        None => prompt("Введите название профессии: ")?,
    };
    let mode = match cli.mode {
        Some(mode) => OutputMode::from_selector(&mode),
        None => OutputMode::from_selector(&prompt("Вакансии или статистика: ")?),
    };

    let dataset = Dataset::load(&file, cli.invalid_rows.into())
        .with_context(|| format!("Failed to load vacancies from {}", file.display()))?;
    let report = Report::from_dataset(&dataset, &TitleFilter::new(profession));

    std::fs::create_dir_all(&cli.output_dir)?;

    match mode {
        OutputMode::Statistics => {
            let stdout = std::io::stdout();
            write_console(&mut stdout.lock(), &report)?;
            write_spreadsheet(&cli.output_dir, &report)?;
        }
        OutputMode::Charts => {
            write_spreadsheet(&cli.output_dir, &report)?;
            write_chart(&cli.output_dir, &report)?;
        }
    }

    info!(records = dataset.len(), ?mode, "Report complete");
    Ok(())
}

/// Prints `message` and reads one trimmed line from stdin.
fn prompt(message: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{message}")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
