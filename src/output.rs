//! Output sinks for a finished [`Report`].
//!
//! Supports labeled console text, a two-sheet spreadsheet written as CSV files,
//! and chart panel data written as JSON.

use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::YearStatistics;
use crate::report::{Report, format_percent};

pub const YEARS_SHEET_FILE: &str = "report_years.csv";
pub const CITIES_SHEET_FILE: &str = "report_cities.csv";
pub const CHART_FILE: &str = "graph.json";

/// Which sinks a run writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Console text and spreadsheet.
    Statistics,
    /// Spreadsheet and chart.
    Charts,
}

impl OutputMode {
    /// `статистика` or `statistics`, in any case, selects [`OutputMode::Statistics`];
    /// anything else selects [`OutputMode::Charts`].
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_lowercase().as_str() {
            "статистика" | "statistics" => OutputMode::Statistics,
            _ => OutputMode::Charts,
        }
    }
}

/// Writes the year dynamics and the top area rankings as labeled text.
pub fn write_console<W: Write>(out: &mut W, report: &Report) -> Result<()> {
    write_year_lines(out, report.all(), "")?;
    write_year_lines(out, report.filtered(), " для выбранной профессии")?;

    let salaries = report
        .top_salaries()
        .iter()
        .map(|s| format!("'{}': {}", s.area, s.average_salary))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "Уровень зарплат по городам (в порядке убывания): {{{salaries}}}")?;

    let shares = report
        .top_shares()
        .iter()
        .map(|s| format!("'{}': {:?}", s.area, s.fraction))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "Доля вакансий по городам (в порядке убывания): {{{shares}}}")?;

    Ok(())
}

fn write_year_lines<W: Write>(out: &mut W, stats: &YearStatistics, suffix: &str) -> Result<()> {
    let salaries = stats
        .iter()
        .map(|(year, stat)| format!("{year}: {}", stat.average_salary))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "Динамика уровня зарплат по годам{suffix}: {{{salaries}}}")?;

    let counts = stats
        .iter()
        .map(|(year, stat)| format!("{year}: {}", stat.count))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "Динамика количества вакансий по годам{suffix}: {{{counts}}}")?;

    Ok(())
}

/// Writes the year sheet and the city sheet into `dir`, returning both paths.
///
/// The city sheet always has ten data rows; positions missing from a ranking are left blank.
pub fn write_spreadsheet(dir: &Path, report: &Report) -> Result<Vec<PathBuf>> {
    let years_path = dir.join(YEARS_SHEET_FILE);
    let mut writer = Writer::from_path(&years_path)
        .with_context(|| format!("Failed to create {}", years_path.display()))?;

    let query = report.query();
    writer.write_record([
        "Год".to_string(),
        "Средняя зарплата".to_string(),
        format!("Средняя зарплата - {query}"),
        "Количество вакансий".to_string(),
        format!("Количество вакансий - {query}"),
    ])?;
    for row in report.year_rows() {
        writer.write_record([
            row.year,
            row.average_all.to_string(),
            row.average_filtered.to_string(),
            row.count_all.to_string(),
            row.count_filtered.to_string(),
        ])?;
    }
    writer.flush()?;
    debug!(path = %years_path.display(), "Year sheet written");

    let cities_path = dir.join(CITIES_SHEET_FILE);
    let mut writer = Writer::from_path(&cities_path)
        .with_context(|| format!("Failed to create {}", cities_path.display()))?;

    writer.write_record(["Город", "Уровень зарплат", "", "Город", "Доля вакансий"])?;
    for row in report.top_area_rows() {
        let (salary_area, salary) = row
            .salary
            .map(|s| (s.area, s.average_salary.to_string()))
            .unwrap_or_default();
        let (share_area, share) = row
            .share
            .map(|s| (s.area, format_percent(s.fraction)))
            .unwrap_or_default();
        writer.write_record([salary_area, salary, String::new(), share_area, share])?;
    }
    writer.flush()?;
    debug!(path = %cities_path.display(), "City sheet written");

    info!(dir = %dir.display(), "Spreadsheet written");
    Ok(vec![years_path, cities_path])
}

/// Writes the four chart panels as pretty-printed JSON into `dir`.
pub fn write_chart(dir: &Path, report: &Report) -> Result<PathBuf> {
    let path = dir.join(CHART_FILE);
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report.chart())?;
    writer.flush()?;

    info!(path = %path.display(), "Chart data written");
    Ok(path)
}
