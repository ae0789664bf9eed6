//! In-memory aggregation over the admitted posting records.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::analyzers::types::{AreaRankings, AreaSalary, AreaShare, YearStat, YearStatistics};
use crate::analyzers::utility::{floor_mean, rounded_share};
use crate::error::{Result, StatsError};
use crate::parser::{RowRejection, admit_row, check_trailing, csv_reader, open_source};
use crate::vacancy::{Header, PostingRecord};

/// Areas whose rounded share of postings falls below this are left out of the rankings.
pub const MIN_AREA_FRACTION: f64 = 0.01;

/// Decimal places kept in an area's share of postings.
const FRACTION_PLACES: u32 = 4;

/// What happens when a row passes the shape check but its record cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Abort loading with the row's error.
    #[default]
    Strict,
    /// Log the error and drop the row.
    Skip,
}

/// Outcome of offering one row to [`Dataset::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    Admitted,
    Rejected(RowRejection),
}

/// Record indices grouped by key, keys kept in first-appearance order.
#[derive(Debug, Default)]
struct Bucket {
    keys: Vec<String>,
    slots: HashMap<String, Vec<usize>>,
}

impl Bucket {
    fn insert(&mut self, key: &str, index: usize) {
        match self.slots.get_mut(key) {
            Some(slot) => slot.push(index),
            None => {
                self.keys.push(key.to_string());
                self.slots.insert(key.to_string(), vec![index]);
            }
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.keys.iter().map(|key| {
            let members = self.slots.get(key).map(Vec::as_slice).unwrap_or_default();
            (key.as_str(), members)
        })
    }
}

/// All postings of one source file, grouped by year and by area.
///
/// Records are owned here; the buckets refer to them by position. Nothing is
/// mutated once a record is admitted.
#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<PostingRecord>,
    by_year: Bucket,
    by_area: Bucket,
    rejected: usize,
    skipped: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and aggregates the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or unreadable, and under [`RowPolicy::Strict`]
    /// on the first row whose record cannot be built.
    #[tracing::instrument(skip_all, fields(path = %path.display(), ?policy))]
    pub fn load(path: &Path, policy: RowPolicy) -> Result<Self> {
        let reader = open_source(path)?;
        Self::from_csv(reader, path, policy)
    }

    /// Aggregates CSV data from any reader. `origin` only labels errors.
    pub fn from_reader<R: Read>(source: R, origin: &Path, policy: RowPolicy) -> Result<Self> {
        Self::from_csv(csv_reader(source), origin, policy)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, origin: &Path, policy: RowPolicy) -> Result<Self> {
        let read_error = |source: csv::Error| StatsError::SourceRead {
            path: origin.to_path_buf(),
            source,
        };

        let header = Header::new(reader.headers().map_err(read_error)?.iter());
        if let Some(field) = header.first_missing() {
            return Err(StatsError::MissingColumn {
                column: field.column(),
                path: origin.to_path_buf(),
            });
        }

        let mut dataset = Self::new();

        for (line, result) in reader.records().enumerate() {
            let record = result.map_err(read_error)?;
            let row: Vec<&str> = record.iter().collect();
            let row_number = line + 2;

            match dataset.ingest(&row, &header) {
                Ok(Ingested::Admitted) => {}
                Ok(Ingested::Rejected(reason)) => {
                    debug!(row = row_number, ?reason, "Row rejected");
                }
                Err(e) if policy == RowPolicy::Skip && e.is_row_error() => {
                    warn!(row = row_number, error = %e, "Skipping row");
                    dataset.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            admitted = dataset.len(),
            rejected = dataset.rejected,
            skipped = dataset.skipped,
            years = dataset.by_year.keys.len(),
            areas = dataset.by_area.keys.len(),
            "Dataset loaded"
        );

        Ok(dataset)
    }

    /// Offers one row to the dataset.
    ///
    /// Rows with an empty cell, more than one cell missing, or a missing trailing
    /// cell that belongs to a recognized column are rejected without error. A row
    /// that passes those checks but cannot be built leaves the dataset unchanged and
    /// returns the build error.
    pub fn ingest<S: AsRef<str>>(&mut self, row: &[S], header: &Header) -> Result<Ingested> {
        let shape = admit_row(row, header.len()).and_then(|()| check_trailing(row, header));
        if let Err(reason) = shape {
            self.rejected += 1;
            return Ok(Ingested::Rejected(reason));
        }

        let record = PostingRecord::from_row(row, header)?;
        self.push(record);
        Ok(Ingested::Admitted)
    }

    /// Adds an already built record to both groupings.
    pub fn push(&mut self, record: PostingRecord) {
        let index = self.records.len();
        self.by_year.insert(record.year(), index);
        self.by_area.insert(record.area(), index);
        self.records.push(record);
    }

    /// Number of admitted records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows dropped by the shape check.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Number of rows dropped under [`RowPolicy::Skip`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn records(&self) -> &[PostingRecord] {
        &self.records
    }

    /// Average salary and count per year over every record.
    pub fn year_statistics(&self) -> YearStatistics {
        self.year_statistics_where(|_| true)
    }

    /// Average salary and count per year over the records selected by `predicate`.
    ///
    /// Every year of the dataset is present; a year with no selected record
    /// reports `{0, 0}`.
    pub fn year_statistics_where<P>(&self, predicate: P) -> YearStatistics
    where
        P: Fn(&PostingRecord) -> bool,
    {
        let mut stats = YearStatistics::default();

        for (year, members) in self.by_year.iter() {
            let (sum, count) = members
                .iter()
                .map(|&i| &self.records[i])
                .filter(|record| predicate(record))
                .fold((0.0, 0usize), |(sum, count), record| {
                    (sum + record.reference_salary(), count + 1)
                });

            stats.push(
                year,
                YearStat {
                    average_salary: floor_mean(sum, count),
                    count,
                },
            );
        }

        stats
    }

    /// Ranks areas by share of postings and by average salary.
    ///
    /// Areas under [`MIN_AREA_FRACTION`] are dropped before ranking. Both sorts are
    /// stable, so ties keep the order in which areas first appeared.
    pub fn area_statistics(&self) -> AreaRankings {
        let total = self.records.len();
        let mut rankings = AreaRankings::default();

        for (area, members) in self.by_area.iter() {
            let fraction = rounded_share(members.len(), total, FRACTION_PLACES);
            if fraction < MIN_AREA_FRACTION {
                continue;
            }

            let sum: f64 = members
                .iter()
                .map(|&i| self.records[i].reference_salary())
                .sum();

            rankings.by_fraction.push(AreaShare {
                area: area.to_string(),
                fraction,
            });
            rankings.by_salary.push(AreaSalary {
                area: area.to_string(),
                average_salary: floor_mean(sum, members.len()),
            });
        }

        rankings
            .by_fraction
            .sort_by(|a, b| b.fraction.total_cmp(&a.fraction));
        rankings
            .by_salary
            .sort_by(|a, b| b.average_salary.cmp(&a.average_salary));

        rankings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::filter::TitleFilter;

    const CSV_HEADER: &str = "name,salary_from,salary_to,salary_currency,area_name,published_at";

    fn header() -> Header {
        Header::new(CSV_HEADER.split(','))
    }

    fn record(title: &str, salary: f64, area: &str, year: &str) -> PostingRecord {
        PostingRecord::new(title, salary, area, year)
    }

    fn load(csv: &str, policy: RowPolicy) -> Result<Dataset> {
        Dataset::from_reader(csv.as_bytes(), Path::new("inline.csv"), policy)
    }

    #[test]
    fn test_single_row_is_admitted() {
        let csv = format!(
            "{CSV_HEADER}\nПрограммист,100,200,RUR,Москва,2022-07-17T18:23:06+0300\n"
        );
        let dataset = load(&csv, RowPolicy::Strict).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].reference_salary(), 150.0);
    }

    #[test]
    fn test_rows_with_empty_fields_are_never_admitted() {
        let csv = format!(
            "{CSV_HEADER}\n\
             Программист,,200,RUR,Москва,2022-07-17T18:23:06+0300\n\
             Программист,100,200,RUR,Москва,\n\
             Программист,100\n\
             Программист,100,200,RUR,Москва,2022-07-17T18:23:06+0300\n"
        );
        let dataset = load(&csv, RowPolicy::Strict).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rejected(), 3);
    }

    #[test]
    fn test_row_missing_trailing_date_is_rejected_not_fatal() {
        let csv = format!(
            "{CSV_HEADER}\n\
             A,100,200,RUR,Москва,2022-07-17T18:23:06+0300\n\
             B,100,200,RUR,Москва\n"
        );
        let dataset = load(&csv, RowPolicy::default()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rejected(), 1);
        assert_eq!(dataset.skipped(), 0);

        let mut dataset = Dataset::new();
        let outcome = dataset
            .ingest(&["B", "100", "200", "RUR", "Москва"], &header())
            .unwrap();
        assert_eq!(
            outcome,
            Ingested::Rejected(RowRejection::MissingTrailingField {
                column: "published_at"
            })
        );
    }

    #[test]
    fn test_row_missing_unrecognized_trailing_column_is_admitted() {
        let csv = format!(
            "{CSV_HEADER},premium\n\
             A,100,200,RUR,Москва,2022-07-17T18:23:06+0300\n"
        );
        let dataset = load(&csv, RowPolicy::Strict).unwrap();

        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_header_without_required_column_fails() {
        let csv = "name,salary_from,salary_to,salary_currency,published_at\n";
        let err = load(csv, RowPolicy::Skip).unwrap_err();

        assert!(matches!(
            err,
            StatsError::MissingColumn {
                column: "area_name",
                ..
            }
        ));
    }

    #[test]
    fn test_ingest_failure_leaves_dataset_unchanged() {
        let mut dataset = Dataset::new();
        let row = ["Программист", "100", "200", "XYZ", "Москва", "2022-07-17T18:23:06+0300"];

        let err = dataset.ingest(&row, &header()).unwrap_err();

        assert!(matches!(err, StatsError::UnknownCurrency { .. }));
        assert!(dataset.is_empty());
        assert!(dataset.year_statistics().is_empty());
    }

    #[test]
    fn test_strict_policy_aborts_on_unknown_currency() {
        let csv = format!(
            "{CSV_HEADER}\n\
             Программист,100,200,RUR,Москва,2022-07-17T18:23:06+0300\n\
             Программист,100,200,XYZ,Москва,2022-07-17T18:23:06+0300\n"
        );
        let err = load(&csv, RowPolicy::Strict).unwrap_err();

        assert!(matches!(err, StatsError::UnknownCurrency { ref code } if code == "XYZ"));
    }

    #[test]
    fn test_strict_policy_aborts_on_malformed_timestamp() {
        let csv = format!("{CSV_HEADER}\nПрограммист,100,200,RUR,Москва,вчера\n");
        let err = load(&csv, RowPolicy::Strict).unwrap_err();

        assert!(matches!(err, StatsError::MalformedTimestamp { ref value } if value == "вчера"));
    }

    #[test]
    fn test_skip_policy_drops_unbuildable_rows() {
        let csv = format!(
            "{CSV_HEADER}\n\
             Программист,100,200,XYZ,Москва,2022-07-17T18:23:06+0300\n\
             Программист,100,200,RUR,Москва,вчера\n\
             Программист,100,200,RUR,Москва,2022-07-17T18:23:06+0300\n"
        );
        let dataset = load(&csv, RowPolicy::Skip).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.skipped(), 2);
    }

    #[test]
    fn test_year_statistics_keep_first_appearance_order() {
        let mut dataset = Dataset::new();
        dataset.push(record("a", 100.0, "Москва", "2021"));
        dataset.push(record("b", 200.0, "Москва", "2019"));
        dataset.push(record("c", 301.0, "Тверь", "2021"));

        let stats = dataset.year_statistics();
        let years: Vec<_> = stats.years().collect();

        assert_eq!(years, ["2021", "2019"]);
        assert_eq!(
            stats.get("2021"),
            Some(YearStat {
                average_salary: 200,
                count: 2
            })
        );
        assert_eq!(
            stats.get("2019"),
            Some(YearStat {
                average_salary: 200,
                count: 1
            })
        );
    }

    #[test]
    fn test_average_salary_is_floored() {
        let mut dataset = Dataset::new();
        dataset.push(record("a", 100.0, "Москва", "2021"));
        dataset.push(record("b", 101.0, "Москва", "2021"));

        assert_eq!(dataset.year_statistics().get("2021").unwrap().average_salary, 100);
        assert_eq!(dataset.area_statistics().by_salary[0].average_salary, 100);
    }

    #[test]
    fn test_filtered_years_keep_every_year() {
        let mut dataset = Dataset::new();
        dataset.push(record("Аналитик", 100.0, "Москва", "2020"));
        dataset.push(record("Программист", 300.0, "Тверь", "2021"));

        let filter = TitleFilter::new("Программист");
        let stats = dataset.year_statistics_where(|r| filter.matches(r));

        assert_eq!(stats.len(), 2);
        assert_eq!(stats.get("2020"), Some(YearStat::default()));
        assert_eq!(
            stats.get("2021"),
            Some(YearStat {
                average_salary: 300,
                count: 1
            })
        );
    }

    #[test]
    fn test_area_threshold_boundary() {
        // 1 of 101 rounds to 0.0099 and is dropped.
        let mut dataset = Dataset::new();
        for _ in 0..100 {
            dataset.push(record("a", 100.0, "Москва", "2022"));
        }
        dataset.push(record("a", 100.0, "Тверь", "2022"));

        let rankings = dataset.area_statistics();
        assert!(rankings.by_fraction.iter().all(|s| s.area != "Тверь"));
        assert!(rankings.by_salary.iter().all(|s| s.area != "Тверь"));

        // 1 of 100 rounds to exactly 0.01 and is kept.
        let mut dataset = Dataset::new();
        for _ in 0..99 {
            dataset.push(record("a", 100.0, "Москва", "2022"));
        }
        dataset.push(record("a", 100.0, "Тверь", "2022"));

        let rankings = dataset.area_statistics();
        let tver = rankings
            .by_fraction
            .iter()
            .find(|s| s.area == "Тверь")
            .unwrap();
        assert_eq!(tver.fraction, 0.01);
        assert!(rankings.by_salary.iter().any(|s| s.area == "Тверь"));
    }

    #[test]
    fn test_rankings_are_descending_and_stable() {
        let mut dataset = Dataset::new();
        dataset.push(record("a", 100.0, "Казань", "2022"));
        dataset.push(record("a", 500.0, "Москва", "2022"));
        dataset.push(record("a", 500.0, "Москва", "2022"));
        dataset.push(record("a", 500.0, "Тверь", "2022"));
        dataset.push(record("a", 100.0, "Омск", "2022"));

        let rankings = dataset.area_statistics();

        let by_salary: Vec<_> = rankings.by_salary.iter().map(|s| s.area.as_str()).collect();
        assert_eq!(by_salary, ["Москва", "Тверь", "Казань", "Омск"]);

        let by_fraction: Vec<_> = rankings
            .by_fraction
            .iter()
            .map(|s| (s.area.as_str(), s.fraction))
            .collect();
        assert_eq!(
            by_fraction,
            [("Москва", 0.4), ("Казань", 0.2), ("Тверь", 0.2), ("Омск", 0.2)]
        );
    }

    #[test]
    fn test_empty_dataset_queries() {
        let dataset = Dataset::new();
        assert!(dataset.year_statistics().is_empty());
        assert_eq!(dataset.area_statistics(), AreaRankings::default());
    }
}
