//! Statistics produced by the aggregation queries.

use serde::Serialize;

/// Average salary and posting count for one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct YearStat {
    pub average_salary: i64,
    pub count: usize,
}

/// Per-year statistics in the order years first appeared in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearStatistics {
    entries: Vec<(String, YearStat)>,
}

impl YearStatistics {
    pub(crate) fn push(&mut self, year: &str, stat: YearStat) {
        self.entries.push((year.to_string(), stat));
    }

    /// Statistic for `year`, if the year occurs in the dataset.
    pub fn get(&self, year: &str) -> Option<YearStat> {
        self.entries
            .iter()
            .find(|(key, _)| key == year)
            .map(|(_, stat)| *stat)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, YearStat)> {
        self.entries.iter().map(|(year, stat)| (year.as_str(), *stat))
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(year, _)| year.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fraction of all postings published in an area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaShare {
    pub area: String,
    pub fraction: f64,
}

/// Average salary of the postings in an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaSalary {
    pub area: String,
    pub average_salary: i64,
}

/// Both area rankings, each sorted in descending order of its value.
///
/// Areas holding less than 1% of the postings appear in neither ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaRankings {
    pub by_fraction: Vec<AreaShare>,
    pub by_salary: Vec<AreaSalary>,
}
