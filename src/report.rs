//! Row sets and chart panels handed to the output sinks.
//!
//! Nothing here recomputes statistics: a [`Report`] only reshapes the results of
//! the dataset queries into the rows each sink renders.

use serde::Serialize;

use crate::analyzers::dataset::Dataset;
use crate::analyzers::filter::TitleFilter;
use crate::analyzers::types::{AreaRankings, AreaSalary, AreaShare, YearStat, YearStatistics};
use crate::text::wrap_label;

/// Number of areas shown in the city tables and charts.
pub const TOP_AREAS: usize = 10;

/// Pie slice label for everything outside the top areas.
pub const OTHER_AREAS_LABEL: &str = "Другие";

pub const SALARY_BY_YEAR_TITLE: &str = "Уровень зарплат по годам";
pub const COUNT_BY_YEAR_TITLE: &str = "Количество вакансий по годам";
pub const SALARY_BY_AREA_TITLE: &str = "Уровень зарплат по городам";
pub const SHARE_BY_AREA_TITLE: &str = "Доля вакансий по городам";

/// One line of the per-year table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearRow {
    pub year: String,
    pub average_all: i64,
    pub average_filtered: i64,
    pub count_all: usize,
    pub count_filtered: usize,
}

/// One line of the city table: the n-th entry of each ranking, side by side.
///
/// A side is `None` when its ranking has fewer than n areas.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopAreaRow {
    pub salary: Option<AreaSalary>,
    pub share: Option<AreaShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub legend: String,
    pub values: Vec<i64>,
}

/// Two bar series over the same year labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBars {
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizontalBars {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pie {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

/// The four chart panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub salary_by_year: GroupedBars,
    pub count_by_year: GroupedBars,
    pub salary_by_area: HorizontalBars,
    pub share_by_area: Pie,
}

/// Query results for one run: all postings, postings matching the query, and area rankings.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    query: String,
    all: YearStatistics,
    filtered: YearStatistics,
    rankings: AreaRankings,
}

impl Report {
    pub fn new(
        query: impl Into<String>,
        all: YearStatistics,
        filtered: YearStatistics,
        rankings: AreaRankings,
    ) -> Self {
        Self {
            query: query.into(),
            all,
            filtered,
            rankings,
        }
    }

    /// Runs the year and area queries against `dataset`.
    pub fn from_dataset(dataset: &Dataset, filter: &TitleFilter) -> Self {
        Self::new(
            filter.query(),
            dataset.year_statistics(),
            dataset.year_statistics_where(|record| filter.matches(record)),
            dataset.area_statistics(),
        )
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn all(&self) -> &YearStatistics {
        &self.all
    }

    pub fn filtered(&self) -> &YearStatistics {
        &self.filtered
    }

    pub fn rankings(&self) -> &AreaRankings {
        &self.rankings
    }

    /// One row per year of the unfiltered statistics.
    pub fn year_rows(&self) -> Vec<YearRow> {
        self.all
            .iter()
            .map(|(year, all)| {
                let filtered = self.filtered.get(year).unwrap_or_default();
                YearRow {
                    year: year.to_string(),
                    average_all: all.average_salary,
                    average_filtered: filtered.average_salary,
                    count_all: all.count,
                    count_filtered: filtered.count,
                }
            })
            .collect()
    }

    /// Exactly [`TOP_AREAS`] rows, padded with empty sides when a ranking is shorter.
    pub fn top_area_rows(&self) -> Vec<TopAreaRow> {
        (0..TOP_AREAS)
            .map(|i| TopAreaRow {
                salary: self.rankings.by_salary.get(i).cloned(),
                share: self.rankings.by_fraction.get(i).cloned(),
            })
            .collect()
    }

    pub fn top_salaries(&self) -> &[AreaSalary] {
        let n = self.rankings.by_salary.len().min(TOP_AREAS);
        &self.rankings.by_salary[..n]
    }

    pub fn top_shares(&self) -> &[AreaShare] {
        let n = self.rankings.by_fraction.len().min(TOP_AREAS);
        &self.rankings.by_fraction[..n]
    }

    /// Share of postings outside the top areas, never negative.
    pub fn other_share(&self) -> f64 {
        let top: f64 = self.top_shares().iter().map(|s| s.fraction).sum();
        (1.0 - top).max(0.0)
    }

    pub fn chart(&self) -> ChartData {
        let years: Vec<String> = self.all.years().map(str::to_string).collect();
        let salary = |stat: YearStat| stat.average_salary;
        let count = |stat: YearStat| stat.count as i64;

        let mut slices: Vec<PieSlice> = self
            .top_shares()
            .iter()
            .map(|s| PieSlice {
                label: s.area.clone(),
                fraction: s.fraction,
            })
            .collect();
        slices.push(PieSlice {
            label: OTHER_AREAS_LABEL.to_string(),
            fraction: self.other_share(),
        });

        ChartData {
            salary_by_year: GroupedBars {
                title: SALARY_BY_YEAR_TITLE.to_string(),
                labels: years.clone(),
                series: vec![
                    Series {
                        legend: "Средняя з/п".to_string(),
                        values: self.year_column(&self.all, salary),
                    },
                    Series {
                        legend: format!("З/п {}", self.query),
                        values: self.year_column(&self.filtered, salary),
                    },
                ],
            },
            count_by_year: GroupedBars {
                title: COUNT_BY_YEAR_TITLE.to_string(),
                labels: years,
                series: vec![
                    Series {
                        legend: "Количество вакансий".to_string(),
                        values: self.year_column(&self.all, count),
                    },
                    Series {
                        legend: format!("Количество вакансий {}", self.query),
                        values: self.year_column(&self.filtered, count),
                    },
                ],
            },
            salary_by_area: HorizontalBars {
                title: SALARY_BY_AREA_TITLE.to_string(),
                labels: self.top_salaries().iter().map(|s| wrap_label(&s.area)).collect(),
                values: self.top_salaries().iter().map(|s| s.average_salary).collect(),
            },
            share_by_area: Pie {
                title: SHARE_BY_AREA_TITLE.to_string(),
                slices,
            },
        }
    }

    /// Values of `stats` aligned on the unfiltered year labels.
    fn year_column(&self, stats: &YearStatistics, pick: impl Fn(YearStat) -> i64) -> Vec<i64> {
        self.all
            .years()
            .map(|year| pick(stats.get(year).unwrap_or_default()))
            .collect()
    }
}

/// Formats a fraction as a percentage with two decimals, e.g. `0.1234` as `12.34%`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vacancy::PostingRecord;

    fn dataset(areas: &[(&str, f64)]) -> Dataset {
        let mut dataset = Dataset::new();
        for (i, &(area, salary)) in areas.iter().enumerate() {
            let year = if i % 2 == 0 { "2021" } else { "2022" };
            dataset.push(PostingRecord::new(format!("Вакансия {i}"), salary, area, year));
        }
        dataset
    }

    #[test]
    fn test_year_rows_pair_all_and_filtered() {
        let dataset = dataset(&[("Москва", 100.0), ("Москва", 200.0), ("Тверь", 300.0)]);
        let report = Report::from_dataset(&dataset, &TitleFilter::new("Вакансия 1"));

        assert_eq!(
            report.year_rows(),
            vec![
                YearRow {
                    year: "2021".to_string(),
                    average_all: 200,
                    average_filtered: 0,
                    count_all: 2,
                    count_filtered: 0,
                },
                YearRow {
                    year: "2022".to_string(),
                    average_all: 200,
                    average_filtered: 200,
                    count_all: 1,
                    count_filtered: 1,
                },
            ]
        );
    }

    #[test]
    fn test_top_area_rows_are_padded_to_ten() {
        let dataset = dataset(&[("Москва", 100.0), ("Тверь", 300.0), ("Тверь", 300.0)]);
        let report = Report::from_dataset(&dataset, &TitleFilter::new(""));
        let rows = report.top_area_rows();

        assert_eq!(rows.len(), TOP_AREAS);
        assert_eq!(rows[0].salary.as_ref().unwrap().area, "Тверь");
        assert_eq!(rows[0].share.as_ref().unwrap().area, "Тверь");
        assert_eq!(rows[1].salary.as_ref().unwrap().area, "Москва");
        assert!(rows[2..].iter().all(|row| *row == TopAreaRow::default()));
    }

    #[test]
    fn test_top_area_rows_truncate_long_rankings() {
        let areas: Vec<(String, f64)> = (0..12).map(|i| (format!("Город {i}"), 1000.0 - i as f64)).collect();
        let areas: Vec<(&str, f64)> = areas.iter().map(|(a, s)| (a.as_str(), *s)).collect();
        let report = Report::from_dataset(&dataset(&areas), &TitleFilter::new(""));

        let rows = report.top_area_rows();
        assert_eq!(rows.len(), TOP_AREAS);
        assert!(rows.iter().all(|row| row.salary.is_some() && row.share.is_some()));
        assert_eq!(rows[9].salary.as_ref().unwrap().area, "Город 9");
        assert_eq!(report.top_salaries().len(), TOP_AREAS);
    }

    #[test]
    fn test_chart_pie_has_other_slice() {
        let areas: Vec<(String, f64)> = (0..12).map(|i| (format!("Город {i}"), 100.0)).collect();
        let areas: Vec<(&str, f64)> = areas.iter().map(|(a, s)| (a.as_str(), *s)).collect();
        let report = Report::from_dataset(&dataset(&areas), &TitleFilter::new(""));

        let chart = report.chart();
        let slices = &chart.share_by_area.slices;

        assert_eq!(slices.len(), TOP_AREAS + 1);
        let other = slices.last().unwrap();
        assert_eq!(other.label, OTHER_AREAS_LABEL);
        // Each of the 12 areas holds round(1/12, 4) = 0.0833.
        assert!((other.fraction - (1.0 - 10.0 * 0.0833)).abs() < 1e-9);
    }

    #[test]
    fn test_chart_panels() {
        let dataset = dataset(&[("Санкт-Петербург", 100.0), ("Москва", 200.0)]);
        let report = Report::from_dataset(&dataset, &TitleFilter::new("Вакансия 0"));
        let chart = report.chart();

        assert_eq!(chart.salary_by_year.labels, ["2021", "2022"]);
        assert_eq!(chart.salary_by_year.series[0].values, [100, 200]);
        assert_eq!(chart.salary_by_year.series[1].values, [100, 0]);
        assert_eq!(chart.salary_by_year.series[1].legend, "З/п Вакансия 0");
        assert_eq!(chart.count_by_year.series[0].values, [1, 1]);
        assert_eq!(chart.count_by_year.series[1].values, [1, 0]);
        assert_eq!(chart.salary_by_area.labels, ["Москва", "Санкт-\nПетербург"]);
        assert_eq!(chart.salary_by_area.values, [200, 100]);
        assert_eq!(chart.share_by_area.slices.last().unwrap().fraction, 0.0);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.1234), "12.34%");
        assert_eq!(format_percent(0.5), "50.00%");
        assert_eq!(format_percent(0.01), "1.00%");
    }
}
