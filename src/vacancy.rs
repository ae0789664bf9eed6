//! Posting records built from raw CSV rows.
//!
//! A [`Header`] resolves column names to [`Field`]s once per file; each row is then
//! folded into a [`PostingRecord`] by matching on the field of its column. Text fields
//! are cleaned with [`clean_text`], the salary columns are converted to roubles and the
//! publication timestamp is reduced to its year.

use chrono::{DateTime, Datelike};
use serde::Serialize;

use crate::error::{Result, StatsError};
use crate::salary::SalaryQuote;
use crate::text::clean_text;

/// Columns the record builder understands. Any other column is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    SalaryFrom,
    SalaryTo,
    SalaryCurrency,
    AreaName,
    PublishedAt,
}

impl Field {
    /// Every field a record is built from.
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::SalaryFrom,
        Field::SalaryTo,
        Field::SalaryCurrency,
        Field::AreaName,
        Field::PublishedAt,
    ];

    /// Resolves a header cell to a field.
    pub fn from_column(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Field::Name),
            "salary_from" => Some(Field::SalaryFrom),
            "salary_to" => Some(Field::SalaryTo),
            "salary_currency" => Some(Field::SalaryCurrency),
            "area_name" => Some(Field::AreaName),
            "published_at" => Some(Field::PublishedAt),
            _ => None,
        }
    }

    /// Column name as it appears in the CSV header.
    pub fn column(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::SalaryFrom => "salary_from",
            Field::SalaryTo => "salary_to",
            Field::SalaryCurrency => "salary_currency",
            Field::AreaName => "area_name",
            Field::PublishedAt => "published_at",
        }
    }
}

/// Column layout of a source file.
#[derive(Debug, Clone, Default)]
pub struct Header {
    columns: Vec<Option<Field>>,
}

impl Header {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = names
            .into_iter()
            .map(|name| Field::from_column(name.as_ref().trim_start_matches('\u{feff}')))
            .collect();
        Self { columns }
    }

    /// Number of columns, recognized or not.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// First field the record builder needs that no column provides.
    pub fn first_missing(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| !self.columns.contains(&Some(*field)))
    }

    /// Field of the column at `index`, if the column is recognized.
    pub fn field_at(&self, index: usize) -> Option<Field> {
        self.columns.get(index).copied().flatten()
    }
}

/// One job posting with its salary already in roubles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostingRecord {
    title: String,
    reference_salary: f64,
    area: String,
    year: String,
}

impl PostingRecord {
    pub fn new(
        title: impl Into<String>,
        reference_salary: f64,
        area: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            reference_salary,
            area: area.into(),
            year: year.into(),
        }
    }

    /// Builds a record from one CSV row laid out according to `header`.
    ///
    /// Cells beyond the header and cells of unrecognized columns are ignored.
    ///
    /// # Errors
    ///
    /// Fails with [`StatsError::MissingField`] when a recognized column is absent from
    /// the row, and propagates salary and timestamp errors.
    pub fn from_row<S: AsRef<str>>(row: &[S], header: &Header) -> Result<Self> {
        let mut draft = Draft::default();

        for (index, cell) in row.iter().enumerate() {
            let Some(field) = header.field_at(index) else {
                continue;
            };
            let value = clean_text(cell.as_ref());

            match field {
                Field::Name => draft.name = Some(value),
                Field::SalaryFrom => draft.salary_from = Some(value),
                Field::SalaryTo => draft.salary_to = Some(value),
                Field::SalaryCurrency => draft.salary_currency = Some(value),
                Field::AreaName => draft.area_name = Some(value),
                Field::PublishedAt => draft.published_at = Some(value),
            }
        }

        draft.finish()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn reference_salary(&self) -> f64 {
        self.reference_salary
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    /// True if `query` occurs in the title. Case-sensitive; an empty query matches.
    pub fn title_contains(&self, query: &str) -> bool {
        self.title.contains(query)
    }
}

#[derive(Default)]
struct Draft {
    name: Option<String>,
    salary_from: Option<String>,
    salary_to: Option<String>,
    salary_currency: Option<String>,
    area_name: Option<String>,
    published_at: Option<String>,
}

impl Draft {
    fn finish(self) -> Result<PostingRecord> {
        let title = require(self.name, Field::Name)?;
        let low = require(self.salary_from, Field::SalaryFrom)?;
        let high = require(self.salary_to, Field::SalaryTo)?;
        let currency = require(self.salary_currency, Field::SalaryCurrency)?;
        let area = require(self.area_name, Field::AreaName)?;
        let published_at = require(self.published_at, Field::PublishedAt)?;

        let salary = SalaryQuote::parse(&low, &high, &currency)?;
        let year = publication_year(&published_at)?;

        Ok(PostingRecord::new(title, salary.to_reference(), area, year))
    }
}

fn require(value: Option<String>, field: Field) -> Result<String> {
    value.ok_or(StatsError::MissingField {
        field: field.column(),
    })
}

/// Extracts the four-digit year from a `YYYY-MM-DDTHH:MM:SS+HHMM` timestamp.
///
/// The offset comes without a colon; one is inserted before its last two digits
/// so the value parses as RFC 3339.
pub fn publication_year(timestamp: &str) -> Result<String> {
    let malformed = || StatsError::MalformedTimestamp {
        value: timestamp.to_string(),
    };

    let split = timestamp.len().checked_sub(2).ok_or_else(malformed)?;
    if !timestamp.is_char_boundary(split) {
        return Err(malformed());
    }
    let (head, minutes) = timestamp.split_at(split);
    let normalized = format!("{head}:{minutes}");

    let parsed = DateTime::parse_from_rfc3339(&normalized).map_err(|_| malformed())?;
    Ok(format!("{:04}", parsed.year()))
}
