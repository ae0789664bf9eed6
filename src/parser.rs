//! CSV source reading and row admission.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder};

use crate::error::{Result, StatsError};
use crate::vacancy::Header;

/// Why a row was dropped before any record was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    /// At least one cell is empty.
    EmptyField,
    /// The row is more than one cell shorter than the header.
    TooFewFields { expected_at_least: usize, found: usize },
    /// The row is one cell short and the omitted trailing cell is a recognized column.
    MissingTrailingField { column: &'static str },
}

/// Checks a row's shape against a header of `header_len` columns.
///
/// A row may omit at most one trailing cell; any empty cell disqualifies it.
pub fn admit_row<S: AsRef<str>>(row: &[S], header_len: usize) -> std::result::Result<(), RowRejection> {
    if row.iter().any(|cell| cell.as_ref().is_empty()) {
        return Err(RowRejection::EmptyField);
    }

    let expected_at_least = header_len.saturating_sub(1);
    if row.len() < expected_at_least {
        return Err(RowRejection::TooFewFields {
            expected_at_least,
            found: row.len(),
        });
    }

    Ok(())
}

/// Checks the cell a one-short row omits.
///
/// Only an unrecognized trailing column may be left out; a row missing a column the
/// record builder needs is dropped like any other malformed row.
pub fn check_trailing<S: AsRef<str>>(row: &[S], header: &Header) -> std::result::Result<(), RowRejection> {
    if row.len() >= header.len() {
        return Ok(());
    }

    match header.field_at(row.len()) {
        Some(field) => Err(RowRejection::MissingTrailingField {
            column: field.column(),
        }),
        None => Ok(()),
    }
}

/// Builds a comma-separated reader that tolerates ragged rows.
///
/// A leading UTF-8 byte-order mark is skipped.
pub fn csv_reader<R: Read>(source: R) -> Reader<R> {
    ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(source)
}

/// Opens the source file at `path` as a CSV reader.
///
/// # Errors
///
/// Returns [`StatsError::SourceNotFound`] if the file does not exist and
/// [`StatsError::SourceRead`] if it cannot be opened.
pub fn open_source(path: &Path) -> Result<Reader<File>> {
    if !path.exists() {
        return Err(StatsError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| StatsError::SourceRead {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    Ok(csv_reader(file))
}
