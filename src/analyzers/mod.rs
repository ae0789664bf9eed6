//! Aggregation of posting records by year and by area.
//!
//! [`Dataset`](dataset::Dataset) owns the admitted records and answers the
//! per-year and per-area queries; the result types live in [`types`].

pub mod dataset;
pub mod filter;
pub mod types;
pub mod utility;
