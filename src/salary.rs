//! Salary quotes and conversion to roubles, the reference currency.

use crate::error::{Result, StatsError};

/// Rouble value of one unit of each supported currency.
static CURRENCY_TO_RUB: &[(&str, f64)] = &[
    ("AZN", 35.68),
    ("BYR", 23.91),
    ("EUR", 59.90),
    ("GEL", 21.74),
    ("KGS", 0.76),
    ("KZT", 0.13),
    ("RUR", 1.0),
    ("UAH", 1.64),
    ("USD", 60.66),
    ("UZS", 0.0055),
];

/// Looks up the conversion rate for `code`, ignoring case.
pub fn rate(code: &str) -> Option<f64> {
    let code = code.to_uppercase();
    CURRENCY_TO_RUB
        .iter()
        .find(|(known, _)| *known == code)
        .map(|&(_, rate)| rate)
}

/// A salary fork in some currency. Only constructible for currencies present in the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryQuote {
    low: f64,
    high: f64,
    currency: String,
    rate: f64,
}

impl SalaryQuote {
    /// Builds a quote from numeric bounds.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::UnknownCurrency`] if `currency` is not in the table.
    pub fn new(low: f64, high: f64, currency: &str) -> Result<Self> {
        let rate = rate(currency).ok_or_else(|| StatsError::UnknownCurrency {
            code: currency.to_string(),
        })?;

        Ok(Self {
            low,
            high,
            currency: currency.to_string(),
            rate,
        })
    }

    /// Builds a quote from the raw CSV strings.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::MalformedSalary`] for a bound that is not a number and
    /// [`StatsError::UnknownCurrency`] for an unsupported currency.
    pub fn parse(low: &str, high: &str, currency: &str) -> Result<Self> {
        Self::new(parse_bound(low)?, parse_bound(high)?, currency)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Midpoint of the fork converted to roubles.
    pub fn to_reference(&self) -> f64 {
        (self.low + self.high) / 2.0 * self.rate
    }
}

fn parse_bound(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StatsError::MalformedSalary {
            value: value.to_string(),
        })
}
