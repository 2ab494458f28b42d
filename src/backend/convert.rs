#![cfg(feature = "server")]
use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Date format of the REST API and of the database columns.
pub const ISO_PATTERN: &str = "%Y-%m-%d %H:%M:%S";
/// Date format of meter exports (`05/03/2021 14:30`).
pub const CSV_PATTERN: &str = "%d/%m/%Y %H:%M";
/// Largest meter balance accepted, either side of zero. Negative balances
/// are emergency credit.
pub const READING_LIMIT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid decimal '{0}'")]
    InvalidDecimal(String),
    #[error("reading {0} is outside -{limit}..={limit}", limit = READING_LIMIT)]
    ReadingOutOfRange(Decimal),
}

pub fn parse_iso(value: &str) -> Result<NaiveDateTime, ConvertError> {
    NaiveDateTime::parse_from_str(value.trim(), ISO_PATTERN)
        .map_err(|_| ConvertError::InvalidDate(value.to_string()))
}

pub fn format_iso(value: &NaiveDateTime) -> String {
    value.format(ISO_PATTERN).to_string()
}

pub fn parse_csv_date(value: &str) -> Result<NaiveDateTime, ConvertError> {
    NaiveDateTime::parse_from_str(value.trim(), CSV_PATTERN)
        .map_err(|_| ConvertError::InvalidDate(value.to_string()))
}

pub fn parse_decimal(value: &str) -> Result<Decimal, ConvertError> {
    Decimal::from_str(value.trim()).map_err(|_| ConvertError::InvalidDecimal(value.to_string()))
}

/// A meter balance: a decimal within [`READING_LIMIT`] of zero.
pub fn parse_reading(value: &str) -> Result<Decimal, ConvertError> {
    let reading = parse_decimal(value)?;
    if reading.abs() > READING_LIMIT {
        return Err(ConvertError::ReadingOutOfRange(reading));
    }
    Ok(reading)
}

/// Money as the API returns it: two places, half-up.
pub fn format_money(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}
