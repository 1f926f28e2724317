//! Duration parsing utilities
//!
//! Parses interval strings such as `50ms`, `2s`, `1.5m`. A bare number is
//! taken as milliseconds.

use std::time::Duration;
use thiserror::Error;

/// Duration parsing errors
#[derive(Debug, Error, PartialEq)]
pub enum DurationParseError {
    #[error("Invalid duration format: {input}. Expected format like '50ms', '2s', '1m'")]
    InvalidFormat { input: String },

    #[error("Invalid duration unit: {unit}. Supported units: ms, s, m, h")]
    InvalidUnit { unit: String },

    #[error("Invalid duration value: {value}. Must be a non-negative number")]
    InvalidValue { value: String },
}

/// Parse a duration string
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vnotify::cli::duration_parser::parse_duration;
///
/// assert_eq!(parse_duration("250").unwrap(), Duration::from_millis(250));
/// assert_eq!(parse_duration("50ms").unwrap(), Duration::from_millis(50));
/// assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
/// assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
/// assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let input = input.trim().to_lowercase();

    if input.is_empty() {
        return Err(DurationParseError::InvalidFormat { input });
    }

    let number_end = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    if number_end == 0 {
        return Err(DurationParseError::InvalidFormat { input });
    }

    let (number_str, unit_str) = input.split_at(number_end);
    let value = number_str
        .parse::<f64>()
        .map_err(|_| DurationParseError::InvalidValue { value: number_str.to_string() })?;
    if !value.is_finite() || value < 0.0 {
        return Err(DurationParseError::InvalidValue { value: number_str.to_string() });
    }

    let millis_per_unit = match unit_str.trim() {
        "" | "ms" => 1.0,
        "s" | "sec" | "secs" => 1_000.0,
        "m" | "min" | "mins" => 60_000.0,
        "h" | "hr" | "hrs" => 3_600_000.0,
        other => return Err(DurationParseError::InvalidUnit { unit: other.to_string() }),
    };

    Ok(Duration::from_secs_f64(value * millis_per_unit / 1_000.0))
}
