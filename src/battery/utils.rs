// projeto: lstmsocdata
// file: src/battery/utils.rs
// Error handling and small parsing helpers shared by the dataset modules

use chrono::Duration;
use ndarray::ShapeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cycle '{name}' has no discharge rows")]
    EmptyCycle { name: String },

    #[error("Cycle '{name}' has a zero SoC maximum, percentage is undefined")]
    DegenerateCycle { name: String },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid time string '{0}', expected H:MM:SS.ffffff")]
    InvalidTimeString(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty cycle set: {0}")]
    EmptySet(String),

    #[error("Shape error: {0}")]
    Shape(String),
}

impl From<ShapeError> for DataError {
    fn from(err: ShapeError) -> Self {
        DataError::Shape(err.to_string())
    }
}

/// Converts a program time such as `3:05:12.250000` into seconds.
///
/// Hours are not bounded to a day, a long test can report `27:00:00.000000`.
/// The fractional part holds microseconds; fractions with fewer than six
/// digits are right padded.
pub fn time_string_to_seconds(input: &str) -> Result<f64, DataError> {
    let invalid = || DataError::InvalidTimeString(input.to_string());
    let trimmed = input.trim();

    let mut parts = trimmed.split(':');
    let (hours, minutes, rest) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s), None) => (h, m, s),
        _ => return Err(invalid()),
    };

    let (seconds, fraction) = match rest.split_once('.') {
        Some((s, f)) => (s, f),
        None => (rest, ""),
    };
    if fraction.len() > 6 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: i64 = seconds.parse().map_err(|_| invalid())?;
    let micros: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<6}", fraction).parse().map_err(|_| invalid())?
    };
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return Err(invalid());
    }

    Duration::try_hours(hours)
        .and_then(|d| d.checked_add(&Duration::minutes(minutes)))
        .and_then(|d| d.checked_add(&Duration::seconds(seconds)))
        .and_then(|d| d.checked_add(&Duration::microseconds(micros)))
        .and_then(|d| d.num_microseconds())
        .map(|us| us as f64 / 1_000_000.0)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_string_to_seconds() {
        assert_eq!(time_string_to_seconds("0:00:00.000000").unwrap(), 0.0);
        assert_eq!(time_string_to_seconds("1:02:03.500000").unwrap(), 3723.5);
        assert_eq!(time_string_to_seconds("27:00:00.000001").unwrap(), 97200.000001);
    }

    #[test]
    fn test_time_string_short_fraction_and_no_fraction() {
        assert_eq!(time_string_to_seconds("0:00:01.25").unwrap(), 1.25);
        assert_eq!(time_string_to_seconds("0:00:10").unwrap(), 10.0);
    }

    #[test]
    fn test_invalid_time_strings() {
        for bad in ["", "12", "1:2", "a:00:00.0", "0:61:00.0", "0:00:00.1234567", "1:2:3:4", "99999999999999:00:00.0"] {
            let result = time_string_to_seconds(bad);
            assert!(
                matches!(result, Err(DataError::InvalidTimeString(_))),
                "expected failure for '{}'",
                bad
            );
        }
    }
}
