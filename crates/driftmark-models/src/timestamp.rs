//! Timestamp parsing and formatting for encoder progress.
//!
//! The encoder reports elapsed output time as `HH:MM:SS.ff`; these helpers
//! convert between that form and seconds.

/// Parse a timestamp string to total seconds.
///
/// Supports formats:
/// - `HH:MM:SS` or `HH:MM:SS.ff`
/// - `MM:SS` or `MM:SS.ff`
/// - `SS` or `SS.ff`
///
/// # Examples
/// ```
/// use driftmark_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("00:00:02.50").unwrap(), 2.5);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    // Components from least to most significant: seconds, minutes, hours
    const COMPONENTS: [(&str, f64); 3] = [("seconds", 1.0), ("minutes", 60.0), ("hours", 3600.0)];

    let mut total = 0.0;
    for (part, (name, scale)) in parts.iter().rev().zip(COMPONENTS) {
        let value: f64 = part
            .parse()
            .map_err(|_| TimestampError::InvalidValue(name, part.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total += value * scale;
    }

    Ok(total)
}

/// Format seconds as `HH:MM:SS.ff`.
pub fn format_seconds(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    format!("{:02}:{:02}:{:05.2}", hours, mins, secs)
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampError {
    /// Timestamp string is empty
    Empty,
    /// Timestamp contains negative values
    Negative,
    /// Invalid numeric value for a component
    InvalidValue(&'static str, String),
    /// Invalid timestamp format
    InvalidFormat(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Timestamp cannot be empty"),
            Self::Negative => write!(f, "Timestamp cannot be negative"),
            Self::InvalidValue(component, value) => {
                write!(f, "Invalid {} value: {}", component, value)
            }
            Self::InvalidFormat(ts) => write!(
                f,
                "Invalid timestamp format '{}'. Use HH:MM:SS.ff, MM:SS.ff or SS.ff",
                ts
            ),
        }
    }
}

impl std::error::Error for TimestampError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encoder_time() {
        assert!((parse_timestamp("00:01:02.25").unwrap() - 62.25).abs() < 1e-9);
        assert!((parse_timestamp("01:00:00.00").unwrap() - 3600.0).abs() < 1e-9);
        assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_timestamp(""), Err(TimestampError::Empty));
        assert_eq!(parse_timestamp("00:-01:00"), Err(TimestampError::Negative));
        assert!(matches!(
            parse_timestamp("00:xx:01"),
            Err(TimestampError::InvalidValue("minutes", _))
        ));
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(62.25), "00:01:02.25");
        assert_eq!(format_seconds(3725.0), "01:02:05.00");
        assert_eq!(format_seconds(-1.0), "00:00:00.00");
    }
}
