use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

static ISO8601_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(?P<w>\d+(?:\.\d+)?)W)?(?:(?P<d>\d+(?:\.\d+)?)D)?(?:T(?:(?P<h>\d+(?:\.\d+)?)H)?(?:(?P<m>\d+(?:\.\d+)?)M)?(?:(?P<s>\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("duration pattern is valid")
});

/// Longest duration accepted from the source, ten years
const MAX_MILLIS: f64 = 3650.0 * 86_400_000.0;

/// Parse an ISO-8601 duration as reported by ARM (`PT1M2.5S`, `P1DT2H`).
///
/// Years and months are rejected since they have no fixed length. Precision
/// is truncated to milliseconds. Durations over ten years are rejected.
pub fn parse_iso8601_duration(input: &str) -> Result<Duration> {
    let trimmed = input.trim();
    let caps = ISO8601_DURATION
        .captures(trimmed)
        .ok_or_else(|| Error::InvalidDuration(input.to_string()))?;

    const UNITS: [(&str, f64); 5] = [
        ("w", 7.0 * 86_400_000.0),
        ("d", 86_400_000.0),
        ("h", 3_600_000.0),
        ("m", 60_000.0),
        ("s", 1_000.0),
    ];

    let mut matched_any = false;
    let mut millis = 0.0_f64;
    for (name, scale) in UNITS {
        if let Some(m) = caps.name(name) {
            let value: f64 = m
                .as_str()
                .parse()
                .map_err(|_| Error::InvalidDuration(input.to_string()))?;
            millis += value * scale;
            matched_any = true;
        }
    }

    if !matched_any {
        return Err(Error::InvalidDuration(input.to_string()));
    }

    if !millis.is_finite() || millis > MAX_MILLIS {
        return Err(Error::InvalidDuration(input.to_string()));
    }

    Duration::try_milliseconds(millis.floor() as i64)
        .ok_or_else(|| Error::InvalidDuration(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fractional_seconds() {
        assert_eq!(
            parse_iso8601_duration("PT1M2.5S").unwrap(),
            Duration::milliseconds(62_500)
        );
    }

    #[test]
    fn test_parse_arm_precision_truncates_to_millis() {
        assert_eq!(
            parse_iso8601_duration("PT12.3456789S").unwrap(),
            Duration::milliseconds(12_345)
        );
    }

    #[test]
    fn test_parse_days_and_hours() {
        assert_eq!(
            parse_iso8601_duration("P1DT2H").unwrap(),
            Duration::hours(26)
        );
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(parse_iso8601_duration("PT0S").unwrap(), Duration::zero());
    }

    #[test]
    fn test_rejects_empty_designators() {
        assert!(parse_iso8601_duration("P").is_err());
        assert!(parse_iso8601_duration("PT").is_err());
    }

    #[test]
    fn test_rejects_out_of_range_durations() {
        assert!(matches!(
            parse_iso8601_duration("P999999999D"),
            Err(Error::InvalidDuration(s)) if s == "P999999999D"
        ));
        let huge = format!("PT{}S", "9".repeat(400));
        assert!(parse_iso8601_duration(&huge).is_err());
        assert_eq!(
            parse_iso8601_duration("P3650D").unwrap(),
            Duration::days(3650)
        );
    }

    #[test]
    fn test_rejects_calendar_units_and_garbage() {
        assert!(parse_iso8601_duration("P1Y").is_err());
        assert!(parse_iso8601_duration("00:01:02").is_err());
        assert!(matches!(
            parse_iso8601_duration("soon"),
            Err(Error::InvalidDuration(s)) if s == "soon"
        ));
    }
}
