//! FCPXML time attribute parsing and formatting.
//!
//! FCPXML expresses positions and durations as seconds with an `s` suffix,
//! either as a plain decimal (`"12.5s"`) or as a rational
//! numerator/denominator pair (`"37500/1000s"`). Only those two grammars are
//! accepted; anything else is an error.

use super::{Result, TimelineError};

/// Parse an FCPXML time value into seconds.
pub fn parse_seconds(raw: &str) -> Result<f64> {
    parse_inner(raw).ok_or_else(|| TimelineError::BadTimeValue {
        value: raw.to_string(),
    })
}

fn parse_inner(raw: &str) -> Option<f64> {
    let body = raw.trim().strip_suffix('s')?;

    if let Some((numerator, denominator)) = body.split_once('/') {
        let numerator: i64 = numerator.parse().ok()?;
        let denominator: i64 = denominator.parse().ok()?;
        if denominator == 0 {
            return None;
        }
        Some(numerator as f64 / denominator as f64)
    } else {
        body.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Format seconds as an FCPXML time value with millisecond precision.
pub fn format_seconds(value: f64) -> String {
    let mut formatted = format!("{:.3}", (value * 1000.0).round() / 1000.0);
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }
    formatted.push('s');
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_seconds("12.5s").unwrap(), 12.5);
        assert_eq!(parse_seconds("0s").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_rational() {
        assert_eq!(parse_seconds("37500/1000s").unwrap(), 37.5);
        assert_eq!(parse_seconds("3000/3000s").unwrap(), 1.0);
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        assert!(parse_seconds("12.5").is_err());
        assert!(parse_seconds("abcs").is_err());
        assert!(parse_seconds("1/0s").is_err());
        assert!(parse_seconds("1/2/3s").is_err());
        assert!(parse_seconds("").is_err());
    }

    #[test]
    fn test_parse_rejects_expressions() {
        // The informal original evaluated these as code; we must not.
        assert!(parse_seconds("1+1s").is_err());
        assert!(parse_seconds("__import__('os')s").is_err());
    }

    #[test]
    fn test_format_trims_trailing_zeros() {
        assert_eq!(format_seconds(12.5), "12.5s");
        assert_eq!(format_seconds(2.0), "2s");
        assert_eq!(format_seconds(0.333), "0.333s");
    }

    #[test]
    fn test_format_parse_round_trip() {
        for value in [0.0, 0.001, 1.5, 37.5, 120.25] {
            assert_eq!(parse_seconds(&format_seconds(value)).unwrap(), value);
        }
    }
}
