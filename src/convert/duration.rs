//! Duration converter
//!
//! Accepts compound unit strings: `"300ms"`, `"1.5h"`, `"2h45m"`, `"10us"`.
//! A bare `"0"` is zero. Units: `ns`, `us`/`µs`/`μs`, `ms`, `s`, `m`, `h`.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use super::Converter;
use crate::error::{BindError, Result};
use crate::field::Field;
use crate::parameter::Parameter;

/// One `<number><unit>` component, ASCII digits only
static COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(ns|us|µs|μs|ms|s|m|h)").expect("valid duration regex")
});

const TARGET: &str = "Duration";

/// Nanoseconds per unit
fn unit_nanos(unit: &str) -> u128 {
    match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60_000_000_000,
        _ => 3_600_000_000_000,
    }
}

/// `<int>.<frac>` scaled by `unit` nanoseconds, fraction truncated
fn component_nanos(number: &str, unit: u128) -> Option<u128> {
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    let whole = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<u128>().ok()?.checked_mul(unit)?
    };

    // Digits past nanosecond precision of an hour cannot change the result
    let frac_part = &frac_part[..frac_part.len().min(18)];
    if frac_part.is_empty() {
        return Some(whole);
    }
    let frac: u128 = frac_part.parse().ok()?;
    let scale = 10u128.pow(frac_part.len() as u32);
    whole.checked_add(frac * unit / scale)
}

/// Parse a duration string like "30s", "5m", "1h30m" into a Duration
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    let s = duration_str.trim();
    if s.is_empty() {
        return Err(BindError::parse(duration_str, TARGET, "empty duration"));
    }
    if s.starts_with('-') {
        return Err(BindError::parse(duration_str, TARGET, "negative duration"));
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let overflow = || BindError::parse(duration_str, TARGET, "duration out of range");
    let mut total: u128 = 0;
    let mut consumed = 0;
    for caps in COMPONENT.captures_iter(s) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() != consumed {
            return Err(BindError::parse(
                duration_str,
                TARGET,
                format!("unexpected {:?}", &s[consumed..whole.start()]),
            ));
        }
        let nanos = component_nanos(&caps[1], unit_nanos(&caps[2])).ok_or_else(overflow)?;
        total = total.checked_add(nanos).ok_or_else(overflow)?;
        consumed = whole.end();
    }

    if consumed != s.len() {
        let rest = &s[consumed..];
        let reason = if rest.chars().all(|c| c.is_ascii_digit() || c == '.') {
            format!("missing unit after {:?}", rest)
        } else {
            format!("unknown unit in {:?}", rest)
        };
        return Err(BindError::parse(duration_str, TARGET, reason));
    }

    let secs = u64::try_from(total / 1_000_000_000).map_err(|_| overflow())?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

/// Parses `std::time::Duration` fields, passes on everything else
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationConverter;

impl Converter for DurationConverter {
    fn convert(&self, param: &Parameter, field: &mut dyn Field) -> Result<bool> {
        let Some(slot) = field.as_any_mut().downcast_mut::<Duration>() else {
            return Ok(false);
        };
        *slot = parse_duration(&param.value)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn parses_compound_and_fractional() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("2h45m10s").unwrap(), Duration::from_secs(9910));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "nonsense", "5", "5x", "s", "-5s", "1h 30m", "invalid duration", "٥s"] {
            let err = parse_duration(bad).unwrap_err();
            assert!(
                matches!(err, BindError::Parse { target: "Duration", .. }),
                "{bad:?} gave {err}"
            );
        }
    }

    #[test]
    fn non_ascii_digits_are_a_parse_error() {
        let raw = format!("1.1{}s", "\u{0966}".repeat(6));
        let err = parse_duration(&raw).unwrap_err();
        assert!(matches!(err, BindError::Parse { target: "Duration", .. }));

        let err = parse_duration("1.\u{0661}\u{0662}ms").unwrap_err();
        assert!(matches!(err, BindError::Parse { .. }));
    }

    #[test]
    fn long_fractions_are_truncated() {
        let d = parse_duration("1.0000000000000000000009s").unwrap();
        assert_eq!(d, Duration::from_secs(1));
    }

    #[test]
    fn converter_only_touches_durations() {
        let mut timeout = Duration::ZERO;
        let handled = DurationConverter
            .convert(&Parameter::string("/timeout", "5s"), &mut timeout)
            .unwrap();
        assert!(handled);
        assert_eq!(timeout, Duration::from_secs(5));

        let mut name = String::new();
        let handled = DurationConverter
            .convert(&Parameter::string("/name", "foo"), &mut name)
            .unwrap();
        assert!(!handled);
        assert!(name.is_empty());
    }

    #[test]
    fn converter_reports_parse_failure() {
        let mut timeout = Duration::ZERO;
        let err = DurationConverter
            .convert(&Parameter::string("/timeout", "nonsense"), &mut timeout)
            .unwrap_err();
        assert!(err.to_string().contains("nonsense"));
    }
}
