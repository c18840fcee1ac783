//! Timestamp converter for `chrono::DateTime<Utc>` fields

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, ParseResult, Utc};

use super::Converter;
use crate::error::{BindError, Result};
use crate::field::Field;
use crate::parameter::Parameter;

const TARGET: &str = "DateTime<Utc>";

/// Layout a timestamp parameter is written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeLayout {
    /// `2020-01-02T15:04:05Z`
    Rfc3339,
    /// `Thu, 02 Jan 2020 15:04:05 +0000`
    Rfc2822,
    /// strftime-style format. Formats without an offset are read as UTC,
    /// date-only formats as midnight UTC.
    Format(String),
}

impl TimeLayout {
    pub fn parse(&self, raw: &str) -> Result<DateTime<Utc>> {
        let parsed = match self {
            TimeLayout::Rfc3339 => DateTime::parse_from_rfc3339(raw),
            TimeLayout::Rfc2822 => DateTime::parse_from_rfc2822(raw),
            TimeLayout::Format(format) => parse_with_format(raw, format),
        };
        parsed
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| BindError::parse(raw, TARGET, e))
    }
}

/// Offset-carrying first, then naive date-time, then naive date
fn parse_with_format(raw: &str, format: &str) -> ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, format).or_else(|err| {
        NaiveDateTime::parse_from_str(raw, format)
            .or_else(|_| {
                NaiveDate::parse_from_str(raw, format)
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
            .map(|naive| naive.and_utc().fixed_offset())
            .map_err(|_| err)
    })
}

impl From<&str> for TimeLayout {
    /// `"rfc3339"` and `"rfc2822"` (any case) name the standard layouts,
    /// anything else is a strftime format
    fn from(layout: &str) -> Self {
        match layout.to_ascii_lowercase().as_str() {
            "rfc3339" => TimeLayout::Rfc3339,
            "rfc2822" => TimeLayout::Rfc2822,
            _ => TimeLayout::Format(layout.to_string()),
        }
    }
}

impl From<String> for TimeLayout {
    fn from(layout: String) -> Self {
        TimeLayout::from(layout.as_str())
    }
}

impl fmt::Display for TimeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLayout::Rfc3339 => f.write_str("rfc3339"),
            TimeLayout::Rfc2822 => f.write_str("rfc2822"),
            TimeLayout::Format(format) => f.write_str(format),
        }
    }
}

/// Parses `DateTime<Utc>` fields with a fixed layout
#[derive(Debug, Clone)]
pub struct TimeConverter {
    layout: TimeLayout,
}

impl TimeConverter {
    pub fn new(layout: impl Into<TimeLayout>) -> Self {
        Self {
            layout: layout.into(),
        }
    }

    pub fn layout(&self) -> &TimeLayout {
        &self.layout
    }
}

impl Converter for TimeConverter {
    fn convert(&self, param: &Parameter, field: &mut dyn Field) -> Result<bool> {
        let Some(slot) = field.as_any_mut().downcast_mut::<DateTime<Utc>>() else {
            return Ok(false);
        };
        *slot = self.layout.parse(&param.value)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc3339() {
        let mut date = DateTime::<Utc>::default();
        let converter = TimeConverter::new(TimeLayout::Rfc3339);
        assert!(converter
            .convert(&Parameter::string("/date", "2020-01-02T15:04:05Z"), &mut date)
            .unwrap());
        assert_eq!(date, Utc.with_ymd_and_hms(2020, 1, 2, 15, 4, 5).unwrap());
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let t = TimeLayout::Rfc3339.parse("2020-01-02T17:04:05+02:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2020, 1, 2, 15, 4, 5).unwrap());
    }

    #[test]
    fn custom_format_without_offset_is_utc() {
        let layout = TimeLayout::from("%Y-%m-%d %H:%M:%S");
        let t = layout.parse("2020-01-02 15:04:05").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2020, 1, 2, 15, 4, 5).unwrap());
    }

    #[test]
    fn date_only_format_is_midnight_utc() {
        let layout = TimeLayout::from("%Y-%m-%d");
        let t = layout.parse("2020-01-02").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap());

        let mut date = DateTime::<Utc>::default();
        assert!(TimeConverter::new(layout)
            .convert(&Parameter::string("/date", "2021-12-31"), &mut date)
            .unwrap());
        assert_eq!(date, Utc.with_ymd_and_hms(2021, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn date_only_format_still_rejects_garbage() {
        let err = TimeLayout::from("%Y-%m-%d").parse("2020-13-45").unwrap_err();
        assert!(matches!(err, BindError::Parse { .. }));
    }

    #[test]
    fn named_layouts() {
        assert_eq!(TimeLayout::from("RFC3339"), TimeLayout::Rfc3339);
        assert_eq!(TimeLayout::from("rfc2822"), TimeLayout::Rfc2822);
        assert_eq!(TimeLayout::Rfc3339.to_string(), "rfc3339");
    }

    #[test]
    fn invalid_time_is_an_error() {
        let mut date = DateTime::<Utc>::default();
        let err = TimeConverter::new("rfc3339")
            .convert(&Parameter::string("/date", "invalid time"), &mut date)
            .unwrap_err();
        assert!(matches!(err, BindError::Parse { .. }));
    }

    #[test]
    fn passes_on_other_types() {
        let mut name = String::new();
        assert!(!TimeConverter::new("rfc3339")
            .convert(&Parameter::string("/not_time", "foo"), &mut name)
            .unwrap());
    }
}
