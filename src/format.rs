//! Number and date formatting for axis labels and label drawables.
//!
//! Pure functions: no coupling to the invalidation system beyond the label
//! redraw a changed output triggers.

use chrono::{NaiveDateTime, TimeZone, Utc};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub enum AxisFormat {
    #[default]
    Numeric,
    Time(TimeUnit),
}

/// Date label granularity, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmartDateFormat {
    Year,
    MonthYear,
    DayMonth,
    HourMin,
    HourMinSec,
}

impl SmartDateFormat {
    fn pattern(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::MonthYear => "%b %Y",
            Self::DayMonth => "%d %b",
            Self::HourMin => "%H:%M",
            Self::HourMinSec => "%H:%M:%S",
        }
    }
}

/// Picks a label granularity from the visible span in seconds. Wide spans drop
/// the detail their labels could not resolve anyway.
pub fn determine_date_format(span_sec: f64) -> SmartDateFormat {
    const MINUTE: f64 = 60.0;
    const DAY: f64 = 86_400.0;
    const MONTH: f64 = 30.0 * DAY;
    const YEAR: f64 = 365.0 * DAY;

    match span_sec {
        s if s > 2.0 * YEAR => SmartDateFormat::Year,
        s if s > 2.0 * MONTH => SmartDateFormat::MonthYear,
        s if s > 1.5 * DAY => SmartDateFormat::DayMonth,
        s if s > 5.0 * MINUTE => SmartDateFormat::HourMin,
        _ => SmartDateFormat::HourMinSec,
    }
}

fn unit_divisor(unit: TimeUnit) -> f64 {
    match unit {
        TimeUnit::Seconds => 1.0,
        TimeUnit::Milliseconds => 1e3,
        TimeUnit::Microseconds => 1e6,
        TimeUnit::Nanoseconds => 1e9,
    }
}

fn epoch_seconds(value: f64, unit: TimeUnit) -> i64 {
    (value / unit_divisor(unit)) as i64
}

/// Timestamp rendered at the given granularity.
pub fn format_timestamp(value: f64, format: SmartDateFormat, unit: TimeUnit) -> String {
    format_date(value, format.pattern(), unit)
}

/// Timestamp rendered with an explicit chrono pattern. A value outside
/// chrono's representable range falls back to the bare number.
pub fn format_date(value: f64, pattern: &str, unit: TimeUnit) -> String {
    match Utc.timestamp_opt(epoch_seconds(value, unit), 0) {
        chrono::LocalResult::Single(d) => d.format(pattern).to_string(),
        _ => format!("{value:.2}"),
    }
}

/// Parses a date string with an explicit chrono pattern back to epoch seconds.
pub fn parse_date(text: &str, pattern: &str) -> Result<f64> {
    let dt = NaiveDateTime::parse_from_str(text, pattern)
        .map_err(|e| eyre!("cannot parse `{text}` with `{pattern}`: {e}"))?;
    Ok(dt.and_utc().timestamp() as f64)
}

/// Default numeric label formatting used by axis renderers.
///
/// Tiny magnitudes keep extra precision, large ones drop decimals.
pub fn format_number(value: f64) -> String {
    if value.abs() < 0.001 && value.abs() > 0.0 {
        format!("{:.4}", value)
    } else if value.abs() > 1000.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn parse_number(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| eyre!("cannot parse `{text}` as number: {e}"))
}

/// Tick label for an axis, picking a date format from the visible span when the
/// axis is a time axis.
pub fn format_tick(value: f64, span: f64, format: AxisFormat) -> String {
    match format {
        AxisFormat::Time(unit) => {
            let fmt = determine_date_format((span / unit_divisor(unit)).abs());
            format_timestamp(value, fmt, unit)
        }
        AxisFormat::Numeric => format_number(value),
    }
}
