// src/normalize/dates.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// How a source writes a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateEncoding {
    /// Milliseconds since the Unix epoch, as a number or numeric string.
    EpochMillis,
    /// RFC 3339 / ISO-8601 timestamp, fractional seconds allowed.
    Iso8601,
    /// `YYYY-MM-DD`
    YearMonthDay,
    /// `MM/DD/YYYY`, the canonical export format.
    MonthDayYear,
}

pub fn parse_date(value: &Value, encoding: DateEncoding) -> Option<NaiveDate> {
    match encoding {
        DateEncoding::EpochMillis => {
            let millis = match value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
                Value::String(s) => s.trim().parse::<i64>().ok()?,
                _ => return None,
            };
            DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
        }
        DateEncoding::Iso8601 => {
            let s = value.as_str()?.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.date_naive())
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
                .ok()
        }
        DateEncoding::YearMonthDay => {
            NaiveDate::parse_from_str(value.as_str()?.trim(), "%Y-%m-%d").ok()
        }
        DateEncoding::MonthDayYear => {
            NaiveDate::parse_from_str(value.as_str()?.trim(), "%m/%d/%Y").ok()
        }
    }
}

/// Absolute number of days between two dates.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}
