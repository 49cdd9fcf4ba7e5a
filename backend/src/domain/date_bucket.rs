//! # Date Bucketing
//!
//! Expense dates are not stored in one shape. Depending on which client wrote a
//! record, the `date` field can hold:
//!
//! - a store timestamp object `{ "seconds": .., "nanoseconds": .. }`
//! - serialized epoch seconds `{ "_seconds": .., "_nanoseconds": .. }`
//!   (the nanosecond part is optional)
//! - an RFC 3339 instant written by this service
//! - any other string, usually an ISO date or date-time without offset
//!
//! or nothing at all. [`DateBucketer`] normalizes every one of those into a
//! month name, a sortable [`MonthKey`] or a `YYYY-MM-DD` day key, falling back
//! to a fixed label instead of failing.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Month label used when a record carries no usable date
pub const DEFAULT_FALLBACK_MONTH_NAME: &str = "July";

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Timestamp object as produced by the document store SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl StoreTimestamp {
    pub fn from_date(date: DateTime<Utc>) -> Self {
        Self {
            seconds: date.timestamp(),
            nanoseconds: date.timestamp_subsec_nanos(),
        }
    }

    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanoseconds)
    }
}

/// Timestamp after a JSON round trip through the store's admin tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSeconds {
    #[serde(rename = "_seconds", alias = "seconds")]
    pub seconds: i64,
    #[serde(
        rename = "_nanoseconds",
        alias = "nanoseconds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub nanoseconds: Option<u32>,
}

impl SerializedSeconds {
    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        let nanos = self.nanoseconds.unwrap_or(0);
        let carry = i64::from(nanos / 1_000_000_000);
        DateTime::from_timestamp(self.seconds.checked_add(carry)?, nanos % 1_000_000_000)
    }
}

/// Heterogeneous date value carried by an expense record.
///
/// Variant order is the order serde tries when reading stored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Timestamp(StoreTimestamp),
    Seconds(SerializedSeconds),
    Native(DateTime<Utc>),
    Text(String),
}

impl From<DateTime<Utc>> for DateValue {
    fn from(date: DateTime<Utc>) -> Self {
        DateValue::Native(date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonthKeyError {
    #[error("month key '{0}' is not in YYYY-MM form")]
    Malformed(String),
    #[error("month {0} is out of range")]
    MonthOutOfRange(u32),
}

/// Calendar month bucket, rendered as "YYYY-MM". Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if !(1..=12).contains(&month) {
            return Err(MonthKeyError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || MonthKeyError::Malformed(trimmed.to_string());

        let (year_part, month_part) = trimmed.split_once('-').ok_or_else(malformed)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(malformed());
        }
        let year = year_part.parse::<i32>().map_err(|_| malformed())?;
        let month = month_part.parse::<u32>().map_err(|_| malformed())?;
        MonthKey::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Normalizes [`DateValue`]s into display buckets for a fixed UTC offset
#[derive(Debug, Clone)]
pub struct DateBucketer {
    offset: FixedOffset,
    fallback_month_name: String,
}

impl DateBucketer {
    pub fn new(offset: FixedOffset, fallback_month_name: impl Into<String>) -> Self {
        let fallback_month_name = fallback_month_name.into();
        let fallback_month_name = if fallback_month_name.trim().is_empty() {
            DEFAULT_FALLBACK_MONTH_NAME.to_string()
        } else {
            fallback_month_name
        };
        Self {
            offset,
            fallback_month_name,
        }
    }

    /// Bucketer on UTC with the default fallback label
    pub fn utc() -> Self {
        Self::new(Utc.fix(), DEFAULT_FALLBACK_MONTH_NAME)
    }

    pub fn fallback_month_name(&self) -> &str {
        &self.fallback_month_name
    }

    /// Resolve any supported representation to an instant
    pub fn to_utc(&self, value: Option<&DateValue>) -> Option<DateTime<Utc>> {
        match value? {
            DateValue::Timestamp(timestamp) => timestamp.to_date(),
            DateValue::Seconds(seconds) => seconds.to_date(),
            DateValue::Native(date) => Some(*date),
            DateValue::Text(text) => self.parse_text(text),
        }
    }

    pub fn to_local(&self, value: Option<&DateValue>) -> Option<DateTime<FixedOffset>> {
        self.to_utc(value).map(|date| date.with_timezone(&self.offset))
    }

    /// Parse free-form date text. Values without an offset are read as local time.
    pub fn parse_text(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(date) = DateTime::parse_from_rfc3339(text) {
            return Some(date.with_timezone(&Utc));
        }

        for format in NAIVE_DATE_TIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return self.local_to_utc(naive);
            }
        }

        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        self.local_to_utc(date.and_hms_opt(0, 0, 0)?)
    }

    fn local_to_utc(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|date| date.with_timezone(&Utc))
    }

    /// Long month name, or the fallback label when the value is absent or unparseable
    pub fn month_name(&self, value: Option<&DateValue>) -> String {
        match self.to_local(value) {
            Some(date) => MONTH_NAMES[date.month0() as usize].to_string(),
            None => self.fallback_month_name.clone(),
        }
    }

    /// Month key of a dated value, `fallback` for an absent one.
    ///
    /// A value that is present but unparseable has no month key and matches
    /// no month.
    pub fn month_key_or(&self, value: Option<&DateValue>, fallback: MonthKey) -> Option<MonthKey> {
        match value {
            None => Some(fallback),
            Some(_) => self.to_local(value).map(|date| MonthKey::from_date(&date)),
        }
    }

    /// Month key, bucketing undated records into the current month
    pub fn month_key(&self, value: Option<&DateValue>) -> Option<MonthKey> {
        self.month_key_or(value, self.current_month_key())
    }

    pub fn local_date(&self, value: Option<&DateValue>) -> Option<NaiveDate> {
        self.to_local(value).map(|date| date.date_naive())
    }

    /// "YYYY-MM-DD" in the local offset
    pub fn day_key(&self, value: Option<&DateValue>) -> Option<String> {
        self.local_date(value)
            .map(|date| date.format("%Y-%m-%d").to_string())
    }

    pub fn current_month_key(&self) -> MonthKey {
        MonthKey::from_date(&Utc::now().with_timezone(&self.offset))
    }
}

impl Default for DateBucketer {
    fn default() -> Self {
        Self::utc()
    }
}
