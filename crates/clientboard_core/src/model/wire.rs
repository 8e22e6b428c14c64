//! Serde adapters for the stored document shape.
//!
//! # Responsibility
//! - Map blank strings in stored documents to `None` and back.
//! - Normalize absent or `null` collections to empty vectors.
//! - Decode loosely typed creation timestamps without failing the record.
//!
//! # Invariants
//! - Calendar dates are written as `YYYY-MM-DD`, empty when unset.
//! - Timestamps are written as RFC 3339 UTC strings, `null` when unset.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `Option<NaiveDate>` stored as `""` when unset.
pub mod blank_date {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_calendar_date(text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{text}`"))),
        }
    }
}

/// `Option<String>` stored as `""` when unset.
pub mod blank_string {
    use super::*;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|value| !value.trim().is_empty()))
    }
}

/// `Option<DateTime<Utc>>` accepting RFC 3339 strings or epoch milliseconds.
///
/// Anything else decodes as `None`, which projections treat as the earliest
/// possible instant.
pub mod loose_timestamp {
    use super::*;
    use serde_json::Value;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(match raw {
            Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        })
    }
}

/// `Vec<T>` where the stored field may be missing or `null`.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok().or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|ts| ts.with_timezone(&Utc).date_naive())
    })
}

#[cfg(test)]
mod tests {
    use super::parse_calendar_date;
    use chrono::NaiveDate;

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 17);
        assert_eq!(parse_calendar_date("2024-05-17"), expected);
        assert_eq!(parse_calendar_date("2024-05-17T09:30:00Z"), expected);
        assert_eq!(parse_calendar_date("next tuesday"), None);
    }
}
