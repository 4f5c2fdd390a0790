//! Serde adapters for the backend's loosely typed JSON.
//!
//! WordPress emits dates as `"2026-01-15T12:00:00"` (site-local, no offset),
//! `"2026-01-15 12:00:00"`, or RFC 3339 depending on the endpoint, and uses
//! `""` or `null` for "not set". Timestamps without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date_naive()))
}

/// `Option<DateTime<Utc>>` that tolerates `""`, `null` and offset-less timestamps.
pub(crate) mod opt_datetime {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => s.serialize_str(&dt.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_datetime(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp {raw:?}"))),
        }
    }
}

/// `Option<NaiveDate>` that accepts a bare date or a full timestamp.
pub(crate) mod opt_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_date(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("unrecognised date {raw:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, with = "opt_datetime")]
        at: Option<DateTime<Utc>>,
        #[serde(default, with = "opt_date")]
        due: Option<NaiveDate>,
    }

    #[test]
    fn accepts_wordpress_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        for raw in ["2026-01-15T12:00:00", "2026-01-15 12:00:00", "2026-01-15T12:00:00Z", "2026-01-15T15:00:00+03:00"] {
            assert_eq!(parse_datetime(raw), Some(expected), "{raw}");
        }
    }

    #[test]
    fn blank_and_missing_are_none() {
        let row: Row = serde_json::from_str(r#"{"at":"","due":null}"#).unwrap();
        assert!(row.at.is_none());
        assert!(row.due.is_none());
        let row: Row = serde_json::from_str("{}").unwrap();
        assert!(row.at.is_none());
    }

    #[test]
    fn date_from_timestamp() {
        let row: Row = serde_json::from_str(r#"{"due":"2026-03-01 00:00:00"}"#).unwrap();
        assert_eq!(row.due, NaiveDate::from_ymd_opt(2026, 3, 1));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<Row>(r#"{"at":"soon"}"#).is_err());
    }
}
