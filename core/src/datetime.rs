//! Lenient ISO-8601 date/time decoding.
//!
//! The API emits timestamps in several ISO-8601 spellings: RFC 3339, offsets
//! without a colon (`+0000`), a space instead of `T`, timestamps with no
//! offset at all, and bare dates. Strict RFC 3339 parsing rejects most of
//! them, so resource types use the serde helpers here instead:
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Bill {
//!     #[serde(with = "mno_core::datetime")]
//!     created_at: DateTime<Utc>,
//!     #[serde(default, with = "mno_core::datetime::option")]
//!     paid_at: Option<DateTime<Utc>>,
//! }
//!
//! let bill: Bill = serde_json::from_str(
//!     r#"{"created_at":"2014-05-21T00:32:35+0000","paid_at":null}"#,
//! ).unwrap();
//! assert_eq!(bill.created_at.to_rfc3339(), "2014-05-21T00:32:35+00:00");
//! assert!(bill.paid_at.is_none());
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse any supported ISO-8601 spelling. Values without an offset are UTC.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render as RFC 3339 with a `Z` suffix.
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 date/time '{raw}'")))
}

/// Same as the parent module for `Option<DateTime<Utc>>`; `null` maps to `None`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid ISO-8601 date/time '{raw}'"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        assert_eq!(parse("2014-05-21T00:32:35Z"), Some(utc(2014, 5, 21, 0, 32, 35)));
        assert_eq!(parse("2014-05-21T10:32:35+10:00"), Some(utc(2014, 5, 21, 0, 32, 35)));
    }

    #[test]
    fn parses_offset_without_colon() {
        assert_eq!(parse("2014-05-21T00:32:35+0000"), Some(utc(2014, 5, 21, 0, 32, 35)));
        assert_eq!(parse("2014-05-21T02:32:35+0200"), Some(utc(2014, 5, 21, 0, 32, 35)));
    }

    #[test]
    fn parses_space_separator_and_fractions() {
        assert_eq!(parse("2014-05-21 00:32:35+0000"), Some(utc(2014, 5, 21, 0, 32, 35)));
        let fractional = parse("2014-05-21T00:32:35.250Z").unwrap();
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn naive_values_are_utc() {
        assert_eq!(parse("2014-05-21T00:32:35"), Some(utc(2014, 5, 21, 0, 32, 35)));
        assert_eq!(parse("2014-05-21 00:32:35"), Some(utc(2014, 5, 21, 0, 32, 35)));
        assert_eq!(parse("2014-05-21"), Some(utc(2014, 5, 21, 0, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse("2014-13-45"), None);
    }

    #[test]
    fn format_uses_zulu() {
        assert_eq!(format(&utc(2014, 5, 21, 0, 32, 35)), "2014-05-21T00:32:35Z");
    }

    #[derive(Debug, serde::Deserialize, serde::Serialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: DateTime<Utc>,
        #[serde(default, with = "super::option")]
        maybe: Option<DateTime<Utc>>,
    }

    #[test]
    fn serde_helpers() {
        let value: Stamped =
            serde_json::from_str(r#"{"at":"2014-05-21T00:32:35+0000"}"#).unwrap();
        assert_eq!(value.at, utc(2014, 5, 21, 0, 32, 35));
        assert!(value.maybe.is_none());

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["at"], "2014-05-21T00:32:35Z");
        assert!(json["maybe"].is_null());

        let bad = serde_json::from_str::<Stamped>(r#"{"at":"nope"}"#);
        assert!(bad.is_err());
    }
}
