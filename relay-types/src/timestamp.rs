//! Lenient timestamp (de)serialization.
//!
//! Front-ends send RFC 3339 (`2024-05-01T10:00:00Z`), ISO-8601 with a compact
//! offset (`+0300`) or no offset at all, minute precision
//! (`2024-05-01T10:00`), or a Unix epoch number. Values without an offset are
//! taken as UTC. Output is always RFC 3339 UTC.
//!
//! Use as `#[serde(with = "relay_types::timestamp")]`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Epoch magnitudes above this are milliseconds rather than seconds.
const MAX_EPOCH_SECONDS: f64 = 2e10;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp in any of the accepted string forms.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(secs) = raw.parse::<f64>() {
        return from_epoch(secs);
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    // A trailing `Z` is UTC; strip it so the naive forms below apply.
    let naive = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Unix epoch seconds, or milliseconds when the value is too large to be seconds.
pub fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() > MAX_EPOCH_SECONDS { value } else { value * 1000.0 };
    DateTime::from_timestamp_millis(millis.round() as i64)
}

/// Canonical string form used on the wire and in the store.
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format(ts))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Int(i64),
    Float(f64),
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let parsed = match RawTimestamp::deserialize(d)? {
        RawTimestamp::Text(raw) => parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))?,
        RawTimestamp::Int(secs) => from_epoch(secs as f64)
            .ok_or_else(|| serde::de::Error::custom(format!("epoch out of range: {secs}")))?,
        RawTimestamp::Float(secs) => from_epoch(secs)
            .ok_or_else(|| serde::de::Error::custom(format!("epoch out of range: {secs}")))?,
    };
    Ok(parsed)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use serde::Deserialize;

    fn ten_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2024-05-01T12:00:00+02:00").expect("rfc3339");
        assert_eq!(ts, ten_utc());
    }

    #[test]
    fn naive_values_are_utc() {
        assert_eq!(parse("2024-05-01T10:00:00"), Some(ten_utc()));

        let frac = parse("2024-05-01T10:00:00.250").expect("naive with fraction");
        assert_eq!(frac.timestamp_subsec_millis(), 250);

        assert!(parse("2024-05-01 10:00:00").is_some());
    }

    #[test]
    fn minute_precision_is_accepted() {
        assert_eq!(parse("2024-05-01T10:00"), Some(ten_utc()));
        assert_eq!(parse("2024-05-01 10:00"), Some(ten_utc()));
        assert_eq!(parse("2024-05-01T10:00Z"), Some(ten_utc()));
        assert_eq!(parse("2024-05-01T13:00+0300"), Some(ten_utc()));
        assert_eq!(parse("2024-05-01T13:00+03:00"), Some(ten_utc()));
    }

    #[test]
    fn compact_offsets_are_accepted() {
        assert_eq!(parse("2024-05-01T13:00:00+0300"), Some(ten_utc()));
        assert_eq!(parse("2024-05-01T07:30:00.000-0230"), Some(ten_utc()));
    }

    #[test]
    fn epoch_strings_are_seconds_or_millis() {
        assert_eq!(parse("1714557600"), Some(ten_utc()));
        assert_eq!(parse("1714557600000"), Some(ten_utc()));
        let half = parse("1714557600.5").expect("fractional epoch");
        assert_eq!(half.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("").is_none());
        assert!(parse("2024-05-01").is_none());
        assert!(from_epoch(f64::NAN).is_none());
    }

    #[test]
    fn formats_as_utc_z() {
        assert_eq!(format(&ten_utc()), "2024-05-01T10:00:00Z");
    }

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(with = "crate::timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn json_numbers_deserialize_as_epoch() {
        let int: Stamped = serde_json::from_str(r#"{"at": 1714557600}"#).unwrap();
        assert_eq!(int.at, ten_utc());

        let float: Stamped = serde_json::from_str(r#"{"at": 1714557600.25}"#).unwrap();
        assert_eq!(float.at.timestamp_subsec_millis(), 250);

        let text: Stamped = serde_json::from_str(r#"{"at": "2024-05-01T10:00"}"#).unwrap();
        assert_eq!(text.at, ten_utc());
    }

    #[test]
    fn invalid_json_values_are_errors() {
        assert!(serde_json::from_str::<Stamped>(r#"{"at": "later"}"#).is_err());
        assert!(serde_json::from_str::<Stamped>(r#"{"at": true}"#).is_err());
    }
}
