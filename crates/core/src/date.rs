//! Ledger date codec.
//!
//! Relations store dates as `YYYY-MM-DD HH:MM` (UTC). Older files carry plain
//! `YYYY-MM-DD` dates, so reading is lenient; writing always uses the canonical form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{DomainError, DomainResult};

/// Canonical on-disk format.
pub const LEDGER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const DATETIME_FORMATS: &[&str] = &[LEDGER_DATE_FORMAT, "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub fn format_ledger_date(date: &DateTime<Utc>) -> String {
    date.format(LEDGER_DATE_FORMAT).to_string()
}

/// Parse any accepted ledger date representation.
///
/// A date without time resolves to midnight UTC.
pub fn parse_ledger_date(raw: &str) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::MissingRequiredField("date"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DomainError::validation(format!("unrecognised date: {raw}")))
}

/// `#[serde(with = "...")]` adapter for `DateTime<Utc>` fields stored in relations.
pub mod ledger_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_ledger_date(date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_ledger_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn date_only_resolves_to_midnight() {
        let d = parse_ledger_date("2025-08-20").unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2025, 8, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn accepts_minutes_seconds_and_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2025, 8, 22, 14, 5, 0).unwrap();
        assert_eq!(parse_ledger_date("2025-08-22 14:05").unwrap(), expected);
        assert_eq!(parse_ledger_date("2025-08-22 14:05:00").unwrap(), expected);
        assert_eq!(parse_ledger_date("2025-08-22T14:05:00Z").unwrap(), expected);
        assert_eq!(
            parse_ledger_date("2025-08-22T19:35:00+05:30").unwrap(),
            expected
        );
    }

    #[test]
    fn writes_canonical_minutes() {
        let d = Utc.with_ymd_and_hms(2025, 8, 21, 9, 30, 59).unwrap();
        assert_eq!(format_ledger_date(&d), "2025-08-21 09:30");
        assert_eq!(parse_ledger_date(&format_ledger_date(&d)).unwrap().second(), 0);
    }

    #[test]
    fn rejects_garbage_and_blank() {
        assert!(matches!(
            parse_ledger_date("yesterday"),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(
            parse_ledger_date(" "),
            Err(DomainError::MissingRequiredField("date"))
        );
    }
}
