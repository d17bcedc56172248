//! Strict `YYYY-MM-DD` handling for dates that arrive over the wire.
//!
//! chrono's own parser also accepts signed and expanded years such as
//! `+12345-01-01` or `-0001-01-01`. Stored as text, those no longer sort in
//! calendar order, so incoming records only take four-digit years.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parses a date written exactly as `YYYY-MM-DD` (years 0000 through 9999).
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `deserialize_with` adapter for [`parse_iso_date`].
pub fn deserialize_iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_iso_date(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}
