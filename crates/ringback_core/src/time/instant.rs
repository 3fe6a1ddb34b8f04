//! Absolute instant value type.
//!
//! # Responsibility
//! - Represent one zone-independent point in time.
//! - Provide the single wire/storage rendering used across core.
//!
//! # Invariants
//! - The inner value is always UTC; the type carries no zone.
//! - Ordering is chronological.
//! - Serialized form is RFC 3339 with a `Z` suffix.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Absolute point in time, serialized as a UTC ISO-8601 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instant(DateTime<Utc>);

/// Error returned when an instant string is not valid RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantParseError {
    input: String,
    reason: String,
}

impl Display for InstantParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid instant `{}`: {} (expected RFC 3339, e.g. 2025-06-01T18:00:00Z)",
            self.input, self.reason
        )
    }
}

impl Error for InstantParseError {}

impl Instant {
    /// Wraps any zoned datetime, normalizing it to UTC.
    pub fn from_datetime<Tz: TimeZone>(value: DateTime<Tz>) -> Self {
        Self(value.with_timezone(&Utc))
    }

    /// Builds an instant from Unix epoch seconds.
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        Utc.timestamp_opt(seconds, 0).single().map(Self)
    }

    /// Parses an RFC 3339 string with any offset (`Z`, `+02:00`, ...).
    pub fn parse(value: &str) -> Result<Self, InstantParseError> {
        let trimmed = value.trim();
        DateTime::parse_from_rfc3339(trimmed)
            .map(Self::from_datetime)
            .map_err(|err| InstantParseError {
                input: trimmed.to_string(),
                reason: err.to_string(),
            })
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Renders the instant with second precision, e.g. `2025-06-01T18:00:00Z`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Fixed-width rendering used for storage columns.
    ///
    /// Microsecond width keeps lexicographic order equal to chronological order.
    pub fn to_storage_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Shifts the instant by a signed duration.
    ///
    /// Returns `None` on overflow.
    pub fn checked_add(&self, delta: Duration) -> Option<Self> {
        self.0.checked_add_signed(delta).map(Self)
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl FromStr for Instant {
    type Err = InstantParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for Instant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::Instant;
    use chrono::Duration;

    #[test]
    fn parse_normalizes_offsets_to_utc() {
        let instant = Instant::parse("2025-06-01T14:00:00-04:00").unwrap();
        assert_eq!(instant.to_rfc3339(), "2025-06-01T18:00:00Z");
    }

    #[test]
    fn parse_rejects_naive_strings() {
        let err = Instant::parse("2025-06-01T14:00:00").unwrap_err();
        assert!(err.to_string().contains("RFC 3339"));
    }

    #[test]
    fn storage_string_orders_chronologically() {
        let earlier = Instant::parse("2025-06-01T18:00:00Z").unwrap();
        let later = earlier.checked_add(Duration::milliseconds(1)).unwrap();
        assert!(earlier < later);
        assert!(earlier.to_storage_string() < later.to_storage_string());
    }

    #[test]
    fn serializes_as_utc_string() {
        let instant = Instant::from_unix_seconds(1_748_800_800).unwrap();
        let json = serde_json::to_value(instant).unwrap();
        assert_eq!(json, serde_json::json!("2025-06-01T18:00:00Z"));
    }
}
