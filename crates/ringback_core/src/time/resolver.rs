//! Wall-clock to instant resolution.
//!
//! # Responsibility
//! - Turn a (date, `HH:MM`, IANA zone) reading into an absolute `Instant`.
//! - Make zone-conversion failures explicit through `Conversion::Degraded`.
//!
//! # Invariants
//! - The naive reading is interpreted in the selected zone, never the
//!   process zone, unless no zone was selected or conversion degraded.
//! - Seconds and sub-seconds of the naive reading are always zero.
//! - Ambiguous readings (DST fall-back overlap) resolve to the earliest instant.
//! - Degraded conversions are logged with `status=degraded`.

use crate::time::instant::Instant;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Time-of-day used when the caller leaves it empty.
pub const DEFAULT_TIME_OF_DAY: &str = "10:30";

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2})$").expect("valid time-of-day regex"));
static ZONE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9/_+\-]+$").expect("valid zone id regex"));

/// Structural input error raised before any zone lookup happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedInput {
    /// Time-of-day is not `HH:MM` with hour 0-23 and minute 0-59.
    TimeOfDay(String),
    /// Timezone is empty or contains characters no IANA identifier uses.
    Timezone(String),
}

impl Display for MalformedInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeOfDay(value) => {
                write!(f, "time of day `{value}` must be HH:MM between 00:00 and 23:59")
            }
            Self::Timezone(value) => {
                write!(f, "timezone `{value}` is not a valid IANA identifier")
            }
        }
    }
}

impl Error for MalformedInput {}

/// Validated 24h time-of-day with zero seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// Parses a strict `HH:MM` string.
    pub fn parse(value: &str) -> Result<Self, MalformedInput> {
        let malformed = || MalformedInput::TimeOfDay(value.to_string());
        let captures = TIME_OF_DAY_RE.captures(value).ok_or_else(malformed)?;
        let hour = captures[1].parse::<u32>().map_err(|_| malformed())?;
        let minute = captures[2].parse::<u32>().map_err(|_| malformed())?;
        if hour > 23 || minute > 59 {
            return Err(malformed());
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

impl FromStr for TimeOfDay {
    type Err = MalformedInput;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A calendar date plus optional time-of-day and zone, as picked by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallClockSelection {
    pub date: NaiveDate,
    /// `HH:MM`; `None` means `DEFAULT_TIME_OF_DAY`.
    pub time_of_day: Option<String>,
    /// IANA zone id; `None` resolves directly in the ambient zone.
    pub timezone: Option<String>,
}

impl WallClockSelection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time_of_day: None,
            timezone: None,
        }
    }

    pub fn at(mut self, time_of_day: impl Into<String>) -> Self {
        self.time_of_day = Some(time_of_day.into());
        self
    }

    pub fn in_zone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// Zone used when no zone was selected or named-zone conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbientZone {
    /// The process-local zone (`chrono::Local`).
    #[default]
    System,
    /// A pinned zone, for hosts whose process zone is not the user's.
    Fixed(Tz),
}

impl AmbientZone {
    fn interpret(&self, naive: &NaiveDateTime) -> DateTime<Utc> {
        match self {
            Self::System => interpret_lenient(&Local, naive),
            Self::Fixed(tz) => interpret_lenient(tz, naive),
        }
    }
}

impl FromStr for AmbientZone {
    type Err = String;

    /// Accepts `system`/`local` or any IANA zone id.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("system") || trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::System);
        }
        trimmed
            .parse::<Tz>()
            .map(Self::Fixed)
            .map_err(|_| format!("unknown ambient zone `{trimmed}`; expected system or an IANA id"))
    }
}

/// Why named-zone conversion was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The identifier is well-formed but missing from the tz database.
    UnknownZone,
    /// The reading falls in a DST gap of the named zone.
    NonexistentLocalTime,
}

impl DegradeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownZone => "unknown_zone",
            Self::NonexistentLocalTime => "nonexistent_local_time",
        }
    }
}

/// Marker attached to an instant produced by the ambient-zone fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedConversion {
    /// The zone identifier that could not be used.
    pub timezone: String,
    pub reason: DegradeReason,
}

/// How the naive reading became an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    ZoneAware(Tz),
    Ambient,
    Degraded(DegradedConversion),
}

/// Resolved instant plus the conversion path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub instant: Instant,
    pub conversion: Conversion,
}

impl Resolution {
    pub fn is_degraded(&self) -> bool {
        matches!(self.conversion, Conversion::Degraded(_))
    }
}

/// Converts wall-clock selections to absolute instants.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeResolver {
    ambient: AmbientZone,
}

impl TimeResolver {
    pub fn new(ambient: AmbientZone) -> Self {
        Self { ambient }
    }

    pub fn ambient(&self) -> AmbientZone {
        self.ambient
    }

    /// Resolves `selection` into an instant.
    ///
    /// # Errors
    /// - `MalformedInput::TimeOfDay` when the time-of-day is not strict `HH:MM`.
    /// - `MalformedInput::Timezone` when the zone id is structurally invalid.
    ///
    /// A structurally valid zone that cannot be used does not fail; the
    /// reading is reinterpreted in the ambient zone and flagged as degraded.
    pub fn resolve(&self, selection: &WallClockSelection) -> Result<Resolution, MalformedInput> {
        let time_of_day = selection
            .time_of_day
            .as_deref()
            .unwrap_or(DEFAULT_TIME_OF_DAY);
        let naive = naive_local(selection.date, TimeOfDay::parse(time_of_day)?)?;

        let Some(raw_zone) = selection.timezone.as_deref() else {
            return Ok(Resolution {
                instant: Instant::from(self.ambient.interpret(&naive)),
                conversion: Conversion::Ambient,
            });
        };

        let zone_id = raw_zone.trim();
        if !ZONE_ID_RE.is_match(zone_id) {
            return Err(MalformedInput::Timezone(raw_zone.to_string()));
        }

        let reason = match zone_id.parse::<Tz>() {
            Ok(tz) => match tz.from_local_datetime(&naive).earliest() {
                Some(resolved) => {
                    return Ok(Resolution {
                        instant: Instant::from_datetime(resolved),
                        conversion: Conversion::ZoneAware(tz),
                    });
                }
                None => DegradeReason::NonexistentLocalTime,
            },
            Err(_) => DegradeReason::UnknownZone,
        };

        let instant = Instant::from(self.ambient.interpret(&naive));
        warn!(
            "event=time_resolve module=time status=degraded reason={} zone={} instant={}",
            reason.as_str(),
            zone_id,
            instant
        );
        Ok(Resolution {
            instant,
            conversion: Conversion::Degraded(DegradedConversion {
                timezone: zone_id.to_string(),
                reason,
            }),
        })
    }
}

/// Builds the `YYYY-MM-DDTHH:MM:00` reading and parses it back.
fn naive_local(date: NaiveDate, time_of_day: TimeOfDay) -> Result<NaiveDateTime, MalformedInput> {
    let composed = format!("{}T{}:00", date.format("%Y-%m-%d"), time_of_day);
    NaiveDateTime::parse_from_str(&composed, NAIVE_FORMAT)
        .map_err(|_| MalformedInput::TimeOfDay(time_of_day.to_string()))
}

/// Localizes `naive` in `zone`, moving readings inside a DST gap forward
/// by one hour. Falls back to reading the value as UTC if that still fails.
fn interpret_lenient<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> DateTime<Utc> {
    if let Some(resolved) = zone.from_local_datetime(naive).earliest() {
        return resolved.with_timezone(&Utc);
    }
    naive
        .checked_add_signed(Duration::hours(1))
        .and_then(|shifted| zone.from_local_datetime(&shifted).earliest())
        .map(|resolved| resolved.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(naive))
}
