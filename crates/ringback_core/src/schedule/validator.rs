//! Future-only schedule validation.
//!
//! # Responsibility
//! - Decide whether a schedule draft is unscheduled, accepted or rejected.
//! - Attach every rejection to the form field that caused it.
//!
//! # Invariants
//! - No date selected => `ScheduleDecision::Unscheduled`.
//! - Resolved instant `<= now` => rejected on `ScheduleField::Date`.
//! - Validation is pure; `now` is always supplied by the caller.

use crate::time::instant::Instant;
use crate::time::resolver::{MalformedInput, Resolution, TimeResolver, WallClockSelection};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Form-level schedule input. `date = None` means "do not schedule".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub date: Option<NaiveDate>,
    pub time_of_day: Option<String>,
    pub timezone: Option<String>,
}

impl ScheduleDraft {
    pub fn unscheduled() -> Self {
        Self::default()
    }

    pub fn on(date: NaiveDate, time_of_day: Option<&str>, timezone: Option<&str>) -> Self {
        Self {
            date: Some(date),
            time_of_day: time_of_day.map(str::to_string),
            timezone: timezone.map(str::to_string),
        }
    }

    /// Returns the wall-clock selection, or `None` when no date was picked.
    pub fn selection(&self) -> Option<WallClockSelection> {
        self.date.map(|date| WallClockSelection {
            date,
            time_of_day: self.time_of_day.clone(),
            timezone: self.timezone.clone(),
        })
    }
}

/// Form field a rejection is rendered next to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleField {
    Date,
    TimeOfDay,
    Timezone,
}

impl ScheduleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::TimeOfDay => "time_of_day",
            Self::Timezone => "timezone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Selected instant is not strictly after `now`.
    Past,
    Malformed(MalformedInput),
}

impl RejectionReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// Field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRejection {
    pub field: ScheduleField,
    pub reason: RejectionReason,
}

impl ScheduleRejection {
    fn past() -> Self {
        Self {
            field: ScheduleField::Date,
            reason: RejectionReason::Past,
        }
    }

    fn malformed(input: MalformedInput) -> Self {
        let field = match input {
            MalformedInput::TimeOfDay(_) => ScheduleField::TimeOfDay,
            MalformedInput::Timezone(_) => ScheduleField::Timezone,
        };
        Self {
            field,
            reason: RejectionReason::Malformed(input),
        }
    }
}

impl Display for ScheduleRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            RejectionReason::Past => f.write_str("scheduled time must be in the future"),
            RejectionReason::Malformed(input) => write!(f, "{input}"),
        }
    }
}

impl Error for ScheduleRejection {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.reason {
            RejectionReason::Past => None,
            RejectionReason::Malformed(input) => Some(input),
        }
    }
}

/// Outcome of validating one schedule draft against `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// No date picked; the reminder is stored without an instant.
    Unscheduled,
    Accepted(Resolution),
    Rejected(ScheduleRejection),
}

impl ScheduleDecision {
    /// Accepted instant, if any.
    pub fn instant(&self) -> Option<Instant> {
        match self {
            Self::Accepted(resolution) => Some(resolution.instant),
            Self::Unscheduled | Self::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&ScheduleRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Unscheduled | Self::Accepted(_) => None,
        }
    }

    /// Converts into the instant to persist, or the rejection to show.
    pub fn into_result(self) -> Result<Option<Instant>, ScheduleRejection> {
        match self {
            Self::Unscheduled => Ok(None),
            Self::Accepted(resolution) => Ok(Some(resolution.instant)),
            Self::Rejected(rejection) => Err(rejection),
        }
    }
}

/// Validates schedule drafts with a configured resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleValidator {
    resolver: TimeResolver,
}

impl ScheduleValidator {
    pub fn new(resolver: TimeResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &TimeResolver {
        &self.resolver
    }

    /// Validates `draft` against the caller's `now` snapshot.
    pub fn validate(&self, draft: &ScheduleDraft, now: Instant) -> ScheduleDecision {
        let Some(selection) = draft.selection() else {
            return ScheduleDecision::Unscheduled;
        };

        let resolution = match self.resolver.resolve(&selection) {
            Ok(resolution) => resolution,
            Err(input) => {
                let rejection = ScheduleRejection::malformed(input);
                debug!(
                    "event=schedule_validate module=schedule status=rejected field={} reason=malformed",
                    rejection.field.as_str()
                );
                return ScheduleDecision::Rejected(rejection);
            }
        };

        if resolution.instant <= now {
            debug!(
                "event=schedule_validate module=schedule status=rejected field=date reason=past"
            );
            return ScheduleDecision::Rejected(ScheduleRejection::past());
        }

        ScheduleDecision::Accepted(resolution)
    }
}
