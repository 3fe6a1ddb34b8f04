//! Reminder domain model.
//!
//! # Responsibility
//! - Define the persisted reminder record and its create/update payload.
//! - Shape form drafts into payloads after schedule validation.
//!
//! # Invariants
//! - `title` and `phone_to_call` are non-empty after trimming.
//! - `scheduled_time`, when set, is an absolute UTC instant.
//! - Updates replace the whole payload; there is no partial patch.

use crate::schedule::validator::ScheduleDraft;
use crate::time::instant::Instant;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned reminder identifier.
pub type ReminderId = i64;

/// Delivery lifecycle of the reminder call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    /// Waiting for its call (or not scheduled at all).
    #[default]
    Scheduled,
    /// Call was placed.
    Completed,
    /// Call could not be placed.
    Failed,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for ReminderStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!(
                "unsupported reminder status `{other}`; expected scheduled|completed|failed"
            )),
        }
    }
}

/// Field-level validation error for reminder writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderValidationError {
    EmptyTitle,
    EmptyPhone,
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => f.write_str("title is required"),
            Self::EmptyPhone => f.write_str("phone number to call is required"),
        }
    }
}

impl Error for ReminderValidationError {}

fn check_fields(title: &str, phone_to_call: &str) -> Result<(), ReminderValidationError> {
    if title.trim().is_empty() {
        return Err(ReminderValidationError::EmptyTitle);
    }
    if phone_to_call.trim().is_empty() {
        return Err(ReminderValidationError::EmptyPhone);
    }
    Ok(())
}

/// Persisted reminder as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedReminder")]
pub struct Reminder {
    pub id: ReminderId,
    pub title: String,
    pub description: Option<String>,
    /// `None` means the reminder was saved without a call time.
    pub scheduled_time: Option<Instant>,
    pub phone_to_call: String,
    pub status: ReminderStatus,
    pub created_at: Instant,
}

impl Reminder {
    /// Checks write invariants shared with `ReminderPayload`.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        check_fields(&self.title, &self.phone_to_call)
    }

    /// Rebuilds the full-replacement payload for this reminder.
    pub fn to_payload(&self) -> ReminderPayload {
        ReminderPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            scheduled_time: self.scheduled_time,
            phone_to_call: self.phone_to_call.clone(),
        }
    }
}

#[derive(Deserialize)]
struct UncheckedReminder {
    id: ReminderId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    scheduled_time: Option<Instant>,
    phone_to_call: String,
    #[serde(default)]
    status: ReminderStatus,
    created_at: Instant,
}

impl TryFrom<UncheckedReminder> for Reminder {
    type Error = ReminderValidationError;

    fn try_from(value: UncheckedReminder) -> Result<Self, Self::Error> {
        let reminder = Self {
            id: value.id,
            title: value.title,
            description: value.description,
            scheduled_time: value.scheduled_time,
            phone_to_call: value.phone_to_call,
            status: value.status,
            created_at: value.created_at,
        };
        reminder.validate()?;
        Ok(reminder)
    }
}

/// Create/update body accepted by the reminder store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<Instant>,
    pub phone_to_call: String,
}

impl ReminderPayload {
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        check_fields(&self.title, &self.phone_to_call)
    }
}

/// Which number the reminder call goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "number", rename_all = "snake_case")]
pub enum PhoneChoice {
    /// The signed-in user's own number.
    Own(String),
    /// A number typed in for this reminder only.
    Custom(String),
}

impl PhoneChoice {
    pub fn number(&self) -> &str {
        match self {
            Self::Own(number) | Self::Custom(number) => number.trim(),
        }
    }
}

/// Unvalidated reminder form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schedule: ScheduleDraft,
    pub phone: PhoneChoice,
}

impl ReminderDraft {
    /// Normalizes the draft into a payload carrying `scheduled_time`.
    ///
    /// `scheduled_time` must come from an accepted or unscheduled decision.
    pub fn to_payload(
        &self,
        scheduled_time: Option<Instant>,
    ) -> Result<ReminderPayload, ReminderValidationError> {
        let payload = ReminderPayload {
            title: self.title.trim().to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            scheduled_time,
            phone_to_call: self.phone.number().to_string(),
        };
        payload.validate()?;
        Ok(payload)
    }
}
