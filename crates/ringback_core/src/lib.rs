//! Core domain logic for Ringback phone-call reminders.
//! This crate owns time resolution, schedule validation and timeline
//! classification; front ends only format inputs and outputs.

pub mod classify;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod time;

pub use classify::{bucket_of, classify, Bucket, Partition};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::reminder::{
    PhoneChoice, Reminder, ReminderDraft, ReminderId, ReminderPayload, ReminderStatus,
    ReminderValidationError,
};
pub use repo::reminder_repo::{
    ReminderListQuery, ReminderPage, ReminderRepository, RepoError, RepoResult,
    SqliteReminderRepository,
};
pub use schedule::validator::{
    RejectionReason, ScheduleDecision, ScheduleDraft, ScheduleField, ScheduleRejection,
    ScheduleValidator,
};
pub use service::reminder_service::{ReminderService, ReminderServiceError, ServiceResult};
pub use time::instant::{Instant, InstantParseError};
pub use time::resolver::{
    AmbientZone, Conversion, DegradeReason, DegradedConversion, MalformedInput, Resolution,
    TimeOfDay, TimeResolver, WallClockSelection, DEFAULT_TIME_OF_DAY,
};

/// Minimal health-check API for front-end wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
