//! Reminder use-case service.
//!
//! # Responsibility
//! - Run schedule validation before any reminder write.
//! - Delegate persistence to a `ReminderRepository`.
//! - Build the upcoming/past timeline from one `now` snapshot.
//!
//! # Invariants
//! - A rejected schedule never reaches the repository.
//! - Every operation takes `now` from its caller.
//! - Log lines carry ids and statuses only, never titles or numbers.

use crate::classify::{classify, Partition};
use crate::model::reminder::{
    Reminder, ReminderDraft, ReminderId, ReminderStatus, ReminderValidationError,
};
use crate::repo::reminder_repo::{ReminderListQuery, ReminderPage, ReminderRepository, RepoError};
use crate::schedule::validator::{ScheduleDecision, ScheduleRejection, ScheduleValidator};
use crate::time::instant::Instant;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for reminder use-cases.
#[derive(Debug)]
pub enum ReminderServiceError {
    /// Schedule fields failed validation; render next to `field`.
    Schedule(ScheduleRejection),
    /// Title or phone failed validation.
    Invalid(ReminderValidationError),
    NotFound(ReminderId),
    Repo(RepoError),
    /// A write succeeded but the read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for ReminderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schedule(rejection) => {
                write!(f, "{}: {rejection}", rejection.field.as_str())
            }
            Self::Invalid(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "reminder not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent reminder state: {details}")
            }
        }
    }
}

impl Error for ReminderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schedule(rejection) => Some(rejection),
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for ReminderServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ReminderValidationError> for ReminderServiceError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<ScheduleRejection> for ReminderServiceError {
    fn from(value: ScheduleRejection) -> Self {
        Self::Schedule(value)
    }
}

pub type ServiceResult<T> = Result<T, ReminderServiceError>;

/// Reminder service facade over repository implementations.
pub struct ReminderService<R: ReminderRepository> {
    repo: R,
    validator: ScheduleValidator,
}

impl<R: ReminderRepository> ReminderService<R> {
    /// Creates a service with the default (system ambient zone) validator.
    pub fn new(repo: R) -> Self {
        Self::with_validator(repo, ScheduleValidator::default())
    }

    pub fn with_validator(repo: R, validator: ScheduleValidator) -> Self {
        Self { repo, validator }
    }

    /// Validates a draft's schedule without touching the store.
    pub fn check_schedule(&self, draft: &ReminderDraft, now: Instant) -> ScheduleDecision {
        self.validator.validate(&draft.schedule, now)
    }

    /// Creates one reminder from form input.
    pub fn create_reminder(&self, draft: &ReminderDraft, now: Instant) -> ServiceResult<Reminder> {
        let payload = draft.to_payload(self.accepted_instant(draft, now)?)?;
        let id = self.repo.create_reminder(&payload, now)?;
        info!(
            "event=reminder_create module=service status=ok id={id} scheduled={}",
            payload.scheduled_time.is_some()
        );
        self.read_back(id, "created reminder not found in read-back")
    }

    /// Replaces every field of an existing reminder.
    ///
    /// Status returns to `scheduled` so a moved call can fire again.
    pub fn update_reminder(
        &self,
        id: ReminderId,
        draft: &ReminderDraft,
        now: Instant,
    ) -> ServiceResult<Reminder> {
        let payload = draft.to_payload(self.accepted_instant(draft, now)?)?;
        self.repo.update_reminder(id, &payload, now)?;
        info!(
            "event=reminder_update module=service status=ok id={id} scheduled={}",
            payload.scheduled_time.is_some()
        );
        self.read_back(id, "updated reminder not found in read-back")
    }

    pub fn get_reminder(&self, id: ReminderId) -> ServiceResult<Reminder> {
        self.repo
            .get_reminder(id)?
            .ok_or(ReminderServiceError::NotFound(id))
    }

    pub fn delete_reminder(&self, id: ReminderId) -> ServiceResult<()> {
        self.repo.delete_reminder(id)?;
        info!("event=reminder_delete module=service status=ok id={id}");
        Ok(())
    }

    pub fn list_reminders(&self, query: &ReminderListQuery) -> ServiceResult<ReminderPage> {
        Ok(self.repo.list_reminders(query)?)
    }

    pub fn mark_completed(&self, id: ReminderId, now: Instant) -> ServiceResult<()> {
        self.set_status(id, ReminderStatus::Completed, now)
    }

    pub fn mark_failed(&self, id: ReminderId, now: Instant) -> ServiceResult<()> {
        self.set_status(id, ReminderStatus::Failed, now)
    }

    /// Loads every reminder and partitions it against `now`.
    pub fn timeline(&self, now: Instant) -> ServiceResult<Partition> {
        let reminders = self.repo.all_reminders()?;
        Ok(classify(&reminders, now))
    }

    fn accepted_instant(
        &self,
        draft: &ReminderDraft,
        now: Instant,
    ) -> Result<Option<Instant>, ScheduleRejection> {
        let decision = self.validator.validate(&draft.schedule, now);
        if let ScheduleDecision::Accepted(resolution) = &decision {
            if resolution.is_degraded() {
                warn!(
                    "event=reminder_schedule module=service status=degraded instant={}",
                    resolution.instant
                );
            }
        }
        decision.into_result()
    }

    fn set_status(
        &self,
        id: ReminderId,
        status: ReminderStatus,
        now: Instant,
    ) -> ServiceResult<()> {
        self.repo.set_status(id, status, now)?;
        info!(
            "event=reminder_status module=service status=ok id={id} reminder_status={}",
            status.as_str()
        );
        Ok(())
    }

    fn read_back(&self, id: ReminderId, details: &'static str) -> ServiceResult<Reminder> {
        self.repo
            .get_reminder(id)?
            .ok_or(ReminderServiceError::InconsistentState(details))
    }
}
