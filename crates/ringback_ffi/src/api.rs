//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose reminder use-cases to Dart via FRB as plain envelopes.
//! - Parse wire strings (dates, instants, statuses) at the boundary.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every envelope carries a UTF-8 `message` with stable meaning.
//! - Schedule rejections report the form field they belong to.

use chrono::{NaiveDate, Utc};
use log::error;
use ringback_core::db::open_db;
use ringback_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Conversion, Instant, PhoneChoice, Reminder, ReminderDraft, ReminderListQuery, ReminderService,
    ReminderServiceError, ReminderStatus, ScheduleDecision, ScheduleDraft, ScheduleValidator,
    SqliteReminderRepository,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const REMINDER_DB_FILE_NAME: &str = "ringback.sqlite3";
static REMINDER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Reminder projection for list and timeline rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// RFC 3339 UTC instant, `None` when unscheduled.
    pub scheduled_time: Option<String>,
    pub phone_to_call: String,
    /// `scheduled|completed|failed`.
    pub status: String,
    pub created_at: String,
}

/// Result of checking schedule inputs without saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCheckResponse {
    /// `false` only when the schedule was rejected.
    pub ok: bool,
    /// Resolved instant; `None` for unscheduled or rejected input.
    pub scheduled_time: Option<String>,
    /// Set when the chosen zone could not be honored.
    pub degraded: bool,
    /// Form field a rejection belongs to (`date|time_of_day|timezone`).
    pub field: Option<String>,
    pub message: String,
}

/// Generic action envelope for reminder writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderActionResponse {
    pub ok: bool,
    /// Saved reminder for create/update success.
    pub reminder: Option<ReminderItem>,
    /// Form field a schedule rejection belongs to.
    pub field: Option<String>,
    pub message: String,
}

impl ReminderActionResponse {
    fn success(message: impl Into<String>, reminder: Option<ReminderItem>) -> Self {
        Self {
            ok: true,
            reminder,
            field: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, field: Option<String>) -> Self {
        Self {
            ok: false,
            reminder: None,
            field,
            message: message.into(),
        }
    }
}

/// Upcoming/past split of every stored reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTimelineResponse {
    pub ok: bool,
    /// Soonest first; unscheduled reminders last.
    pub upcoming: Vec<ReminderItem>,
    /// Most recent first.
    pub past: Vec<ReminderItem>,
    pub message: String,
}

/// One page of the reminder history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderListResponse {
    pub ok: bool,
    pub items: Vec<ReminderItem>,
    pub total: u64,
    /// Effective page after normalization.
    pub page: u32,
    /// Effective limit after normalization.
    pub limit: u32,
    pub total_pages: u32,
    pub message: String,
}

/// Reminder form input as sent by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderInput {
    pub title: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD`; `None` leaves the reminder unscheduled.
    pub date: Option<String>,
    /// `HH:MM`; `None` uses the default time of day.
    pub time_of_day: Option<String>,
    /// IANA zone id; `None` uses the device zone.
    pub timezone: Option<String>,
    pub phone_to_call: String,
    /// `true` when `phone_to_call` is the user's own number.
    pub use_own_phone: bool,
}

/// Resolves schedule inputs against `now` without touching the store.
///
/// `now` is an RFC 3339 instant; `None` samples the current time.
///
/// # FFI contract
/// - Sync call, no I/O.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn check_schedule(
    date: Option<String>,
    time_of_day: Option<String>,
    timezone: Option<String>,
    now: Option<String>,
) -> ScheduleCheckResponse {
    let (draft, now) = match schedule_draft(date, time_of_day, timezone)
        .and_then(|draft| Ok((draft, parse_now(now)?)))
    {
        Ok(parsed) => parsed,
        Err(failure) => {
            return ScheduleCheckResponse {
                ok: false,
                scheduled_time: None,
                degraded: false,
                field: failure.field,
                message: failure.message,
            };
        }
    };

    match ScheduleValidator::default().validate(&draft, now) {
        ScheduleDecision::Unscheduled => ScheduleCheckResponse {
            ok: true,
            scheduled_time: None,
            degraded: false,
            field: None,
            message: "No date selected.".to_string(),
        },
        ScheduleDecision::Accepted(resolution) => {
            let message = match &resolution.conversion {
                Conversion::Degraded(degraded) => format!(
                    "Time zone `{}` could not be applied; using device time zone.",
                    degraded.timezone
                ),
                _ => "Schedule accepted.".to_string(),
            };
            ScheduleCheckResponse {
                ok: true,
                scheduled_time: Some(resolution.instant.to_rfc3339()),
                degraded: resolution.is_degraded(),
                field: None,
                message,
            }
        }
        ScheduleDecision::Rejected(rejection) => ScheduleCheckResponse {
            ok: false,
            scheduled_time: None,
            degraded: false,
            field: Some(rejection.field.as_str().to_string()),
            message: rejection.to_string(),
        },
    }
}

/// Creates a reminder after validating its schedule.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the saved reminder on success.
#[flutter_rust_bridge::frb(sync)]
pub fn create_reminder(input: ReminderInput, now: Option<String>) -> ReminderActionResponse {
    let (draft, now) = match reminder_draft(input).and_then(|d| Ok((d, parse_now(now)?))) {
        Ok(parsed) => parsed,
        Err(failure) => return ReminderActionResponse::failure(failure.message, failure.field),
    };
    match with_reminder_service(|service| service.create_reminder(&draft, now)) {
        Ok(reminder) => {
            ReminderActionResponse::success("Reminder created.", Some(to_reminder_item(&reminder)))
        }
        Err(failure) => ReminderActionResponse::failure(
            format!("create_reminder failed: {}", failure.message),
            failure.field,
        ),
    }
}

/// Replaces every field of reminder `id` and resets its status.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn update_reminder(
    id: i64,
    input: ReminderInput,
    now: Option<String>,
) -> ReminderActionResponse {
    let (draft, now) = match reminder_draft(input).and_then(|d| Ok((d, parse_now(now)?))) {
        Ok(parsed) => parsed,
        Err(failure) => return ReminderActionResponse::failure(failure.message, failure.field),
    };
    match with_reminder_service(|service| service.update_reminder(id, &draft, now)) {
        Ok(reminder) => {
            ReminderActionResponse::success("Reminder updated.", Some(to_reminder_item(&reminder)))
        }
        Err(failure) => ReminderActionResponse::failure(
            format!("update_reminder failed: {}", failure.message),
            failure.field,
        ),
    }
}

/// Deletes reminder `id`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_reminder(id: i64) -> ReminderActionResponse {
    match with_reminder_service(|service| service.delete_reminder(id)) {
        Ok(()) => ReminderActionResponse::success("Reminder deleted.", None),
        Err(failure) => ReminderActionResponse::failure(
            format!("delete_reminder failed: {}", failure.message),
            None,
        ),
    }
}

/// Splits every stored reminder into upcoming and past against `now`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_timeline(now: Option<String>) -> ReminderTimelineResponse {
    let result = parse_now(now).and_then(|now| with_reminder_service(|s| s.timeline(now)));
    match result {
        Ok(partition) => ReminderTimelineResponse {
            ok: true,
            message: format!(
                "{} upcoming, {} past.",
                partition.upcoming.len(),
                partition.past.len()
            ),
            upcoming: partition.upcoming.iter().map(to_reminder_item).collect(),
            past: partition.past.iter().map(to_reminder_item).collect(),
        },
        Err(failure) => ReminderTimelineResponse {
            ok: false,
            upcoming: Vec::new(),
            past: Vec::new(),
            message: format!("reminder_timeline failed: {}", failure.message),
        },
    }
}

/// Lists reminders newest first with optional status and text filters.
///
/// `page` and `limit` are normalized; the response echoes the applied values.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn list_reminders(
    status: Option<String>,
    search: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
) -> ReminderListResponse {
    let mut query = ReminderListQuery {
        status: None,
        search,
        page: page.unwrap_or(0),
        limit: limit.unwrap_or(0),
    };

    if let Some(raw) = status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        match raw.parse::<ReminderStatus>() {
            Ok(parsed) => query.status = Some(parsed),
            Err(err) => return list_failure(&query, format!("list_reminders failed: {err}")),
        }
    }

    match with_reminder_service(|service| service.list_reminders(&query)) {
        Ok(page) => ReminderListResponse {
            ok: true,
            message: if page.items.is_empty() {
                "No reminders.".to_string()
            } else {
                format!("Found {} reminder(s).", page.total)
            },
            items: page.items.iter().map(to_reminder_item).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        },
        Err(failure) => list_failure(
            &query,
            format!("list_reminders failed: {}", failure.message),
        ),
    }
}

fn list_failure(query: &ReminderListQuery, message: String) -> ReminderListResponse {
    ReminderListResponse {
        ok: false,
        items: Vec::new(),
        total: 0,
        page: query.applied_page(),
        limit: query.applied_limit(),
        total_pages: 1,
        message,
    }
}

/// Boundary failure with the form field it belongs to, if any.
struct Failure {
    field: Option<String>,
    message: String,
}

impl Failure {
    fn plain(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    fn on_field(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }
}

impl From<ReminderServiceError> for Failure {
    fn from(value: ReminderServiceError) -> Self {
        match &value {
            ReminderServiceError::Schedule(rejection) => Self::on_field(
                rejection.field.as_str(),
                rejection.to_string(),
            ),
            _ => Self::plain(value.to_string()),
        }
    }
}

fn parse_now(now: Option<String>) -> Result<Instant, Failure> {
    match now.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(Instant::from(Utc::now())),
        Some(raw) => {
            Instant::parse(raw).map_err(|err| Failure::plain(format!("invalid now: {err}")))
        }
    }
}

fn schedule_draft(
    date: Option<String>,
    time_of_day: Option<String>,
    timezone: Option<String>,
) -> Result<ScheduleDraft, Failure> {
    let date = match date.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        None => None,
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| Failure::on_field("date", format!("invalid date `{raw}`")))?,
        ),
    };
    Ok(ScheduleDraft {
        date,
        time_of_day,
        timezone,
    })
}

fn reminder_draft(input: ReminderInput) -> Result<ReminderDraft, Failure> {
    let schedule = schedule_draft(input.date, input.time_of_day, input.timezone)?;
    let phone = if input.use_own_phone {
        PhoneChoice::Own(input.phone_to_call)
    } else {
        PhoneChoice::Custom(input.phone_to_call)
    };
    Ok(ReminderDraft {
        title: input.title,
        description: input.description,
        schedule,
        phone,
    })
}

fn resolve_reminder_db_path() -> PathBuf {
    REMINDER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("RINGBACK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(REMINDER_DB_FILE_NAME)
        })
        .clone()
}

fn with_reminder_service<T>(
    f: impl FnOnce(
        &ReminderService<SqliteReminderRepository<'_>>,
    ) -> Result<T, ReminderServiceError>,
) -> Result<T, Failure> {
    let db_path = resolve_reminder_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        error!("event=ffi_db_open module=ffi status=error error={err}");
        Failure::plain(format!("reminder DB open failed: {err}"))
    })?;
    let service = ReminderService::new(SqliteReminderRepository::new(&conn));
    f(&service).map_err(Failure::from)
}

fn to_reminder_item(reminder: &Reminder) -> ReminderItem {
    ReminderItem {
        id: reminder.id,
        title: reminder.title.clone(),
        description: reminder.description.clone(),
        scheduled_time: reminder.scheduled_time.map(|at| at.to_rfc3339()),
        phone_to_call: reminder.phone_to_call.clone(),
        status: reminder.status.as_str().to_string(),
        created_at: reminder.created_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        check_schedule, core_version, create_reminder, delete_reminder, init_logging,
        list_reminders, ping, reminder_timeline, update_reminder, ReminderInput,
    };
    use ringback_core::db::open_db;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    const NOW: &str = "2030-01-10T12:00:00Z";

    static TEST_DB_DIR: OnceLock<TempDir> = OnceLock::new();

    /// Points the process-wide store at a private, pre-migrated file.
    ///
    /// Must run before the first DB-backed call in every test.
    fn use_test_db() {
        TEST_DB_DIR.get_or_init(|| {
            let dir = tempfile::tempdir().expect("create test db dir");
            let path = dir.path().join("ringback-ffi-test.sqlite3");
            open_db(&path).expect("migrate test db");
            std::env::set_var("RINGBACK_DB_PATH", &path);
            assert_eq!(super::resolve_reminder_db_path(), path);
            dir
        });
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn check_schedule_resolves_zone_aware_instant() {
        let response = check_schedule(
            Some("2030-01-15".to_string()),
            Some("09:00".to_string()),
            Some("America/New_York".to_string()),
            Some(NOW.to_string()),
        );
        assert!(response.ok, "{}", response.message);
        assert_eq!(
            response.scheduled_time.as_deref(),
            Some("2030-01-15T14:00:00Z")
        );
        assert!(!response.degraded);
    }

    #[test]
    fn check_schedule_rejects_past_on_date_field() {
        let response = check_schedule(
            Some("2030-01-09".to_string()),
            Some("09:00".to_string()),
            Some("UTC".to_string()),
            Some(NOW.to_string()),
        );
        assert!(!response.ok);
        assert_eq!(response.field.as_deref(), Some("date"));
        assert_eq!(response.message, "scheduled time must be in the future");
    }

    #[test]
    fn check_schedule_flags_unknown_zone_as_degraded() {
        let response = check_schedule(
            Some("2031-06-01".to_string()),
            None,
            Some("Mars/Olympus_Mons".to_string()),
            Some(NOW.to_string()),
        );
        assert!(response.ok, "{}", response.message);
        assert!(response.degraded);
        assert!(response.scheduled_time.is_some());
    }

    #[test]
    fn check_schedule_reports_bad_date_text() {
        let response = check_schedule(Some("15/01/2030".to_string()), None, None, None);
        assert!(!response.ok);
        assert_eq!(response.field.as_deref(), Some("date"));
    }

    #[test]
    fn check_schedule_without_date_is_unscheduled() {
        let response = check_schedule(None, None, None, Some(NOW.to_string()));
        assert!(response.ok);
        assert_eq!(response.scheduled_time, None);
    }

    #[test]
    fn create_update_and_list_round_through_store() {
        use_test_db();
        let token = unique_token("ffi-reminder");
        let created = create_reminder(input(&token, Some("2030-02-01")), Some(NOW.to_string()));
        assert!(created.ok, "{}", created.message);
        let item = created.reminder.expect("created reminder");
        assert_eq!(item.status, "scheduled");
        assert_eq!(item.scheduled_time.as_deref(), Some("2030-02-01T09:15:00Z"));

        let mut changed = input(&token, Some("2030-03-01"));
        changed.description = Some("moved".to_string());
        let updated = update_reminder(item.id, changed, Some(NOW.to_string()));
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(
            updated.reminder.and_then(|r| r.description).as_deref(),
            Some("moved")
        );

        let listed = list_reminders(Some("scheduled".to_string()), Some(token), None, Some(500));
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.limit, 100);
        assert_eq!(listed.page, 1);
        assert!(listed.items.iter().any(|listed| listed.id == item.id));

        let deleted = delete_reminder(item.id);
        assert!(deleted.ok, "{}", deleted.message);
    }

    #[test]
    fn create_reminder_rejects_past_schedule_with_field() {
        use_test_db();
        let response = create_reminder(
            input(&unique_token("ffi-past"), Some("2029-12-31")),
            Some(NOW.to_string()),
        );
        assert!(!response.ok);
        assert_eq!(response.field.as_deref(), Some("date"));
        assert!(response.reminder.is_none());
    }

    #[test]
    fn timeline_places_created_reminder_in_upcoming() {
        use_test_db();
        let created = create_reminder(
            input(&unique_token("ffi-timeline"), Some("2030-04-01")),
            Some(NOW.to_string()),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.reminder.expect("created reminder").id;

        let timeline = reminder_timeline(Some(NOW.to_string()));
        assert!(timeline.ok, "{}", timeline.message);
        assert!(timeline.upcoming.iter().any(|item| item.id == id));
        assert!(timeline.past.iter().all(|item| item.id != id));
    }

    #[test]
    fn list_reminders_rejects_unknown_status() {
        use_test_db();
        let response = list_reminders(Some("snoozed".to_string()), None, None, None);
        assert!(!response.ok);
        assert_eq!(response.limit, 10);
    }

    #[test]
    fn delete_reminder_reports_missing_id() {
        use_test_db();
        let response = delete_reminder(i64::MAX);
        assert!(!response.ok);
        assert!(response.message.contains("not found"));
    }

    fn input(title: &str, date: Option<&str>) -> ReminderInput {
        ReminderInput {
            title: title.to_string(),
            description: None,
            date: date.map(str::to_string),
            time_of_day: Some("09:15".to_string()),
            timezone: Some("UTC".to_string()),
            phone_to_call: "+1 555 0100".to_string(),
            use_own_phone: false,
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
