//! Reminder repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/replace/get/list/delete over the `reminders` table.
//! - Keep SQL and column encodings inside the store boundary.
//!
//! # Invariants
//! - Write paths validate the payload before any SQL runs.
//! - Instants are stored as fixed-width RFC 3339 UTC text.
//! - Read paths reject undecodable rows instead of masking them.
//! - List pages are ordered by `created_at DESC, id DESC`.
//! - Connections come from `db::open_db*`; search relies on `ringback_fold`.

use crate::db::{fold_for_search, DbError};
use crate::model::reminder::{
    Reminder, ReminderId, ReminderPayload, ReminderStatus, ReminderValidationError,
};
use crate::time::instant::Instant;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page size used when a query asks for `0`.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Upper bound applied to any requested page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

const REMINDER_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    scheduled_time,
    phone_to_call,
    status,
    created_at
FROM reminders";

pub type RepoResult<T> = Result<T, RepoError>;

/// Reminder store error.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReminderValidationError),
    Db(DbError),
    NotFound(ReminderId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "reminder not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored reminder: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ReminderValidationError> for RepoError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter and paging options for listing reminders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderListQuery {
    pub status: Option<ReminderStatus>,
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    /// 1-based; `0` is treated as `1`.
    pub page: u32,
    /// `0` means `DEFAULT_PAGE_LIMIT`; capped at `MAX_PAGE_LIMIT`.
    pub limit: u32,
}

impl ReminderListQuery {
    pub fn applied_limit(&self) -> u32 {
        match self.limit {
            0 => DEFAULT_PAGE_LIMIT,
            value => value.min(MAX_PAGE_LIMIT),
        }
    }

    pub fn applied_page(&self) -> u32 {
        self.page.max(1)
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// One page of listed reminders plus totals for pagination controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPage {
    pub items: Vec<Reminder>,
    /// Rows matching the filter across all pages.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    /// Always at least `1`.
    pub total_pages: u32,
}

/// Persistence contract for reminders.
pub trait ReminderRepository {
    fn create_reminder(&self, payload: &ReminderPayload, created_at: Instant)
        -> RepoResult<ReminderId>;
    /// Replaces every payload field and resets status to `scheduled`.
    fn update_reminder(
        &self,
        id: ReminderId,
        payload: &ReminderPayload,
        updated_at: Instant,
    ) -> RepoResult<()>;
    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<Reminder>>;
    fn list_reminders(&self, query: &ReminderListQuery) -> RepoResult<ReminderPage>;
    /// Every stored reminder, in insertion order.
    fn all_reminders(&self) -> RepoResult<Vec<Reminder>>;
    fn set_status(
        &self,
        id: ReminderId,
        status: ReminderStatus,
        updated_at: Instant,
    ) -> RepoResult<()>;
    fn delete_reminder(&self, id: ReminderId) -> RepoResult<()>;
}

/// SQLite-backed reminder repository.
pub struct SqliteReminderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReminderRepository for SqliteReminderRepository<'_> {
    fn create_reminder(
        &self,
        payload: &ReminderPayload,
        created_at: Instant,
    ) -> RepoResult<ReminderId> {
        payload.validate()?;
        let stamp = created_at.to_storage_string();

        self.conn.execute(
            "INSERT INTO reminders (
                title,
                description,
                scheduled_time,
                phone_to_call,
                status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                payload.title.as_str(),
                payload.description.as_deref(),
                payload.scheduled_time.map(|at| at.to_storage_string()),
                payload.phone_to_call.as_str(),
                ReminderStatus::Scheduled.as_str(),
                stamp,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_reminder(
        &self,
        id: ReminderId,
        payload: &ReminderPayload,
        updated_at: Instant,
    ) -> RepoResult<()> {
        payload.validate()?;

        let changed = self.conn.execute(
            "UPDATE reminders
             SET
                title = ?1,
                description = ?2,
                scheduled_time = ?3,
                phone_to_call = ?4,
                status = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                payload.title.as_str(),
                payload.description.as_deref(),
                payload.scheduled_time.map(|at| at.to_storage_string()),
                payload.phone_to_call.as_str(),
                ReminderStatus::Scheduled.as_str(),
                updated_at.to_storage_string(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_reminder_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_reminders(&self, query: &ReminderListQuery) -> RepoResult<ReminderPage> {
        let mut filter = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            filter.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(term) = query.search_term() {
            let pattern = like_pattern(term);
            filter.push_str(
                " AND (ringback_fold(title) LIKE ? ESCAPE '\\'
                   OR ringback_fold(coalesce(description, '')) LIKE ? ESCAPE '\\')",
            );
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM reminders{filter};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;
        let total = u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {total}")))?;

        let limit = query.applied_limit();
        let page = query.applied_page();
        let offset = i64::from(page - 1) * i64::from(limit);

        let sql = format!(
            "{REMINDER_SELECT_SQL}{filter} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?;"
        );
        bind_values.push(Value::Integer(i64::from(limit)));
        bind_values.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_reminder_row(row)?);
        }

        Ok(ReminderPage {
            items,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        })
    }

    fn all_reminders(&self) -> RepoResult<Vec<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut reminders = Vec::new();
        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }
        Ok(reminders)
    }

    fn set_status(
        &self,
        id: ReminderId,
        status: ReminderStatus,
        updated_at: Instant,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE reminders SET status = ?1, updated_at = ?2 WHERE id = ?3;",
            params![status.as_str(), updated_at.to_storage_string(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_reminder(&self, id: ReminderId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM reminders WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_reminder_row(row: &Row<'_>) -> RepoResult<Reminder> {
    let id: ReminderId = row.get("id")?;

    let scheduled_time = match row.get::<_, Option<String>>("scheduled_time")? {
        Some(value) => Some(parse_stored_instant(id, "scheduled_time", &value)?),
        None => None,
    };
    let created_text: String = row.get("created_at")?;
    let created_at = parse_stored_instant(id, "created_at", &created_text)?;

    let status_text: String = row.get("status")?;
    let status = status_text.parse::<ReminderStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in reminders.status (id={id})"
        ))
    })?;

    let reminder = Reminder {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        scheduled_time,
        phone_to_call: row.get("phone_to_call")?,
        status,
        created_at,
    };
    reminder.validate()?;
    Ok(reminder)
}

fn parse_stored_instant(id: ReminderId, column: &str, value: &str) -> RepoResult<Instant> {
    Instant::parse(value).map_err(|err| {
        RepoError::InvalidData(format!("reminders.{column} (id={id}): {err}"))
    })
}

/// Folds `term` like `ringback_fold` and escapes LIKE wildcards.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in fold_for_search(term).chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn total_pages(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    let pages = total.div_ceil(limit).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
