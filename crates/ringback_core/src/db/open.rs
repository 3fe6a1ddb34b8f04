//! Connection opening for the reminder store.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - Returned connections are migrated to `migrations::latest_version()`.
//! - Returned connections expose `ringback_fold(text)`, the Unicode lowercase
//!   fold used by reminder search on both the column and the term.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQL name of the search folding function.
pub const SEARCH_FOLD_FN: &str = "ringback_fold";

/// Opens (or creates) a reminder store file and migrates it.
///
/// # Side effects
/// - Emits `event=db_open mode=file` start/ok/error log lines.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory reminder store, mainly for tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect()
        .map_err(DbError::from)
        .and_then(|mut conn| configure(&mut conn).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    register_search_fold(conn)?;
    apply_migrations(conn)
}

/// Registers `ringback_fold`; NULL stays NULL, text is lowercased with
/// Rust's Unicode rules (SQLite's `lower()` only folds ASCII).
fn register_search_fold(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        SEARCH_FOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| fold_for_search(&text))),
    )?;
    Ok(())
}

/// Case fold shared by stored text and search terms.
pub fn fold_for_search(text: &str) -> String {
    text.to_lowercase()
}
