use std::time::Duration;

use include_dir::{include_dir, Dir};
use rusqlite::{Connection, ErrorCode, OpenFlags};
use rusqlite_migration::Migrations;
use tracing::{debug, instrument, trace};

mod database_connection;
pub use database_connection::*;

pub mod model;

static MIGRATIONS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/migrations");

fn sqlite_connection_profiling_callback(query: &str, duration: Duration) {
    trace!(target: "sqlite_profiling", ?duration, query);
}

pub fn get_migrations() -> Result<Migrations<'static>, anyhow::Error> {
    Ok(Migrations::from_directory(&MIGRATIONS_DIR)?)
}

#[instrument(skip(conn))]
pub fn run_pragmas(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

/// Per-connection setup used by the pool's post-create hook
#[instrument(skip(conn))]
pub fn configure_new_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    run_pragmas(conn)?;
    conn.profile(Some(sqlite_connection_profiling_callback));
    Ok(())
}

/// Brings `conn` up to the latest schema. Tests use this directly on
/// in-memory databases.
pub fn migrate_to_latest(conn: &mut Connection) -> Result<(), anyhow::Error> {
    get_migrations()?.to_latest(conn)?;
    Ok(())
}

/// Opens the database, applies pending migrations and closes it again.
/// Runs before the pool is created so every pooled connection sees the
/// final schema.
#[instrument]
pub fn run_migrations(connection_string: &str) -> Result<(), anyhow::Error> {
    let open_flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_CREATE;

    let mut conn = Connection::open_with_flags(connection_string, open_flags)?;
    run_pragmas(&conn)?;
    migrate_to_latest(&mut conn)?;
    debug!("schema up to date");

    if let Err((_conn, e)) = conn.close() {
        Err(e)?;
    }
    Ok(())
}

/// True when an insert lost to a unique (or primary key) constraint
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}
