use crate::db::DbPool;
use crate::models::{GenerationErrorCode, GenerationErrorLog};
use crate::schema::generation_error_logs;
use anyhow::Result;
use diesel::prelude::*;
use tracing::{instrument, debug};

/// Appends an error-log entry for a generation
///
/// Entries are append-only; nothing in the application updates or deletes
/// them.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `generation_id` - The ID of the generation that failed
/// * `code` - Which pipeline stage failed
/// * `message` - Free-text description of the failure
///
/// ### Returns
///
/// A Result containing the created GenerationErrorLog if successful
#[instrument(skip(pool, message), fields(generation_id = %generation_id, code = %code.as_str()))]
pub fn log_generation_error(
    pool: &DbPool,
    generation_id: &str,
    code: GenerationErrorCode,
    message: &str,
) -> Result<GenerationErrorLog> {
    debug!("Recording generation error");

    let conn = &mut pool.get()?;
    let entry = GenerationErrorLog::new(generation_id.to_string(), code, message.to_string());

    diesel::insert_into(generation_error_logs::table)
        .values(&entry)
        .execute(conn)?;

    Ok(entry)
}

/// Lists all error-log entries recorded for a generation
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `generation_id` - The ID of the generation to look up
#[instrument(skip(pool), fields(generation_id = %generation_id))]
pub fn list_errors_for_generation(
    pool: &DbPool,
    generation_id: &str,
) -> Result<Vec<GenerationErrorLog>> {
    let conn = &mut pool.get()?;
    let entries = generation_error_logs::table
        .filter(generation_error_logs::generation_id.eq(generation_id))
        .order(generation_error_logs::created_at.asc())
        .load::<GenerationErrorLog>(conn)?;
    Ok(entries)
}
