use crate::db::DbPool;
use crate::models::{Generation, GenerationStatus, JsonValue};
use crate::schema::generations;
use anyhow::{Result, anyhow};
use chrono::Utc;
use diesel::prelude::*;
use tracing::{instrument, debug};

/// Inserts a pending generation row
///
/// The caller builds the [`Generation`] (and therefore owns its id) so that a
/// failed insert can still be attributed to a concrete generation id in the
/// error log.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `generation` - The generation to insert
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database insert operation fails
#[instrument(skip(pool, generation), fields(generation_id = %generation.get_id()))]
pub fn insert_generation(pool: &DbPool, generation: &Generation) -> Result<()> {
    debug!("Inserting new generation");

    let conn = &mut pool.get()?;
    diesel::insert_into(generations::table)
        .values(generation)
        .execute(conn)?;

    Ok(())
}

/// Retrieves a generation by its ID
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `generation_id` - The ID of the generation to retrieve
///
/// ### Returns
///
/// A Result containing the Generation if found, or None otherwise
#[instrument(skip(pool), fields(generation_id = %generation_id))]
pub fn get_generation(pool: &DbPool, generation_id: &str) -> Result<Option<Generation>> {
    let conn = &mut pool.get()?;
    let result = generations::table
        .filter(generations::id.eq(generation_id))
        .first::<Generation>(conn)
        .optional()?;
    Ok(result)
}

/// Updates the lifecycle status stored in a generation's log payload
///
/// Rewrites the log JSON with the new status and bumps `updated_at`. The
/// text_length and requested_cards fields recorded at creation are preserved.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `generation_id` - The ID of the generation to update
/// * `status` - The new lifecycle status
///
/// ### Errors
///
/// Returns an error if:
/// - The generation does not exist
/// - The stored log payload does not parse
/// - The database update operation fails
#[instrument(skip(pool), fields(generation_id = %generation_id, status = %status.as_str()))]
pub fn update_generation_status(
    pool: &DbPool,
    generation_id: &str,
    status: GenerationStatus,
) -> Result<()> {
    debug!("Updating generation status");

    let conn = &mut pool.get()?;

    let generation = generations::table
        .filter(generations::id.eq(generation_id))
        .first::<Generation>(conn)
        .optional()?
        .ok_or_else(|| anyhow!("Generation not found: {}", generation_id))?;

    let mut log = generation.get_log()?;
    log.status = status;

    diesel::update(generations::table.filter(generations::id.eq(generation_id)))
        .set((
            generations::log.eq(JsonValue(serde_json::to_value(&log)?)),
            generations::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    Ok(())
}
