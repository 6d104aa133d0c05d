use crate::db::DbPool;
use crate::dto::{FlashcardQueryDto, UpdateFlashcardDto};
use crate::models::Flashcard;
use crate::schema::flashcards;
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use tracing::{instrument, debug, info};

/// Inserts a batch of flashcards
///
/// Used by the generation pipeline to persist a whole generated batch in one
/// statement, so the batch either lands completely or not at all.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `cards` - The flashcards to insert
///
/// ### Returns
///
/// A Result containing the number of inserted rows if successful
#[instrument(skip(pool, cards), fields(count = %cards.len()))]
pub fn insert_flashcards(pool: &DbPool, cards: &[Flashcard]) -> Result<usize> {
    debug!("Inserting flashcards");

    let conn = &mut pool.get()?;
    let inserted = diesel::insert_into(flashcards::table)
        .values(cards)
        .execute(conn)?;

    info!("Inserted {} flashcards", inserted);
    Ok(inserted)
}

/// Retrieves a flashcard by ID, scoped to its owner
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `flashcard_id` - The ID of the flashcard to retrieve
/// * `user_id` - The ID of the requesting user
///
/// ### Returns
///
/// A Result containing the Flashcard if it exists and belongs to the user,
/// or None otherwise
#[instrument(skip(pool), fields(flashcard_id = %flashcard_id, user_id = %user_id))]
pub fn get_flashcard(pool: &DbPool, flashcard_id: &str, user_id: &str) -> Result<Option<Flashcard>> {
    let conn = &mut pool.get()?;
    let result = flashcards::table
        .filter(flashcards::id.eq(flashcard_id))
        .filter(flashcards::user_id.eq(user_id))
        .first::<Flashcard>(conn)
        .optional()?;
    Ok(result)
}

/// Lists a user's flashcards with filtering, sorting and pagination
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The ID of the requesting user
/// * `query` - Filter, sort and pagination options (already validated)
///
/// ### Returns
///
/// A Result containing the matching page of flashcards together with the
/// total number of rows matching the filters
#[instrument(skip(pool, query), fields(user_id = %user_id))]
pub fn list_flashcards(
    pool: &DbPool,
    user_id: &str,
    query: &FlashcardQueryDto,
) -> Result<(Vec<Flashcard>, i64)> {
    debug!("Listing flashcards with filters: {:?}", query);

    let conn = &mut pool.get()?;

    let mut data_query = flashcards::table
        .filter(flashcards::user_id.eq(user_id))
        .into_boxed();
    let mut count_query = flashcards::table
        .filter(flashcards::user_id.eq(user_id))
        .count()
        .into_boxed();

    if let Some(status) = &query.status {
        data_query = data_query.filter(flashcards::status.eq(status.clone()));
        count_query = count_query.filter(flashcards::status.eq(status.clone()));
    }
    if let Some(source) = &query.source {
        data_query = data_query.filter(flashcards::source.eq(source.clone()));
        count_query = count_query.filter(flashcards::source.eq(source.clone()));
    }

    data_query = match (query.sort.as_str(), query.order.as_str()) {
        ("updated_at", "asc") => data_query.order(flashcards::updated_at.asc()),
        ("updated_at", _) => data_query.order(flashcards::updated_at.desc()),
        (_, "asc") => data_query.order(flashcards::created_at.asc()),
        _ => data_query.order(flashcards::created_at.desc()),
    };

    let total: i64 = count_query.get_result(conn)?;
    let cards = data_query
        .limit(query.limit)
        .offset(query.offset)
        .load::<Flashcard>(conn)?;

    info!("Retrieved {} of {} flashcards", cards.len(), total);
    Ok((cards, total))
}

/// Updates a flashcard's front, back and/or status
///
/// Fields left as None in the update are preserved. The update is scoped to
/// the owning user; updating another user's flashcard behaves like updating a
/// missing one.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `flashcard_id` - The ID of the flashcard to update
/// * `user_id` - The ID of the requesting user
/// * `update` - The fields to change (already validated)
///
/// ### Returns
///
/// A Result containing the updated Flashcard, or None if no matching
/// flashcard exists
#[instrument(skip(pool, update), fields(flashcard_id = %flashcard_id, user_id = %user_id))]
pub fn update_flashcard(
    pool: &DbPool,
    flashcard_id: &str,
    user_id: &str,
    update: &UpdateFlashcardDto,
) -> Result<Option<Flashcard>> {
    debug!("Updating flashcard");

    let conn = &mut pool.get()?;

    let existing = flashcards::table
        .filter(flashcards::id.eq(flashcard_id))
        .filter(flashcards::user_id.eq(user_id))
        .first::<Flashcard>(conn)
        .optional()?;

    let Some(existing) = existing else {
        debug!("Flashcard not found");
        return Ok(None);
    };

    let new_front = update.front.clone().unwrap_or_else(|| existing.get_front());
    let new_back = update.back.clone().unwrap_or_else(|| existing.get_back());
    let new_status = update.status.clone().unwrap_or_else(|| existing.get_status());

    diesel::update(
        flashcards::table
            .filter(flashcards::id.eq(flashcard_id))
            .filter(flashcards::user_id.eq(user_id)),
    )
    .set((
        flashcards::front.eq(new_front),
        flashcards::back.eq(new_back),
        flashcards::status.eq(new_status),
        flashcards::updated_at.eq(Utc::now().naive_utc()),
    ))
    .execute(conn)?;

    let updated = flashcards::table
        .filter(flashcards::id.eq(flashcard_id))
        .first::<Flashcard>(conn)?;

    info!("Updated flashcard {}", flashcard_id);
    Ok(Some(updated))
}

/// Deletes a flashcard, scoped to its owner
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `flashcard_id` - The ID of the flashcard to delete
/// * `user_id` - The ID of the requesting user
///
/// ### Returns
///
/// A Result containing true if a flashcard was deleted, false if no matching
/// flashcard exists
#[instrument(skip(pool), fields(flashcard_id = %flashcard_id, user_id = %user_id))]
pub fn delete_flashcard(pool: &DbPool, flashcard_id: &str, user_id: &str) -> Result<bool> {
    debug!("Deleting flashcard");

    let conn = &mut pool.get()?;
    let deleted = diesel::delete(
        flashcards::table
            .filter(flashcards::id.eq(flashcard_id))
            .filter(flashcards::user_id.eq(user_id)),
    )
    .execute(conn)?;

    Ok(deleted > 0)
}
