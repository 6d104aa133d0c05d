use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The review status of a flashcard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashcardStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FlashcardStatus {
    /// Returns the status as the string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashcardStatus::Pending => "pending",
            FlashcardStatus::Accepted => "accepted",
            FlashcardStatus::Rejected => "rejected",
        }
    }

    /// Parses a status from its database string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FlashcardStatus::Pending),
            "accepted" => Some(FlashcardStatus::Accepted),
            "rejected" => Some(FlashcardStatus::Rejected),
            _ => None,
        }
    }
}

/// How a flashcard came to exist
///
/// `AiFull` cards come straight from the generation pipeline, `AiEdited` cards
/// were generated and then touched up by the user, and `Manual` cards were
/// written by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashcardSource {
    #[serde(rename = "ai-full")]
    AiFull,
    #[serde(rename = "ai-edited")]
    AiEdited,
    #[serde(rename = "manual")]
    Manual,
}

impl FlashcardSource {
    /// Returns the source as the string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashcardSource::AiFull => "ai-full",
            FlashcardSource::AiEdited => "ai-edited",
            FlashcardSource::Manual => "manual",
        }
    }

    /// Parses a source from its database string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ai-full" => Some(FlashcardSource::AiFull),
            "ai-edited" => Some(FlashcardSource::AiEdited),
            "manual" => Some(FlashcardSource::Manual),
            _ => None,
        }
    }
}

/// Represents a flashcard in the system
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::flashcards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Flashcard {
    /// Unique identifier for the flashcard (UUID v4 as string)
    id: String,

    /// The ID of the user who owns this flashcard
    user_id: String,

    /// The ID of the generation that produced this flashcard, if any
    generation_id: Option<String>,

    /// The front side: the question or concept
    front: String,

    /// The back side: the answer or explanation
    back: String,

    /// The review status ("pending", "accepted" or "rejected")
    status: String,

    /// How this flashcard was created ("ai-full", "ai-edited" or "manual")
    source: String,

    /// When this flashcard was created
    created_at: NaiveDateTime,

    /// When this flashcard was last updated
    updated_at: NaiveDateTime,
}

impl Flashcard {
    /// Creates a new manually-authored flashcard
    ///
    /// ### Arguments
    ///
    /// * `user_id` - The ID of the owning user
    /// * `front` - The front side text
    /// * `back` - The back side text
    pub fn new(user_id: String, front: String, back: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            generation_id: None,
            front,
            back,
            status: FlashcardStatus::Pending.as_str().to_string(),
            source: FlashcardSource::Manual.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new flashcard with all fields specified
    ///
    /// Used when persisting generated flashcards, whose id, timestamps and
    /// provenance were fixed by the generation adapter.
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_fields(
        id: String,
        user_id: String,
        generation_id: Option<String>,
        front: String,
        back: String,
        status: FlashcardStatus,
        source: FlashcardSource,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            generation_id,
            front,
            back,
            status: status.as_str().to_string(),
            source: source.as_str().to_string(),
            created_at: created_at.naive_utc(),
            updated_at: updated_at.naive_utc(),
        }
    }

    /// Gets the flashcard's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the user who owns this flashcard
    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    /// Gets the ID of the generation that produced this flashcard, if any
    pub fn get_generation_id(&self) -> Option<String> {
        self.generation_id.clone()
    }

    /// Gets the front side text
    pub fn get_front(&self) -> String {
        self.front.clone()
    }

    /// Gets the back side text
    pub fn get_back(&self) -> String {
        self.back.clone()
    }

    /// Gets the review status string
    pub fn get_status(&self) -> String {
        self.status.clone()
    }

    /// Gets the source string
    pub fn get_source(&self) -> String {
        self.source.clone()
    }

    /// Gets the flashcard's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the flashcard's last-update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
