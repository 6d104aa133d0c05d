use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonValue;

/// The lifecycle status recorded in a generation's log payload
///
/// A generation starts out `Pending` and ends up either `Completed` (all of
/// its flashcards were persisted) or `Failed` (some stage of the pipeline
/// broke; the matching error-log row explains what happened).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Completed,
    Failed,
}

impl GenerationStatus {
    /// Returns the status as the string stored in the log payload
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }
}

/// The JSON log payload stored on each generation row
///
/// Records what was asked of the pipeline (input length and card count) along
/// with the lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationLog {
    /// The length of the submitted source text, in characters
    pub text_length: i64,

    /// How many flashcards the caller asked for
    pub requested_cards: i32,

    /// The lifecycle status of the generation
    pub status: GenerationStatus,
}

/// Represents one request to turn source text into flashcards
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::generations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Generation {
    /// Unique identifier for the generation (UUID v4 as string)
    id: String,

    /// The ID of the user who owns this generation
    user_id: String,

    /// When this generation was created
    created_at: NaiveDateTime,

    /// When this generation was last updated
    updated_at: NaiveDateTime,

    /// JSON log payload, stored as TEXT (see [`GenerationLog`])
    log: JsonValue,
}

impl Generation {
    /// Creates a new pending generation
    ///
    /// ### Arguments
    ///
    /// * `user_id` - The ID of the owning user
    /// * `text_length` - The length of the submitted source text, in characters
    /// * `requested_cards` - How many flashcards were requested
    pub fn new(user_id: String, text_length: i64, requested_cards: i32) -> Self {
        let now = Utc::now().naive_utc();
        let log = GenerationLog {
            text_length,
            requested_cards,
            status: GenerationStatus::Pending,
        };
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            log: JsonValue(serde_json::to_value(log).expect("log payload serializes")),
        }
    }

    /// Gets the generation's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the user who owns this generation
    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    /// Gets the generation's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the generation's last-update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }

    /// Gets the parsed log payload
    ///
    /// ### Errors
    ///
    /// Returns an error if the stored log text does not deserialize into a
    /// [`GenerationLog`]
    pub fn get_log(&self) -> Result<GenerationLog, serde_json::Error> {
        serde_json::from_value(self.log.0.clone())
    }
}
