use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered player, as seen by tournament owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerRecord {
    pub name: String,
    pub phone_number: String,
    pub image_url: Option<String>,
}

/// The public view of a registered player. Phone numbers are left out on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerCard {
    pub name: String,
    pub image_url: Option<String>,
}

impl From<PlayerRecord> for PlayerCard {
    fn from(record: PlayerRecord) -> Self {
        Self {
            name: record.name,
            image_url: record.image_url,
        }
    }
}

/// A sports category. `sports_name` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SportCategory {
    pub sports_name: String,
    pub sports_date: NaiveDate,
}

/// Outcome of an insert keyed on a natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    Inserted,
    /// A row with the same key is already stored; nothing was written.
    AlreadyExists,
}
