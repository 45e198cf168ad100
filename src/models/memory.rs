use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MemoryCategory, MemoryConfidence};

/// A proposed durable health fact. Always a suggestion — never written
/// to [`UserMemory`] without an explicit approval step per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCandidate {
    pub category: MemoryCategory,
    pub label: String,
    pub value: String,
    pub confidence: MemoryConfidence,
}

/// An approved durable health fact in the user's profile memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMemory {
    pub id: Uuid,
    pub category: MemoryCategory,
    pub label: String,
    pub value: String,
    pub source_episode_id: Option<Uuid>,
    pub approved_at: NaiveDateTime,
}
