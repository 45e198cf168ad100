//! Memory extraction and the approval gate.
//!
//! Extraction proposes; only explicit per-item approval persists.

pub mod extract;

pub use extract::extract_candidates;

use chrono::Local;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::memory as memory_repo;
use crate::error::EngineError;
use crate::models::{MemoryCandidate, UserMemory};

/// Merge one approved candidate into durable profile memory. This is
/// the only write path into `user_memory`.
pub fn approve_candidate(
    conn: &Connection,
    candidate: &MemoryCandidate,
    source_episode_id: Option<Uuid>,
) -> Result<UserMemory, EngineError> {
    if candidate.value.trim().is_empty() {
        return Err(EngineError::invalid("memory candidate value must not be empty"));
    }

    let memory = UserMemory {
        id: Uuid::new_v4(),
        category: candidate.category,
        label: candidate.label.clone(),
        value: candidate.value.clone(),
        source_episode_id,
        approved_at: Local::now().naive_local(),
    };
    memory_repo::insert_memory(conn, &memory)?;
    tracing::info!(category = memory.category.as_str(), "Memory approved");
    Ok(memory)
}

pub fn list_memories(conn: &Connection) -> Result<Vec<UserMemory>, EngineError> {
    Ok(memory_repo::list_memories(conn)?)
}

/// Remove an approved fact. NotFound for unknown ids.
pub fn forget_memory(conn: &Connection, id: Uuid) -> Result<(), EngineError> {
    Ok(memory_repo::delete_memory(conn, &id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::enums::{MemoryCategory, MemoryConfidence, MessageRole};
    use crate::models::Message;

    fn candidate() -> MemoryCandidate {
        MemoryCandidate {
            category: MemoryCategory::Allergy,
            label: "Allergy".into(),
            value: "penicillin".into(),
            confidence: MemoryConfidence::High,
        }
    }

    #[test]
    fn extraction_alone_persists_nothing() {
        let conn = open_memory_database().unwrap();
        let transcript = vec![Message {
            id: Uuid::new_v4(),
            episode_id: Uuid::new_v4(),
            seq: 0,
            role: MessageRole::User,
            text: "I'm allergic to penicillin".into(),
            timestamp: Local::now().naive_local(),
        }];

        let candidates = extract_candidates(&transcript);
        assert!(!candidates.is_empty());
        assert!(list_memories(&conn).unwrap().is_empty());
    }

    #[test]
    fn approval_persists_the_fact() {
        let conn = open_memory_database().unwrap();
        let memory = approve_candidate(&conn, &candidate(), None).unwrap();

        let memories = list_memories(&conn).unwrap();
        assert_eq!(memories.len(), 1);
        assert_eq!(memories[0].id, memory.id);
        assert_eq!(memories[0].value, "penicillin");
    }

    #[test]
    fn forget_removes_the_fact() {
        let conn = open_memory_database().unwrap();
        let memory = approve_candidate(&conn, &candidate(), None).unwrap();

        forget_memory(&conn, memory.id).unwrap();
        assert!(list_memories(&conn).unwrap().is_empty());

        assert!(forget_memory(&conn, memory.id).is_err());
    }
}
