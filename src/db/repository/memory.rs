use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::config;
use crate::db::DatabaseError;
use crate::models::enums::MemoryCategory;
use crate::models::UserMemory;

pub fn insert_memory(conn: &Connection, memory: &UserMemory) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO user_memory (id, category, label, value, source_episode_id, approved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            memory.id.to_string(),
            memory.category.as_str(),
            memory.label,
            memory.value,
            memory.source_episode_id.map(|id| id.to_string()),
            memory.approved_at.format(config::TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_memories(conn: &Connection) -> Result<Vec<UserMemory>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, category, label, value, source_episode_id, approved_at
         FROM user_memory ORDER BY approved_at DESC, id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut memories = Vec::new();
    for row in rows {
        let (id, category, label, value, source, approved_at) = row?;
        memories.push(UserMemory {
            id: Uuid::parse_str(&id).map_err(|_| DatabaseError::InvalidEnum {
                field: "user_memory.id".into(),
                value: id.clone(),
            })?,
            category: MemoryCategory::from_str(&category)?,
            label,
            value,
            source_episode_id: source.and_then(|s| Uuid::parse_str(&s).ok()),
            approved_at: NaiveDateTime::parse_from_str(&approved_at, config::TIMESTAMP_FORMAT)
                .unwrap_or_default(),
        });
    }
    Ok(memories)
}

pub fn delete_memory(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM user_memory WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("UserMemory", id));
    }
    Ok(())
}
