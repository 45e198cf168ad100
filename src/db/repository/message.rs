use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::config;
use crate::db::DatabaseError;
use crate::models::enums::MessageRole;
use crate::models::Message;

pub fn insert_message(conn: &Connection, msg: &Message) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO messages (id, episode_id, seq, role, text, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            msg.id.to_string(),
            msg.episode_id.to_string(),
            msg.seq,
            msg.role.as_str(),
            msg.text,
            msg.timestamp.format(config::TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Next append position for an episode (0 for the first message).
pub fn next_seq(conn: &Connection, episode_id: &Uuid) -> Result<u32, DatabaseError> {
    let next: u32 = conn.query_row(
        "SELECT COALESCE(MAX(seq) + 1, 0) FROM messages WHERE episode_id = ?1",
        params![episode_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(next)
}

/// Transcript in strict append order. Unknown episode ids yield an
/// empty vec, never an error.
pub fn get_messages_by_episode(
    conn: &Connection,
    episode_id: &Uuid,
) -> Result<Vec<Message>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, episode_id, seq, role, text, timestamp
         FROM messages WHERE episode_id = ?1 ORDER BY seq ASC",
    )?;

    let rows = stmt.query_map(params![episode_id.to_string()], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            episode_id: row.get(1)?,
            seq: row.get(2)?,
            role: row.get(3)?,
            text: row.get(4)?,
            timestamp: row.get(5)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

struct MessageRow {
    id: String,
    episode_id: String,
    seq: u32,
    role: String,
    text: String,
    timestamp: String,
}

fn message_from_row(row: MessageRow) -> Result<Message, DatabaseError> {
    Ok(Message {
        id: Uuid::parse_str(&row.id).map_err(|_| DatabaseError::InvalidEnum {
            field: "message.id".into(),
            value: row.id.clone(),
        })?,
        episode_id: Uuid::parse_str(&row.episode_id).map_err(|_| DatabaseError::InvalidEnum {
            field: "message.episode_id".into(),
            value: row.episode_id.clone(),
        })?,
        seq: row.seq,
        role: MessageRole::from_str(&row.role)?,
        text: row.text,
        timestamp: NaiveDateTime::parse_from_str(&row.timestamp, config::TIMESTAMP_FORMAT)
            .unwrap_or_default(),
    })
}
