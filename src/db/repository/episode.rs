use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::config;
use crate::db::DatabaseError;
use crate::models::enums::{ExternalTriageLevel, ForWhom};
use crate::models::{Episode, EpisodeUpdate};

pub fn insert_episode(conn: &Connection, ep: &Episode) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO episodes (id, title, for_whom, relationship, age, triage_level,
         last_message_snippet, message_count, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            ep.id.to_string(),
            ep.title,
            ep.for_whom.as_str(),
            ep.relationship,
            ep.age,
            ep.triage_level.map(|l| l.as_str()),
            ep.last_message_snippet,
            ep.message_count,
            ep.is_active as i32,
            ep.created_at.format(config::TIMESTAMP_FORMAT).to_string(),
            ep.updated_at.format(config::TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_episode(conn: &Connection, id: &Uuid) -> Result<Option<Episode>, DatabaseError> {
    let result = conn.query_row(
        &format!("{SELECT_EPISODE} WHERE id = ?1"),
        params![id.to_string()],
        row_to_episode_row,
    );

    match result {
        Ok(row) => Ok(Some(episode_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_episodes(conn: &Connection) -> Result<Vec<Episode>, DatabaseError> {
    query_episodes(conn, &format!("{SELECT_EPISODE} ORDER BY updated_at DESC, id"), [])
}

pub fn get_recent_episodes(conn: &Connection, limit: u32) -> Result<Vec<Episode>, DatabaseError> {
    query_episodes(
        conn,
        &format!("{SELECT_EPISODE} ORDER BY updated_at DESC, id LIMIT ?1"),
        params![limit],
    )
}

/// Partial metadata update; untouched fields keep their value.
/// Returns NotFound when the episode does not exist.
pub fn update_episode_fields(
    conn: &Connection,
    id: &Uuid,
    fields: &EpisodeUpdate,
    updated_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE episodes SET
            title = COALESCE(?1, title),
            for_whom = COALESCE(?2, for_whom),
            relationship = COALESCE(?3, relationship),
            age = COALESCE(?4, age),
            updated_at = ?5
         WHERE id = ?6",
        params![
            fields.title,
            fields.for_whom.map(|f| f.as_str()),
            fields.relationship,
            fields.age,
            updated_at.format(config::TIMESTAMP_FORMAT).to_string(),
            id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("Episode", id));
    }
    Ok(())
}

pub fn set_triage_level(
    conn: &Connection,
    id: &Uuid,
    level: ExternalTriageLevel,
    updated_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE episodes SET triage_level = ?1, updated_at = ?2 WHERE id = ?3",
        params![
            level.as_str(),
            updated_at.format(config::TIMESTAMP_FORMAT).to_string(),
            id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("Episode", id));
    }
    Ok(())
}

/// Flip the is_active flag. Returns the number of rows changed so the
/// caller can choose between NotFound (close) and no-op (resume).
pub fn set_active(
    conn: &Connection,
    id: &Uuid,
    active: bool,
    updated_at: NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE episodes SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![
            active as i32,
            updated_at.format(config::TIMESTAMP_FORMAT).to_string(),
            id.to_string(),
        ],
    )?;
    Ok(updated)
}

/// Delete the episode; messages go with it via the FK cascade.
pub fn delete_episode(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM episodes WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Episode", id));
    }
    Ok(())
}

/// Bump message_count and refresh snippet + updated_at after an append.
pub fn record_append(
    conn: &Connection,
    id: &Uuid,
    snippet: &str,
    updated_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE episodes SET
            message_count = message_count + 1,
            last_message_snippet = ?1,
            updated_at = ?2
         WHERE id = ?3",
        params![
            snippet,
            updated_at.format(config::TIMESTAMP_FORMAT).to_string(),
            id.to_string(),
        ],
    )?;
    Ok(())
}

// ── Row mapping ─────────────────────────────────────────────

const SELECT_EPISODE: &str =
    "SELECT id, title, for_whom, relationship, age, triage_level,
            last_message_snippet, message_count, is_active, created_at, updated_at
     FROM episodes";

struct EpisodeRow {
    id: String,
    title: String,
    for_whom: String,
    relationship: Option<String>,
    age: Option<u32>,
    triage_level: Option<String>,
    last_message_snippet: Option<String>,
    message_count: u32,
    is_active: i32,
    created_at: String,
    updated_at: String,
}

fn row_to_episode_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EpisodeRow> {
    Ok(EpisodeRow {
        id: row.get(0)?,
        title: row.get(1)?,
        for_whom: row.get(2)?,
        relationship: row.get(3)?,
        age: row.get(4)?,
        triage_level: row.get(5)?,
        last_message_snippet: row.get(6)?,
        message_count: row.get(7)?,
        is_active: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn episode_from_row(row: EpisodeRow) -> Result<Episode, DatabaseError> {
    Ok(Episode {
        id: Uuid::parse_str(&row.id).map_err(|_| DatabaseError::InvalidEnum {
            field: "episode.id".into(),
            value: row.id.clone(),
        })?,
        title: row.title,
        for_whom: ForWhom::from_str(&row.for_whom)?,
        relationship: row.relationship,
        age: row.age,
        triage_level: row
            .triage_level
            .as_deref()
            .map(ExternalTriageLevel::from_str)
            .transpose()?,
        last_message_snippet: row.last_message_snippet,
        message_count: row.message_count,
        is_active: row.is_active != 0,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, config::TIMESTAMP_FORMAT)
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&row.updated_at, config::TIMESTAMP_FORMAT)
            .unwrap_or_default(),
    })
}

fn query_episodes<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Episode>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_episode_row)?;

    let mut episodes = Vec::new();
    for row in rows {
        episodes.push(episode_from_row(row?)?);
    }
    Ok(episodes)
}
