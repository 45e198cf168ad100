use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::config;
use crate::db::DatabaseError;
use crate::models::enums::{FeedbackRating, FeedbackReason};
use crate::models::{FeedbackEntry, ReasonBreakdown};

pub fn insert_feedback(conn: &Connection, entry: &FeedbackEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO feedback (id, episode_id, message_id, rating, reason,
         custom_reason, message_snippet, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id.to_string(),
            entry.episode_id.to_string(),
            entry.message_id.to_string(),
            entry.rating.as_str(),
            entry.reason.map(|r| r.as_str()),
            entry.custom_reason,
            entry.message_snippet,
            entry.created_at.format(config::TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Boolean rated check — by design not a count: repeated submissions
/// for the same message still read as "rated" exactly once.
pub fn has_rated_message(conn: &Connection, message_id: &Uuid) -> Result<bool, DatabaseError> {
    let rated: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM feedback WHERE message_id = ?1)",
        params![message_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(rated)
}

/// All feedback for an episode, newest first. Works for deleted
/// episodes too — entries are historical records.
pub fn get_feedback_for_episode(
    conn: &Connection,
    episode_id: &Uuid,
) -> Result<Vec<FeedbackEntry>, DatabaseError> {
    query_feedback(
        conn,
        &format!("{SELECT_FEEDBACK} WHERE episode_id = ?1 ORDER BY created_at DESC, id"),
        params![episode_id.to_string()],
    )
}

pub fn get_recent_feedback(conn: &Connection, limit: u32) -> Result<Vec<FeedbackEntry>, DatabaseError> {
    query_feedback(
        conn,
        &format!("{SELECT_FEEDBACK} ORDER BY created_at DESC, id LIMIT ?1"),
        params![limit],
    )
}

pub fn get_all_feedback(conn: &Connection) -> Result<Vec<FeedbackEntry>, DatabaseError> {
    query_feedback(conn, &format!("{SELECT_FEEDBACK} ORDER BY created_at DESC, id"), [])
}

/// (total, helpful) counts in one pass.
pub fn rating_counts(conn: &Connection) -> Result<(u32, u32), DatabaseError> {
    let counts = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN rating = 'helpful' THEN 1 ELSE 0 END), 0)
         FROM feedback",
        [],
        |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
    )?;
    Ok(counts)
}

pub fn reason_breakdown(conn: &Connection) -> Result<ReasonBreakdown, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT reason, COUNT(*) FROM feedback WHERE reason IS NOT NULL GROUP BY reason")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
    })?;

    let mut breakdown = ReasonBreakdown::default();
    for row in rows {
        let (reason, count) = row?;
        breakdown.add(FeedbackReason::from_str(&reason)?, count);
    }
    Ok(breakdown)
}

/// Destructive reset, intended for test/operator tooling only.
pub fn clear_all_feedback(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM feedback", [])?;
    Ok(())
}

// ── Row mapping ─────────────────────────────────────────────

const SELECT_FEEDBACK: &str =
    "SELECT id, episode_id, message_id, rating, reason, custom_reason, message_snippet, created_at
     FROM feedback";

struct FeedbackRow {
    id: String,
    episode_id: String,
    message_id: String,
    rating: String,
    reason: Option<String>,
    custom_reason: Option<String>,
    message_snippet: Option<String>,
    created_at: String,
}

fn feedback_from_row(row: FeedbackRow) -> Result<FeedbackEntry, DatabaseError> {
    Ok(FeedbackEntry {
        id: Uuid::parse_str(&row.id).map_err(|_| DatabaseError::InvalidEnum {
            field: "feedback.id".into(),
            value: row.id.clone(),
        })?,
        episode_id: Uuid::parse_str(&row.episode_id).unwrap_or_default(),
        message_id: Uuid::parse_str(&row.message_id).unwrap_or_default(),
        rating: FeedbackRating::from_str(&row.rating)?,
        reason: row.reason.as_deref().map(FeedbackReason::from_str).transpose()?,
        custom_reason: row.custom_reason,
        message_snippet: row.message_snippet,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, config::TIMESTAMP_FORMAT)
            .unwrap_or_default(),
    })
}

fn query_feedback<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<FeedbackEntry>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok(FeedbackRow {
            id: row.get(0)?,
            episode_id: row.get(1)?,
            message_id: row.get(2)?,
            rating: row.get(3)?,
            reason: row.get(4)?,
            custom_reason: row.get(5)?,
            message_snippet: row.get(6)?,
            created_at: row.get(7)?,
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(feedback_from_row(row?)?);
    }
    Ok(entries)
}
