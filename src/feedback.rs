//! Feedback aggregator: per-message ratings and derived quality
//! signals.

use chrono::Local;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::config;
use crate::db::repository::feedback as feedback_repo;
use crate::error::EngineError;
use crate::models::enums::{FeedbackRating, FeedbackReason};
use crate::models::{FeedbackEntry, FeedbackInput, FeedbackSummary};

/// Record a rating for an assistant message.
///
/// Entries append freely — the data model keeps every submission as an
/// audit record — while the rated check stays boolean. Snippets and
/// custom reasons are truncated so no unbounded free text is persisted.
pub fn submit_feedback(conn: &Connection, input: FeedbackInput) -> Result<FeedbackEntry, EngineError> {
    if input.rating == FeedbackRating::Helpful && input.reason.is_some() {
        return Err(EngineError::invalid("reasons only accompany not_helpful ratings"));
    }
    if input.custom_reason.is_some() && input.reason != Some(FeedbackReason::Other) {
        return Err(EngineError::invalid("custom reason requires reason 'other'"));
    }

    let entry = FeedbackEntry {
        id: Uuid::new_v4(),
        episode_id: input.episode_id,
        message_id: input.message_id,
        rating: input.rating,
        reason: input.reason,
        custom_reason: input
            .custom_reason
            .map(|r| config::truncate_chars(&r, config::SNIPPET_MAX_LEN)),
        message_snippet: input
            .snippet
            .map(|s| config::truncate_chars(&s, config::SNIPPET_MAX_LEN)),
        created_at: Local::now().naive_local(),
    };
    feedback_repo::insert_feedback(conn, &entry)?;
    Ok(entry)
}

pub fn has_rated_message(conn: &Connection, message_id: Uuid) -> Result<bool, EngineError> {
    Ok(feedback_repo::has_rated_message(conn, &message_id)?)
}

/// Aggregate quality signals. helpful_percentage is 0 when there is no
/// feedback at all — never a division by zero.
pub fn feedback_summary(conn: &Connection) -> Result<FeedbackSummary, EngineError> {
    let (total, helpful) = feedback_repo::rating_counts(conn)?;
    let helpful_percentage = if total == 0 {
        0
    } else {
        ((helpful as f64 / total as f64) * 100.0).round() as u8
    };

    Ok(FeedbackSummary {
        total_feedback: total,
        helpful_count: helpful,
        not_helpful_count: total - helpful,
        helpful_percentage,
        reason_breakdown: feedback_repo::reason_breakdown(conn)?,
        recent_feedback: feedback_repo::get_recent_feedback(
            conn,
            config::RECENT_FEEDBACK_LIMIT as u32,
        )?,
    })
}

/// Feedback for one episode, newest first. Deleted episodes keep their
/// feedback: entries are historical records, not owned by the episode.
pub fn feedback_for_episode(conn: &Connection, episode_id: Uuid) -> Result<Vec<FeedbackEntry>, EngineError> {
    Ok(feedback_repo::get_feedback_for_episode(conn, &episode_id)?)
}

pub fn recent_feedback(conn: &Connection, limit: u32) -> Result<Vec<FeedbackEntry>, EngineError> {
    Ok(feedback_repo::get_recent_feedback(conn, limit)?)
}

/// Export document: `{exportedAt, summary, entries}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackExport {
    exported_at: String,
    summary: FeedbackSummary,
    entries: Vec<FeedbackEntry>,
}

pub fn export_feedback_json(conn: &Connection) -> Result<String, EngineError> {
    let export = FeedbackExport {
        exported_at: Local::now()
            .naive_local()
            .format(config::TIMESTAMP_FORMAT)
            .to_string(),
        summary: feedback_summary(conn)?,
        entries: feedback_repo::get_all_feedback(conn)?,
    };
    serde_json::to_string_pretty(&export)
        .map_err(|e| EngineError::invalid(format!("feedback export serialization: {e}")))
}

/// Destructive reset for test/operator tooling.
pub fn clear_all_feedback(conn: &Connection) -> Result<(), EngineError> {
    tracing::warn!("Clearing all feedback entries");
    Ok(feedback_repo::clear_all_feedback(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    fn input(rating: FeedbackRating, reason: Option<FeedbackReason>) -> FeedbackInput {
        FeedbackInput {
            episode_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            rating,
            reason,
            custom_reason: None,
            snippet: Some("Based on what you've shared, it would be best to…".into()),
        }
    }

    #[test]
    fn submit_marks_message_rated() {
        let conn = open_memory_database().unwrap();
        let fb = input(FeedbackRating::Helpful, None);
        let message_id = fb.message_id;

        assert!(!has_rated_message(&conn, message_id).unwrap());
        submit_feedback(&conn, fb).unwrap();
        assert!(has_rated_message(&conn, message_id).unwrap());
    }

    #[test]
    fn rated_check_stays_boolean_across_duplicates() {
        let conn = open_memory_database().unwrap();
        let fb = input(FeedbackRating::Helpful, None);
        let message_id = fb.message_id;

        submit_feedback(&conn, fb.clone()).unwrap();
        submit_feedback(&conn, fb).unwrap();

        assert!(has_rated_message(&conn, message_id).unwrap());
        // Both entries are kept as audit records.
        assert_eq!(feedback_summary(&conn).unwrap().total_feedback, 2);
    }

    #[test]
    fn empty_summary_has_zero_percentage() {
        let conn = open_memory_database().unwrap();
        let summary = feedback_summary(&conn).unwrap();
        assert_eq!(summary.total_feedback, 0);
        assert_eq!(summary.helpful_percentage, 0);
    }

    #[test]
    fn percentage_is_rounded() {
        let conn = open_memory_database().unwrap();
        submit_feedback(&conn, input(FeedbackRating::Helpful, None)).unwrap();
        submit_feedback(&conn, input(FeedbackRating::Helpful, None)).unwrap();
        submit_feedback(&conn, input(FeedbackRating::NotHelpful, Some(FeedbackReason::TooLong))).unwrap();

        let summary = feedback_summary(&conn).unwrap();
        // 2/3 → 66.67 → 67
        assert_eq!(summary.helpful_percentage, 67);
        assert_eq!(summary.helpful_count, 2);
        assert_eq!(summary.not_helpful_count, 1);
    }

    #[test]
    fn reason_breakdown_counts_per_variant() {
        let conn = open_memory_database().unwrap();
        submit_feedback(&conn, input(FeedbackRating::NotHelpful, Some(FeedbackReason::TooLong))).unwrap();
        submit_feedback(&conn, input(FeedbackRating::NotHelpful, Some(FeedbackReason::TooLong))).unwrap();
        submit_feedback(&conn, input(FeedbackRating::NotHelpful, Some(FeedbackReason::FeltUnsafe))).unwrap();

        let breakdown = feedback_summary(&conn).unwrap().reason_breakdown;
        assert_eq!(breakdown.too_long, 2);
        assert_eq!(breakdown.felt_unsafe, 1);
        assert_eq!(breakdown.didnt_answer, 0);
        assert_eq!(breakdown.other, 0);
    }

    #[test]
    fn helpful_rating_rejects_a_reason() {
        let conn = open_memory_database().unwrap();
        let result = submit_feedback(&conn, input(FeedbackRating::Helpful, Some(FeedbackReason::TooLong)));
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn custom_reason_requires_other() {
        let conn = open_memory_database().unwrap();
        let mut fb = input(FeedbackRating::NotHelpful, Some(FeedbackReason::TooLong));
        fb.custom_reason = Some("rambling".into());
        assert!(submit_feedback(&conn, fb).is_err());

        let mut fb = input(FeedbackRating::NotHelpful, Some(FeedbackReason::Other));
        fb.custom_reason = Some("rambling".into());
        assert!(submit_feedback(&conn, fb).is_ok());
    }

    #[test]
    fn snippet_is_truncated() {
        let conn = open_memory_database().unwrap();
        let mut fb = input(FeedbackRating::Helpful, None);
        fb.snippet = Some("x".repeat(500));

        let entry = submit_feedback(&conn, fb).unwrap();
        let snippet = entry.message_snippet.unwrap();
        assert!(snippet.chars().count() <= crate::config::SNIPPET_MAX_LEN);
    }

    #[test]
    fn feedback_for_episode_filters_and_sorts() {
        let conn = open_memory_database().unwrap();
        let episode_id = Uuid::new_v4();

        let mut a = input(FeedbackRating::Helpful, None);
        a.episode_id = episode_id;
        submit_feedback(&conn, a).unwrap();
        submit_feedback(&conn, input(FeedbackRating::Helpful, None)).unwrap();

        let entries = feedback_for_episode(&conn, episode_id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].episode_id, episode_id);
    }

    #[test]
    fn export_has_contract_fields() {
        let conn = open_memory_database().unwrap();
        submit_feedback(&conn, input(FeedbackRating::Helpful, None)).unwrap();

        let json = export_feedback_json(&conn).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("exportedAt").is_some());
        assert!(value.get("summary").is_some());
        assert!(value["entries"].as_array().unwrap().len() == 1);
        assert!(value["summary"].get("helpfulPercentage").is_some());
        assert!(value["summary"]["reasonBreakdown"].get("tooLong").is_some());
    }

    #[test]
    fn clear_removes_everything() {
        let conn = open_memory_database().unwrap();
        submit_feedback(&conn, input(FeedbackRating::Helpful, None)).unwrap();
        clear_all_feedback(&conn).unwrap();
        assert_eq!(feedback_summary(&conn).unwrap().total_feedback, 0);
    }
}
