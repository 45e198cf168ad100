use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{FeedbackRating, FeedbackReason};

/// A user's judgment on one assistant message.
///
/// Field names serialize camelCase: feedback entries travel in the JSON
/// export document, which is an external contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub episode_id: Uuid,
    pub message_id: Uuid,
    pub rating: FeedbackRating,
    pub reason: Option<FeedbackReason>,
    pub custom_reason: Option<String>,
    /// Truncated snippet of the rated message.
    pub message_snippet: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input for submitting feedback on an assistant message.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackInput {
    pub episode_id: Uuid,
    pub message_id: Uuid,
    pub rating: FeedbackRating,
    pub reason: Option<FeedbackReason>,
    pub custom_reason: Option<String>,
    pub snippet: Option<String>,
}

/// Aggregated quality signals over all recorded feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub total_feedback: u32,
    pub helpful_count: u32,
    pub not_helpful_count: u32,
    /// round(helpful / total * 100); 0 when there is no feedback.
    pub helpful_percentage: u8,
    pub reason_breakdown: ReasonBreakdown,
    /// Newest first.
    pub recent_feedback: Vec<FeedbackEntry>,
}

/// One counter per negative-feedback reason. A fixed struct rather than
/// a string-keyed map, so a new reason variant is a compile-time-checked
/// change everywhere it is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonBreakdown {
    pub too_long: u32,
    pub didnt_answer: u32,
    pub felt_unsafe: u32,
    pub other: u32,
}

impl ReasonBreakdown {
    pub fn add(&mut self, reason: FeedbackReason, count: u32) {
        match reason {
            FeedbackReason::TooLong => self.too_long += count,
            FeedbackReason::DidntAnswer => self.didnt_answer += count,
            FeedbackReason::FeltUnsafe => self.felt_unsafe += count,
            FeedbackReason::Other => self.other += count,
        }
    }
}
