use std::sync::OnceLock;

use regex::Regex;

use crate::models::enums::{InternalTriageLevel, MessageRole};
use crate::models::{Message, SubjectContext};

/// The symptom-to-level judgment seam. Implementations may be
/// rule-based, model-backed, or human-in-the-loop; the engine only
/// depends on this contract: one internal level per classification
/// call.
pub trait TriageClassifier: Send + Sync {
    fn classify(&self, transcript: &[Message], ctx: &SubjectContext) -> InternalTriageLevel;
}

/// Rule-based default classifier using keyword heuristics over the
/// user's messages. Deliberately conservative: unknown signal lands in
/// the lower tiers, which the emergency detector independently guards.
pub struct KeywordClassifier;

impl TriageClassifier for KeywordClassifier {
    fn classify(&self, transcript: &[Message], ctx: &SubjectContext) -> InternalTriageLevel {
        let text = user_text(transcript);
        let level = base_level(&text);
        let level = bump_for_age(level, ctx);
        tracing::debug!(level = level.as_str(), "Keyword classification");
        level
    }
}

fn user_text(transcript: &[Message]) -> String {
    let mut text = String::new();
    for msg in transcript.iter().filter(|m| m.role == MessageRole::User) {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&msg.text.to_lowercase());
    }
    text
}

fn base_level(text: &str) -> InternalTriageLevel {
    if has_urgent_pattern(text) {
        return InternalTriageLevel::Urgent;
    }
    if let Some(rating) = severity_rating(text) {
        return match rating {
            0..=3 => InternalTriageLevel::SelfCare,
            4..=6 => InternalTriageLevel::NonUrgent,
            _ => InternalTriageLevel::Urgent,
        };
    }
    if has_soon_pattern(text) {
        return InternalTriageLevel::Soon;
    }
    if has_mild_pattern(text) {
        return InternalTriageLevel::SelfCare;
    }
    if has_intermittent_pattern(text) {
        return InternalTriageLevel::Monitor;
    }
    InternalTriageLevel::NonUrgent
}

/// Vulnerable ages (infants and the very old) get one cautious step up
/// for anything below the urgent tier.
fn bump_for_age(level: InternalTriageLevel, ctx: &SubjectContext) -> InternalTriageLevel {
    let vulnerable = matches!(ctx.age, Some(age) if age <= 1 || age >= 75);
    if !vulnerable {
        return level;
    }
    match level {
        InternalTriageLevel::SelfCare
        | InternalTriageLevel::NonUrgent
        | InternalTriageLevel::Monitor => InternalTriageLevel::Soon,
        other => other,
    }
}

fn has_urgent_pattern(text: &str) -> bool {
    let patterns = [
        "chest pain",
        "severe",
        "worst",
        "unbearable",
        "high fever",
        "fever of 103",
        "fever of 104",
        "temperature of 103",
        "temperature of 104",
        "103\u{b0}",
        "104\u{b0}",
        "blood in",
        "coughing up blood",
        "vomiting blood",
        "can't keep anything down",
        "cannot keep anything down",
        "fainted",
        "vision loss",
        "losing vision",
        "dehydrated",
        "spreading fast",
    ];
    patterns.iter().any(|p| text.contains(p))
}

fn has_soon_pattern(text: &str) -> bool {
    let patterns = [
        "getting worse",
        "keeps getting worse",
        "not improving",
        "won't go away",
        "more than a week",
        "over a week",
        "for weeks",
        "persistent",
        "keeps coming back",
        "spreading",
        "swollen",
        "fever",
    ];
    patterns.iter().any(|p| text.contains(p))
}

fn has_mild_pattern(text: &str) -> bool {
    let patterns = ["mild", "slight", "minor", "a little", "barely"];
    patterns.iter().any(|p| text.contains(p))
}

fn has_intermittent_pattern(text: &str) -> bool {
    let patterns = ["comes and goes", "on and off", "now and then", "occasionally"];
    patterns.iter().any(|p| text.contains(p))
}

/// Extract a self-reported "N out of 10" severity rating, if present.
fn severity_rating(text: &str) -> Option<u8> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\b(10|\d)\s*(?:out of|/)\s*10\b").expect("severity regex")
    });
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
