//! Follow-up question engine: decides what to ask next, if anything.
//!
//! Pure transformation from (transcript, subject context) to a list of
//! 0–2 plain-language questions. Holds no state between calls: whether
//! a gap is open is read entirely from the transcript.

use crate::models::enums::{ForWhom, MessageRole};
use crate::models::{Message, SubjectContext};

/// Maximum questions per turn. More than two at once reads as an
/// interrogation rather than a conversation.
const MAX_QUESTIONS_PER_TURN: usize = 2;

/// What the interview needs next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUpPlan {
    /// Enough information gathered; hand over to the classifier.
    Complete,
    /// Ask these (1–2) questions before classifying.
    Ask(Vec<String>),
}

/// Information categories the interview tries to fill, in priority
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    Onset,
    Location,
    Severity,
    AssociatedSymptoms,
    RiskFactors,
}

const GAP_PRIORITY: [Gap; 5] = [
    Gap::Onset,
    Gap::Location,
    Gap::Severity,
    Gap::AssociatedSymptoms,
    Gap::RiskFactors,
];

/// Select the next follow-up questions for this transcript.
///
/// A gap is considered closed when the user's messages already answer
/// it, or when an assistant turn already asked it — a user who skipped
/// a question once is not badgered with it again.
pub fn next_questions(transcript: &[Message], ctx: &SubjectContext) -> FollowUpPlan {
    let user_text = collect_text(transcript, MessageRole::User);
    let asked_text = collect_text(transcript, MessageRole::Assistant);

    let questions: Vec<String> = GAP_PRIORITY
        .iter()
        .filter(|gap| !gap_answered(**gap, &user_text, ctx))
        .map(|gap| question_for(*gap, ctx))
        .filter(|q| !asked_text.contains(&q.to_lowercase()))
        .take(MAX_QUESTIONS_PER_TURN)
        .collect();

    if questions.is_empty() {
        FollowUpPlan::Complete
    } else {
        FollowUpPlan::Ask(questions)
    }
}

fn collect_text(transcript: &[Message], role: MessageRole) -> String {
    let mut text = String::new();
    for msg in transcript.iter().filter(|m| m.role == role) {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&msg.text.to_lowercase());
    }
    text
}

fn gap_answered(gap: Gap, user_text: &str, ctx: &SubjectContext) -> bool {
    match gap {
        Gap::Onset => has_any(
            user_text,
            &[
                "since", "yesterday", "today", "this morning", "last night", "ago",
                "started", "began", "for a few", "for the past", "all week", "woke up",
            ],
        ),
        Gap::Location => {
            has_any(
                user_text,
                &[
                    "head", "forehead", "temple", "eye", "ear", "throat", "neck", "chest",
                    "stomach", "belly", "abdomen", "back", "shoulder", "arm", "hand", "wrist",
                    "hip", "leg", "knee", "ankle", "foot", "skin", "all over",
                ],
            ) || has_any(user_text, &["in my", "on my", "in her", "on her", "in his", "on his", "in their", "on their"])
        }
        Gap::Severity => {
            has_any(
                user_text,
                &["mild", "moderate", "severe", "intense", "slight", "unbearable", "out of 10", "/10"],
            )
        }
        Gap::AssociatedSymptoms => has_any(
            user_text,
            &[
                "also", "as well", "along with", "no other symptom", "nothing else",
                "just the", "only the", "fever", "nausea", "vomit", "dizzy", "rash",
            ],
        ),
        Gap::RiskFactors => {
            // Age on file already answers the age part of the risk
            // picture; text can answer the rest.
            let mentioned = has_any(
                user_text,
                &[
                    "pregnan", "diabet", "blood pressure", "heart condition", "asthma",
                    "chronic", "immune", "otherwise healthy", "no other conditions",
                    "no medical conditions", "no conditions",
                ],
            );
            mentioned || ctx.age.is_some()
        }
    }
}

fn has_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}

/// Plain-language question per gap, phrased for the subject. Family
/// members get neutral "they" wording.
fn question_for(gap: Gap, ctx: &SubjectContext) -> String {
    let family = ctx.for_whom == ForWhom::FamilyMember;
    match gap {
        Gap::Onset => {
            if family {
                "When did this start for them?".into()
            } else {
                "When did this start?".into()
            }
        }
        Gap::Location => {
            if family {
                "Where on their body is it bothering them?".into()
            } else {
                "Where exactly do you feel it?".into()
            }
        }
        Gap::Severity => {
            if family {
                "How bad does it seem for them, on a scale of 1 to 10?".into()
            } else {
                "How bad is it for you, on a scale of 1 to 10?".into()
            }
        }
        Gap::AssociatedSymptoms => {
            if family {
                "Have they had any other symptoms along with this?".into()
            } else {
                "Have you noticed any other symptoms along with this?".into()
            }
        }
        Gap::RiskFactors => {
            if family {
                "Do they have any ongoing health conditions I should know about?".into()
            } else {
                "Do you have any ongoing health conditions, or is there any chance of pregnancy?".into()
            }
        }
    }
}
