//! Emergency detection and the escalation path.
//!
//! Fires on the user's MESSAGE, never on classifier output — the
//! classifier is not trusted for emergency triage. A positive detection
//! short-circuits the interview: no follow-up questions, external level
//! pinned to `emergency`, and every later assistant turn in the episode
//! only reinforces the call-to-action.
//!
//! Rules are checked in registry order; first match wins. Message tone
//! is fixed: calm and de-escalating, with a direct emergency-services
//! contact step.

use serde::Serialize;

use super::keywords::*;
use crate::config;
use crate::models::SubjectContext;

/// Result of a positive emergency detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyAlert {
    /// Which rule fired, for the audit trail.
    pub rule_id: &'static str,
    /// Calm, fixed-tone explanation shown to the user.
    pub message: String,
    /// Direct emergency-services contact step.
    pub call_to_action: String,
}

impl EmergencyAlert {
    /// Reinforcement turn for an episode already in the escalated
    /// state: repeats the call-to-action without restarting the
    /// interview.
    pub fn reinforcement() -> Self {
        Self {
            rule_id: "RED-REPEAT",
            message: "I hear you. The most important thing right now is still to get \
                      emergency help — everything else can wait."
                .into(),
            call_to_action: config::EMERGENCY_CALL_TO_ACTION.into(),
        }
    }

    /// Full escalation text as one assistant message.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.message, self.call_to_action)
    }
}

/// Condition under which a red-flag rule fires.
enum RedFlagCondition {
    /// Message contains any keyword.
    AnyKeyword { keywords: &'static [&'static str] },
    /// Message contains a keyword from BOTH sets.
    PairedKeywords {
        first: &'static [&'static str],
        second: &'static [&'static str],
    },
    /// Subject at or below the age threshold AND any keyword.
    AgeAtMostWithKeyword {
        max_age_years: u32,
        keywords: &'static [&'static str],
    },
}

struct RedFlagRule {
    /// Unique identifier for the audit trail.
    id: &'static str,
    condition: RedFlagCondition,
    /// Fixed user-facing message.
    message: &'static str,
}

/// Registry, most specific first. Every rule is emergency severity by
/// definition; anything softer belongs to the classifier, not here.
fn rules() -> Vec<RedFlagRule> {
    vec![
        RedFlagRule {
            id: "RED-001",
            condition: RedFlagCondition::PairedKeywords {
                first: CHEST_PAIN_KEYWORDS,
                second: BREATHING_KEYWORDS,
            },
            message: "Chest pain together with trouble breathing needs to be checked \
                      by emergency services straight away. Please stop here and get \
                      help now.",
        },
        RedFlagRule {
            id: "RED-002",
            condition: RedFlagCondition::AnyKeyword {
                keywords: BREATHING_DISTRESS_KEYWORDS,
            },
            message: "Serious trouble breathing needs immediate medical help.",
        },
        RedFlagRule {
            id: "RED-003",
            condition: RedFlagCondition::AnyKeyword {
                keywords: STROKE_KEYWORDS,
            },
            message: "Sudden weakness, face drooping, or slurred speech can be signs \
                      of a stroke, where every minute counts.",
        },
        RedFlagRule {
            id: "RED-004",
            condition: RedFlagCondition::AnyKeyword {
                keywords: ANAPHYLAXIS_KEYWORDS,
            },
            message: "Swelling of the throat or tongue can be a severe allergic \
                      reaction that needs treatment right away.",
        },
        RedFlagRule {
            id: "RED-005",
            condition: RedFlagCondition::AnyKeyword {
                keywords: UNRESPONSIVE_KEYWORDS,
            },
            message: "Someone who is unresponsive or can't be woken needs emergency \
                      help immediately.",
        },
        RedFlagRule {
            id: "RED-006",
            condition: RedFlagCondition::AnyKeyword {
                keywords: SEIZURE_KEYWORDS,
            },
            message: "A seizure needs immediate medical attention. Keep the person on \
                      their side and don't put anything in their mouth.",
        },
        RedFlagRule {
            id: "RED-007",
            condition: RedFlagCondition::AnyKeyword {
                keywords: BLEEDING_KEYWORDS,
            },
            message: "Bleeding that won't stop needs emergency care. Keep firm \
                      pressure on the wound while you get help.",
        },
        RedFlagRule {
            id: "RED-008",
            condition: RedFlagCondition::AnyKeyword {
                keywords: SELF_HARM_KEYWORDS,
            },
            message: "I'm really glad you told me. You deserve support right now, and \
                      there are people ready to help immediately.",
        },
        RedFlagRule {
            id: "RED-009",
            condition: RedFlagCondition::AgeAtMostWithKeyword {
                max_age_years: 0,
                keywords: FEVER_KEYWORDS,
            },
            message: "In a baby under one year, any fever should be treated as an \
                      emergency until a clinician says otherwise.",
        },
    ]
}

/// Screen a user message for emergency signal. First matching rule
/// wins; `None` means the normal interview flow continues.
pub fn check_emergency(text: &str, ctx: &SubjectContext) -> Option<EmergencyAlert> {
    let lower = text.to_lowercase();

    for rule in &rules() {
        if rule.condition.matches(&lower, ctx) {
            tracing::warn!(rule_id = rule.id, "Emergency rule fired");
            return Some(EmergencyAlert {
                rule_id: rule.id,
                message: rule.message.into(),
                call_to_action: config::EMERGENCY_CALL_TO_ACTION.into(),
            });
        }
    }

    None
}

impl RedFlagCondition {
    fn matches(&self, lower: &str, ctx: &SubjectContext) -> bool {
        match self {
            Self::AnyKeyword { keywords } => contains_any(lower, keywords),
            Self::PairedKeywords { first, second } => {
                contains_any(lower, first) && contains_any(lower, second)
            }
            Self::AgeAtMostWithKeyword { max_age_years, keywords } => {
                let Some(age) = ctx.age else { return false };
                age <= *max_age_years && contains_any(lower, keywords)
            }
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}
