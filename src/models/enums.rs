use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
});

str_enum!(ForWhom {
    Myself => "self",
    FamilyMember => "family_member",
});

/// Fine-grained urgency classification used for internal reasoning.
/// Never shown to users directly — see [`ExternalTriageLevel`].
str_enum!(InternalTriageLevel {
    Emergency => "emergency",
    Urgent => "urgent",
    Soon => "soon",
    NonUrgent => "non_urgent",
    Monitor => "monitor",
    SelfCare => "self_care",
});

/// The restricted urgency vocabulary surfaced to users. Narrower than
/// the internal scale on purpose: overly granular labels read as false
/// reassurance.
str_enum!(ExternalTriageLevel {
    Emergency => "emergency",
    Urgent => "urgent",
    Soon => "soon",
    SelfCare => "self_care",
});

str_enum!(FeedbackRating {
    Helpful => "helpful",
    NotHelpful => "not_helpful",
});

str_enum!(FeedbackReason {
    TooLong => "too_long",
    DidntAnswer => "didnt_answer",
    FeltUnsafe => "felt_unsafe",
    Other => "other",
});

str_enum!(MemoryCategory {
    Allergy => "allergy",
    Condition => "condition",
    Medication => "medication",
    Preference => "preference",
    Trigger => "trigger",
});

str_enum!(MemoryConfidence {
    Low => "low",
    Medium => "medium",
    High => "high",
});
