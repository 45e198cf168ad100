use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ExternalTriageLevel, ForWhom, MessageRole};

/// One bounded symptom-inquiry conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: Uuid,
    /// Short human label derived from the opening symptom text.
    pub title: String,
    pub for_whom: ForWhom,
    /// Required when `for_whom` is a family member.
    pub relationship: Option<String>,
    /// Age in years; drives triage sensitivity.
    pub age: Option<u32>,
    /// External level, null until classified.
    pub triage_level: Option<ExternalTriageLevel>,
    pub last_message_snippet: Option<String>,
    pub message_count: u32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Episode {
    /// Subject context handed to the classifier, follow-up engine and
    /// emergency detector.
    pub fn subject_context(&self) -> SubjectContext {
        SubjectContext {
            for_whom: self.for_whom,
            age: self.age,
            relationship: self.relationship.clone(),
        }
    }
}

/// One transcript turn. Exclusively owned by its episode; `seq` defines
/// strict append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub episode_id: Uuid,
    pub seq: u32,
    pub role: MessageRole,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

/// Who the conversation is about, as seen by the reasoning components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectContext {
    pub for_whom: ForWhom,
    pub age: Option<u32>,
    pub relationship: Option<String>,
}

impl SubjectContext {
    pub fn self_adult() -> Self {
        Self {
            for_whom: ForWhom::Myself,
            age: None,
            relationship: None,
        }
    }

    pub fn is_family_member(&self) -> bool {
        self.for_whom == ForWhom::FamilyMember
    }
}

/// Partial update for episode metadata. `None` fields are left as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeUpdate {
    pub title: Option<String>,
    pub for_whom: Option<ForWhom>,
    pub relationship: Option<String>,
    pub age: Option<u32>,
}
