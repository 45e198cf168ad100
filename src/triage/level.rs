//! Internal → external triage level mapping.
//!
//! The match is exhaustive with no wildcard arm on purpose: a new
//! internal level cannot compile until someone classifies it into one
//! of the four external buckets. A silent default here would be an
//! under-triage hazard, not a convenience.

use crate::models::enums::{ExternalTriageLevel, InternalTriageLevel};

/// Total, pure, idempotent mapping to the user-facing vocabulary.
///
/// `non_urgent` and `monitor` both collapse to `self_care`: from the
/// user's perspective, both mean "no urgent action, just watch it".
pub fn map_to_external(level: InternalTriageLevel) -> ExternalTriageLevel {
    match level {
        InternalTriageLevel::Emergency => ExternalTriageLevel::Emergency,
        InternalTriageLevel::Urgent => ExternalTriageLevel::Urgent,
        InternalTriageLevel::Soon => ExternalTriageLevel::Soon,
        InternalTriageLevel::NonUrgent
        | InternalTriageLevel::Monitor
        | InternalTriageLevel::SelfCare => ExternalTriageLevel::SelfCare,
    }
}

impl From<InternalTriageLevel> for ExternalTriageLevel {
    fn from(level: InternalTriageLevel) -> Self {
        map_to_external(level)
    }
}

impl ExternalTriageLevel {
    /// Calm, plain-language recommendation for this level. Tone is
    /// fixed: never alarming, never falsely certain.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Emergency => {
                "This sounds like it needs emergency care right now. Please contact \
                 emergency services — getting help quickly matters more than anything \
                 else at this moment."
            }
            Self::Urgent => {
                "Based on what you've shared, it would be best to be seen by a \
                 clinician today. An urgent-care visit or a same-day appointment is a \
                 reasonable next step."
            }
            Self::Soon => {
                "This doesn't look like an emergency, but it's worth having it checked. \
                 Try to book an appointment in the next day or two, and reach out \
                 sooner if anything changes."
            }
            Self::SelfCare => {
                "From what you've described, this sounds like something you can look \
                 after at home for now. Rest, fluids, and keeping an eye on it are \
                 sensible. If it gets worse or doesn't improve, check back in or see a \
                 clinician."
            }
        }
    }
}
