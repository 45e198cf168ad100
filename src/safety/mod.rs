//! Emergency detection / escalation path.

pub mod escalation;
pub mod keywords;

pub use escalation::{check_emergency, EmergencyAlert};
