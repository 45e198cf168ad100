//! Urgency triage: the internal→external level mapping and the
//! pluggable symptom-to-level judgment seam.

pub mod classifier;
pub mod level;

pub use classifier::{KeywordClassifier, TriageClassifier};
pub use level::map_to_external;
