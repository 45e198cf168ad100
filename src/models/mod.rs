pub mod enums;
pub mod episode;
pub mod feedback;
pub mod memory;

pub use episode::{Episode, EpisodeUpdate, Message, SubjectContext};
pub use feedback::{FeedbackEntry, FeedbackInput, FeedbackSummary, ReasonBreakdown};
pub use memory::{MemoryCandidate, UserMemory};
