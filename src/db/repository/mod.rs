pub mod episode;
pub mod feedback;
pub mod memory;
pub mod message;
