use thiserror::Error;

use crate::db::DatabaseError;

/// Engine-level failures. Safety escalation is deliberately NOT here:
/// it is control flow (a distinct turn outcome), not an error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Rejected before any state mutation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(e))
    }
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
