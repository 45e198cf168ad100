//! Local-first conversation engine for everyday health questions.
//!
//! Everything runs on-device against a single SQLite file: symptom
//! conversations are grouped into episodes, each turn is screened for
//! emergency red flags before anything else, a short follow-up
//! interview fills information gaps, and a rule-based classifier
//! assigns an urgency level that is mapped into a small user-facing
//! vocabulary. Durable facts about the user are extracted as
//! candidates but persisted only after explicit approval.
//!
//! The [`engine::Engine`] facade ties the pieces together; each layer
//! underneath is usable on its own against a [`rusqlite::Connection`].

pub mod config;
pub mod db;
pub mod engine;
pub mod episodes;
pub mod error;
pub mod feedback;
pub mod followup;
pub mod memory;
pub mod models;
pub mod safety;
pub mod session;
pub mod triage;

pub use engine::{Engine, TurnOutcome};
pub use error::EngineError;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. Filter comes from
/// `RUST_LOG`, falling back to the crate default. Safe to call once at
/// startup; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    let _ = fmt().with_env_filter(filter).try_init();
}
