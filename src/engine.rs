//! Turn orchestration for the health-buddy conversation.
//!
//! Control flow per user turn: append → emergency screen → follow-up
//! decision → classification → composed reply. Emergency detection is a
//! cancellation signal for the rest of the turn: once it fires, the
//! follow-up engine is not consulted and the external level is pinned
//! to `emergency`, regardless of what the classifier would say.

use std::path::Path;

use rusqlite::Connection;
use uuid::Uuid;

use crate::db;
use crate::episodes::EpisodeStore;
use crate::error::EngineError;
use crate::followup::{self, FollowUpPlan};
use crate::models::enums::{
    ExternalTriageLevel, ForWhom, InternalTriageLevel, MessageRole,
};
use crate::models::{Episode, Message};
use crate::safety::{self, EmergencyAlert};
use crate::session::Session;
use crate::triage::{map_to_external, KeywordClassifier, TriageClassifier};

/// What a completed turn produced. The escalated variant is control
/// flow, not an error: callers render the escalation UI instead of a
/// routine answer.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Emergency detected (or reinforced); interview is over.
    Escalated { alert: EmergencyAlert, message: Message },
    /// More information needed; the questions were appended as the
    /// assistant turn.
    NeedsInfo { questions: Vec<String>, message: Message },
    /// Interview complete; urgency assessed and a recommendation
    /// composed.
    Assessed {
        internal: InternalTriageLevel,
        external: ExternalTriageLevel,
        message: Message,
    },
}

/// The conversation engine. Owns the database connection, the
/// session's active-episode pointer, and the pluggable triage
/// judgment.
pub struct Engine {
    conn: Connection,
    session: Session,
    classifier: Box<dyn TriageClassifier>,
}

impl Engine {
    /// Open with the default rule-based classifier.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        Ok(Self::with_classifier(db::open_database(path)?, Box::new(KeywordClassifier)))
    }

    /// In-memory engine, used in tests and previews.
    pub fn in_memory() -> Result<Self, EngineError> {
        Ok(Self::with_classifier(db::open_memory_database()?, Box::new(KeywordClassifier)))
    }

    pub fn with_classifier(conn: Connection, classifier: Box<dyn TriageClassifier>) -> Self {
        Self {
            conn,
            session: Session::new(),
            classifier,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Start an episode from an opening symptom description and run the
    /// first interview turn on it.
    pub fn start_episode(
        &mut self,
        symptom_text: &str,
        for_whom: ForWhom,
        age: Option<u32>,
        relationship: Option<&str>,
    ) -> Result<(Episode, TurnOutcome), EngineError> {
        let episode = EpisodeStore::new(&self.conn).start_episode(
            &mut self.session,
            symptom_text,
            for_whom,
            age,
            relationship,
        )?;
        let outcome = self.run_turn(episode.id, symptom_text)?;
        let episode = self
            .get_episode(episode.id)?
            .ok_or_else(|| db::DatabaseError::not_found("Episode", episode.id))?;
        Ok((episode, outcome))
    }

    /// Append a user message and produce the assistant's turn.
    pub fn handle_user_message(
        &mut self,
        episode_id: Uuid,
        text: &str,
    ) -> Result<TurnOutcome, EngineError> {
        EpisodeStore::new(&self.conn).add_message(episode_id, MessageRole::User, text)?;
        self.run_turn(episode_id, text)
    }

    fn run_turn(&mut self, episode_id: Uuid, latest_user_text: &str) -> Result<TurnOutcome, EngineError> {
        let store = EpisodeStore::new(&self.conn);
        let episode = store
            .get_episode(episode_id)?
            .ok_or_else(|| db::DatabaseError::not_found("Episode", episode_id))?;
        let ctx = episode.subject_context();

        // An episode already escalated only gets reinforcement turns.
        if episode.triage_level == Some(ExternalTriageLevel::Emergency) {
            let alert = EmergencyAlert::reinforcement();
            let message =
                store.add_message(episode_id, MessageRole::Assistant, &alert.full_text())?;
            return Ok(TurnOutcome::Escalated { alert, message });
        }

        // Emergency screen comes first and wins over everything else.
        if let Some(alert) = safety::check_emergency(latest_user_text, &ctx) {
            store.set_triage_level(episode_id, ExternalTriageLevel::Emergency)?;
            let message =
                store.add_message(episode_id, MessageRole::Assistant, &alert.full_text())?;
            return Ok(TurnOutcome::Escalated { alert, message });
        }

        let transcript = store.get_messages(episode_id)?;
        if let FollowUpPlan::Ask(questions) = followup::next_questions(&transcript, &ctx) {
            let text = questions.join(" ");
            let message = store.add_message(episode_id, MessageRole::Assistant, &text)?;
            return Ok(TurnOutcome::NeedsInfo { questions, message });
        }

        let internal = self.classifier.classify(&transcript, &ctx);
        let external = map_to_external(internal);
        store.set_triage_level(episode_id, external)?;
        let message =
            store.add_message(episode_id, MessageRole::Assistant, external.guidance())?;
        tracing::info!(
            episode_id = %episode_id,
            internal = internal.as_str(),
            external = external.as_str(),
            "Episode assessed"
        );
        Ok(TurnOutcome::Assessed { internal, external, message })
    }

    // ── Lifecycle & reads (session threading) ─────────────

    pub fn close_episode(&mut self, episode_id: Uuid) -> Result<(), EngineError> {
        EpisodeStore::new(&self.conn).close_episode(&mut self.session, episode_id)
    }

    pub fn resume_episode(&mut self, episode_id: Uuid) -> Result<(), EngineError> {
        EpisodeStore::new(&self.conn).resume_episode(&mut self.session, episode_id)
    }

    pub fn delete_episode(&mut self, episode_id: Uuid) -> Result<(), EngineError> {
        EpisodeStore::new(&self.conn).delete_episode(&mut self.session, episode_id)
    }

    pub fn get_episode(&self, episode_id: Uuid) -> Result<Option<Episode>, EngineError> {
        EpisodeStore::new(&self.conn).get_episode(episode_id)
    }

    pub fn get_messages(&self, episode_id: Uuid) -> Result<Vec<Message>, EngineError> {
        EpisodeStore::new(&self.conn).get_messages(episode_id)
    }

    pub fn get_active_episode(&self) -> Result<Option<Episode>, EngineError> {
        EpisodeStore::new(&self.conn).get_active_episode(&self.session)
    }

    pub fn get_recent_episodes(&self, limit: u32) -> Result<Vec<Episode>, EngineError> {
        EpisodeStore::new(&self.conn).get_recent_episodes(limit)
    }
}
