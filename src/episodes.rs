//! Episode/message store: owns the conversation transcript and episode
//! metadata lifecycle.
//!
//! Lifecycle: created(active) → [closed ⇄ resumed] → deleted. At most
//! one episode is active per [`Session`]; starting a new one simply
//! displaces the pointer.

use chrono::Local;
use rusqlite::Connection;
use uuid::Uuid;

use crate::config;
use crate::db::repository::{episode as episode_repo, message as message_repo};
use crate::error::EngineError;
use crate::models::enums::{ExternalTriageLevel, ForWhom, MessageRole};
use crate::models::{Episode, EpisodeUpdate, Message};
use crate::session::Session;

/// Oldest verified human age, used as the validation ceiling.
const MAX_AGE_YEARS: u32 = 130;

/// Manages episode lifecycle and transcript persistence.
pub struct EpisodeStore<'a> {
    conn: &'a Connection,
}

impl<'a> EpisodeStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Start a new episode from an opening symptom description.
    ///
    /// Creates the episode and its first user message atomically, and
    /// makes the new episode the session's active one.
    pub fn start_episode(
        &self,
        session: &mut Session,
        symptom_text: &str,
        for_whom: ForWhom,
        age: Option<u32>,
        relationship: Option<&str>,
    ) -> Result<Episode, EngineError> {
        let symptom_text = symptom_text.trim();
        if symptom_text.is_empty() {
            return Err(EngineError::invalid("symptom text must not be empty"));
        }
        validate_age(age)?;
        if for_whom == ForWhom::FamilyMember && (relationship.is_none() || age.is_none()) {
            return Err(EngineError::invalid(
                "family member episodes require relationship and age",
            ));
        }

        let now = Local::now().naive_local();
        let episode = Episode {
            id: Uuid::new_v4(),
            title: derive_title(symptom_text),
            for_whom,
            relationship: relationship.map(|r| r.to_string()),
            age,
            triage_level: None,
            last_message_snippet: Some(config::truncate_chars(symptom_text, config::SNIPPET_MAX_LEN)),
            message_count: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let opening = Message {
            id: Uuid::new_v4(),
            episode_id: episode.id,
            seq: 0,
            role: MessageRole::User,
            text: symptom_text.to_string(),
            timestamp: now,
        };

        let tx = self.conn.unchecked_transaction().map_err(EngineError::from)?;
        episode_repo::insert_episode(&tx, &episode)?;
        message_repo::insert_message(&tx, &opening)?;
        tx.commit().map_err(EngineError::from)?;

        session.set_active(episode.id);
        tracing::info!(episode_id = %episode.id, "Episode started");
        Ok(episode)
    }

    /// Append a transcript turn. Bumps message_count, refreshes the
    /// last-message snippet and the episode's update timestamp.
    pub fn add_message(
        &self,
        episode_id: Uuid,
        role: MessageRole,
        text: &str,
    ) -> Result<Message, EngineError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::invalid("message text must not be empty"));
        }
        self.require_episode(episode_id)?;

        let now = Local::now().naive_local();
        let msg = Message {
            id: Uuid::new_v4(),
            episode_id,
            seq: message_repo::next_seq(self.conn, &episode_id)?,
            role,
            text: text.to_string(),
            timestamp: now,
        };

        let tx = self.conn.unchecked_transaction().map_err(EngineError::from)?;
        message_repo::insert_message(&tx, &msg)?;
        episode_repo::record_append(
            &tx,
            &episode_id,
            &config::truncate_chars(text, config::SNIPPET_MAX_LEN),
            now,
        )?;
        tx.commit().map_err(EngineError::from)?;

        Ok(msg)
    }

    /// Partial metadata update. The resulting row is validated as a
    /// whole: switching to a family-member subject still requires a
    /// relationship and an age, whether supplied here or already on
    /// file.
    pub fn update_episode(
        &self,
        episode_id: Uuid,
        fields: &EpisodeUpdate,
    ) -> Result<(), EngineError> {
        validate_age(fields.age)?;
        if let Some(ref title) = fields.title {
            if title.trim().is_empty() {
                return Err(EngineError::invalid("title must not be empty"));
            }
        }

        let current = self.require_episode(episode_id)?;
        let for_whom = fields.for_whom.unwrap_or(current.for_whom);
        let relationship = fields.relationship.as_deref().or(current.relationship.as_deref());
        let age = fields.age.or(current.age);
        if for_whom == ForWhom::FamilyMember && (relationship.is_none() || age.is_none()) {
            return Err(EngineError::invalid(
                "family member episodes require relationship and age",
            ));
        }

        let now = Local::now().naive_local();
        episode_repo::update_episode_fields(self.conn, &episode_id, fields, now)?;
        Ok(())
    }

    pub fn set_triage_level(
        &self,
        episode_id: Uuid,
        level: ExternalTriageLevel,
    ) -> Result<(), EngineError> {
        let now = Local::now().naive_local();
        episode_repo::set_triage_level(self.conn, &episode_id, level, now)?;
        Ok(())
    }

    /// Deactivate an episode; clears the session pointer if it pointed
    /// here. Unknown id is NotFound.
    pub fn close_episode(&self, session: &mut Session, episode_id: Uuid) -> Result<(), EngineError> {
        let now = Local::now().naive_local();
        let updated = episode_repo::set_active(self.conn, &episode_id, false, now)?;
        if updated == 0 {
            return Err(crate::db::DatabaseError::not_found("Episode", episode_id).into());
        }
        session.clear_if_active(&episode_id);
        Ok(())
    }

    /// Reactivate an episode and make it the session's active one.
    /// Unknown id is a no-op, not an error, so UI retries stay simple.
    pub fn resume_episode(&self, session: &mut Session, episode_id: Uuid) -> Result<(), EngineError> {
        let now = Local::now().naive_local();
        let updated = episode_repo::set_active(self.conn, &episode_id, true, now)?;
        if updated > 0 {
            session.set_active(episode_id);
        }
        Ok(())
    }

    /// Delete the episode and all of its messages atomically. Feedback
    /// entries survive as historical records.
    pub fn delete_episode(&self, session: &mut Session, episode_id: Uuid) -> Result<(), EngineError> {
        episode_repo::delete_episode(self.conn, &episode_id)?;
        session.clear_if_active(&episode_id);
        tracing::info!(episode_id = %episode_id, "Episode deleted");
        Ok(())
    }

    // ── Reads ─────────────────────────────────────────────

    pub fn get_episode(&self, episode_id: Uuid) -> Result<Option<Episode>, EngineError> {
        Ok(episode_repo::get_episode(self.conn, &episode_id)?)
    }

    /// Empty vec for unknown ids, never an error.
    pub fn get_messages(&self, episode_id: Uuid) -> Result<Vec<Message>, EngineError> {
        Ok(message_repo::get_messages_by_episode(self.conn, &episode_id)?)
    }

    pub fn get_active_episode(&self, session: &Session) -> Result<Option<Episode>, EngineError> {
        match session.active_episode() {
            Some(id) => self.get_episode(id),
            None => Ok(None),
        }
    }

    pub fn get_all_episodes(&self) -> Result<Vec<Episode>, EngineError> {
        Ok(episode_repo::get_all_episodes(self.conn)?)
    }

    /// Newest first by update timestamp.
    pub fn get_recent_episodes(&self, limit: u32) -> Result<Vec<Episode>, EngineError> {
        Ok(episode_repo::get_recent_episodes(self.conn, limit)?)
    }

    fn require_episode(&self, episode_id: Uuid) -> Result<Episode, EngineError> {
        self.get_episode(episode_id)?
            .ok_or_else(|| crate::db::DatabaseError::not_found("Episode", episode_id).into())
    }
}

fn validate_age(age: Option<u32>) -> Result<(), EngineError> {
    if let Some(age) = age {
        if age > MAX_AGE_YEARS {
            return Err(EngineError::invalid(format!("age {age} is out of range")));
        }
    }
    Ok(())
}

/// Short human label from the opening symptom text: first clause,
/// truncated.
fn derive_title(symptom_text: &str) -> String {
    let first_clause = symptom_text
        .split(['.', '!', '?', '\n'])
        .next()
        .unwrap_or(symptom_text)
        .trim();
    config::truncate_chars(first_clause, config::TITLE_MAX_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::error::EngineError;

    fn setup() -> (Connection, Session) {
        (open_memory_database().unwrap(), Session::new())
    }

    // ── start_episode ─────────────────────────────────────

    #[test]
    fn start_creates_episode_and_opening_message() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        let ep = store
            .start_episode(&mut session, "I have a mild headache since yesterday", ForWhom::Myself, None, None)
            .unwrap();

        assert_eq!(ep.message_count, 1);
        assert!(ep.is_active);
        assert!(ep.triage_level.is_none());
        assert_eq!(session.active_episode(), Some(ep.id));

        let messages = store.get_messages(ep.id).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].text, "I have a mild headache since yesterday");
    }

    #[test]
    fn start_rejects_empty_symptom_text() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        let result = store.start_episode(&mut session, "   ", ForWhom::Myself, None, None);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
        // All-or-nothing: no episode row was created.
        assert!(store.get_all_episodes().unwrap().is_empty());
    }

    #[test]
    fn start_family_member_requires_relationship_and_age() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        let missing_both =
            store.start_episode(&mut session, "she has a cough", ForWhom::FamilyMember, None, None);
        assert!(matches!(missing_both, Err(EngineError::InvalidInput(_))));

        let ok = store.start_episode(
            &mut session,
            "she has a cough",
            ForWhom::FamilyMember,
            Some(6),
            Some("daughter"),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn start_rejects_implausible_age() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        let result = store.start_episode(
            &mut session,
            "fever",
            ForWhom::FamilyMember,
            Some(200),
            Some("father"),
        );
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn second_start_displaces_active_pointer() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        let first = store
            .start_episode(&mut session, "headache", ForWhom::Myself, None, None)
            .unwrap();
        let second = store
            .start_episode(&mut session, "sore throat", ForWhom::Myself, None, None)
            .unwrap();

        assert_eq!(session.active_episode(), Some(second.id));
        // The first episode row still reports active; only the pointer moved.
        assert!(store.get_episode(first.id).unwrap().unwrap().is_active);
        assert_eq!(store.get_active_episode(&session).unwrap().unwrap().id, second.id);
    }

    #[test]
    fn derived_title_is_first_clause() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        let ep = store
            .start_episode(
                &mut session,
                "Sharp pain in my lower back. It started after lifting boxes.",
                ForWhom::Myself,
                None,
                None,
            )
            .unwrap();
        assert_eq!(ep.title, "Sharp pain in my lower back");
    }

    #[test]
    fn derived_title_truncates_long_openings() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        let long = "a very long rambling description of symptoms ".repeat(5);
        let ep = store
            .start_episode(&mut session, &long, ForWhom::Myself, None, None)
            .unwrap();
        assert!(ep.title.chars().count() <= crate::config::TITLE_MAX_LEN);
        assert!(ep.title.ends_with('\u{2026}'));
    }

    // ── add_message ───────────────────────────────────────

    #[test]
    fn add_message_appends_in_order() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "I have a mild headache since yesterday", ForWhom::Myself, None, None)
            .unwrap();

        store
            .add_message(ep.id, MessageRole::Assistant, "How bad is it on a scale of 1 to 10?")
            .unwrap();
        store
            .add_message(ep.id, MessageRole::User, "It's about a 3 out of 10")
            .unwrap();

        let messages = store.get_messages(ep.id).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].text, "I have a mild headache since yesterday");
        assert_eq!(messages[2].text, "It's about a 3 out of 10");
        assert_eq!(
            messages.iter().map(|m| m.seq).collect::<Vec<_>>(),
            vec![0, 1, 2],
            "seq must reflect exact append order"
        );

        let ep = store.get_episode(ep.id).unwrap().unwrap();
        assert_eq!(ep.message_count, 3);
        assert_eq!(ep.last_message_snippet.as_deref(), Some("It's about a 3 out of 10"));
    }

    #[test]
    fn add_message_unknown_episode_is_not_found() {
        let (conn, _) = setup();
        let store = EpisodeStore::new(&conn);

        let result = store.add_message(Uuid::new_v4(), MessageRole::User, "hello");
        assert!(matches!(
            result,
            Err(EngineError::Database(crate::db::DatabaseError::NotFound { .. }))
        ));
    }

    #[test]
    fn rapid_appends_keep_order_within_same_second() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "stomach ache", ForWhom::Myself, None, None)
            .unwrap();

        for i in 0..10 {
            store
                .add_message(ep.id, MessageRole::User, &format!("detail {i}"))
                .unwrap();
        }

        let messages = store.get_messages(ep.id).unwrap();
        let texts: Vec<&str> = messages[1..].iter().map(|m| m.text.as_str()).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("detail {i}")).collect();
        assert_eq!(texts, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    // ── close / resume ────────────────────────────────────

    #[test]
    fn close_clears_active_pointer() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "headache", ForWhom::Myself, None, None)
            .unwrap();

        store.close_episode(&mut session, ep.id).unwrap();

        assert!(store.get_active_episode(&session).unwrap().is_none());
        assert!(!store.get_episode(ep.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn close_unknown_episode_is_not_found() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let result = store.close_episode(&mut session, Uuid::new_v4());
        assert!(matches!(
            result,
            Err(EngineError::Database(crate::db::DatabaseError::NotFound { .. }))
        ));
    }

    #[test]
    fn resume_reactivates_and_takes_pointer() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "headache", ForWhom::Myself, None, None)
            .unwrap();
        store.close_episode(&mut session, ep.id).unwrap();

        store.resume_episode(&mut session, ep.id).unwrap();

        assert_eq!(session.active_episode(), Some(ep.id));
        assert!(store.get_episode(ep.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn resume_unknown_episode_is_noop() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        store.resume_episode(&mut session, Uuid::new_v4()).unwrap();
        assert!(session.active_episode().is_none());
    }

    // ── delete ────────────────────────────────────────────

    #[test]
    fn delete_cascades_to_messages() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "headache", ForWhom::Myself, None, None)
            .unwrap();
        for _ in 0..4 {
            store.add_message(ep.id, MessageRole::User, "more detail").unwrap();
        }

        store.delete_episode(&mut session, ep.id).unwrap();

        assert!(store.get_episode(ep.id).unwrap().is_none());
        assert!(store.get_messages(ep.id).unwrap().is_empty());
        assert!(session.active_episode().is_none());

        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn delete_unknown_episode_is_not_found() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let result = store.delete_episode(&mut session, Uuid::new_v4());
        assert!(result.is_err());
    }

    // ── updates & reads ───────────────────────────────────

    #[test]
    fn update_episode_partial_fields() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "headache", ForWhom::Myself, None, None)
            .unwrap();

        store
            .update_episode(
                ep.id,
                &EpisodeUpdate {
                    title: Some("Recurring headaches".into()),
                    age: Some(34),
                    ..EpisodeUpdate::default()
                },
            )
            .unwrap();

        let ep = store.get_episode(ep.id).unwrap().unwrap();
        assert_eq!(ep.title, "Recurring headaches");
        assert_eq!(ep.age, Some(34));
    }

    #[test]
    fn update_can_switch_subject_with_complete_details() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "she has a cough", ForWhom::Myself, None, None)
            .unwrap();

        store
            .update_episode(
                ep.id,
                &EpisodeUpdate {
                    for_whom: Some(ForWhom::FamilyMember),
                    relationship: Some("daughter".into()),
                    age: Some(6),
                    ..EpisodeUpdate::default()
                },
            )
            .unwrap();

        let ep = store.get_episode(ep.id).unwrap().unwrap();
        assert_eq!(ep.for_whom, ForWhom::FamilyMember);
        assert_eq!(ep.relationship.as_deref(), Some("daughter"));
        assert_eq!(ep.age, Some(6));
    }

    #[test]
    fn update_rejects_family_member_switch_without_details() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "a cough", ForWhom::Myself, None, None)
            .unwrap();

        let result = store.update_episode(
            ep.id,
            &EpisodeUpdate {
                for_whom: Some(ForWhom::FamilyMember),
                ..EpisodeUpdate::default()
            },
        );
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));

        // Details already on file satisfy the switch.
        store
            .update_episode(
                ep.id,
                &EpisodeUpdate {
                    relationship: Some("son".into()),
                    age: Some(10),
                    ..EpisodeUpdate::default()
                },
            )
            .unwrap();
        store
            .update_episode(
                ep.id,
                &EpisodeUpdate {
                    for_whom: Some(ForWhom::FamilyMember),
                    ..EpisodeUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(
            store.get_episode(ep.id).unwrap().unwrap().for_whom,
            ForWhom::FamilyMember
        );
    }

    #[test]
    fn set_triage_level_persists() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);
        let ep = store
            .start_episode(&mut session, "headache", ForWhom::Myself, None, None)
            .unwrap();

        store.set_triage_level(ep.id, ExternalTriageLevel::Soon).unwrap();

        let ep = store.get_episode(ep.id).unwrap().unwrap();
        assert_eq!(ep.triage_level, Some(ExternalTriageLevel::Soon));
    }

    #[test]
    fn recent_episodes_newest_first() {
        let (conn, mut session) = setup();
        let store = EpisodeStore::new(&conn);

        let a = store
            .start_episode(&mut session, "headache", ForWhom::Myself, None, None)
            .unwrap();
        let b = store
            .start_episode(&mut session, "cough", ForWhom::Myself, None, None)
            .unwrap();
        // Touch the older episode so it becomes the most recently updated.
        conn.execute(
            "UPDATE episodes SET updated_at = '2099-01-01 00:00:00' WHERE id = ?1",
            rusqlite::params![a.id.to_string()],
        )
        .unwrap();

        let recent = store.get_recent_episodes(2).unwrap();
        assert_eq!(recent[0].id, a.id);
        assert_eq!(recent[1].id, b.id);
    }

    #[test]
    fn get_messages_unknown_episode_is_empty() {
        let (conn, _) = setup();
        let store = EpisodeStore::new(&conn);
        assert!(store.get_messages(Uuid::new_v4()).unwrap().is_empty());
    }
}
