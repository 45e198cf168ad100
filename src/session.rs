use uuid::Uuid;

/// Session-scoped conversation state.
///
/// The active-episode pointer lives here, not in module-level state, so
/// concurrent user sessions in a multi-user deployment cannot observe
/// each other's pointer. Last-writer-wins: starting or resuming an
/// episode overwrites the pointer without requiring a close first.
#[derive(Debug, Default, Clone)]
pub struct Session {
    active_episode: Option<Uuid>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_episode(&self) -> Option<Uuid> {
        self.active_episode
    }

    pub(crate) fn set_active(&mut self, id: Uuid) {
        self.active_episode = Some(id);
    }

    /// Clears the pointer only if it references the given episode.
    pub(crate) fn clear_if_active(&mut self, id: &Uuid) {
        if self.active_episode == Some(*id) {
            self.active_episode = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_active_episode() {
        assert!(Session::new().active_episode().is_none());
    }

    #[test]
    fn clear_only_matching_episode() {
        let mut session = Session::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        session.set_active(a);

        session.clear_if_active(&b);
        assert_eq!(session.active_episode(), Some(a));

        session.clear_if_active(&a);
        assert!(session.active_episode().is_none());
    }
}
