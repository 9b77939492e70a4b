//! Per-user conversation transcripts.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::types::{ChatMessage, UserKey};

/// Storage for per-user transcripts.
///
/// All operations are synchronous and return owned snapshots, so callers never
/// hold references into the store across a gateway call.
pub trait SessionStore: Send + Sync {
    /// Snapshot of the user's transcript, or `None` if no conversation started.
    fn get(&self, user: UserKey) -> Option<Vec<ChatMessage>>;

    /// Snapshot of the user's transcript, creating an empty one if absent.
    fn get_or_create(&self, user: UserKey) -> Vec<ChatMessage>;

    /// Empty the user's transcript.
    fn reset(&self, user: UserKey) -> Vec<ChatMessage>;

    /// Replace the whole transcript.
    fn replace(&self, user: UserKey, messages: Vec<ChatMessage>);

    /// Push one message to the end of the transcript, creating it if needed.
    fn append(&self, user: UserKey, message: ChatMessage);
}

/// Process-lifetime store backed by a map. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<UserKey, Vec<ChatMessage>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a started conversation.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user: UserKey) -> Option<Vec<ChatMessage>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .cloned()
    }

    fn get_or_create(&self, user: UserKey) -> Vec<ChatMessage> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user)
            .or_default()
            .clone()
    }

    fn reset(&self, user: UserKey) -> Vec<ChatMessage> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, Vec::new());
        Vec::new()
    }

    fn replace(&self, user: UserKey, messages: Vec<ChatMessage>) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, messages);
    }

    fn append(&self, user: UserKey, message: ChatMessage) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user)
            .or_default()
            .push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn missing_user_has_no_session() {
        let store = InMemorySessionStore::new();
        assert!(store.get(7).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn get_or_create_starts_empty_session() {
        let store = InMemorySessionStore::new();
        assert!(store.get_or_create(7).is_empty());
        assert_eq!(store.get(7), Some(Vec::new()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn append_keeps_insertion_order() {
        let store = InMemorySessionStore::new();
        store.append(1, ChatMessage::user("first"));
        store.append(1, ChatMessage::assistant("second"));

        let session = store.get_or_create(1);
        let contents: Vec<_> = session.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
        assert_eq!(session[1].role, MessageRole::Assistant);
    }

    #[test]
    fn reset_clears_existing_transcript() {
        let store = InMemorySessionStore::new();
        store.append(1, ChatMessage::user("hello"));
        assert!(store.reset(1).is_empty());
        assert_eq!(store.get(1), Some(Vec::new()));
    }

    #[test]
    fn replace_discards_prior_messages() {
        let store = InMemorySessionStore::new();
        store.append(1, ChatMessage::user("a"));
        store.append(1, ChatMessage::assistant("b"));
        store.replace(1, vec![ChatMessage::system("seed")]);

        let session = store.get(1).expect("session exists");
        assert_eq!(session.len(), 1);
        assert_eq!(session[0].content, "seed");
    }

    #[test]
    fn users_are_independent() {
        let store = InMemorySessionStore::new();
        store.append(1, ChatMessage::user("mine"));
        store.reset(2);

        assert_eq!(store.get(1).map(|s| s.len()), Some(1));
        assert_eq!(store.get(2).map(|s| s.len()), Some(0));
    }

    #[test]
    fn snapshots_are_detached() {
        let store = InMemorySessionStore::new();
        let mut snapshot = store.get_or_create(3);
        snapshot.push(ChatMessage::user("local only"));
        assert_eq!(store.get(3), Some(Vec::new()));
    }
}
