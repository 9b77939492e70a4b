//! Turn handling: maps inbound events to session updates, gateway calls and a reply.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info};

use crate::chat::ChatBackend;
use crate::prediction::Predictor;
use crate::session::SessionStore;
use crate::types::{ChatMessage, UserKey};

pub const HELP_TEXT: &str = "Send an image of a plant, and I'll try to recognize its disease!";

/// Inbound event, already stripped of platform details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Explicit start or reset.
    Init,
    Help,
    Text(String),
    /// Bytes of the largest available variant of a photo.
    Image(Vec<u8>),
}

/// The single reply every turn produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Welcome message; rendered by the bot layer since it mentions the user.
    Greeting,
    Text(String),
}

/// Context prompt seeded into a fresh session after a prediction.
pub fn system_prompt(label: &str) -> String {
    format!(
        "You are Plant Care AI Assistant, an expert in agriculture and plant diseases. \
         A user has recently identified {label} in their plant. Provide detailed information \
         about this disease, its causes, symptoms, prevention, and treatment methods. Also, be \
         prepared to answer follow-up questions about this disease and other plant care issues."
    )
}

/// The transcript that replaces a user's session once a label is known.
pub fn seed_context(label: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(system_prompt(label))]
}

pub fn prediction_announcement(label: &str) -> String {
    format!("Prediction: {label}")
}

pub struct TurnOrchestrator<S, P, C> {
    sessions: Arc<S>,
    predictor: P,
    chat: C,
    turn_locks: Mutex<HashMap<UserKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S, P, C> TurnOrchestrator<S, P, C>
where
    S: SessionStore,
    P: Predictor,
    C: ChatBackend,
{
    pub fn new(sessions: Arc<S>, predictor: P, chat: C) -> Self {
        Self {
            sessions,
            predictor,
            chat,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Run one turn for `user`.
    ///
    /// Turns for the same user are serialized for their whole duration, so a
    /// reply is always appended right after the message that produced it.
    pub async fn handle(&self, user: UserKey, event: Event) -> Reply {
        match event {
            Event::Help => Reply::Text(HELP_TEXT.to_string()),
            Event::Init => {
                self.serialized(user, async {
                    self.sessions.reset(user);
                    info!("Reset conversation for user {user}");
                    Reply::Greeting
                })
                .await
            }
            Event::Text(text) => {
                self.serialized(user, async { Reply::Text(self.chat_turn(user, text).await) })
                    .await
            }
            Event::Image(bytes) => {
                self.serialized(user, async { Reply::Text(self.image_turn(user, bytes).await) })
                    .await
            }
        }
    }

    async fn serialized<T>(&self, user: UserKey, turn: impl Future<Output = T>) -> T {
        let lock = self.turn_lock(user);
        let output = {
            let _turn = lock.lock().await;
            turn.await
        };
        self.release_turn_lock(user, &lock);
        output
    }

    async fn chat_turn(&self, user: UserKey, text: String) -> String {
        self.sessions.append(user, ChatMessage::user(text));
        let transcript = self.sessions.get_or_create(user);

        debug!(
            "Transcript for user {user} has {} messages",
            transcript.len()
        );
        for message in &transcript {
            debug!(
                "  [{}] {}: {} chars",
                message.id,
                message.role,
                message.content.len()
            );
        }

        match self.chat.chat(&transcript).await {
            Ok(content) => {
                self.sessions
                    .append(user, ChatMessage::assistant(content.clone()));
                content
            }
            Err(e) => e.user_message(),
        }
    }

    async fn image_turn(&self, user: UserKey, image: Vec<u8>) -> String {
        match self.predictor.predict(image).await {
            Ok(label) => {
                info!("Predicted '{label}' for user {user}");
                self.sessions.replace(user, seed_context(&label));
                prediction_announcement(&label)
            }
            Err(e) => e.user_message(),
        }
    }

    fn turn_lock(&self, user: UserKey) -> Arc<tokio::sync::Mutex<()>> {
        self.turn_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user)
            .or_default()
            .clone()
    }

    /// Drop the user's lock entry once no other turn holds or waits on it.
    /// Clones are only taken under the map lock, so the count is stable here.
    fn release_turn_lock(&self, user: UserKey, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .turn_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(lock) == 2 {
            locks.remove(&user);
        }
    }
}
