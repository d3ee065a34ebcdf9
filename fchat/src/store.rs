//! In-memory session store with per-conversation turn serialization.
//!
//! Every session starts with its system preset at index 0 and keeps it there.
//! A turn runs against a snapshot taken under the session's turn lock and
//! commits its result in one step. Resets bump the session generation, and a
//! turn whose generation no longer matches at commit time is discarded.
//!
//! ```rust
//! use fchat::SessionStore;
//! use fprovider::{Message, Role};
//!
//! let store = SessionStore::new();
//! store
//!     .get_or_create("P100", "You are a helpful assistant.")
//!     .expect("session should be created");
//! store.append("P100", Message::user("hello")).expect("append should work");
//! store.reset("P100").expect("reset should work");
//!
//! let session = store.snapshot("P100").expect("session exists");
//! assert_eq!(session.messages.len(), 1);
//! assert_eq!(session.messages[0].role, Role::System);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use fcommon::ConversationId;
use fprovider::Message;
use tokio::sync::OwnedMutexGuard;

use crate::ChatError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: ConversationId,
    pub messages: Vec<Message>,
    pub generation: u64,
}

impl Session {
    pub fn preset(&self) -> &str {
        self.messages.first().map(Message::text).unwrap_or_default()
    }
}

#[derive(Debug)]
struct SessionState {
    messages: Vec<Message>,
    generation: u64,
}

impl SessionState {
    fn new(preset: &str) -> Self {
        Self {
            messages: vec![Message::system(preset)],
            generation: 0,
        }
    }

    fn truncate_to_preset(&mut self) {
        self.messages.truncate(1);
        self.generation += 1;
    }
}

#[derive(Debug)]
struct SessionEntry {
    turn: Arc<tokio::sync::Mutex<()>>,
    state: Mutex<SessionState>,
}

impl SessionEntry {
    fn new(preset: &str) -> Self {
        Self {
            turn: Arc::new(tokio::sync::Mutex::new(())),
            state: Mutex::new(SessionState::new(preset)),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, SessionState>, ChatError> {
        self.state
            .lock()
            .map_err(|_| ChatError::store("session lock poisoned"))
    }

    fn snapshot(&self, id: &ConversationId) -> Result<Session, ChatError> {
        let state = self.state()?;
        Ok(Session {
            id: id.clone(),
            messages: state.messages.clone(),
            generation: state.generation,
        })
    }
}

/// Exclusive access to one conversation for the duration of a turn.
///
/// Holding the guard keeps other turns on the same conversation waiting.
/// Resets and persona changes are not blocked by it.
#[derive(Debug)]
pub struct TurnGuard {
    entry: Arc<SessionEntry>,
    snapshot: Session,
    _permit: OwnedMutexGuard<()>,
}

impl TurnGuard {
    pub fn session(&self) -> &Session {
        &self.snapshot
    }

    pub fn history(&self) -> &[Message] {
        &self.snapshot.messages
    }

    /// Replaces the stored history with `messages` if the session has not been
    /// reset since the turn began. Returns `false` when the result was stale
    /// and has been dropped.
    pub fn commit(self, messages: Vec<Message>) -> Result<bool, ChatError> {
        if messages.is_empty() {
            return Err(ChatError::store(
                "a committed history must keep its system preset",
            ));
        }

        let mut state = self.entry.state()?;
        if state.generation != self.snapshot.generation {
            return Ok(false);
        }

        state.messages = messages;
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<ConversationId, Arc<SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session, creating it seeded with `preset` when unseen.
    pub fn get_or_create(
        &self,
        id: impl Into<ConversationId>,
        preset: &str,
    ) -> Result<Session, ChatError> {
        let id = validated(id.into())?;
        self.entry_or_create(&id, preset)?.snapshot(&id)
    }

    /// Truncates the history back to the preset. Unknown ids are a no-op.
    pub fn reset(&self, id: impl Into<ConversationId>) -> Result<(), ChatError> {
        let id = validated(id.into())?;
        if let Some(entry) = self.entry(&id)? {
            entry.state()?.truncate_to_preset();
        }
        Ok(())
    }

    /// Replaces the preset and truncates the history, creating the session if
    /// needed.
    pub fn set_preset(&self, id: impl Into<ConversationId>, preset: &str) -> Result<(), ChatError> {
        let id = validated(id.into())?;
        let entry = self.entry_or_create(&id, preset)?;
        let mut state = entry.state()?;
        state.truncate_to_preset();
        state.messages[0] = Message::system(preset);
        Ok(())
    }

    /// Appends one message to an existing session.
    pub fn append(&self, id: impl Into<ConversationId>, message: Message) -> Result<(), ChatError> {
        let id = validated(id.into())?;
        let entry = self.entry(&id)?.ok_or_else(|| {
            ChatError::invalid_argument(format!("conversation '{id}' has not been started"))
        })?;
        entry.state()?.messages.push(message);
        Ok(())
    }

    pub fn snapshot(&self, id: impl Into<ConversationId>) -> Option<Session> {
        let id = id.into();
        let entry = self.entry(&id).ok()??;
        entry.snapshot(&id).ok()
    }

    pub fn contains(&self, id: impl Into<ConversationId>) -> bool {
        let id = id.into();
        matches!(self.entry(&id), Ok(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .map(|sessions| sessions.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits for any in-flight turn on `id` to finish, then hands out a
    /// snapshot to run the next one against.
    pub async fn begin_turn(
        &self,
        id: impl Into<ConversationId>,
        preset: &str,
    ) -> Result<TurnGuard, ChatError> {
        let id = validated(id.into())?;
        let entry = self.entry_or_create(&id, preset)?;
        let permit = Arc::clone(&entry.turn).lock_owned().await;
        let snapshot = entry.snapshot(&id)?;

        Ok(TurnGuard {
            entry,
            snapshot,
            _permit: permit,
        })
    }

    fn sessions(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<ConversationId, Arc<SessionEntry>>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|_| ChatError::store("session store lock poisoned"))
    }

    fn entry(&self, id: &ConversationId) -> Result<Option<Arc<SessionEntry>>, ChatError> {
        Ok(self.sessions()?.get(id).cloned())
    }

    fn entry_or_create(
        &self,
        id: &ConversationId,
        preset: &str,
    ) -> Result<Arc<SessionEntry>, ChatError> {
        let mut sessions = self.sessions()?;
        let entry = sessions
            .entry(id.clone())
            .or_insert_with(|| Arc::new(SessionEntry::new(preset)));
        Ok(Arc::clone(entry))
    }
}

fn validated(id: ConversationId) -> Result<ConversationId, ChatError> {
    if id.is_blank() {
        return Err(ChatError::invalid_argument(
            "conversation id must not be empty",
        ));
    }
    Ok(id)
}
