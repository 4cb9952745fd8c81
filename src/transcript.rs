//! Transcript types and the chronological session facade.
//!
//! Storage is prepend-based (newest entry at the head), matching Redis
//! `LPUSH` semantics, so chronological order is the reverse of storage
//! order. `Transcript` hides that inversion: callers only ever append
//! chronologically and replay chronologically.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{CatapultError, Result};
use crate::store::ListStore;

/// Suffix of the list holding raw candidate inputs.
const ANSWERS_SUFFIX: &str = "_answers";

/// Suffix of the list holding raw assistant outputs.
const QUESTIONS_SUFFIX: &str = "_questions";

/// A single message in an interview conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The text content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
        }
    }

    /// Create a new system message.
    ///
    /// System messages carry the interview instruction and the candidate
    /// profile seeded at session creation.
    pub fn system(content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_string(),
        }
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Interview instruction and candidate profile
    System,
    /// Candidate turns
    User,
    /// Generated interviewer turns
    Assistant,
}

impl Role {
    /// The wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chronological facade over one session's stored logs.
///
/// Owns the three keys derived from the interview id: the transcript
/// itself, plus the raw `_answers` and `_questions` side logs.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use catapult::{MemoryListStore, Message, Transcript};
///
/// # tokio_test::block_on(async {
/// let transcript = Transcript::new(Arc::new(MemoryListStore::new()), "sess1");
/// transcript
///     .append_chronological(&Message::system("instruction"))
///     .await
///     .unwrap();
/// transcript
///     .append_chronological(&Message::user("first answer"))
///     .await
///     .unwrap();
///
/// let replayed = transcript.replay().await.unwrap();
/// assert_eq!(replayed[0].content, "instruction");
/// assert_eq!(replayed[1].content, "first answer");
/// # });
/// ```
pub struct Transcript {
    store: Arc<dyn ListStore>,
    interview_id: String,
}

impl Transcript {
    /// Bind a transcript to a session id on the given store.
    pub fn new(store: Arc<dyn ListStore>, interview_id: &str) -> Self {
        Self {
            store,
            interview_id: interview_id.to_string(),
        }
    }

    /// The session id this transcript is bound to.
    pub fn interview_id(&self) -> &str {
        &self.interview_id
    }

    fn answers_key(&self) -> String {
        format!("{}{}", self.interview_id, ANSWERS_SUFFIX)
    }

    fn questions_key(&self) -> String {
        format!("{}{}", self.interview_id, QUESTIONS_SUFFIX)
    }

    /// Append a message as the chronologically newest transcript entry.
    pub async fn append_chronological(&self, message: &Message) -> Result<()> {
        let serialized = serde_json::to_string(message)?;
        self.store
            .append_front(&self.interview_id, &serialized)
            .await
    }

    /// Replay the full transcript in chronological order.
    ///
    /// Entries that fail to parse are a store error: the transcript is
    /// append-only and every entry was written by `append_chronological`.
    pub async fn replay(&self) -> Result<Vec<Message>> {
        let raw = self.store.read_all(&self.interview_id).await?;
        let mut messages = Vec::with_capacity(raw.len());
        // Storage is newest-first; walk backwards for chronological order.
        for entry in raw.iter().rev() {
            let message: Message = serde_json::from_str(entry).map_err(|e| {
                CatapultError::Store(format!(
                    "corrupt transcript entry for session '{}': {}",
                    self.interview_id, e
                ))
            })?;
            messages.push(message);
        }
        Ok(messages)
    }

    /// Record a raw candidate input in the `_answers` log.
    pub async fn push_answer(&self, text: &str) -> Result<()> {
        self.store.append_front(&self.answers_key(), text).await
    }

    /// Record a raw assistant output in the `_questions` log.
    pub async fn push_question(&self, text: &str) -> Result<()> {
        self.store.append_front(&self.questions_key(), text).await
    }

    /// All recorded candidate inputs, oldest first.
    pub async fn answers(&self) -> Result<Vec<String>> {
        let mut raw = self.store.read_all(&self.answers_key()).await?;
        raw.reverse();
        Ok(raw)
    }

    /// All recorded assistant outputs, oldest first.
    pub async fn questions(&self) -> Result<Vec<String>> {
        let mut raw = self.store.read_all(&self.questions_key()).await?;
        raw.reverse();
        Ok(raw)
    }
}
