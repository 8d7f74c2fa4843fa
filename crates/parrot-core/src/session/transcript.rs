//! The append-only message transcript.

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, MessageId};

/// The ordered sequence of messages shown to the user.
///
/// Messages are append-only and immutable once created; the transcript lives
/// for the session (there is no reset short of dropping it). Ids are handed
/// out from a monotonic counter owned by the transcript, so an assistant
/// reply appended after its triggering user message always carries a strictly
/// greater id and transcript order matches causal order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user message and returns its id.
    pub fn push_user(&mut self, content: impl Into<String>) -> MessageId {
        let id = self.allocate_id();
        self.messages.push(ChatMessage::user(id, content));
        id
    }

    /// Appends an assistant message and returns its id.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> MessageId {
        let id = self.allocate_id();
        self.messages.push(ChatMessage::assistant(id, content));
        id
    }

    /// Returns the message with the given id, if present.
    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Returns the most recently appended message.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages in the transcript.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when no message has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates over messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId(self.next_id)
    }
}
