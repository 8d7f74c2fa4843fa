//! Per-message feedback ledger.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::session::MessageId;

/// Records one positive/negative judgment per assistant message.
///
/// Write-once per id: the first vote is final and later calls for the same id
/// have no effect. Persistence to a backend stays an external collaborator;
/// the ledger only lives for the session.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FeedbackLedger {
    votes: HashMap<MessageId, bool>,
}

impl FeedbackLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a vote for the message.
    ///
    /// Returns `true` when the vote was newly recorded, `false` when the id
    /// already had a vote (in which case the stored value is unchanged).
    pub fn record(&mut self, id: MessageId, is_positive: bool) -> bool {
        if self.votes.contains_key(&id) {
            return false;
        }
        self.votes.insert(id, is_positive);
        true
    }

    /// Returns the recorded vote for the message, if any.
    pub fn vote(&self, id: MessageId) -> Option<bool> {
        self.votes.get(&id).copied()
    }

    /// True when the message already has a recorded vote.
    pub fn is_recorded(&self, id: MessageId) -> bool {
        self.votes.contains_key(&id)
    }

    /// Number of messages with recorded feedback.
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    /// True when no feedback has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
