//! The conversation controller.
//!
//! Owns the transcript and the feedback ledger, orchestrates submissions,
//! and schedules the delayed echo reply. Front ends observe everything
//! through the [`SessionEvent`] channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use parrot_core::config::ChatConfig;
use parrot_core::context::{ContextIndex, DEFAULT_INDEX};
use parrot_core::feedback::FeedbackLedger;
use parrot_core::session::{MessageId, Notice, SessionEvent, Transcript};
use parrot_core::thought::produce_steps;
use parrot_core::Result;

/// Text of the acknowledgment shown after feedback is recorded.
pub const FEEDBACK_ACK_TEXT: &str = "Thank you for your feedback!";
/// How long front ends should keep the acknowledgment visible.
pub const FEEDBACK_ACK_DISMISS_MS: u64 = 3000;

/// Orchestrates the turn-taking chat flow.
///
/// `submit` appends the user message, replaces the thought-process and
/// contextual-info snapshots, and schedules the echo reply after the
/// configured delay. Overlapping submissions run independent timers; message
/// ids still grow monotonically because the transcript allocates them, so an
/// assistant reply always sorts after its triggering user message.
///
/// Every pending reply listens on a child of the controller's cancellation
/// token; [`ConversationController::shutdown`] cancels them all, so nothing
/// fires into a torn-down front end.
pub struct ConversationController {
    session_id: String,
    transcript: Arc<RwLock<Transcript>>,
    feedback: Arc<RwLock<FeedbackLedger>>,
    context_index: Arc<ContextIndex>,
    events: mpsc::Sender<SessionEvent>,
    reply_delay: Duration,
    cancel: CancellationToken,
}

impl ConversationController {
    /// Creates a controller publishing to `events`, configured from `config`.
    pub fn new(events: mpsc::Sender<SessionEvent>, config: &ChatConfig) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            transcript: Arc::new(RwLock::new(Transcript::new())),
            feedback: Arc::new(RwLock::new(FeedbackLedger::new())),
            context_index: Arc::new(DEFAULT_INDEX.clone()),
            events,
            reply_delay: Duration::from_millis(config.reply_delay_ms),
            cancel: CancellationToken::new(),
        }
    }

    /// Overrides the reply delay after construction.
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    /// Replaces the keyword table used for contextual info resolution.
    pub fn with_context_index(mut self, index: ContextIndex) -> Self {
        self.context_index = Arc::new(index);
        self
    }

    /// Identifier of the session this controller drives.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Submits user input.
    ///
    /// A blank submission (empty after trimming) is a no-op: nothing is
    /// appended, no event is published, no reply is scheduled. Trimming is
    /// only the emptiness check — the message, the thought interpolation,
    /// and the echo all carry the text exactly as given. Otherwise the user
    /// message is appended immediately and the echo reply is scheduled after
    /// the configured delay; the reply recomputes the contextual info
    /// snapshot from its own text, overwriting the one computed here.
    ///
    /// Returns the id of the appended user message, or `None` for a no-op.
    pub async fn submit(&self, text: &str) -> Result<Option<MessageId>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let (user_id, message) = {
            let mut transcript = self.transcript.write().await;
            let id = transcript.push_user(text);
            (id, transcript.get(id).cloned())
        };
        if let Some(message) = message {
            let _ = self
                .events
                .send(SessionEvent::MessageAppended { message })
                .await;
        }

        let steps = produce_steps(text);
        let _ = self
            .events
            .send(SessionEvent::ThoughtsUpdated { steps })
            .await;

        let card = self.context_index.resolve(text).cloned();
        let _ = self.events.send(SessionEvent::ContextUpdated { card }).await;

        self.schedule_reply(text.to_string());
        tracing::debug!(session = %self.session_id, id = %user_id, "user message submitted");
        Ok(Some(user_id))
    }

    fn schedule_reply(&self, input: String) {
        let transcript = Arc::clone(&self.transcript);
        let context_index = Arc::clone(&self.context_index);
        let events = self.events.clone();
        let cancel = self.cancel.child_token();
        let delay = self.reply_delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("pending reply cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let reply = format!("Echo: {input}");
            let message = {
                let mut transcript = transcript.write().await;
                let id = transcript.push_assistant(&reply);
                transcript.get(id).cloned()
            };
            if let Some(message) = message {
                let _ = events.send(SessionEvent::MessageAppended { message }).await;
            }

            // The reply overwrites the contextual info computed at submit time.
            let card = context_index.resolve(&reply).cloned();
            let _ = events.send(SessionEvent::ContextUpdated { card }).await;
        });
    }

    /// Records feedback for a message; the first vote per id is final.
    ///
    /// A newly recorded vote emits a transient acknowledgment notice.
    /// Returns whether the vote was newly recorded.
    pub async fn record_feedback(&self, id: MessageId, is_positive: bool) -> bool {
        let newly_recorded = self.feedback.write().await.record(id, is_positive);
        if newly_recorded {
            tracing::info!(message = %id, positive = is_positive, "feedback recorded");
            let _ = self
                .events
                .send(SessionEvent::Notice {
                    notice: Notice::ack(FEEDBACK_ACK_TEXT, FEEDBACK_ACK_DISMISS_MS),
                })
                .await;
        }
        newly_recorded
    }

    /// Returns the recorded vote for a message, if any.
    pub async fn feedback_for(&self, id: MessageId) -> Option<bool> {
        self.feedback.read().await.vote(id)
    }

    /// Number of messages currently in the transcript.
    pub async fn message_count(&self) -> usize {
        self.transcript.read().await.len()
    }

    /// Shared handle to the transcript, for read-only inspection.
    pub fn transcript(&self) -> Arc<RwLock<Transcript>> {
        Arc::clone(&self.transcript)
    }

    /// Cancels every pending reply. Call before tearing down the front end.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ConversationController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
