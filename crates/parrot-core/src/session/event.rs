//! Session events published by the conversation controller.

use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use crate::context::ContextCard;
use crate::thought::ThoughtStep;

/// Category of a transient notice, used by front ends to pick styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeKind {
    /// Informational message.
    Info,
    /// A recoverable error scoped to one feature.
    Error,
    /// Acknowledgment of a user action (e.g. feedback received).
    Ack,
}

/// A transient, auto-dismissing message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    /// How long a front end should keep the notice visible, when it has a
    /// notion of dismissal at all (a scrolling terminal does not).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismiss_after_ms: Option<u64>,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Info,
            dismiss_after_ms: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
            dismiss_after_ms: None,
        }
    }

    pub fn ack(text: impl Into<String>, dismiss_after_ms: u64) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Ack,
            dismiss_after_ms: Some(dismiss_after_ms),
        }
    }
}

/// High-level events published over the session channel.
///
/// The controller is the only producer; front ends consume these to keep
/// their view of the transcript and side panels current.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended to the transcript.
    MessageAppended { message: ChatMessage },
    /// The thought-process snapshot was replaced wholesale.
    ThoughtsUpdated { steps: Vec<ThoughtStep> },
    /// The contextual info snapshot was replaced wholesale (`None` clears it).
    ContextUpdated { card: Option<ContextCard> },
    /// A transient notice for the user.
    Notice { notice: Notice },
}
