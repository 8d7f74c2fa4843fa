//! Session domain module.
//!
//! This module contains the transcript and its message types, plus the event
//! enum the controller publishes to front ends.
//!
//! # Module Structure
//!
//! - `message`: Message types (`MessageId`, `MessageRole`, `ChatMessage`)
//! - `transcript`: The append-only message sequence (`Transcript`)
//! - `event`: Controller-published events (`SessionEvent`, `Notice`)

mod event;
mod message;
mod transcript;

// Re-export public API
pub use event::{Notice, NoticeKind, SessionEvent};
pub use message::{ChatMessage, MessageId, MessageRole};
pub use transcript::Transcript;
