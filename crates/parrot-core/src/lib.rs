//! Domain types and pure logic for the Parrot mock chat application.
//!
//! Everything here is UI-toolkit agnostic: the transcript, the canned
//! thought-process producer, the contextual info resolver, the feedback
//! ledger, panel-shell state, and configuration. Orchestration lives in
//! `parrot-interaction`, presentation in `parrot-readline`.

pub mod app_state;
pub mod config;
pub mod context;
pub mod error;
pub mod feedback;
pub mod secret;
pub mod session;
pub mod thought;

// Re-export common error type
pub use error::{ParrotError, Result};
