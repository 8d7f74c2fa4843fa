//! Orchestration for the Parrot mock chat application.
//!
//! Ties the `parrot-core` domain together: the conversation controller that
//! drives the turn-taking flow, the voice capture adapter, and the data-only
//! card generator.

pub mod controller;
pub mod generate;
pub mod voice;

pub use controller::{ConversationController, FEEDBACK_ACK_DISMISS_MS, FEEDBACK_ACK_TEXT};
pub use generate::{CardElement, CardGenerator, CardSpec};
pub use voice::{
    platform_recognizer, CaptureState, RecognitionEvent, RecognizerConfig, ScriptedRecognizer,
    SpeechRecognizer, VoiceCapture,
};
