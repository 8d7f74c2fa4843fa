//! Voice dictation: a thin adapter over a speech-recognition capability.
//!
//! The adapter is a two-state machine (`Idle` -> `Listening` -> `Idle`) with
//! an error side channel. Recognizers hand over the *cumulative* list of
//! transcript fragments on every partial result; the adapter joins them with
//! single spaces and delivers the full current hypothesis to the caller each
//! time, never an increment.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use parrot_core::session::{Notice, SessionEvent};
use parrot_core::{ParrotError, Result};

/// Configuration handed to a recognizer when listening starts.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// BCP 47 language tag, e.g. "en-US".
    pub language: String,
    /// Deliver partial hypotheses while the user is still speaking.
    pub interim_results: bool,
    /// Keep listening across pauses instead of ending after one utterance.
    pub continuous: bool,
}

impl RecognizerConfig {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            interim_results: true,
            continuous: true,
        }
    }
}

/// Events a recognizer reports while listening.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// The cumulative transcript fragments recognized so far.
    Result { fragments: Vec<String> },
    /// A recognition fault. The recognizer is done; the adapter returns to
    /// idle and reports the fault without blocking further attempts.
    Error(String),
    /// The recognizer stopped (end of speech or an explicit stop).
    End,
}

/// A speech-recognition capability.
///
/// Implementations push events into the provided channel until they emit
/// `End`. `stop` must be safe to call at any time, including when the
/// recognizer is not running.
pub trait SpeechRecognizer: Send + Sync {
    fn start(
        &self,
        config: &RecognizerConfig,
        events: mpsc::Sender<RecognitionEvent>,
    ) -> Result<()>;
    fn stop(&self);
}

/// Looks up a platform speech-recognition capability.
///
/// No terminal platform currently exposes one, so this returns `None` and
/// the voice feature reports `UnsupportedCapability` unless dictation is
/// simulated via configuration.
pub fn platform_recognizer() -> Option<Arc<dyn SpeechRecognizer>> {
    None
}

/// Adapter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Listening,
}

/// Wraps an optional recognizer into a toggleable dictation source.
///
/// Callers receive the full current hypothesis through `on_transcript` on
/// every partial update. Faults are surfaced as error notices on the session
/// event channel; the adapter then returns to idle so the user can retry.
pub struct VoiceCapture {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    config: RecognizerConfig,
    state: Arc<Mutex<CaptureState>>,
    /// Bumped on every listening start; pumps from earlier runs carry a
    /// stale value and must not touch the state.
    generation: Arc<AtomicU64>,
    on_transcript: Arc<dyn Fn(String) + Send + Sync>,
    notices: mpsc::Sender<SessionEvent>,
}

impl VoiceCapture {
    /// Creates an adapter.
    ///
    /// `recognizer` is `None` when the platform offers no speech capability;
    /// toggling then fails with `UnsupportedCapability` and the state stays
    /// idle.
    pub fn new(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        config: RecognizerConfig,
        notices: mpsc::Sender<SessionEvent>,
        on_transcript: impl Fn(String) + Send + Sync + 'static,
    ) -> Self {
        Self {
            recognizer,
            config,
            state: Arc::new(Mutex::new(CaptureState::Idle)),
            generation: Arc::new(AtomicU64::new(0)),
            on_transcript: Arc::new(on_transcript),
            notices,
        }
    }

    /// Current adapter state.
    pub fn state(&self) -> CaptureState {
        *self.state.lock().unwrap()
    }

    /// Toggles listening.
    ///
    /// Idle -> starts the recognizer and moves to `Listening`; Listening ->
    /// stops the recognizer and moves to `Idle`. Returns the new state.
    pub fn toggle(&self) -> Result<CaptureState> {
        let current = self.state();
        match current {
            CaptureState::Listening => {
                if let Some(recognizer) = &self.recognizer {
                    recognizer.stop();
                }
                self.set_state(CaptureState::Idle);
                Ok(CaptureState::Idle)
            }
            CaptureState::Idle => self.start_listening(),
        }
    }

    fn start_listening(&self) -> Result<CaptureState> {
        let Some(recognizer) = &self.recognizer else {
            return Err(ParrotError::unsupported_capability(
                "speech recognition is not available on this platform",
            ));
        };

        let (tx, mut rx) = mpsc::channel::<RecognitionEvent>(32);
        recognizer.start(&self.config, tx)?;
        self.set_state(CaptureState::Listening);
        let session = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        let on_transcript = Arc::clone(&self.on_transcript);
        let notices = self.notices.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                // A recognizer that outlives its stop can still emit; only
                // the current listening session may flip the state.
                let current = generation.load(Ordering::SeqCst) == session;
                match event {
                    RecognitionEvent::Result { fragments } => {
                        // Full current hypothesis, single-space joined.
                        on_transcript(fragments.join(" "));
                    }
                    RecognitionEvent::Error(message) => {
                        tracing::warn!("speech recognition fault: {message}");
                        if current {
                            *state.lock().unwrap() = CaptureState::Idle;
                        }
                        let _ = notices
                            .send(SessionEvent::Notice {
                                notice: Notice::error(format!(
                                    "Speech recognition error: {message}"
                                )),
                            })
                            .await;
                    }
                    RecognitionEvent::End => {
                        if current {
                            *state.lock().unwrap() = CaptureState::Idle;
                        }
                    }
                }
            }
        });

        Ok(CaptureState::Listening)
    }

    fn set_state(&self, new_state: CaptureState) {
        *self.state.lock().unwrap() = new_state;
    }
}

/// Replays a fixed fragment sequence as if it were dictated speech.
///
/// Backs the simulated dictation mode and the tests: each step appends one
/// fragment and reports the cumulative list, the way a continuous recognizer
/// with interim results does.
pub struct ScriptedRecognizer {
    fragments: Vec<String>,
    step_delay: Duration,
    stopped: Arc<AtomicBool>,
}

impl ScriptedRecognizer {
    pub fn new(fragments: Vec<String>) -> Self {
        Self {
            fragments,
            step_delay: Duration::from_millis(150),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Overrides the delay between fragments.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(
        &self,
        _config: &RecognizerConfig,
        events: mpsc::Sender<RecognitionEvent>,
    ) -> Result<()> {
        self.stopped.store(false, Ordering::SeqCst);
        let fragments = self.fragments.clone();
        let delay = self.step_delay;
        let stopped = Arc::clone(&self.stopped);

        tokio::spawn(async move {
            let mut heard: Vec<String> = Vec::new();
            for fragment in fragments {
                tokio::time::sleep(delay).await;
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                heard.push(fragment);
                if events
                    .send(RecognitionEvent::Result {
                        fragments: heard.clone(),
                    })
                    .await
                    .is_err()
                {
                    return;
                }
            }
            let _ = events.send(RecognitionEvent::End).await;
        });

        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn collector() -> (Arc<StdMutex<Vec<String>>>, impl Fn(String) + Send + Sync) {
        let heard = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&heard);
        (heard, move |hypothesis: String| {
            sink.lock().unwrap().push(hypothesis)
        })
    }

    #[tokio::test]
    async fn absent_capability_errors_and_stays_idle() {
        let (notices, _rx) = mpsc::channel(8);
        let (_, on_transcript) = collector();
        let capture = VoiceCapture::new(
            None,
            RecognizerConfig::new("en-US"),
            notices,
            on_transcript,
        );

        let err = capture.toggle().unwrap_err();
        assert!(err.is_unsupported_capability());
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn delivers_full_hypotheses_on_every_partial() {
        let recognizer = Arc::new(
            ScriptedRecognizer::new(vec!["hello".into(), "there".into(), "world".into()])
                .with_step_delay(Duration::from_millis(5)),
        );
        let (notices, _rx) = mpsc::channel(8);
        let (heard, on_transcript) = collector();
        let capture = VoiceCapture::new(
            Some(recognizer),
            RecognizerConfig::new("en-US"),
            notices,
            on_transcript,
        );

        assert_eq!(capture.toggle().unwrap(), CaptureState::Listening);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let heard = heard.lock().unwrap().clone();
        assert_eq!(
            heard,
            vec![
                "hello".to_string(),
                "hello there".to_string(),
                "hello there world".to_string(),
            ]
        );
        // Script exhausted -> End -> back to idle.
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn toggling_while_listening_stops_the_recognizer() {
        let recognizer = Arc::new(
            ScriptedRecognizer::new(vec!["one".into(), "two".into(), "three".into()])
                .with_step_delay(Duration::from_millis(30)),
        );
        let (notices, _rx) = mpsc::channel(8);
        let (heard, on_transcript) = collector();
        let capture = VoiceCapture::new(
            Some(recognizer),
            RecognizerConfig::new("en-US"),
            notices,
            on_transcript,
        );

        capture.toggle().unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(capture.toggle().unwrap(), CaptureState::Idle);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let count = heard.lock().unwrap().len();
        assert!(count < 3, "stop should cut the script short, got {count}");
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    /// Ends its first run well after `stop`, the way a recognizer whose stop
    /// is asynchronous does; later runs never end on their own.
    struct LingeringRecognizer {
        starts: AtomicU64,
        end_delay: Duration,
    }

    impl LingeringRecognizer {
        fn new(end_delay: Duration) -> Self {
            Self {
                starts: AtomicU64::new(0),
                end_delay,
            }
        }
    }

    impl SpeechRecognizer for LingeringRecognizer {
        fn start(
            &self,
            _config: &RecognizerConfig,
            events: mpsc::Sender<RecognitionEvent>,
        ) -> Result<()> {
            if self.starts.fetch_add(1, Ordering::SeqCst) == 0 {
                let delay = self.end_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(RecognitionEvent::End).await;
                });
            }
            Ok(())
        }

        fn stop(&self) {}
    }

    #[tokio::test]
    async fn late_end_from_a_previous_run_cannot_stop_the_current_one() {
        let recognizer = Arc::new(LingeringRecognizer::new(Duration::from_millis(40)));
        let (notices, _rx) = mpsc::channel(8);
        let (_, on_transcript) = collector();
        let capture = VoiceCapture::new(
            Some(recognizer),
            RecognizerConfig::new("en-US"),
            notices,
            on_transcript,
        );

        // First run, stopped immediately; its End is still in flight.
        assert_eq!(capture.toggle().unwrap(), CaptureState::Listening);
        assert_eq!(capture.toggle().unwrap(), CaptureState::Idle);

        // Second run starts before the stale End lands.
        assert_eq!(capture.toggle().unwrap(), CaptureState::Listening);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            capture.state(),
            CaptureState::Listening,
            "a stale End must not flip the live session back to idle"
        );
    }

    struct FaultyRecognizer;

    impl SpeechRecognizer for FaultyRecognizer {
        fn start(
            &self,
            _config: &RecognizerConfig,
            events: mpsc::Sender<RecognitionEvent>,
        ) -> Result<()> {
            tokio::spawn(async move {
                let _ = events
                    .send(RecognitionEvent::Error("no-speech".into()))
                    .await;
                let _ = events.send(RecognitionEvent::End).await;
            });
            Ok(())
        }

        fn stop(&self) {}
    }

    #[tokio::test]
    async fn fault_reports_a_notice_and_returns_to_idle() {
        let (notices, mut rx) = mpsc::channel(8);
        let (_, on_transcript) = collector();
        let capture = VoiceCapture::new(
            Some(Arc::new(FaultyRecognizer)),
            RecognizerConfig::new("en-US"),
            notices,
            on_transcript,
        );

        capture.toggle().unwrap();
        let event = tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            SessionEvent::Notice { notice } => {
                assert!(notice.text.contains("no-speech"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(capture.state(), CaptureState::Idle);

        // The fault does not block another attempt.
        assert_eq!(capture.toggle().unwrap(), CaptureState::Listening);
    }
}
