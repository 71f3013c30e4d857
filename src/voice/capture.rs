//! Speech capture following a wake word
//!
//! Wraps an external speech-to-text engine behind a bounded listening window.
//! Failures never leave this module as errors: they are posted to the session
//! as [`SpeechEvent::Error`] so the session reacts to them like any other
//! engine event.

use async_trait::async_trait;

use super::events::{EventSender, SpeechEvent, TimerKind};
use super::timer::Timer;
use crate::Result;
use crate::config::CaptureConfig;

/// Options for one recognition pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP-47 language tag (e.g. "en-US")
    pub language: String,
    /// Emit partial transcripts while the user speaks
    pub interim_results: bool,
    /// Keep listening after the first final transcript
    pub continuous: bool,
    /// Capture pass; the engine tags every event it reports with it
    pub pass: u64,
}

/// An external speech recognition engine
///
/// Transcripts and errors are reported through the [`EventSender`] the
/// engine was constructed with, tagged with [`RecognitionOptions::pass`].
#[async_trait]
pub trait SpeechEngine: Send {
    /// Engine name for logs
    fn name(&self) -> &'static str;

    /// Whether recognition is supported in this environment
    async fn is_available(&mut self) -> bool {
        true
    }

    /// Ask for microphone access; `Ok(false)` means refused
    ///
    /// # Errors
    ///
    /// Returns error if the permission prompt itself fails
    async fn request_permission(&mut self) -> Result<bool>;

    /// Begin recognition
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot start
    async fn start(&mut self, options: &RecognitionOptions) -> Result<()>;

    /// End recognition early
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to stop
    async fn stop(&mut self) -> Result<()>;
}

/// What an engine event means for the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// User is still speaking
    Partial(String),
    /// Utterance complete
    Final(String),
    /// Recognition failed
    Failed(String),
    /// Engine stopped without a final transcript
    Ended,
    /// No new speech within the silence window
    TimedOut,
}

/// Speech capture with a silence timeout
pub struct SpeechCapture {
    engine: Box<dyn SpeechEngine>,
    options: RecognitionOptions,
    config: CaptureConfig,
    events: EventSender,
    silence: Timer,
    active: bool,
    engine_running: bool,
    partial: Option<String>,
    last_error: Option<String>,
}

impl SpeechCapture {
    /// Wrap an engine
    #[must_use]
    pub fn new(engine: Box<dyn SpeechEngine>, config: CaptureConfig, events: EventSender) -> Self {
        let options = RecognitionOptions {
            language: config.language.clone(),
            interim_results: true,
            continuous: false,
            pass: 0,
        };

        Self {
            engine,
            options,
            config,
            events,
            silence: Timer::new(TimerKind::Silence),
            active: false,
            engine_running: false,
            partial: None,
            last_error: None,
        }
    }

    /// Begin a capture pass
    ///
    /// Emits zero or more partials, then exactly one of a final transcript,
    /// an error, or a silent stop. Start-up failures (unsupported
    /// environment, permission refused, engine error) are posted as
    /// [`SpeechEvent::Error`].
    pub async fn start(&mut self) {
        if self.active {
            tracing::debug!("speech capture already active");
            return;
        }

        self.active = true;
        self.options.pass += 1;
        self.partial = None;
        self.last_error = None;

        if !self.engine.is_available().await {
            self.fail_start("Speech recognition not available");
            return;
        }

        match self.engine.request_permission().await {
            Ok(true) => {}
            Ok(false) => {
                self.fail_start("Microphone permission denied");
                return;
            }
            Err(e) => {
                self.fail_start(&e.to_string());
                return;
            }
        }

        if let Err(e) = self.engine.start(&self.options).await {
            self.fail_start(&e.to_string());
            return;
        }

        self.engine_running = true;
        self.silence.arm(self.config.silence_timeout, &self.events);
        tracing::debug!(
            engine = self.engine.name(),
            language = %self.options.language,
            pass = self.options.pass,
            "speech capture started"
        );
    }

    /// Interpret an engine event
    ///
    /// Returns `None` for stale engine output: no pass is active, or the
    /// event belongs to an earlier pass.
    pub async fn handle_event(&mut self, pass: u64, event: SpeechEvent) -> Option<CaptureOutcome> {
        if !self.active {
            tracing::trace!(?event, "speech event outside capture, ignored");
            return None;
        }
        if pass != self.options.pass {
            tracing::debug!(
                pass,
                current = self.options.pass,
                ?event,
                "speech event from earlier pass, ignored"
            );
            return None;
        }

        match event {
            SpeechEvent::Partial(text) => {
                tracing::debug!(hearing = %text, "partial transcript");
                self.silence.arm(self.config.silence_timeout, &self.events);
                self.partial = Some(text.clone());
                Some(CaptureOutcome::Partial(text))
            }
            SpeechEvent::Final(text) => {
                tracing::info!(transcript = %text, "final transcript");
                self.stop().await;
                Some(CaptureOutcome::Final(text))
            }
            SpeechEvent::Error(reason) => {
                tracing::warn!(error = %reason, "speech capture error");
                self.last_error = Some(reason.clone());
                self.engine_running = false;
                self.stop().await;
                Some(CaptureOutcome::Failed(reason))
            }
            SpeechEvent::Ended => {
                tracing::debug!("speech engine ended without a transcript");
                self.engine_running = false;
                self.stop().await;
                Some(CaptureOutcome::Ended)
            }
        }
    }

    /// Handle a silence timer expiry
    pub async fn on_silence_elapsed(&mut self, generation: u64) -> Option<CaptureOutcome> {
        if !self.silence.fire(generation) || !self.active {
            return None;
        }

        tracing::info!(
            timeout_ms = self.config.silence_timeout.as_millis(),
            "no speech, stopping capture"
        );
        self.stop().await;
        Some(CaptureOutcome::TimedOut)
    }

    /// End capture early; idempotent
    pub async fn stop(&mut self) {
        self.silence.cancel();
        self.active = false;
        self.partial = None;

        if !self.engine_running {
            return;
        }
        self.engine_running = false;

        if let Err(e) = self.engine.stop().await {
            tracing::error!(error = %e, "stop listening error");
        } else {
            tracing::debug!("speech capture stopped");
        }
    }

    /// Whether a capture pass is in progress
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.active
    }

    /// Latest partial transcript of the current pass
    #[must_use]
    pub fn partial(&self) -> Option<&str> {
        self.partial.as_deref()
    }

    /// Current (or most recent) capture pass
    #[must_use]
    pub const fn pass(&self) -> u64 {
        self.options.pass
    }

    /// Most recent capture error
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn fail_start(&mut self, reason: &str) {
        tracing::warn!(error = %reason, "speech capture failed to start");
        self.last_error = Some(reason.to_string());
        self.events.speech_error(self.options.pass, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::events;
    use crate::voice::simulated::simulated_speech;

    fn new_capture() -> (SpeechCapture, crate::voice::simulated::SpeechController) {
        let (tx, _rx) = events::channel();
        let (engine, controller) = simulated_speech(tx.clone());
        (
            SpeechCapture::new(Box::new(engine), CaptureConfig::default(), tx),
            controller,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_start_is_a_new_pass() {
        let (mut capture, controller) = new_capture();

        capture.start().await;
        assert_eq!(capture.pass(), 1);
        assert_eq!(controller.last_options().map(|o| o.pass), Some(1));

        capture.stop().await;
        capture.start().await;
        assert_eq!(capture.pass(), 2);
        assert_eq!(controller.last_options().map(|o| o.pass), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_from_earlier_pass_ignored() {
        let (mut capture, _controller) = new_capture();

        capture.start().await;
        capture.stop().await;
        capture.start().await;

        assert_eq!(capture.handle_event(1, SpeechEvent::Ended).await, None);
        assert_eq!(
            capture
                .handle_event(1, SpeechEvent::Error("late".to_string()))
                .await,
            None
        );
        assert!(capture.is_listening());
        assert_eq!(capture.last_error(), None);

        assert_eq!(
            capture.handle_event(2, SpeechEvent::Ended).await,
            Some(CaptureOutcome::Ended)
        );
        assert!(!capture.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_while_inactive_ignored() {
        let (mut capture, _controller) = new_capture();
        assert_eq!(
            capture
                .handle_event(0, SpeechEvent::Final("next".to_string()))
                .await,
            None
        );
    }
}
