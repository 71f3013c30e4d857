//! Voice session orchestrator
//!
//! A single actor that owns the session state machine:
//!
//! ```text
//!   Idle ──wake word──▶ Listening ──final──▶ Processing ──▶ Confirming
//!    ▲                     │                                   │
//!    └──error / silence────┘◀───────── confirming hold ────────┘
//! ```
//!
//! Engine callbacks and timers reach it as [`VoiceEvent`]s and are handled
//! one at a time, so every handler either no-ops or makes exactly one
//! transition. The wake word detector is armed only while idle, and the two
//! engines are never running at the same time.

use serde::Serialize;
use tokio::sync::{mpsc, watch};

use super::capture::{CaptureOutcome, SpeechCapture};
use super::events::{EventReceiver, EventSender, SpeechEvent, TimerKind, VoiceEvent};
use super::feedback::ConfirmationFeedback;
use super::timer::Timer;
use super::wake_word::WakeWordDetector;
use crate::command::{self, VoiceCommand, WakePhrases};
use crate::config::{FeedbackConfig, SessionConfig};
use crate::state::AppState;

/// Where the session is in its cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceState {
    /// Waiting for the wake word
    #[default]
    Idle,
    /// Capturing the follow-up utterance
    Listening,
    /// Parsing and dispatching
    Processing,
    /// Showing the outcome before returning to idle
    Confirming,
}

impl std::fmt::Display for VoiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listening => write!(f, "listening"),
            Self::Processing => write!(f, "processing"),
            Self::Confirming => write!(f, "confirming"),
        }
    }
}

/// What a presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoiceSnapshot {
    /// Session state
    pub state: VoiceState,
    /// Visible confirmation message
    pub confirmation: Option<String>,
    /// What the user is saying right now
    pub partial_transcript: Option<String>,
    /// Most recently dispatched command
    pub last_command: Option<VoiceCommand>,
}

/// Cheap handle for driving and observing a running session
#[derive(Clone)]
pub struct VoiceHandle {
    events: EventSender,
    snapshot: watch::Receiver<VoiceSnapshot>,
}

impl VoiceHandle {
    /// Development trigger: same path as a detected wake word
    pub fn trigger_wake_word(&self) {
        tracing::debug!("manual wake word trigger");
        self.events.wake_word_detected();
    }

    /// Enable or disable the pipeline
    pub fn set_enabled(&self, enabled: bool) {
        self.events.send(VoiceEvent::SetEnabled(enabled));
    }

    /// Current observable state
    #[must_use]
    pub fn snapshot(&self) -> VoiceSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to observable state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<VoiceSnapshot> {
        self.snapshot.clone()
    }
}

/// The voice session orchestrator
pub struct VoiceSession<S> {
    store: S,
    detector: WakeWordDetector,
    capture: SpeechCapture,
    feedback: ConfirmationFeedback,
    wake_phrases: WakePhrases,
    config: SessionConfig,
    state: VoiceState,
    enabled: bool,
    processing_in_flight: bool,
    cooldown: Timer,
    confirming_hold: Timer,
    last_command: Option<VoiceCommand>,
    events: EventSender,
    events_rx: EventReceiver,
    snapshot_tx: watch::Sender<VoiceSnapshot>,
}

impl<S: AppState> VoiceSession<S> {
    /// Assemble a session
    ///
    /// `events` must be the pair whose sender was given to the detector and
    /// capture engines.
    #[must_use]
    pub fn new(
        store: S,
        detector: WakeWordDetector,
        capture: SpeechCapture,
        wake_phrases: WakePhrases,
        config: SessionConfig,
        feedback: &FeedbackConfig,
        events: (EventSender, EventReceiver),
    ) -> Self {
        let (events, events_rx) = events;
        let (snapshot_tx, _) = watch::channel(VoiceSnapshot::default());

        Self {
            store,
            detector,
            capture,
            feedback: ConfirmationFeedback::new(feedback.display_for),
            wake_phrases,
            enabled: config.enabled,
            config,
            state: VoiceState::Idle,
            processing_in_flight: false,
            cooldown: Timer::new(TimerKind::ProcessingCooldown),
            confirming_hold: Timer::new(TimerKind::ConfirmingHold),
            last_command: None,
            events,
            events_rx,
            snapshot_tx,
        }
    }

    /// Handle for triggering and observing this session
    #[must_use]
    pub fn handle(&self) -> VoiceHandle {
        VoiceHandle {
            events: self.events.clone(),
            snapshot: self.snapshot_tx.subscribe(),
        }
    }

    /// Arm the detector for the first time
    pub async fn start(&mut self) {
        tracing::info!(
            enabled = self.enabled,
            ready = self.detector.is_ready(),
            mode = ?self.detector.mode(),
            keyword = self.detector.keyword(),
            "voice session starting"
        );
        if self.enabled && self.state == VoiceState::Idle {
            self.arm_detector().await;
        }
        self.publish();
    }

    /// Process events until shutdown is signalled
    pub async fn run(mut self, shutdown_rx: &mut mpsc::Receiver<()>) -> S {
        self.start().await;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("voice session shutting down");
                    break;
                }
                event = self.events_rx.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event).await;
                }
            }
        }

        self.set_enabled(false).await;
        self.store
    }

    /// Wait for and handle one event
    ///
    /// Returns false if the channel closed.
    pub async fn step(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    /// Handle one queued event without waiting
    ///
    /// Returns false if nothing was queued.
    pub async fn try_step(&mut self) -> bool {
        match self.events_rx.try_recv() {
            Ok(event) => {
                self.handle_event(event).await;
                true
            }
            Err(_) => false,
        }
    }

    /// React to a single event
    pub async fn handle_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::WakeWordDetected => self.on_wake_word().await,
            VoiceEvent::WakeWordError(reason) => self.detector.record_error(reason),
            VoiceEvent::Speech { pass, event } => self.on_speech(pass, event).await,
            VoiceEvent::TimerElapsed { kind, generation } => self.on_timer(kind, generation).await,
            VoiceEvent::SetEnabled(enabled) => self.set_enabled(enabled).await,
        }
    }

    async fn on_wake_word(&mut self) {
        if !self.enabled {
            tracing::debug!("wake word ignored, voice disabled");
            return;
        }
        if self.state != VoiceState::Idle {
            tracing::debug!(state = %self.state, "wake word ignored, session busy");
            return;
        }

        tracing::info!("wake word detected - starting speech recognition");

        // Both engines want the microphone; the detector must let go first
        if let Err(e) = self.detector.stop().await {
            tracing::warn!(error = %e, "failed to stop wake word detector");
        }

        self.transition(VoiceState::Listening);
        self.capture.start().await;
    }

    async fn on_speech(&mut self, pass: u64, event: SpeechEvent) {
        if matches!(event, SpeechEvent::Final(_)) && self.processing_in_flight {
            tracing::debug!("duplicate final transcript dropped");
            return;
        }

        let Some(outcome) = self.capture.handle_event(pass, event).await else {
            return;
        };

        match outcome {
            CaptureOutcome::Partial(_) => {
                if self.state == VoiceState::Listening {
                    self.publish();
                }
            }
            CaptureOutcome::Final(text) => {
                if self.state == VoiceState::Listening {
                    self.process_transcript(&text);
                } else {
                    tracing::debug!(state = %self.state, "final transcript outside listening, dropped");
                }
            }
            CaptureOutcome::Failed(_) | CaptureOutcome::Ended | CaptureOutcome::TimedOut => {
                self.abandon_listening().await;
            }
        }
    }

    async fn on_timer(&mut self, kind: TimerKind, generation: u64) {
        match kind {
            TimerKind::Silence => {
                if self.capture.on_silence_elapsed(generation).await.is_some() {
                    self.abandon_listening().await;
                }
            }
            TimerKind::ProcessingCooldown => {
                if self.cooldown.fire(generation) {
                    self.processing_in_flight = false;
                    tracing::trace!("processing guard cleared");
                }
            }
            TimerKind::ConfirmingHold => {
                if self.confirming_hold.fire(generation) && self.state == VoiceState::Confirming {
                    self.transition(VoiceState::Idle);
                    self.arm_detector().await;
                }
            }
            TimerKind::ConfirmationExpiry => {
                if self.feedback.on_expired(generation) {
                    self.publish();
                }
            }
        }
    }

    /// Listening → Processing → Confirming, all in one tick
    fn process_transcript(&mut self, transcript: &str) {
        self.processing_in_flight = true;
        self.cooldown
            .arm(self.config.processing_cooldown, &self.events);
        self.transition(VoiceState::Processing);

        let text = self.wake_phrases.strip(transcript);
        let command = command::parse(&text);
        tracing::info!(command = command.kind(), utterance = %text, "executing voice command");

        let confirmation = command::dispatch(&command, &mut self.store);
        self.last_command = Some(command);
        self.feedback.show(confirmation, &self.events);

        self.transition(VoiceState::Confirming);
        self.confirming_hold
            .arm(self.config.confirm_hold, &self.events);
    }

    /// Capture ended without a command: back to idle, nothing reported
    async fn abandon_listening(&mut self) {
        if self.state != VoiceState::Listening {
            return;
        }
        self.capture.stop().await;
        self.transition(VoiceState::Idle);
        self.arm_detector().await;
    }

    async fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        tracing::info!(enabled, "voice pipeline toggled");

        if enabled {
            if self.state == VoiceState::Idle {
                self.arm_detector().await;
            }
            return;
        }

        if let Err(e) = self.detector.stop().await {
            tracing::warn!(error = %e, "failed to stop wake word detector");
        }
        self.capture.stop().await;
        self.cooldown.cancel();
        self.confirming_hold.cancel();
        self.processing_in_flight = false;
        self.feedback.clear();

        if self.state == VoiceState::Idle {
            self.publish();
        } else {
            self.transition(VoiceState::Idle);
        }
    }

    async fn arm_detector(&mut self) {
        if !self.enabled || !self.detector.is_ready() {
            return;
        }
        if let Err(e) = self.detector.start().await {
            tracing::warn!(error = %e, "failed to start wake word detector");
        }
    }

    fn transition(&mut self, to: VoiceState) {
        tracing::debug!(from = %self.state, to = %to, "voice state");
        self.state = to;
        self.publish();
    }

    fn publish(&self) {
        let snapshot = VoiceSnapshot {
            state: self.state,
            confirmation: self.feedback.message().map(ToString::to_string),
            partial_transcript: if self.state == VoiceState::Listening {
                self.capture.partial().map(ToString::to_string)
            } else {
                None
            },
            last_command: self.last_command.clone(),
        };
        self.snapshot_tx.send_replace(snapshot);
    }

    /// Current session state
    #[must_use]
    pub const fn state(&self) -> VoiceState {
        self.state
    }

    /// Whether the pipeline is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a processing pass is still within its cooldown
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        self.processing_in_flight
    }

    /// Visible confirmation message
    #[must_use]
    pub fn confirmation(&self) -> Option<&str> {
        self.feedback.message()
    }

    /// Observable state as last published
    #[must_use]
    pub fn snapshot(&self) -> VoiceSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// The wake word detector
    #[must_use]
    pub const fn detector(&self) -> &WakeWordDetector {
        &self.detector
    }

    /// The speech capture
    #[must_use]
    pub const fn capture(&self) -> &SpeechCapture {
        &self.capture
    }

    /// Application state
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}
