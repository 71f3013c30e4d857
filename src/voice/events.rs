//! Events delivered to the voice session
//!
//! Engine callbacks and timer expiries arrive outside the session's own call
//! stack. They are funnelled through one channel so the session handles them
//! strictly one at a time.

use tokio::sync::mpsc;

/// Output of a speech recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Provisional transcript, may still change
    Partial(String),
    /// Committed transcript
    Final(String),
    /// Recognition failed; human-readable reason
    Error(String),
    /// The engine stopped listening
    Ended,
}

/// Which session timer elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// No new speech within the silence window
    Silence,
    /// Processing guard cooldown
    ProcessingCooldown,
    /// Confirming hold before returning to idle
    ConfirmingHold,
    /// Confirmation message auto-clear
    ConfirmationExpiry,
}

/// Anything the session reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// The wake phrase was heard (or triggered manually)
    WakeWordDetected,
    /// The keyword engine reported a runtime error
    WakeWordError(String),
    /// Speech recognition output
    Speech {
        /// Capture pass the engine was started for
        pass: u64,
        /// What the engine reported
        event: SpeechEvent,
    },
    /// A timer armed with this generation elapsed
    TimerElapsed {
        /// Timer that fired
        kind: TimerKind,
        /// Arm generation, used to discard superseded expiries
        generation: u64,
    },
    /// Enable or disable the pipeline
    SetEnabled(bool),
}

/// Cloneable sender used by engines, timers and handles
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<VoiceEvent>,
}

/// Receiving end owned by the session
pub type EventReceiver = mpsc::UnboundedReceiver<VoiceEvent>;

/// Create a connected sender/receiver pair
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

impl EventSender {
    /// Send an event; a closed session is not an error for the caller
    pub fn send(&self, event: VoiceEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("voice session gone, event dropped");
        }
    }

    /// Report a wake word detection
    pub fn wake_word_detected(&self) {
        self.send(VoiceEvent::WakeWordDetected);
    }

    /// Report a keyword engine error
    pub fn wake_word_error(&self, reason: impl Into<String>) {
        self.send(VoiceEvent::WakeWordError(reason.into()));
    }

    /// Report a partial transcript for a capture pass
    pub fn partial(&self, pass: u64, text: impl Into<String>) {
        self.speech(pass, SpeechEvent::Partial(text.into()));
    }

    /// Report a final transcript for a capture pass
    pub fn final_transcript(&self, pass: u64, text: impl Into<String>) {
        self.speech(pass, SpeechEvent::Final(text.into()));
    }

    /// Report a recognition error for a capture pass
    pub fn speech_error(&self, pass: u64, reason: impl Into<String>) {
        self.speech(pass, SpeechEvent::Error(reason.into()));
    }

    /// Report that the recognizer stopped
    pub fn speech_ended(&self, pass: u64) {
        self.speech(pass, SpeechEvent::Ended);
    }

    fn speech(&self, pass: u64, event: SpeechEvent) {
        self.send(VoiceEvent::Speech { pass, event });
    }
}
