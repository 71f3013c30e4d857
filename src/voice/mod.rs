//! Voice command pipeline
//!
//! Wake word detection, speech capture, confirmation feedback, and the
//! session orchestrator that sequences them. Real keyword and speech engines
//! plug in through [`KeywordEngineFactory`] and [`SpeechEngine`].

mod capture;
pub mod events;
mod feedback;
mod session;
pub mod simulated;
mod timer;
mod wake_word;

pub use capture::{CaptureOutcome, RecognitionOptions, SpeechCapture, SpeechEngine};
pub use events::{EventReceiver, EventSender, SpeechEvent, TimerKind, VoiceEvent};
pub use feedback::ConfirmationFeedback;
pub use session::{VoiceHandle, VoiceSession, VoiceSnapshot, VoiceState};
pub use timer::Timer;
pub use wake_word::{
    DetectorMode, KeywordEngine, KeywordEngineFactory, KeywordOptions, WakeWordDetector,
};
