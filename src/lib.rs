//! Droid Voice - voice command pipeline for an ambient display
//!
//! This library provides the voice front-end of a family dashboard / photo
//! frame:
//! - Wake word detection with a simulation fallback
//! - Speech capture with a silence timeout
//! - A fixed command grammar and its dispatch onto application state
//! - The session state machine and confirmation feedback
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Engines (injected)                   │
//! │      KeywordEngine      │      SpeechEngine          │
//! └────────────────────┬────────────────────────────────┘
//!                      │ VoiceEvent
//! ┌────────────────────▼────────────────────────────────┐
//! │                  VoiceSession                        │
//! │  Detector │ Capture │ Parser │ Dispatch │ Feedback   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    AppState                          │
//! │   Todos  │  Calendar  │  Slideshow  │  Settings     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod config;
pub mod daemon;
pub mod error;
pub mod state;
pub mod voice;

pub use command::{VoiceCommand, dispatch, parse, strip_wake_phrase};
pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use state::{AppState, MemoryStore, TodoItem};
pub use voice::{VoiceHandle, VoiceSession, VoiceSnapshot, VoiceState};
