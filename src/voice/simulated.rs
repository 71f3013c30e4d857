//! Stand-in engines for environments without real speech hardware
//!
//! Both engines implement the same traits as real ones and are injected at
//! construction. A controller handle lets the console (or a test) script
//! what the "microphone" hears.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::capture::{RecognitionOptions, SpeechEngine};
use super::events::EventSender;
use super::wake_word::{KeywordEngine, KeywordEngineFactory, KeywordOptions};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct SpeechState {
    listening: bool,
    unavailable: bool,
    permission_denied: bool,
    fail_start: Option<String>,
    queued: VecDeque<String>,
    pass: u64,
    starts: usize,
    stops: usize,
    last_options: Option<RecognitionOptions>,
}

/// Scripted speech recognizer
pub struct SimulatedSpeechEngine {
    state: Arc<Mutex<SpeechState>>,
    events: EventSender,
}

/// Controls what a [`SimulatedSpeechEngine`] hears
#[derive(Clone)]
pub struct SpeechController {
    state: Arc<Mutex<SpeechState>>,
    events: EventSender,
}

/// Create a simulated recognizer and its controller
#[must_use]
pub fn simulated_speech(events: EventSender) -> (SimulatedSpeechEngine, SpeechController) {
    let state = Arc::new(Mutex::new(SpeechState::default()));
    (
        SimulatedSpeechEngine {
            state: Arc::clone(&state),
            events: events.clone(),
        },
        SpeechController { state, events },
    )
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl SpeechEngine for SimulatedSpeechEngine {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn is_available(&mut self) -> bool {
        !lock(&self.state).unavailable
    }

    async fn request_permission(&mut self) -> Result<bool> {
        Ok(!lock(&self.state).permission_denied)
    }

    async fn start(&mut self, options: &RecognitionOptions) -> Result<()> {
        let mut state = lock(&self.state);
        if let Some(reason) = state.fail_start.take() {
            return Err(Error::Speech(reason));
        }

        state.listening = true;
        state.pass = options.pass;
        state.starts += 1;
        state.last_options = Some(options.clone());

        // Speech typed before the wake word is heard as soon as capture opens
        if let Some(text) = state.queued.pop_front() {
            self.events.final_transcript(options.pass, text);
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.listening = false;
        state.stops += 1;
        Ok(())
    }
}

impl SpeechController {
    /// Speak a complete utterance
    ///
    /// Delivered as a final transcript while listening, otherwise queued for
    /// the next capture pass.
    pub fn say(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = lock(&self.state);
        if state.listening {
            self.events.final_transcript(state.pass, text);
        } else {
            state.queued.push_back(text);
        }
    }

    /// Deliver a partial transcript if listening
    pub fn hear_partial(&self, text: impl Into<String>) {
        let state = lock(&self.state);
        if state.listening {
            self.events.partial(state.pass, text);
        }
    }

    /// Report a recognition error if listening; the engine stops itself
    pub fn fail(&self, reason: impl Into<String>) {
        let mut state = lock(&self.state);
        if state.listening {
            state.listening = false;
            self.events.speech_error(state.pass, reason);
        }
    }

    /// End the pass without a transcript if listening
    pub fn end(&self) {
        let mut state = lock(&self.state);
        if state.listening {
            state.listening = false;
            self.events.speech_ended(state.pass);
        }
    }

    /// Refuse microphone access on the next start
    pub fn deny_permission(&self, denied: bool) {
        lock(&self.state).permission_denied = denied;
    }

    /// Report recognition as unsupported
    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }

    /// Make the next engine start fail with this reason
    pub fn fail_next_start(&self, reason: impl Into<String>) {
        lock(&self.state).fail_start = Some(reason.into());
    }

    /// Whether the engine is listening
    #[must_use]
    pub fn is_listening(&self) -> bool {
        lock(&self.state).listening
    }

    /// Number of engine starts
    #[must_use]
    pub fn starts(&self) -> usize {
        lock(&self.state).starts
    }

    /// Number of engine stops
    #[must_use]
    pub fn stops(&self) -> usize {
        lock(&self.state).stops
    }

    /// Options passed to the most recent start
    #[must_use]
    pub fn last_options(&self) -> Option<RecognitionOptions> {
        lock(&self.state).last_options.clone()
    }

    /// Drop utterances queued for a future pass
    pub fn clear_queue(&self) {
        lock(&self.state).queued.clear();
    }
}

#[derive(Debug, Default)]
struct KeywordState {
    events: Option<EventSender>,
    options: Option<KeywordOptions>,
    armed: bool,
    starts: usize,
    stops: usize,
}

/// Keyword engine that fires only when told to
struct ManualKeywordEngine {
    state: Arc<Mutex<KeywordState>>,
}

/// Factory for manually triggered keyword engines
pub struct ManualKeywordFactory {
    state: Arc<Mutex<KeywordState>>,
}

/// Fires the wake word of a [`ManualKeywordFactory`] engine
#[derive(Clone)]
pub struct KeywordTrigger {
    state: Arc<Mutex<KeywordState>>,
}

/// Create a manual keyword factory and its trigger
#[must_use]
pub fn manual_keyword() -> (ManualKeywordFactory, KeywordTrigger) {
    let state = Arc::new(Mutex::new(KeywordState::default()));
    (
        ManualKeywordFactory {
            state: Arc::clone(&state),
        },
        KeywordTrigger { state },
    )
}

#[async_trait]
impl KeywordEngineFactory for ManualKeywordFactory {
    async fn create(
        &self,
        options: &KeywordOptions,
        events: EventSender,
    ) -> Result<Box<dyn KeywordEngine>> {
        let mut state = lock(&self.state);
        state.events = Some(events);
        state.options = Some(options.clone());
        Ok(Box::new(ManualKeywordEngine {
            state: Arc::clone(&self.state),
        }))
    }
}

#[async_trait]
impl KeywordEngine for ManualKeywordEngine {
    fn name(&self) -> &'static str {
        "manual"
    }

    async fn start(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.armed = true;
        state.starts += 1;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.armed = false;
        state.stops += 1;
        Ok(())
    }
}

impl KeywordTrigger {
    /// Simulate the wake phrase being heard
    ///
    /// Returns false (and sends nothing) unless the engine is armed.
    pub fn fire(&self) -> bool {
        let state = lock(&self.state);
        match (&state.events, state.armed) {
            (Some(events), true) => {
                events.wake_word_detected();
                true
            }
            _ => false,
        }
    }

    /// Whether the engine is armed
    #[must_use]
    pub fn is_armed(&self) -> bool {
        lock(&self.state).armed
    }

    /// Number of engine starts
    #[must_use]
    pub fn starts(&self) -> usize {
        lock(&self.state).starts
    }

    /// Number of engine stops
    #[must_use]
    pub fn stops(&self) -> usize {
        lock(&self.state).stops
    }

    /// Options the engine was created with
    #[must_use]
    pub fn options(&self) -> Option<KeywordOptions> {
        lock(&self.state).options.clone()
    }
}
