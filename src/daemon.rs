//! Daemon - the ambient display voice service
//!
//! Wires configuration, engines, the application store and the voice session
//! together, then runs until interrupted. Without a native keyword engine the
//! detector runs in simulation mode and stdin acts as the microphone.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::{LinesStream, WatchStream};

use crate::state::{AppState, MemoryStore};
use crate::voice::simulated::{SpeechController, simulated_speech};
use crate::voice::{
    KeywordEngineFactory, SpeechCapture, VoiceHandle, VoiceSession, VoiceSnapshot, VoiceState,
    WakeWordDetector, events,
};
use crate::{Config, Result};

/// The droid daemon - owns the voice session for its lifetime
pub struct Daemon {
    config: Config,
    keyword_factory: Option<Box<dyn KeywordEngineFactory>>,
}

/// A line typed on the development console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Fire the wake word
    Wake,
    /// Enable or disable the pipeline
    Enable(bool),
    /// Something the user "said"
    Say(String),
}

impl ConsoleInput {
    /// Interpret a console line; blank lines are ignored
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" => None,
            ":wake" => Some(Self::Wake),
            ":on" => Some(Self::Enable(true)),
            ":off" => Some(Self::Enable(false)),
            _ => Some(Self::Say(line.to_string())),
        }
    }
}

impl Daemon {
    /// Create a new daemon instance
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            keyword_factory: None,
        }
    }

    /// Use a native keyword engine instead of simulation
    #[must_use]
    pub fn with_keyword_factory(mut self, factory: Box<dyn KeywordEngineFactory>) -> Self {
        self.keyword_factory = Some(factory);
        self
    }

    /// Run the daemon until ctrl-c
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be assembled
    pub async fn run(self) -> Result<()> {
        let config = self.config;
        let wake_phrases = config.wake_word.wake_phrases()?;

        let (tx, rx) = events::channel();

        let mut detector = WakeWordDetector::new(&config.wake_word, tx.clone());
        detector.initialize(self.keyword_factory.as_deref()).await;

        let (engine, controller) = simulated_speech(tx.clone());
        let capture = SpeechCapture::new(Box::new(engine), config.capture.clone(), tx.clone());
        let store = MemoryStore::new(config.display.slide_count);

        let session = VoiceSession::new(
            store,
            detector,
            capture,
            wake_phrases,
            config.session.clone(),
            &config.feedback,
            (tx, rx),
        );
        let handle = session.handle();

        // Set up shutdown signal
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(()).await;
            }
        });

        let watcher = tokio::spawn(watch_snapshots(handle.clone()));
        let console = tokio::spawn(run_console(handle, controller));

        tracing::info!(
            keyword = %config.wake_word.keyword,
            enabled = config.session.enabled,
            "droid ready - type \":wake\" or just speak a command"
        );

        let store = session.run(&mut shutdown_rx).await;

        console.abort();
        watcher.abort();

        tracing::info!(
            todos = store.todos().len(),
            open = store.todos().iter().filter(|t| !t.completed).count(),
            "daemon stopped"
        );
        Ok(())
    }
}

/// Drive the session from stdin
///
/// Typed lines go through [`say_line`].
async fn run_console(handle: VoiceHandle, controller: SpeechController) {
    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "console read failed");
                break;
            }
        };

        match ConsoleInput::parse(&line) {
            None => {}
            Some(ConsoleInput::Wake) => handle.trigger_wake_word(),
            Some(ConsoleInput::Enable(enabled)) => handle.set_enabled(enabled),
            Some(ConsoleInput::Say(text)) => {
                say_line(&handle, &controller, text);
            }
        }
    }

    tracing::debug!("console closed");
}

/// Speak a typed line into the session
///
/// While idle the line wakes the session and is heard as soon as capture
/// opens; while listening it is heard straight away. Otherwise the session is
/// busy and the line is dropped. Returns whether the line was accepted.
pub fn say_line(handle: &VoiceHandle, controller: &SpeechController, text: String) -> bool {
    match handle.snapshot().state {
        VoiceState::Idle => {
            // Text left over from a pass that never opened must not be heard later
            controller.clear_queue();
            controller.say(text);
            handle.trigger_wake_word();
            true
        }
        VoiceState::Listening => {
            controller.say(text);
            true
        }
        state => {
            tracing::info!(%state, utterance = %text, "session busy, ignored");
            false
        }
    }
}

/// Log observable state changes
async fn watch_snapshots(handle: VoiceHandle) {
    let mut snapshots = WatchStream::new(handle.subscribe());
    let mut last = VoiceSnapshot::default();

    while let Some(snapshot) = snapshots.next().await {
        if snapshot == last {
            continue;
        }

        if snapshot.state != last.state {
            tracing::debug!(from = %last.state, to = %snapshot.state, "voice state changed");
        }
        if snapshot.partial_transcript != last.partial_transcript {
            if let Some(partial) = &snapshot.partial_transcript {
                tracing::info!(hearing = %partial, "listening");
            }
        }
        if snapshot.confirmation != last.confirmation {
            if let Some(message) = &snapshot.confirmation {
                println!("  > {message}");
            }
        }
        last = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_input() {
        assert_eq!(ConsoleInput::parse("   "), None);
        assert_eq!(ConsoleInput::parse(":wake"), Some(ConsoleInput::Wake));
        assert_eq!(ConsoleInput::parse(" :off "), Some(ConsoleInput::Enable(false)));
        assert_eq!(ConsoleInput::parse(":on"), Some(ConsoleInput::Enable(true)));
        assert_eq!(
            ConsoleInput::parse("next slide"),
            Some(ConsoleInput::Say("next slide".to_string()))
        );
    }
}
