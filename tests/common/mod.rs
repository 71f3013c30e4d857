//! Shared test utilities
#![allow(dead_code)]

use std::time::Duration;

use droid_voice::MemoryStore;
use droid_voice::config::{Config, WakeWordConfig};
use droid_voice::voice::simulated::{
    KeywordTrigger, SpeechController, manual_keyword, simulated_speech,
};
use droid_voice::voice::{SpeechCapture, VoiceSession, WakeWordDetector, events};

/// A session wired to scriptable engines
pub struct Harness {
    pub session: VoiceSession<MemoryStore>,
    pub speech: SpeechController,
    pub keyword: KeywordTrigger,
}

/// Default timings: silence 5000 ms, cooldown 1000 ms, hold 2000 ms, display 3000 ms
pub fn test_config() -> Config {
    Config {
        wake_word: WakeWordConfig {
            access_key: Some("test-key".to_string()),
            ..WakeWordConfig::default()
        },
        ..Config::default()
    }
}

/// Build a started session around a manual keyword engine and simulated speech
pub async fn harness() -> Harness {
    harness_with(test_config()).await
}

/// Build a started session from the given config
pub async fn harness_with(config: Config) -> Harness {
    let (tx, rx) = events::channel();

    let (factory, keyword) = manual_keyword();
    let mut detector = WakeWordDetector::new(&config.wake_word, tx.clone());
    detector.initialize(Some(&factory)).await;

    let (engine, speech) = simulated_speech(tx.clone());
    let capture = SpeechCapture::new(Box::new(engine), config.capture.clone(), tx.clone());

    let mut session = VoiceSession::new(
        MemoryStore::new(config.display.slide_count),
        detector,
        capture,
        config.wake_word.wake_phrases().expect("valid wake phrases"),
        config.session.clone(),
        &config.feedback,
        (tx, rx),
    );
    session.start().await;

    Harness {
        session,
        speech,
        keyword,
    }
}

/// Let spawned timer tasks run, then handle everything queued
pub async fn settle(session: &mut VoiceSession<MemoryStore>) {
    loop {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        if !session.try_step().await {
            break;
        }
        while session.try_step().await {}
    }
}

/// Advance paused time, then settle
pub async fn advance(session: &mut VoiceSession<MemoryStore>, by: Duration) {
    tokio::time::sleep(by).await;
    settle(session).await;
}

/// Milliseconds shorthand
pub const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

impl Harness {
    /// Say a command the way a user would: wake word, then the utterance
    pub async fn speak(&mut self, utterance: &str) {
        self.speech.say(utterance);
        assert!(self.keyword.fire(), "keyword engine should be armed");
        settle(&mut self.session).await;
    }

    /// Fire the wake word with nothing queued, leaving the session listening
    pub async fn wake(&mut self) {
        assert!(self.keyword.fire(), "keyword engine should be armed");
        settle(&mut self.session).await;
    }
}
