//! Configuration management for the voice pipeline
//!
//! Priority: env > TOML file > defaults.

pub mod file;

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::Result;
use crate::command::{DEFAULT_WAKE_PHRASES, WakePhrases};

/// Voice pipeline configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    /// Wake word detection
    pub wake_word: WakeWordConfig,

    /// Speech capture
    pub capture: CaptureConfig,

    /// Session timing and the global enable switch
    pub session: SessionConfig,

    /// Confirmation message display
    pub feedback: FeedbackConfig,

    /// Ambient display settings
    pub display: DisplayConfig,
}

/// Wake word detector configuration
#[derive(Debug, Clone, Serialize)]
pub struct WakeWordConfig {
    /// Keyword engine credential; without one the detector simulates
    #[serde(serialize_with = "redact")]
    pub access_key: Option<String>,

    /// Phrase the keyword engine listens for
    pub keyword: String,

    /// Detection sensitivity, 0.0 to 1.0
    pub sensitivity: f32,

    /// Phrases stripped from the front of a transcript before parsing
    pub phrases: Vec<String>,
}

impl Default for WakeWordConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            keyword: "hey droid".to_string(),
            sensitivity: 0.5,
            phrases: DEFAULT_WAKE_PHRASES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl WakeWordConfig {
    /// Build the wake phrase stripper from the configured phrases
    ///
    /// # Errors
    ///
    /// Returns error if no usable phrase is configured
    pub fn wake_phrases(&self) -> Result<WakePhrases> {
        WakePhrases::new(self.phrases.iter().map(String::as_str))
    }
}

/// Speech capture configuration
#[derive(Debug, Clone, Serialize)]
pub struct CaptureConfig {
    /// BCP-47 recognition language
    pub language: String,

    /// Listening window without new speech before capture gives up
    #[serde(rename = "silence_timeout_ms", serialize_with = "millis")]
    pub silence_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            silence_timeout: Duration::from_millis(5000),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    /// Whether the pipeline starts enabled
    pub enabled: bool,

    /// How long the session stays in confirming before going idle
    #[serde(rename = "confirm_hold_ms", serialize_with = "millis")]
    pub confirm_hold: Duration,

    /// Window in which further final transcripts are dropped
    #[serde(rename = "processing_cooldown_ms", serialize_with = "millis")]
    pub processing_cooldown: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confirm_hold: Duration::from_millis(2000),
            processing_cooldown: Duration::from_millis(1000),
        }
    }
}

/// Confirmation feedback configuration
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackConfig {
    /// How long a confirmation stays visible
    #[serde(rename = "display_ms", serialize_with = "millis")]
    pub display_for: Duration,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            display_for: Duration::from_millis(3000),
        }
    }
}

/// Ambient display configuration
#[derive(Debug, Clone, Serialize)]
pub struct DisplayConfig {
    /// Number of slides in the photo slideshow
    pub slide_count: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { slide_count: 5 }
    }
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration with explicit voice disable option
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let mut config = Self::default();

        // Load optional TOML config file (env > toml > default)
        file::load_config_file().apply(&mut config);
        config.apply_env();

        if disable_voice {
            config.session.enabled = false;
            tracing::info!("voice explicitly disabled via --disable-voice");
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("DROID_WAKE_WORD_ACCESS_KEY") {
            self.wake_word.access_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        if let Ok(keyword) = std::env::var("DROID_WAKE_WORD") {
            self.wake_word.keyword = keyword;
        }
        if let Some(sensitivity) = env_parse::<f32>("DROID_WAKE_WORD_SENSITIVITY") {
            self.wake_word.sensitivity = sensitivity;
        }
        if let Ok(language) = std::env::var("DROID_SPEECH_LANGUAGE") {
            self.capture.language = language;
        }
        if let Some(ms) = env_parse::<u64>("DROID_SILENCE_TIMEOUT_MS") {
            self.capture.silence_timeout = Duration::from_millis(ms);
        }
    }

    /// Clamp ranges and reject configurations the pipeline cannot run with
    fn validate(&mut self) -> Result<()> {
        let sensitivity = self.wake_word.sensitivity;
        self.wake_word.sensitivity = if sensitivity.is_nan() {
            0.5
        } else {
            sensitivity.clamp(0.0, 1.0)
        };

        if self.wake_word.keyword.trim().is_empty() {
            return Err(crate::Error::Config("wake word keyword is empty".to_string()));
        }
        if self.capture.language.trim().is_empty() {
            return Err(crate::Error::Config(
                "speech language is empty".to_string(),
            ));
        }

        // Surfaces a bad phrase list at load time rather than at session start
        self.wake_word.wake_phrases()?;
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable env var");
            None
        }
    }
}

#[allow(clippy::ref_option)]
fn redact<S: Serializer>(value: &Option<String>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(if value.is_some() { "<set>" } else { "<unset>" })
}

#[allow(clippy::cast_possible_truncation)]
fn millis<S: Serializer>(value: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(value.as_millis() as u64)
}
