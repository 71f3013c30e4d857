//! TOML configuration file loading
//!
//! Reads `config.toml` from the platform config dir (on Linux
//! `~/.config/droid/config.toml`), or the path in `DROID_CONFIG`.
//! All fields are optional and overlay the built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use super::Config;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct DroidConfigFile {
    /// Global voice switch
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Wake word detection
    #[serde(default)]
    pub wake_word: WakeWordFileConfig,

    /// Speech capture
    #[serde(default)]
    pub capture: CaptureFileConfig,

    /// Session timing
    #[serde(default)]
    pub session: SessionFileConfig,

    /// Confirmation feedback
    #[serde(default)]
    pub feedback: FeedbackFileConfig,

    /// Ambient display
    #[serde(default)]
    pub display: DisplayFileConfig,
}

/// Voice switch
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable the voice pipeline
    pub enabled: Option<bool>,
}

/// Wake word configuration
#[derive(Debug, Default, Deserialize)]
pub struct WakeWordFileConfig {
    pub access_key: Option<String>,
    pub keyword: Option<String>,
    pub sensitivity: Option<f32>,
    /// Phrases stripped before parsing (replaces the default list)
    pub phrases: Option<Vec<String>>,
}

/// Speech capture configuration
#[derive(Debug, Default, Deserialize)]
pub struct CaptureFileConfig {
    /// Recognition language (e.g. "en-GB")
    pub language: Option<String>,
    pub silence_timeout_ms: Option<u64>,
}

/// Session timing configuration
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    pub confirm_hold_ms: Option<u64>,
    pub processing_cooldown_ms: Option<u64>,
}

/// Confirmation display configuration
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackFileConfig {
    pub display_ms: Option<u64>,
}

/// Display configuration
#[derive(Debug, Default, Deserialize)]
pub struct DisplayFileConfig {
    pub slide_count: Option<usize>,
}

impl DroidConfigFile {
    /// Overlay the fields present in the file onto `config`
    pub fn apply(self, config: &mut Config) {
        if let Some(enabled) = self.voice.enabled {
            config.session.enabled = enabled;
        }

        let wake = self.wake_word;
        if let Some(key) = wake.access_key.filter(|k| !k.trim().is_empty()) {
            config.wake_word.access_key = Some(key);
        }
        if let Some(keyword) = wake.keyword {
            config.wake_word.keyword = keyword;
        }
        if let Some(sensitivity) = wake.sensitivity {
            config.wake_word.sensitivity = sensitivity;
        }
        if let Some(phrases) = wake.phrases {
            config.wake_word.phrases = phrases;
        }

        if let Some(language) = self.capture.language {
            config.capture.language = language;
        }
        if let Some(ms) = self.capture.silence_timeout_ms {
            config.capture.silence_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.session.confirm_hold_ms {
            config.session.confirm_hold = Duration::from_millis(ms);
        }
        if let Some(ms) = self.session.processing_cooldown_ms {
            config.session.processing_cooldown = Duration::from_millis(ms);
        }
        if let Some(ms) = self.feedback.display_ms {
            config.feedback.display_for = Duration::from_millis(ms);
        }
        if let Some(count) = self.display.slide_count {
            config.display.slide_count = count;
        }
    }
}

/// Load the TOML config file from the standard path
///
/// Returns `DroidConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> DroidConfigFile {
    let Some(path) = config_file_path() else {
        return DroidConfigFile::default();
    };

    if !path.exists() {
        return DroidConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                DroidConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            DroidConfigFile::default()
        }
    }
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the contents are not valid TOML for this schema
pub fn parse_config(content: &str) -> crate::Result<DroidConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Return the config file path: `DROID_CONFIG` or `<config dir>/droid/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DROID_CONFIG") {
        return Some(PathBuf::from(path));
    }

    directories::ProjectDirs::from("", "", "droid").map(|d| d.config_dir().join("config.toml"))
}
