//! Wake word detection
//!
//! Wraps an external keyword-spotting engine. When no engine can be brought
//! up the detector runs in simulation mode: it still reports ready so the
//! rest of the pipeline stays usable through the manual trigger.

use async_trait::async_trait;

use super::events::EventSender;
use crate::config::WakeWordConfig;
use crate::{Error, Result};

/// A running keyword-spotting engine
///
/// Detections are reported through the [`EventSender`] handed to the factory.
#[async_trait]
pub trait KeywordEngine: Send {
    /// Engine name for logs
    fn name(&self) -> &'static str;

    /// Begin monitoring the microphone
    ///
    /// # Errors
    ///
    /// Returns error if the microphone or model cannot be opened
    async fn start(&mut self) -> Result<()>;

    /// Stop monitoring and release the microphone
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to stop
    async fn stop(&mut self) -> Result<()>;
}

/// Settings passed to a keyword engine on creation
#[derive(Debug, Clone)]
pub struct KeywordOptions {
    /// Engine credential
    pub access_key: String,
    /// Phrase to listen for
    pub keyword: String,
    /// Detection sensitivity, 0.0 to 1.0
    pub sensitivity: f32,
}

/// Creates keyword engines
#[async_trait]
pub trait KeywordEngineFactory: Send + Sync {
    /// Set up an engine that reports detections to `events`
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be initialized
    async fn create(
        &self,
        options: &KeywordOptions,
        events: EventSender,
    ) -> Result<Box<dyn KeywordEngine>>;
}

/// How detections are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorMode {
    /// Not initialized yet
    Uninitialized,
    /// A real keyword engine is attached
    Engine,
    /// No engine; detections only come from the manual trigger
    Simulation,
}

/// Gatekeeper for the keyword engine
pub struct WakeWordDetector {
    options: KeywordOptions,
    events: EventSender,
    engine: Option<Box<dyn KeywordEngine>>,
    mode: DetectorMode,
    armed: bool,
    last_error: Option<String>,
}

impl WakeWordDetector {
    /// Create an uninitialized detector
    #[must_use]
    pub fn new(config: &WakeWordConfig, events: EventSender) -> Self {
        let options = KeywordOptions {
            access_key: config.access_key.clone().unwrap_or_default(),
            keyword: config.keyword.to_lowercase().trim().to_string(),
            sensitivity: config.sensitivity,
        };

        Self {
            options,
            events,
            engine: None,
            mode: DetectorMode::Uninitialized,
            armed: false,
            last_error: None,
        }
    }

    /// Bring up the keyword engine, degrading to simulation on any failure
    ///
    /// Never fails: a missing credential, a missing backend, or an engine
    /// error all leave the detector ready in [`DetectorMode::Simulation`].
    pub async fn initialize(&mut self, factory: Option<&dyn KeywordEngineFactory>) {
        if self.mode != DetectorMode::Uninitialized {
            return;
        }

        if self.options.access_key.is_empty() {
            tracing::info!("wake word: running in simulation mode (no access key)");
            self.mode = DetectorMode::Simulation;
            return;
        }

        let Some(factory) = factory else {
            let reason = "no keyword engine backend available";
            tracing::warn!("wake word: {reason}, falling back to simulation mode");
            self.last_error = Some(reason.to_string());
            self.mode = DetectorMode::Simulation;
            return;
        };

        match factory.create(&self.options, self.events.clone()).await {
            Ok(engine) => {
                tracing::info!(
                    engine = engine.name(),
                    keyword = %self.options.keyword,
                    sensitivity = self.options.sensitivity,
                    "wake word engine initialized"
                );
                self.engine = Some(engine);
                self.last_error = None;
                self.mode = DetectorMode::Engine;
            }
            Err(e) => {
                tracing::error!(error = %e, "wake word engine init failed, using simulation mode");
                self.last_error = Some(e.to_string());
                self.mode = DetectorMode::Simulation;
            }
        }
    }

    /// Arm the detector
    ///
    /// No-op unless ready, and when already armed.
    ///
    /// # Errors
    ///
    /// Returns error if the engine refuses to start
    pub async fn start(&mut self) -> Result<()> {
        if !self.is_ready() {
            tracing::debug!("wake word not initialized, not arming");
            return Ok(());
        }
        if self.armed {
            return Ok(());
        }

        if let Some(engine) = self.engine.as_mut() {
            engine.start().await.map_err(|e| {
                let msg = e.to_string();
                self.last_error = Some(msg.clone());
                Error::WakeWord(msg)
            })?;
            tracing::debug!(engine = engine.name(), "wake word listening started");
        } else {
            tracing::debug!("simulation mode: wake word listening started");
        }

        self.armed = true;
        Ok(())
    }

    /// Disarm the detector; safe to call when not armed
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to stop. The detector counts as
    /// disarmed either way.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.armed {
            return Ok(());
        }
        self.armed = false;

        if let Some(engine) = self.engine.as_mut() {
            engine.stop().await.map_err(|e| {
                let msg = e.to_string();
                self.last_error = Some(msg.clone());
                Error::WakeWord(msg)
            })?;
            tracing::debug!(engine = engine.name(), "wake word listening stopped");
        } else {
            tracing::debug!("simulation mode: wake word listening stopped");
        }

        Ok(())
    }

    /// Record an error reported by the running engine
    pub fn record_error(&mut self, reason: String) {
        tracing::warn!(error = %reason, "wake word engine error");
        self.last_error = Some(reason);
    }

    /// Whether initialization has completed (engine or simulation)
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.mode != DetectorMode::Uninitialized
    }

    /// Whether the detector is currently armed
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Current detection mode
    #[must_use]
    pub const fn mode(&self) -> DetectorMode {
        self.mode
    }

    /// Most recent engine error
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Configured keyword
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.options.keyword
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;
    use crate::voice::events;

    struct FailingFactory;

    #[async_trait]
    impl KeywordEngineFactory for FailingFactory {
        async fn create(
            &self,
            _options: &KeywordOptions,
            _events: EventSender,
        ) -> Result<Box<dyn KeywordEngine>> {
            Err(Error::EngineUnavailable("no model file".to_string()))
        }
    }

    fn config(access_key: Option<&str>) -> WakeWordConfig {
        WakeWordConfig {
            access_key: access_key.map(ToString::to_string),
            ..WakeWordConfig::default()
        }
    }

    #[tokio::test]
    async fn test_uninitialized_start_is_noop() {
        let (tx, _rx) = events::channel();
        let mut detector = WakeWordDetector::new(&config(None), tx);

        assert!(!detector.is_ready());
        assert_ok!(detector.start().await);
        assert!(!detector.is_armed());
    }

    #[tokio::test]
    async fn test_no_access_key_simulates() {
        let (tx, _rx) = events::channel();
        let mut detector = WakeWordDetector::new(&config(None), tx);
        detector.initialize(None).await;

        assert!(detector.is_ready());
        assert_eq!(detector.mode(), DetectorMode::Simulation);
        assert!(detector.last_error().is_none());

        assert_ok!(detector.start().await);
        assert!(detector.is_armed());
        assert_ok!(detector.stop().await);
        assert_ok!(detector.stop().await);
        assert!(!detector.is_armed());
    }

    #[tokio::test]
    async fn test_failed_init_degrades_to_simulation() {
        let (tx, _rx) = events::channel();
        let mut detector = WakeWordDetector::new(&config(Some("key")), tx);
        detector.initialize(Some(&FailingFactory)).await;

        assert!(detector.is_ready());
        assert_eq!(detector.mode(), DetectorMode::Simulation);
        assert_eq!(
            detector.last_error(),
            Some("engine unavailable: no model file")
        );
    }

    #[tokio::test]
    async fn test_missing_backend_degrades_to_simulation() {
        let (tx, _rx) = events::channel();
        let mut detector = WakeWordDetector::new(&config(Some("key")), tx);
        detector.initialize(None).await;

        assert_eq!(detector.mode(), DetectorMode::Simulation);
        assert!(detector.last_error().is_some());
    }
}
