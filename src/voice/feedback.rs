//! Confirmation feedback
//!
//! Holds at most one status message. A new message replaces the old one and
//! restarts the auto-clear timer; there is no queue.

use std::time::Duration;

use super::events::{EventSender, TimerKind};
use super::timer::Timer;

/// The current confirmation message and its expiry
#[derive(Debug)]
pub struct ConfirmationFeedback {
    message: Option<String>,
    display_for: Duration,
    expiry: Timer,
}

impl ConfirmationFeedback {
    /// Create empty feedback with the given display duration
    #[must_use]
    pub const fn new(display_for: Duration) -> Self {
        Self {
            message: None,
            display_for,
            expiry: Timer::new(TimerKind::ConfirmationExpiry),
        }
    }

    /// Show a message, superseding any current one
    pub fn show(&mut self, text: impl Into<String>, events: &EventSender) {
        let text = text.into();
        tracing::info!(message = %text, "confirmation");
        self.message = Some(text);
        self.expiry.arm(self.display_for, events);
    }

    /// Remove the message and cancel its timer; idempotent
    pub fn clear(&mut self) {
        self.expiry.cancel();
        self.message = None;
    }

    /// Handle an auto-clear expiry
    ///
    /// Returns true if the message was cleared. Expiries of superseded
    /// messages are ignored.
    pub fn on_expired(&mut self, generation: u64) -> bool {
        if !self.expiry.fire(generation) {
            return false;
        }
        tracing::debug!("confirmation expired");
        self.message = None;
        true
    }

    /// Message currently visible
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::events::{self, VoiceEvent};

    async fn next_expiry(rx: &mut events::EventReceiver) -> u64 {
        match rx.recv().await {
            Some(VoiceEvent::TimerElapsed {
                kind: TimerKind::ConfirmationExpiry,
                generation,
            }) => generation,
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacement_uses_new_timer() {
        let (tx, mut rx) = events::channel();
        let mut feedback = ConfirmationFeedback::new(Duration::from_millis(3000));

        feedback.show("A", &tx);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        feedback.show("B", &tx);
        assert_eq!(feedback.message(), Some("B"));

        // A's deadline (t=3000) passes without clearing B
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(feedback.message(), Some("B"));

        let generation = next_expiry(&mut rx).await;
        assert!(feedback.on_expired(generation));
        assert_eq!(feedback.message(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_is_idempotent() {
        let (tx, mut rx) = events::channel();
        let mut feedback = ConfirmationFeedback::new(Duration::from_millis(100));

        feedback.clear();
        feedback.show("hello", &tx);
        feedback.clear();
        feedback.clear();
        assert_eq!(feedback.message(), None);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_expiry_ignored() {
        let (tx, _rx) = events::channel();
        let mut feedback = ConfirmationFeedback::new(Duration::from_millis(100));

        feedback.show("first", &tx);
        feedback.show("second", &tx);
        assert!(!feedback.on_expired(1));
        assert_eq!(feedback.message(), Some("second"));
    }
}
