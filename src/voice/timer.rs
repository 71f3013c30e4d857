//! Cancellable one-shot timers
//!
//! A timer posts [`VoiceEvent::TimerElapsed`] to the session when it fires.
//! Re-arming aborts the previous task and bumps the generation, so an expiry
//! that was already queued before cancellation is recognised as stale.

use std::time::Duration;

use tokio::task::JoinHandle;

use super::events::{EventSender, TimerKind, VoiceEvent};

/// One-shot timer owned by a single session component
#[derive(Debug)]
pub struct Timer {
    kind: TimerKind,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Timer {
    /// Create an unarmed timer
    #[must_use]
    pub const fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            generation: 0,
            task: None,
        }
    }

    /// Arm (or re-arm) the timer, cancelling any pending expiry
    pub fn arm(&mut self, after: Duration, events: &EventSender) {
        self.cancel();
        self.generation += 1;

        let kind = self.kind;
        let generation = self.generation;
        let events = events.clone();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            events.send(VoiceEvent::TimerElapsed { kind, generation });
        }));

        tracing::trace!(?kind, generation, after_ms = after.as_millis(), "timer armed");
    }

    /// Cancel a pending expiry; no-op when unarmed
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::trace!(kind = ?self.kind, generation = self.generation, "timer cancelled");
        }
    }

    /// Accept an expiry event
    ///
    /// Returns true only for the current arm generation of a still-armed
    /// timer; the timer is then disarmed.
    pub fn fire(&mut self, generation: u64) -> bool {
        if self.task.is_some() && generation == self.generation {
            self.task = None;
            true
        } else {
            tracing::trace!(kind = ?self.kind, generation, "stale timer expiry ignored");
            false
        }
    }

    /// Whether an expiry is pending
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::events;

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_with_current_generation() {
        let (tx, mut rx) = events::channel();
        let mut timer = Timer::new(TimerKind::Silence);

        timer.arm(Duration::from_millis(100), &tx);
        let event = rx.recv().await.unwrap();
        let VoiceEvent::TimerElapsed { kind, generation } = event else {
            panic!("unexpected event: {event:?}");
        };
        assert_eq!(kind, TimerKind::Silence);
        assert!(timer.fire(generation));
        assert!(!timer.fire(generation));
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_supersedes_previous() {
        let (tx, mut rx) = events::channel();
        let mut timer = Timer::new(TimerKind::ConfirmationExpiry);

        timer.arm(Duration::from_millis(100), &tx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        timer.arm(Duration::from_millis(100), &tx);

        let start = tokio::time::Instant::now();
        let event = rx.recv().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(
            event,
            VoiceEvent::TimerElapsed {
                kind: TimerKind::ConfirmationExpiry,
                generation: 2,
            }
        );
        assert!(!timer.fire(1));
        assert!(timer.fire(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let (tx, mut rx) = events::channel();
        let mut timer = Timer::new(TimerKind::ConfirmingHold);

        timer.arm(Duration::from_millis(10), &tx);
        timer.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        assert!(!timer.fire(1));
    }
}
