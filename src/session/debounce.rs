//! Cancel-and-reschedule debouncing on the tokio timer

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Delay between the last input change and regeneration
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Collapses bursts of triggers into one delivery after a quiet period
///
/// Every [`trigger`](Debouncer::trigger) aborts the pending delivery and
/// schedules a new one `delay` later, so only the latest value is delivered on
/// the receiver returned by [`Debouncer::new`].
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    sender: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its deliveries arrive on
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            sender,
            pending: None,
        };
        (debouncer, receiver)
    }

    /// Quiet period before delivery
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending delivery with `value`, due `delay` from now.
    pub fn trigger(&mut self, value: T) {
        self.cancel();

        let deadline = Instant::now() + self.delay;
        let sender = self.sender.clone();
        self.pending = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            // Receiver gone means the session ended; nothing to deliver to.
            let _ = sender.send(value);
        }));
    }

    /// Drop the pending delivery, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a delivery is scheduled and has not fired yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_latest() {
        let (mut debouncer, mut rx) = Debouncer::new(DEFAULT_DEBOUNCE);

        debouncer.trigger(1);
        advance(Duration::from_millis(100)).await;
        debouncer.trigger(2);
        advance(Duration::from_millis(100)).await;
        let last_trigger = Instant::now();
        debouncer.trigger(3);

        assert_eq!(rx.recv().await, Some(3));
        assert!(last_trigger.elapsed() >= DEFAULT_DEBOUNCE);

        let more = timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(more.is_err(), "only one delivery expected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_delivery() {
        let (mut debouncer, mut rx) = Debouncer::new(DEFAULT_DEBOUNCE);
        debouncer.trigger("edit");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        let delivered = timeout(Duration::from_secs(1), rx.recv()).await;
        assert!(delivered.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_triggers_each_deliver() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(50));
        debouncer.trigger('a');
        assert_eq!(rx.recv().await, Some('a'));
        debouncer.trigger('b');
        assert_eq!(rx.recv().await, Some('b'));
    }
}
