//! Debouncing.
//!
//! [`Debouncer`] is a plain state machine driven by explicit instants, so
//! callers (and tests) decide when time passes. [`spawn_debounced`] wraps
//! the same rule around a `tokio::sync::watch` channel for event-driven
//! callers.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Holds a committed value and at most one pending value.
///
/// Each [`push`](Debouncer::push) restarts the quiet period; the pending
/// value is committed by the first [`poll`](Debouncer::poll) at or after
/// the deadline.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    committed: T,
    pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            committed: initial,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn committed(&self) -> &T {
        &self.committed
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    /// When the pending value will commit, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Commits the pending value if its deadline has passed.
    ///
    /// Returns the new committed value only when it differs from the old one.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if due {
            self.commit()
        } else {
            None
        }
    }

    /// Commits the pending value immediately.
    pub fn flush(&mut self) -> Option<&T> {
        if self.pending.is_some() {
            self.commit()
        } else {
            None
        }
    }

    fn commit(&mut self) -> Option<&T> {
        let (value, _) = self.pending.take()?;
        if value == self.committed {
            return None;
        }
        self.committed = value;
        Some(&self.committed)
    }
}

/// Spawns a task that forwards values from the returned sender to the
/// returned receiver once they have been stable for `delay`.
///
/// The task ends when the sender is dropped; a pending value is flushed
/// first.
pub fn spawn_debounced<T>(
    initial: T,
    delay: Duration,
) -> (watch::Sender<T>, watch::Receiver<T>, JoinHandle<()>)
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let (input_tx, mut input_rx) = watch::channel(initial.clone());
    let (output_tx, output_rx) = watch::channel(initial);

    let handle = tokio::spawn(async move {
        loop {
            if input_rx.changed().await.is_err() {
                return;
            }
            // Restart the window on every change until the input goes quiet.
            let closed = loop {
                tokio::select! {
                    changed = input_rx.changed() => {
                        if changed.is_err() {
                            break true;
                        }
                    }
                    _ = tokio::time::sleep(delay) => break false,
                }
            };
            let latest = input_rx.borrow_and_update().clone();
            output_tx.send_if_modified(|current| {
                if *current == latest {
                    false
                } else {
                    *current = latest;
                    true
                }
            });
            if closed {
                return;
            }
        }
    });

    (input_tx, output_rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commits_after_quiet_period() {
        let start = Instant::now();
        let mut d = Debouncer::new(String::new(), Duration::from_millis(400));
        d.push("r".to_string(), start);
        d.push("ru".to_string(), start + Duration::from_millis(100));
        d.push("rust".to_string(), start + Duration::from_millis(200));

        assert_eq!(d.poll(start + Duration::from_millis(500)), None);
        assert_eq!(
            d.poll(start + Duration::from_millis(600)).map(String::as_str),
            Some("rust")
        );
        assert_eq!(d.committed(), "rust");
        assert!(d.pending().is_none());
    }

    #[test]
    fn test_unchanged_value_does_not_fire() {
        let start = Instant::now();
        let mut d = Debouncer::new("a".to_string(), Duration::from_millis(10));
        d.push("b".to_string(), start);
        d.push("a".to_string(), start + Duration::from_millis(5));
        assert_eq!(d.poll(start + Duration::from_millis(50)), None);
        assert!(d.deadline().is_none());
    }

    #[test]
    fn test_flush_commits_now() {
        let mut d = Debouncer::new(0, Duration::from_secs(60));
        d.push(3, Instant::now());
        assert_eq!(d.flush(), Some(&3));
        assert_eq!(d.flush(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_debounce_emits_latest() {
        let (tx, mut rx, handle) = spawn_debounced(String::new(), Duration::from_millis(400));
        tx.send("r".to_string()).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send("rust".to_string()).unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*rx.borrow(), "");

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "rust");

        drop(tx);
        handle.await.unwrap();
    }
}
