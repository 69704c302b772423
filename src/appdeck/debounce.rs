//! Trailing-edge debouncing for search-as-you-type input.

use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Forwards only the last value of each burst, once input has been quiet for `delay`.
///
/// Values go in through [`Debouncer::call`] and come out of the receiver returned by
/// [`Debouncer::new`]. Dropping the debouncer flushes a pending value and closes the
/// receiver. Must be created inside a tokio runtime.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, mut incoming) = mpsc::unbounded_channel::<T>();
        let (output, settled) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                let Some(value) = pending.take() else {
                    match incoming.recv().await {
                        Some(value) => pending = Some(value),
                        None => break,
                    }
                    continue;
                };

                tokio::select! {
                    next = incoming.recv() => match next {
                        Some(newer) => pending = Some(newer),
                        None => {
                            let _ = output.send(value);
                            break;
                        }
                    },
                    _ = tokio::time::sleep(delay) => {
                        if output.send(value).is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::trace!("debouncer closed");
        });

        (Self { input }, settled)
    }

    /// Feeds a value. Returns false once the receiving side is gone.
    pub fn call(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn burst_yields_last_value() {
        let (debouncer, mut settled) = Debouncer::new(DEFAULT_DELAY);
        debouncer.call("c");
        debouncer.call("ch");
        debouncer.call("chat");
        assert_eq!(settled.recv().await, Some("chat"));
    }

    #[tokio::test(start_paused = true)]
    async fn each_input_restarts_the_quiet_period() {
        let start = Instant::now();
        let (debouncer, mut settled) = Debouncer::new(DEFAULT_DELAY);

        debouncer.call("a");
        sleep(Duration::from_millis(200)).await;
        debouncer.call("ab");
        sleep(Duration::from_millis(200)).await;
        assert_eq!(settled.try_recv(), Err(TryRecvError::Empty));

        assert_eq!(settled.recv().await, Some("ab"));
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_each_settle() {
        let (debouncer, mut settled) = Debouncer::new(DEFAULT_DELAY);
        debouncer.call(1);
        sleep(Duration::from_millis(400)).await;
        debouncer.call(2);
        assert_eq!(settled.recv().await, Some(1));
        assert_eq!(settled.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_flushes_pending_value() {
        let start = Instant::now();
        let (debouncer, mut settled) = Debouncer::new(DEFAULT_DELAY);
        debouncer.call("last");
        drop(debouncer);

        assert_eq!(settled.recv().await, Some("last"));
        assert!(start.elapsed() < DEFAULT_DELAY);
        assert_eq!(settled.recv().await, None);
    }
}
