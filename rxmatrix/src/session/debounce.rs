use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(200);

/// Single-slot debouncer.
///
/// [`schedule`](Self::schedule) replaces whatever was scheduled before and has
/// not started yet: only work still holding the latest ticket once the quiet
/// window elapses is run. Outputs of work that started but was superseded
/// while running are dropped on receipt.
pub struct Debouncer<T> {
    quiet: Duration,
    latest: Arc<AtomicU64>,
    delivered: u64,
    tx: mpsc::UnboundedSender<(u64, T)>,
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            quiet,
            latest: Arc::new(AtomicU64::new(0)),
            delivered: 0,
            tx,
            rx,
        }
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet
    }

    /// Schedules `work` to run after the quiet window and returns its ticket.
    pub fn schedule<F>(&self, work: F) -> u64
    where
        F: Future<Output = T> + Send + 'static,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();
        let quiet = self.quiet;

        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if latest.load(Ordering::SeqCst) != ticket {
                tracing::trace!(ticket, "Debounced call superseded before it ran");
                return;
            }
            let output = work.await;
            let _ = tx.send((ticket, output));
        });

        ticket
    }

    /// Waits for the output of the latest scheduled call. `None` right away
    /// when that output was already handed out or nothing was scheduled.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            if self.delivered == self.latest.load(Ordering::SeqCst) {
                return None;
            }
            let (ticket, output) = self.rx.recv().await?;
            if self.is_latest(ticket) {
                self.delivered = ticket;
                return Some(output);
            }
        }
    }

    /// Returns the latest output if it has already arrived.
    pub fn try_next(&mut self) -> Option<T> {
        let mut newest = None;
        while let Ok((ticket, output)) = self.rx.try_recv() {
            if self.is_latest(ticket) {
                self.delivered = ticket;
                newest = Some(output);
            }
        }
        newest
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

impl<T: Send + 'static> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}
