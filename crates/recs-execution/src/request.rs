//! Request lifecycle for user-triggered fetches.
//!
//! Every fetch runs under a [`RequestTicket`]. Starting a new request on a
//! [`RequestTracker`] cancels the previous ticket, and only the ticket the
//! tracker considers current may publish its result. Together these make
//! "last request wins" hold even when responses arrive out of order.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// Handle for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    id: u64,
    token: CancellationToken,
}

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Drives `fut` until it completes or the ticket is cancelled.
    ///
    /// Returns `None` when cancelled; `fut` is dropped at that point, which
    /// aborts the underlying HTTP request.
    pub async fn run<F, T>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

/// Issues tickets and remembers which one is current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: AtomicU64,
    current: Mutex<Option<RequestTicket>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, cancelling the one in flight (if any).
    pub fn begin(&self) -> RequestTicket {
        let ticket = RequestTicket {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            token: CancellationToken::new(),
        };

        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(ticket.clone()) {
            tracing::debug!(superseded = previous.id, by = ticket.id, "Cancelling superseded request");
            previous.cancel();
        }
        ticket
    }

    /// True while `ticket` is the newest request and has not been cancelled.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        matches!(current.as_ref(), Some(c) if c.id == ticket.id) && !ticket.is_cancelled()
    }

    /// Marks `ticket` as done. A no-op if a newer request has started.
    pub fn finish(&self, ticket: &RequestTicket) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(current.as_ref(), Some(c) if c.id == ticket.id) {
            *current = None;
        }
    }

    /// Cancels the outstanding request, e.g. on logout.
    pub fn cancel_all(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ticket) = current.take() {
            ticket.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_ticket_supersedes_old() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        assert!(tracker.is_current(&first));

        let second = tracker.begin();
        assert!(first.is_cancelled());
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_finish_only_clears_own_ticket() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        tracker.finish(&first);
        assert!(tracker.is_current(&second));

        tracker.finish(&second);
        assert!(!tracker.is_current(&second));
    }

    #[test]
    fn test_cancel_all() {
        let tracker = RequestTracker::new();
        let ticket = tracker.begin();
        tracker.cancel_all();
        assert!(ticket.is_cancelled());
        assert!(!tracker.is_current(&ticket));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_returns_none_when_cancelled() {
        let tracker = RequestTracker::new();
        let ticket = tracker.begin();

        let slow = {
            let ticket = ticket.clone();
            tokio::spawn(async move {
                ticket
                    .run(async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        "late"
                    })
                    .await
            })
        };

        tokio::task::yield_now().await;
        let _newer = tracker.begin();
        assert_eq!(slow.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_run_returns_output() {
        let ticket = RequestTracker::new().begin();
        assert_eq!(ticket.run(async { 7 }).await, Some(7));
    }
}
