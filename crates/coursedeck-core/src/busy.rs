// ── Busy signal ──
//
// Shared "work in flight" flag for UI busy indicators. Internally a
// count of live guards collapsed to a boolean: only the 0→1 and 1→0
// edges are published, so overlapping operations never flicker idle.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::trace;

/// Process-wide busy flag.
///
/// Cheaply cloneable; every clone observes and drives the same flag.
#[derive(Debug, Clone)]
pub struct BusySignal {
    inner: Arc<BusyInner>,
}

#[derive(Debug)]
struct BusyInner {
    /// Live guard count. Only modified inside `send_if_modified`, which
    /// holds the channel's write lock, so count and flag move together.
    in_flight: AtomicUsize,
    busy: watch::Sender<bool>,
}

impl BusySignal {
    pub fn new() -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            inner: Arc::new(BusyInner {
                in_flight: AtomicUsize::new(0),
                busy,
            }),
        }
    }

    /// Assert busy until the returned guard is dropped.
    pub fn enter(&self) -> BusyGuard {
        let inner = Arc::clone(&self.inner);
        inner.busy.send_if_modified(|busy| {
            let previous = inner.in_flight.fetch_add(1, Ordering::AcqRel);
            trace!(in_flight = previous + 1, "busy enter");
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        BusyGuard { inner }
    }

    /// Track `operation` for its whole lifetime.
    ///
    /// Busy is asserted immediately, when `wrap` is called, and released
    /// exactly once when the returned future completes or is dropped
    /// before completion. The operation's output passes through untouched.
    pub fn wrap<F>(&self, operation: F) -> impl Future<Output = F::Output> + use<F>
    where
        F: Future,
    {
        let guard = self.enter();
        async move {
            let output = operation.await;
            drop(guard);
            output
        }
    }

    /// Subscribe to the flag. The receiver holds the current value and is
    /// notified on every busy/idle transition.
    pub fn observe(&self) -> watch::Receiver<bool> {
        self.inner.busy.subscribe()
    }

    /// The flag as a `Stream`: yields the current value first, then each change.
    pub fn stream(&self) -> WatchStream<bool> {
        WatchStream::new(self.observe())
    }

    pub fn is_busy(&self) -> bool {
        *self.inner.busy.borrow()
    }

    /// Number of operations currently holding the flag.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }
}

impl Default for BusySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyInner {
    fn release(&self) {
        self.busy.send_if_modified(|busy| {
            let previous = self.in_flight.fetch_sub(1, Ordering::AcqRel);
            trace!(in_flight = previous.saturating_sub(1), "busy exit");
            if previous == 1 {
                *busy = false;
                true
            } else {
                false
            }
        });
    }
}

/// Scoped busy assertion returned by [`BusySignal::enter`].
///
/// Releases its hold on drop, on every exit path.
#[derive(Debug)]
#[must_use = "busy is released as soon as the guard is dropped"]
pub struct BusyGuard {
    inner: Arc<BusyInner>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.release();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn starts_idle() {
        let busy = BusySignal::new();
        assert!(!busy.is_busy());
        assert!(!*busy.observe().borrow());
        assert_eq!(busy.in_flight(), 0);
    }

    #[test]
    fn guard_asserts_and_releases() {
        let busy = BusySignal::new();
        let guard = busy.enter();
        assert!(busy.is_busy());
        drop(guard);
        assert!(!busy.is_busy());
    }

    #[test]
    fn overlapping_guards_publish_only_edges() {
        let busy = BusySignal::new();
        let mut rx = busy.observe();
        rx.borrow_and_update();

        let a = busy.enter();
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        let b = busy.enter();
        assert!(!rx.has_changed().unwrap());

        drop(a);
        assert!(!rx.has_changed().unwrap());
        assert!(busy.is_busy());

        drop(b);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn overlapping_wraps_stay_busy_until_last_finishes() {
        let busy = BusySignal::new();
        let (tx_a, rx_a) = oneshot::channel::<u32>();
        let (tx_b, rx_b) = oneshot::channel::<u32>();

        let a = tokio::spawn(busy.wrap(rx_a));
        assert!(busy.is_busy());
        let b = tokio::spawn(busy.wrap(rx_b));

        tx_a.send(1).unwrap();
        assert_eq!(a.await.unwrap().unwrap(), 1);
        assert!(busy.is_busy(), "busy cleared while B still in flight");
        assert_eq!(busy.in_flight(), 1);

        tx_b.send(2).unwrap();
        assert_eq!(b.await.unwrap().unwrap(), 2);
        assert!(!busy.is_busy());
    }

    #[test]
    fn wrap_holds_busy_while_pending() {
        use tokio_test::{assert_pending, assert_ready, task};

        let busy = BusySignal::new();
        let (tx, rx) = oneshot::channel::<u8>();
        let mut wrapped = task::spawn(busy.wrap(rx));

        assert_pending!(wrapped.poll());
        assert!(busy.is_busy());

        tx.send(3).unwrap();
        assert!(wrapped.is_woken());
        assert_eq!(assert_ready!(wrapped.poll()).unwrap(), 3);
        assert!(!busy.is_busy());
    }

    #[tokio::test]
    async fn wrap_forwards_failure_and_releases() {
        let busy = BusySignal::new();
        let result: Result<(), &str> = busy.wrap(async { Err("nope") }).await;
        assert_eq!(result, Err("nope"));
        assert!(!busy.is_busy());
    }

    #[tokio::test]
    async fn dropped_wrap_releases() {
        let busy = BusySignal::new();
        let pending = busy.wrap(std::future::pending::<()>());
        assert!(busy.is_busy());
        drop(pending);
        assert!(!busy.is_busy());
        assert_eq!(busy.in_flight(), 0);
    }

    #[tokio::test]
    async fn aborted_task_releases() {
        let busy = BusySignal::new();
        let task = tokio::spawn(busy.wrap(std::future::pending::<()>()));
        assert!(busy.is_busy());
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!busy.is_busy());
    }

    #[tokio::test]
    async fn stream_replays_current_value() {
        use tokio_stream::StreamExt;

        let busy = BusySignal::new();
        let _guard = busy.enter();
        let mut stream = busy.stream();
        assert_eq!(stream.next().await, Some(true));
    }
}
