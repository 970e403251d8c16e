// ── Reactive entity streams ──
//
// Subscription types for consuming collection changes from the stores.

mod filter;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

pub use filter::{CourseFilter, FilteredStream};

/// An immutable, shareable view of a whole collection.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// A subscription to a collection of entities.
///
/// Always holds a current snapshot: a fresh subscription starts from the
/// latest published value, then follows every change.
pub struct EntityStream<T: Send + Sync + 'static> {
    current: Snapshot<T>,
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(mut receiver: watch::Receiver<Snapshot<T>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &Snapshot<T> {
        &self.current
    }

    /// The latest published snapshot (may be newer than `current()`).
    pub fn latest(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publication, returning the new snapshot.
    /// Returns `None` if the owning store has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream` that yields the current snapshot first,
    /// then each subsequent publication.
    pub fn into_stream(self) -> SnapshotStream<T> {
        SnapshotStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

impl<T: Send + Sync + 'static> Clone for EntityStream<T> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            receiver: self.receiver.clone(),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Intermediate snapshots published faster than the consumer polls are
/// coalesced; the consumer always converges on the latest one.
pub struct SnapshotStream<T: Send + Sync + 'static> {
    inner: WatchStream<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> Stream for SnapshotStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin (boxed inner future), so re-pinning is fine.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
