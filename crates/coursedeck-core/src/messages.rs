// ── Notification bus ──
//
// Decouples the code that detects a failure from the code that shows it.
// Batches are broadcast without replay: a subscriber only sees what is
// reported after it subscribed.

use std::fmt;
use std::sync::Arc;

use futures_core::Stream;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{trace, warn};

/// One reporting event: an ordered, never-empty list of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBatch(Arc<[String]>);

impl MessageBatch {
    /// Build a batch, or `None` if there are no messages.
    pub fn new<I, S>(messages: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
        if messages.is_empty() {
            None
        } else {
            Some(Self(messages.into()))
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// The headline message (always present).
    pub fn first(&self) -> &str {
        self.0.first().map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for MessageBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(": "))
    }
}

/// Process-wide error message channel.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<MessageBatch>,
}

impl NotificationBus {
    /// Default number of batches a slow subscriber may fall behind.
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish `messages` as one batch. Empty input is dropped.
    pub fn report<I, S>(&self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(batch) = MessageBatch::new(messages) else {
            trace!("ignoring empty notification batch");
            return;
        };
        warn!(messages = ?batch.messages(), "notification reported");
        // No subscribers is fine: nobody is displaying messages.
        let _ = self.tx.send(batch);
    }

    /// Subscribe to batches reported from now on.
    pub fn observe(&self) -> MessageStream {
        MessageStream {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Subscription handle vended by [`NotificationBus::observe`].
///
/// A subscriber that falls more than the bus capacity behind skips the
/// missed batches (with a warning) instead of failing.
#[derive(Debug)]
pub struct MessageStream {
    rx: broadcast::Receiver<MessageBatch>,
}

impl MessageStream {
    /// Wait for the next batch. Returns `None` once every bus handle is gone.
    pub async fn recv(&mut self) -> Option<MessageBatch> {
        loop {
            match self.rx.recv().await {
                Ok(batch) => return Some(batch),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next batch if one is already waiting.
    pub fn try_recv(&mut self) -> Option<MessageBatch> {
        loop {
            match self.rx.try_recv() {
                Ok(batch) => return Some(batch),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification subscriber lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> impl Stream<Item = MessageBatch> + Send + Unpin {
        BroadcastStream::new(self.rx).filter_map(|item| match item {
            Ok(batch) => Some(batch),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "notification subscriber lagged");
                None
            }
        })
    }
}
