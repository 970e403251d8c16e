// ── Shared save outcome ──

use std::future::IntoFuture;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};

use crate::error::CoreError;

type SaveFuture = Shared<BoxFuture<'static, Result<serde_json::Value, CoreError>>>;

/// Deferred result of one [`CoursesStore::save`](super::CoursesStore::save).
///
/// The persistence request runs on its own task and is issued exactly once.
/// Every clone of the handle resolves to the same outcome; dropping all of
/// them does not cancel the request or its rollback.
#[derive(Clone)]
pub struct SaveHandle {
    id: String,
    outcome: SaveFuture,
}

impl SaveHandle {
    /// Spawn `request` and wrap its result for sharing.
    pub(crate) fn spawn<F>(id: String, request: F) -> Self
    where
        F: Future<Output = Result<serde_json::Value, CoreError>> + Send + 'static,
    {
        let task = tokio::spawn(request);
        let outcome = async move {
            task.await
                .unwrap_or_else(|e| Err(CoreError::Internal(format!("save task failed: {e}"))))
        }
        .boxed()
        .shared();

        Self { id, outcome }
    }

    /// Id of the course being saved.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the backend acknowledgement, or the propagated failure.
    pub async fn outcome(&self) -> Result<serde_json::Value, CoreError> {
        self.outcome.clone().await
    }

    /// The outcome, if the save has already finished and been awaited.
    pub fn peek(&self) -> Option<&Result<serde_json::Value, CoreError>> {
        self.outcome.peek()
    }
}

impl IntoFuture for SaveHandle {
    type Output = Result<serde_json::Value, CoreError>;
    type IntoFuture = SaveFuture;

    fn into_future(self) -> Self::IntoFuture {
        self.outcome
    }
}

impl std::fmt::Debug for SaveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveHandle")
            .field("id", &self.id)
            .field("done", &self.outcome.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn clones_share_one_execution() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let handle = SaveHandle::spawn("1".into(), async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({ "ok": true }))
        });
        let other = handle.clone();

        let (a, b) = tokio::join!(handle.outcome(), other.outcome());
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(handle.clone().await.unwrap(), serde_json::json!({ "ok": true }));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(handle.peek().is_some());
    }

    #[tokio::test]
    async fn failure_is_shared() {
        let handle = SaveHandle::spawn("1".into(), async {
            Err(CoreError::Timeout)
        });
        assert_eq!(handle.outcome().await, Err(CoreError::Timeout));
        assert_eq!(handle.clone().outcome().await, Err(CoreError::Timeout));
    }

    #[tokio::test]
    async fn request_runs_without_awaiting() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = SaveHandle::spawn("1".into(), async move {
            let _ = tx.send(());
            Ok(serde_json::Value::Null)
        });
        drop(handle);
        rx.await.unwrap();
    }
}
