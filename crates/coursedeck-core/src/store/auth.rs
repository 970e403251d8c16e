// ── Auth store ──
//
// Holds the logged-in user as an observable value and keeps it in
// session storage so a restart picks the session back up.

use std::sync::Arc;

use coursedeck_api::CourseClient;
use futures_core::Stream;
use secrecy::SecretString;
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use super::session::SessionStorage;
use crate::error::CoreError;
use crate::model::User;

/// Session storage key for the persisted user.
pub const AUTH_DATA_KEY: &str = "auth_data";

/// Reactive store for the authenticated user.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    client: CourseClient,
    storage: SessionStorage,
    user: watch::Sender<Option<Arc<User>>>,
}

impl AuthStore {
    /// Create the store, restoring a persisted user if there is one.
    ///
    /// Unreadable session data is logged and treated as logged out.
    pub fn new(client: CourseClient, storage: SessionStorage) -> Self {
        let restored = match storage.load::<User>(AUTH_DATA_KEY) {
            Ok(Some(user)) => {
                debug!(email = %user.email, "restored session");
                Some(Arc::new(user))
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session data");
                None
            }
        };
        let (user, _) = watch::channel(restored);

        Self {
            inner: Arc::new(AuthInner {
                client,
                storage,
                user,
            }),
        }
    }

    /// Authenticate, publish the user, and persist it.
    ///
    /// A failure to persist is logged but does not fail the login: the
    /// session is valid for this process either way.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Arc<User>, CoreError> {
        let user: Arc<User> = Arc::new(self.inner.client.login(email, password).await?.into());

        self.inner.user.send_replace(Some(Arc::clone(&user)));
        if let Err(e) = self.inner.storage.store(AUTH_DATA_KEY, user.as_ref()) {
            warn!(error = %e, "could not persist session");
        }

        info!(email = %user.email, "logged in");
        Ok(user)
    }

    /// Forget the user, in memory and on disk.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.inner.user.send_replace(None);
        self.inner.storage.remove(AUTH_DATA_KEY)?;
        info!("logged out");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn current_user(&self) -> Option<Arc<User>> {
        self.inner.user.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.user.borrow().is_some()
    }

    pub fn is_logged_out(&self) -> bool {
        !self.is_logged_in()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to the user. `None` means logged out.
    pub fn user(&self) -> watch::Receiver<Option<Arc<User>>> {
        self.inner.user.subscribe()
    }

    /// Logged-in flag as a stream: current value first, then each change.
    pub fn logged_in(&self) -> impl Stream<Item = bool> + Send + Unpin + use<> {
        WatchStream::new(self.user()).map(|user| user.is_some())
    }

    /// Logged-out flag as a stream: current value first, then each change.
    pub fn logged_out(&self) -> impl Stream<Item = bool> + Send + Unpin + use<> {
        self.logged_in().map(|logged_in| !logged_in)
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("session_dir", &self.inner.storage.dir())
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}
