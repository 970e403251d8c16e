// ── Application context ──
//
// Explicitly constructed bundle of the shared services. Consumers get
// one of these instead of reaching for globals, and tests build as many
// isolated contexts as they like.

use tracing::debug;

use crate::busy::BusySignal;
use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::messages::NotificationBus;
use crate::store::{AuthStore, CoursesStore, SessionStorage};

/// The shared services of one running application.
///
/// Cheaply cloneable; every field is a handle onto shared state.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub busy: BusySignal,
    pub messages: NotificationBus,
    pub courses: CoursesStore,
    pub auth: AuthStore,
}

impl AppContext {
    /// Wire up the services for `config`. Does no network I/O; the
    /// persisted session (if any) is restored from disk.
    pub fn new(config: &StoreConfig) -> Result<Self, CoreError> {
        let client = config.build_client()?;
        let busy = BusySignal::new();
        let messages = NotificationBus::new(config.message_capacity);

        let courses = CoursesStore::new(client.clone(), busy.clone(), messages.clone());
        let auth = AuthStore::new(client, SessionStorage::new(&config.session_dir));

        debug!(api_url = %config.api_url, "application context ready");
        Ok(Self {
            busy,
            messages,
            courses,
            auth,
        })
    }
}
