// ── Runtime configuration ──
//
// Describes *how* to reach the backend and size the shared channels.
// Never touches disk: `coursedeck-config` (or a test) builds one and
// hands it in.

use std::path::PathBuf;
use std::time::Duration;

use coursedeck_api::{CourseClient, TransportConfig};
use url::Url;

use crate::error::CoreError;
use crate::messages::NotificationBus;

/// Configuration for one backend connection and its shared state.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend base URL (e.g. `http://localhost:9000`).
    pub api_url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// How many unread notification batches a slow subscriber may fall behind.
    pub message_capacity: usize,
    /// Directory for process-durable session data (the logged-in user).
    pub session_dir: PathBuf,
}

impl StoreConfig {
    /// Config with default tuning for the given backend and session directory.
    pub fn new(api_url: Url, session_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_url,
            timeout: Duration::from_secs(30),
            message_capacity: NotificationBus::DEFAULT_CAPACITY,
            session_dir: session_dir.into(),
        }
    }

    /// Transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default().with_timeout(self.timeout)
    }

    /// Build the backend client.
    pub fn build_client(&self) -> Result<CourseClient, CoreError> {
        Ok(CourseClient::new(self.api_url.clone(), &self.transport())?)
    }
}
