//! Reactive data layer between `coursedeck-api` and UI consumers.
//!
//! - **[`CoursesStore`]** -- Owns the course collection behind a
//!   `tokio::sync::watch` channel. [`refresh()`](CoursesStore::refresh)
//!   replaces it from the backend; [`save()`](CoursesStore::save) applies an
//!   optimistic edit, persists it, and rolls it back on failure.
//!
//! - **[`BusySignal`]** -- Shared busy flag. [`wrap()`](BusySignal::wrap)
//!   tracks any future for its whole lifetime; overlapping operations keep
//!   the flag raised until the last one ends.
//!
//! - **[`NotificationBus`]** -- Broadcast channel of non-empty
//!   [`MessageBatch`]es, separating failure detection from display.
//!
//! - **[`AuthStore`]** -- Logged-in user as an observable value, persisted in
//!   [`SessionStorage`].
//!
//! - **[`EntityStream`] / [`FilteredStream`]** -- Subscription handles with
//!   `current()` / `latest()` / `changed()` and `Stream` adapters.
//!
//! Nothing here is global: build the services yourself or via
//! [`AppContext`].

pub mod busy;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod messages;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use busy::{BusyGuard, BusySignal};
pub use config::StoreConfig;
pub use context::AppContext;
pub use error::CoreError;
pub use messages::{MessageBatch, MessageStream, NotificationBus};
pub use model::{Category, Course, CourseChanges, User, sort_by_seq_no};
pub use store::{AuthStore, CoursesStore, SaveHandle, SessionStorage};
pub use stream::{CourseFilter, EntityStream, FilteredStream, Snapshot};
