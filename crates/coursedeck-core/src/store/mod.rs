// ── Reactive stores ──
//
// Shared, observable state containers. Each store owns its state and is
// the only writer; consumers get read-only subscriptions.

mod auth;
mod courses;
mod ledger;
mod save;
mod session;

pub use auth::{AUTH_DATA_KEY, AuthStore};
pub use courses::{CoursesStore, LOAD_FAILED_MESSAGE, SAVE_FAILED_MESSAGE};
pub use save::SaveHandle;
pub use session::SessionStorage;
