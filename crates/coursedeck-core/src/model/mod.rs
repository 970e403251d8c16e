// ── Domain model ──
//
// Canonical types consumed by the store and its subscribers. Values are
// immutable snapshots: edits produce new values.

mod course;
mod user;

pub use course::{Category, Course, CourseChanges, sort_by_seq_no};
pub use user::User;
