// ── Course domain types ──

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Difficulty tier of a course.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Category {
    Beginner,
    Advanced,
}

/// A course snapshot.
///
/// `seq_no` is the display ordering key; collection order itself carries
/// no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub seq_no: i64,
    pub category: Category,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub icon_url: Option<String>,
    pub course_list_icon: Option<String>,
    pub lessons_count: Option<u32>,
    pub promo: bool,
}

impl Course {
    /// Return a new course with `changes` layered on top of this one.
    #[must_use]
    pub fn apply(&self, changes: &CourseChanges) -> Course {
        let mut next = self.clone();
        if let Some(seq_no) = changes.seq_no {
            next.seq_no = seq_no;
        }
        if let Some(category) = changes.category {
            next.category = category;
        }
        if let Some(ref description) = changes.description {
            next.description.clone_from(description);
        }
        if let Some(ref long_description) = changes.long_description {
            next.long_description.clone_from(long_description);
        }
        if let Some(ref icon_url) = changes.icon_url {
            next.icon_url.clone_from(icon_url);
        }
        if let Some(ref course_list_icon) = changes.course_list_icon {
            next.course_list_icon.clone_from(course_list_icon);
        }
        if let Some(lessons_count) = changes.lessons_count {
            next.lessons_count = lessons_count;
        }
        if let Some(promo) = changes.promo {
            next.promo = promo;
        }
        next
    }
}

/// A partial set of course fields.
///
/// `None` leaves a field untouched. Nullable fields use a nested `Option`
/// so a change can clear them (`Some(None)` serializes as `null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq_no: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_list_icon: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_count: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo: Option<bool>,
}

impl CourseChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seq_no(mut self, seq_no: i64) -> Self {
        self.seq_no = Some(seq_no);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn with_promo(mut self, promo: bool) -> Self {
        self.promo = Some(promo);
        self
    }

    /// `true` if no field would change.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Sort by `seq_no` ascending. Stable: equal keys keep their relative order.
pub fn sort_by_seq_no(courses: &mut [Arc<Course>]) {
    courses.sort_by_key(|c| c.seq_no);
}
