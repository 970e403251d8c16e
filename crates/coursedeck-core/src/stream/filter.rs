// ── Filtered course views ──
//
// Derived, continuously-updating subsets of the course collection. Every
// snapshot is filtered and then stably sorted by `seq_no`.

use std::sync::Arc;

use futures_core::Stream;
use tokio_stream::StreamExt;

use super::EntityStream;
use crate::model::{Category, Course, sort_by_seq_no};

/// Filter predicate for course collections.
pub enum CourseFilter {
    All,
    ByCategory(Category),
    Custom(Box<dyn Fn(&Course) -> bool + Send + Sync>),
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        match self {
            Self::All => true,
            Self::ByCategory(category) => course.category == *category,
            Self::Custom(f) => f(course),
        }
    }

    /// Matching courses ordered by `seq_no` ascending (ties keep input order).
    pub fn apply(&self, courses: &[Arc<Course>]) -> Vec<Arc<Course>> {
        let mut matching: Vec<Arc<Course>> = courses
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect();
        sort_by_seq_no(&mut matching);
        matching
    }
}

impl std::fmt::Debug for CourseFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::ByCategory(category) => write!(f, "ByCategory({category})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A filtered subscription over the course collection.
///
/// Restartable: a new view immediately reflects the latest collection.
pub struct FilteredStream {
    inner: EntityStream<Course>,
    filter: CourseFilter,
}

impl FilteredStream {
    pub(crate) fn new(inner: EntityStream<Course>, filter: CourseFilter) -> Self {
        Self { inner, filter }
    }

    pub fn filter(&self) -> &CourseFilter {
        &self.filter
    }

    /// The filtered view of the snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> Vec<Arc<Course>> {
        self.filter.apply(self.inner.current())
    }

    /// The filtered view of the latest published snapshot.
    pub fn latest(&self) -> Vec<Arc<Course>> {
        self.filter.apply(&self.inner.latest())
    }

    /// Wait for the collection to change, returning the new filtered view.
    pub async fn changed(&mut self) -> Option<Vec<Arc<Course>>> {
        let snap = self.inner.changed().await?;
        Some(self.filter.apply(&snap))
    }

    /// Convert into a `Stream` yielding the current view first, then one
    /// view per collection change.
    pub fn into_stream(self) -> impl Stream<Item = Vec<Arc<Course>>> + Send + Unpin {
        let filter = self.filter;
        self.inner
            .into_stream()
            .map(move |snap| filter.apply(&snap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, seq_no: i64, category: Category) -> Arc<Course> {
        Arc::new(Course {
            id: id.into(),
            seq_no,
            category,
            description: None,
            long_description: None,
            icon_url: None,
            course_list_icon: None,
            lessons_count: None,
            promo: id == "promo",
        })
    }

    fn ids(courses: &[Arc<Course>]) -> Vec<&str> {
        courses.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn by_category_filters_and_sorts() {
        let courses = vec![
            course("a", 3, Category::Beginner),
            course("b", 1, Category::Advanced),
            course("c", 2, Category::Beginner),
        ];

        let beginner = CourseFilter::ByCategory(Category::Beginner).apply(&courses);
        assert_eq!(ids(&beginner), vec!["c", "a"]);

        let advanced = CourseFilter::ByCategory(Category::Advanced).apply(&courses);
        assert_eq!(ids(&advanced), vec!["b"]);
    }

    #[test]
    fn custom_and_all_filters() {
        let courses = vec![
            course("promo", 5, Category::Beginner),
            course("plain", 4, Category::Advanced),
        ];

        let promo = CourseFilter::Custom(Box::new(|c| c.promo));
        assert_eq!(ids(&promo.apply(&courses)), vec!["promo"]);

        let custom = CourseFilter::Custom(Box::new(|c| c.seq_no < 5));
        assert_eq!(ids(&custom.apply(&courses)), vec!["plain"]);
        assert_eq!(ids(&CourseFilter::All.apply(&courses)), vec!["plain", "promo"]);
    }
}
