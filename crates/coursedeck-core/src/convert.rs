// ── Wire → domain conversion ──
//
// `coursedeck-api` speaks raw records; the store only ever holds the
// canonical model. Unknown categories are rejected rather than guessed.

use std::collections::HashMap;
use std::sync::Arc;

use coursedeck_api::{CourseRecord, UserRecord};
use tracing::warn;

use crate::error::CoreError;
use crate::model::{Category, Course, User};

impl TryFrom<CourseRecord> for Course {
    type Error = CoreError;

    fn try_from(record: CourseRecord) -> Result<Self, Self::Error> {
        let category: Category =
            record
                .category
                .parse()
                .map_err(|_| CoreError::ValidationFailed {
                    message: format!(
                        "course {} has unknown category '{}'",
                        record.id, record.category
                    ),
                })?;

        Ok(Course {
            id: record.id,
            seq_no: record.seq_no,
            category,
            description: record.description,
            long_description: record.long_description,
            icon_url: record.icon_url,
            course_list_icon: record.course_list_icon,
            lessons_count: record.lessons_count,
            promo: record.promo.unwrap_or(false),
        })
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            email: record.email,
            picture_url: record.picture_url,
        }
    }
}

/// Convert a fetched batch into a collection that is unique by id.
///
/// A repeated id keeps the position of its first occurrence and the value
/// of its last.
pub(crate) fn collect_courses(records: Vec<CourseRecord>) -> Result<Vec<Arc<Course>>, CoreError> {
    let mut courses: Vec<Arc<Course>> = Vec::with_capacity(records.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for record in records {
        let course = Course::try_from(record)?;
        if let Some(&index) = positions.get(&course.id) {
            warn!(id = %course.id, "duplicate course id in payload");
            if let Some(slot) = courses.get_mut(index) {
                *slot = Arc::new(course);
            }
        } else {
            positions.insert(course.id.clone(), courses.len());
            courses.push(Arc::new(course));
        }
    }

    Ok(courses)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(id: &str, seq_no: i64, category: &str) -> CourseRecord {
        CourseRecord {
            id: id.into(),
            seq_no,
            category: category.into(),
            description: None,
            long_description: None,
            icon_url: None,
            course_list_icon: None,
            lessons_count: None,
            promo: None,
        }
    }

    #[test]
    fn record_converts() {
        let course = Course::try_from(record("1", 3, "BEGINNER")).unwrap();
        assert_eq!(course.category, Category::Beginner);
        assert!(!course.promo);
    }

    #[test]
    fn unknown_category_rejected() {
        let err = Course::try_from(record("1", 3, "EXPERT")).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn duplicates_collapse_to_one_entry() {
        let courses = collect_courses(vec![
            record("1", 1, "BEGINNER"),
            record("2", 2, "ADVANCED"),
            record("1", 7, "ADVANCED"),
        ])
        .unwrap();

        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].id, "1");
        assert_eq!(courses[0].seq_no, 7);
        assert_eq!(courses[1].id, "2");
    }
}
