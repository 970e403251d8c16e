// Course endpoints
//
// Fetch-all and partial update. The update body is whatever partial
// field set the caller serializes; the backend acknowledgement is
// returned untouched.

use serde::Serialize;
use tracing::debug;

use crate::client::CourseClient;
use crate::error::Error;
use crate::models::CourseRecord;

impl CourseClient {
    /// Fetch every course.
    ///
    /// `GET /api/courses` → `{ "payload": [CourseRecord, ...] }`
    pub async fn list_courses(&self) -> Result<Vec<CourseRecord>, Error> {
        let url = self.api_url("courses")?;
        let courses: Vec<CourseRecord> = self.get_payload(url).await?;
        debug!(count = courses.len(), "fetched courses");
        Ok(courses)
    }

    /// Persist a partial update for one course.
    ///
    /// `PUT /api/courses/{id}` with the changed fields as the JSON body.
    pub async fn update_course(
        &self,
        id: &str,
        changes: &(impl Serialize + Sync),
    ) -> Result<serde_json::Value, Error> {
        let url = self.api_url(&format!("courses/{id}"))?;
        self.put_json(url, changes).await
    }
}
