// Authentication endpoint
//
// Email/password login. The backend answers with the user record; the
// core decides how and where to persist it.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::CourseClient;
use crate::error::Error;
use crate::models::{LoginRequest, UserRecord};

impl CourseClient {
    /// Authenticate with email and password.
    ///
    /// `POST /api/login` with `{ email, password }`. Any non-success status
    /// is reported as [`Error::Authentication`].
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<UserRecord, Error> {
        let url = self.api_url("login")?;

        debug!("logging in at {}", url);

        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };

        let user: UserRecord = self.post_json(url, &body).await.map_err(|e| match e {
            Error::Http { status, message } => Error::Authentication {
                message: format!("login failed (HTTP {status}): {message}"),
            },
            other => other,
        })?;

        debug!("login successful");
        Ok(user)
    }
}
