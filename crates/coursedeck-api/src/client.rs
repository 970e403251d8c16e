// Course backend HTTP client
//
// Wraps `reqwest::Client` with URL construction, status mapping, and
// `payload` envelope unwrapping. Endpoint methods live in sibling
// modules (`courses`, `auth`) as inherent impls to keep this module
// focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::transport::TransportConfig;

/// Raw HTTP client for the course backend.
///
/// Every endpoint lives under `{base_url}/api/`. Collection responses are
/// wrapped in a `{ "payload": ... }` envelope which is stripped before
/// the caller sees the data.
#[derive(Debug, Clone)]
pub struct CourseClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CourseClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://localhost:9000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the `payload` envelope.
    pub(crate) async fn get_payload<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let body = Self::success_body(resp).await?;

        let envelope: Envelope<T> = decode(&body)?;
        Ok(envelope.payload)
    }

    /// Send a PUT request with a JSON body, returning the raw acknowledgement.
    ///
    /// An empty response body is reported as `Value::Null`.
    pub(crate) async fn put_json(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<serde_json::Value, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        let body = Self::success_body(resp).await?;

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        decode(&body)
    }

    /// Send a POST request with a JSON body and decode the (unwrapped) response.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        let body = Self::success_body(resp).await?;

        decode(&body)
    }

    /// Map non-success statuses to errors and return the body text.
    async fn success_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        trace!(%status, "response received");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(Error::Http {
                status: status.as_u16(),
                message: if preview.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").into()
                } else {
                    preview
                },
            });
        }

        resp.text().await.map_err(Error::Transport)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}
