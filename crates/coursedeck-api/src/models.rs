// Raw wire types for the course backend.
//
// These mirror the JSON the backend speaks. `coursedeck-core` converts
// them into its own domain model; consumers should not depend on them.

use serde::{Deserialize, Serialize};

/// Response envelope: the backend nests the actual data under `payload`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub payload: T,
}

/// A course as sent by the backend.
///
/// Only `id`, `seqNo`, and `category` are guaranteed; everything else
/// is optional on the wire.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub seq_no: i64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub course_list_icon: Option<String>,
    #[serde(default)]
    pub lessons_count: Option<u32>,
    #[serde(default)]
    pub promo: Option<bool>,
}

/// The authenticated user returned by `/api/login`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub email: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}

/// Body of the login request.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Backends disagree on whether ids are strings or numbers; accept both.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}
