use serde::{Deserialize, Serialize};

/// The authenticated user.
///
/// Serialized as-is into session storage so it survives restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,
    pub email: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}
