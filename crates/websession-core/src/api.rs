use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the authenticated user as returned by the current-user endpoint.
///
/// Only the fields the session layer and its callers commonly read are typed;
/// anything else the server sends is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            first_name: None,
            last_name: None,
            role: None,
            extra: Map::new(),
        }
    }

    /// Name for log lines; `-` when the server sent none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfToken {
    pub header_name: String,
    #[serde(default)]
    pub parameter_name: Option<String>,
    pub token: String,
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub j_username: &'a str,
    pub j_password: &'a str,
}
