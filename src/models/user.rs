//! User identity and the client-side session.

use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Authenticated user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    /// Backend user ID (sent as a number, kept as a string)
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl User {
    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        match self.first_name.as_deref() {
            Some(first) if !first.trim().is_empty() => first,
            _ => &self.username,
        }
    }
}

/// The current login: who we are and the tokens that prove it.
///
/// Owned by the credential store; replaced whole on login/signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
