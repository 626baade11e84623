//! Wire types shared between the gateway and the session layer.
//!
//! `UserRecord` is an explicit schema at the gateway boundary: the session
//! layer relies only on the identity fields and round-trips everything else
//! verbatim through `extra`, so server-owned business fields survive a
//! store round trip without the client assuming their shape.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Identity payload returned by the server.
///
/// `id` stays a raw JSON value because the server is free to use numeric or
/// string identifiers; the client only ever displays it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    /// Best label available for headers and greetings.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_owned();
        }
        if let Some(email) = self.email.as_deref() {
            return email.to_owned();
        }
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Successful login/register response.
///
/// The upstream API spells the refresh token both ways depending on the
/// endpoint version; accept either.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthSession {
    pub user: UserRecord,
    pub token: String,
    #[serde(default, alias = "refreshToken", alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

/// Successful token refresh response.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenPair {
    pub token: String,
    #[serde(default, alias = "refreshToken", alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

/// Registration form payload, sent verbatim to `/auth/register/`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
