//! Session operations: login, register, logout, refresh, profile.
//!
//! The manager is the only writer of the credential store in the normal
//! flow (the gateway's expiry procedure being the one global exception).
//! Every operation returns the normalized [`ApiResult`] and persists on
//! success; persistence itself goes through small pure helpers so the
//! atomicity rules are unit-testable without a network.
//!
//! State machine per browser session:
//! `LoggedOut → (login/register success) → LoggedIn → (logout | refresh
//! failure | any Unauthorized) → LoggedOut`.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::rc::Rc;

use crate::net::error::{ApiError, ApiResult, ErrorKind};
use crate::net::gateway::{Auth, Gateway, HttpTransport, Method};
use crate::net::types::{AuthSession, RegisterPayload, TokenPair, UserRecord};
use crate::session::store::{CredentialRecord, CredentialStore};

pub struct SessionManager<T: HttpTransport> {
    gateway: Rc<Gateway<T>>,
    store: Rc<dyn CredentialStore>,
}

impl<T: HttpTransport> SessionManager<T> {
    pub fn new(gateway: Rc<Gateway<T>>, store: Rc<dyn CredentialStore>) -> Self {
        Self { gateway, store }
    }

    /// Authenticate and persist the resulting session atomically.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserRecord> {
        let value = self
            .gateway
            .request(
                Method::Post,
                "/auth/login/",
                Some(serde_json::json!({ "email": email, "password": password })),
                Auth::Anonymous,
            )
            .await?;
        let session = decode_auth_session(value)?;
        store_session(self.store.as_ref(), &session);
        Ok(session.user)
    }

    /// Create an account; the response carries a session, same as login.
    pub async fn register(&self, payload: &RegisterPayload) -> ApiResult<UserRecord> {
        let body = serde_json::to_value(payload)
            .map_err(|e| ApiError::new(ErrorKind::Unknown, e.to_string()))?;
        let value = self
            .gateway
            .request(Method::Post, "/auth/register/", Some(body), Auth::Anonymous)
            .await?;
        let session = decode_auth_session(value)?;
        store_session(self.store.as_ref(), &session);
        Ok(session.user)
    }

    /// End the session. The server call is best-effort; local credentials are
    /// cleared no matter what it returns, and the server-side outcome is
    /// surfaced for callers that care.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self
            .gateway
            .request(Method::Post, "/auth/logout/", None, Auth::Bearer)
            .await;
        if let Err(err) = &result {
            leptos::logging::warn!("logout request failed, clearing locally anyway: {err}");
        }
        self.store.clear();
        result.map(|_| ())
    }

    /// Mint a new access token from the stored refresh token.
    ///
    /// A dead refresh token means the session cannot be salvaged, so any
    /// failure clears the store instead of retrying.
    pub async fn refresh(&self) -> ApiResult<String> {
        let Some(refresh_token) = self.store.get().refresh_token else {
            self.store.clear();
            return Err(ApiError::from_kind(ErrorKind::Unauthorized));
        };

        let outcome = self
            .gateway
            .request(
                Method::Post,
                "/auth/refresh/",
                Some(serde_json::json!({ "refreshToken": refresh_token })),
                Auth::Anonymous,
            )
            .await
            .and_then(decode_token_pair);

        match outcome {
            Ok(pair) => {
                apply_refresh(self.store.as_ref(), &pair);
                Ok(pair.token)
            }
            Err(err) => {
                self.store.clear();
                Err(err)
            }
        }
    }

    /// Fetch the current identity without touching the tokens.
    ///
    /// Used for background verification of an optimistic session; a 401 here
    /// expires the session through the gateway's global effect.
    pub async fn get_profile(&self) -> ApiResult<UserRecord> {
        self.gateway
            .request_as(Method::Get, "/accounts/profile/me/", None, Auth::Bearer)
            .await
    }

    /// Update the server-side profile and refresh the cached identity.
    pub async fn update_profile(&self, patch: serde_json::Value) -> ApiResult<UserRecord> {
        let user: UserRecord = self
            .gateway
            .request_as(
                Method::Put,
                "/accounts/profile/update_profile/",
                Some(patch),
                Auth::Bearer,
            )
            .await?;
        apply_profile(self.store.as_ref(), &user);
        Ok(user)
    }
}

// =============================================================
// Persistence helpers (pure over the store)
// =============================================================

fn decode_auth_session(value: serde_json::Value) -> ApiResult<AuthSession> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::malformed(format!("auth response missing fields: {e}")))
}

fn decode_token_pair(value: serde_json::Value) -> ApiResult<TokenPair> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::malformed(format!("refresh response missing fields: {e}")))
}

/// Persist a fresh session in one write: token, refresh token, and user land
/// together or not at all.
fn store_session(store: &dyn CredentialStore, session: &AuthSession) {
    store.set(&CredentialRecord::signed_in(
        session.token.clone(),
        session.refresh_token.clone(),
        session.user.clone(),
    ));
}

/// Swap tokens after a refresh, keeping the cached user. If the server did
/// not rotate the refresh token, the old one stays.
fn apply_refresh(store: &dyn CredentialStore, pair: &TokenPair) {
    let current = store.get();
    let Some(user) = current.user else {
        // Refresh without a cached identity would violate the token/user
        // invariant; leave the store logged out.
        store.clear();
        return;
    };
    store.set(&CredentialRecord::signed_in(
        pair.token.clone(),
        pair.refresh_token.clone().or(current.refresh_token),
        user,
    ));
}

/// Replace the cached identity after a profile fetch/update. A logged-out
/// store stays logged out.
fn apply_profile(store: &dyn CredentialStore, user: &UserRecord) {
    let current = store.get();
    let Some(access_token) = current.access_token else {
        return;
    };
    store.set(&CredentialRecord::signed_in(
        access_token,
        current.refresh_token,
        user.clone(),
    ));
}
