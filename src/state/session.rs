//! UI-facing session state.
//!
//! [`SessionView`] is a plain struct with pure transition methods; the app
//! holds it in an `RwSignal` provided via context. Components read it through
//! [`use_session`] and drive it through the [`SessionContext`] operations,
//! which delegate to the session manager and fold its results back into the
//! signal.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;

use crate::net::error::ApiResult;
use crate::net::gateway::PlatformTransport;
use crate::net::types::{RegisterPayload, UserRecord};
use crate::session::manager::SessionManager;
use crate::session::store::CredentialRecord;

/// What the rest of the application sees of the session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionView {
    pub user: Option<UserRecord>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl SessionView {
    /// Startup protocol, step one: synchronous optimistic read.
    ///
    /// Returns the initial view plus whether a background profile
    /// verification should run. An empty store renders logged out with zero
    /// network calls; a populated store renders authenticated immediately
    /// from possibly-stale local data.
    pub fn startup(record: &CredentialRecord) -> (Self, bool) {
        if record.is_authenticated() {
            (
                Self {
                    user: record.user.clone(),
                    is_authenticated: true,
                    is_loading: false,
                },
                true,
            )
        } else {
            (Self::default(), false)
        }
    }

    /// Background verification succeeded: replace the possibly-stale cached
    /// user with the fresh record. No-op if the session died in the interim.
    pub fn apply_verified_user(&mut self, user: UserRecord) {
        if self.is_authenticated {
            self.user = Some(user);
        }
    }

    pub fn apply_signed_in(&mut self, user: UserRecord) {
        self.user = Some(user);
        self.is_authenticated = true;
        self.is_loading = false;
    }

    pub fn apply_signed_out(&mut self) {
        *self = Self::default();
    }
}

/// Session context provided at the app root.
#[derive(Clone)]
pub struct SessionContext {
    pub view: RwSignal<SessionView>,
    pub manager: SendWrapper<Rc<SessionManager<PlatformTransport>>>,
}

/// Grab the session context. Panics if called outside `App`.
pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}

impl SessionContext {
    /// Sign in and fold the result into the view. `is_loading` is held for
    /// the duration so forms can disable their controls.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserRecord> {
        self.view.update(|v| v.is_loading = true);
        let result = self.manager.login(email, password).await;
        self.view.update(|v| match &result {
            Ok(user) => v.apply_signed_in(user.clone()),
            Err(_) => v.is_loading = false,
        });
        result
    }

    pub async fn register(&self, payload: &RegisterPayload) -> ApiResult<UserRecord> {
        self.view.update(|v| v.is_loading = true);
        let result = self.manager.register(payload).await;
        self.view.update(|v| match &result {
            Ok(user) => v.apply_signed_in(user.clone()),
            Err(_) => v.is_loading = false,
        });
        result
    }

    /// Sign out. Local state is demoted regardless of what the server said.
    pub async fn logout(&self) {
        self.view.update(|v| v.is_loading = true);
        let _ = self.manager.logout().await;
        self.view.update(SessionView::apply_signed_out);
    }

    pub async fn update_profile(&self, patch: serde_json::Value) -> ApiResult<UserRecord> {
        self.view.update(|v| v.is_loading = true);
        let result = self.manager.update_profile(patch).await;
        self.view.update(|v| {
            v.is_loading = false;
            if let Ok(user) = &result {
                v.apply_verified_user(user.clone());
            }
        });
        result
    }

    /// Startup protocol, step two: non-blocking verification of the
    /// optimistic session against the server.
    ///
    /// Success self-heals any staleness in the cached user. Failure does not
    /// demote the session from here — a transient network error must leave
    /// the optimistic state intact, and a 401 has already expired the session
    /// through the gateway's global effect.
    pub async fn verify(&self) {
        match self.manager.get_profile().await {
            Ok(user) => self.view.update(|v| v.apply_verified_user(user)),
            Err(err) => {
                leptos::logging::warn!("background profile verification failed: {err}");
            }
        }
    }
}
