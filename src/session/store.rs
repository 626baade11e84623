//! Credential persistence.
//!
//! The store holds three logical fields: access token, refresh token, and the
//! serialized current-user record. Reads are synchronous — the session view
//! needs them at first render, before any network round trip — and never
//! fail: corrupted persisted state degrades to "logged out", not to a crash.
//!
//! The browser implementation lives in `localStorage`; tests and SSR use the
//! in-memory store.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;

use crate::net::types::UserRecord;

/// localStorage keys for the persisted credential fields.
pub const ACCESS_TOKEN_KEY: &str = "rentdesk_access_token";
pub const REFRESH_TOKEN_KEY: &str = "rentdesk_refresh_token";
pub const USER_KEY: &str = "rentdesk_user";

/// The persisted credential tuple.
///
/// Invariant: `user` is present iff `access_token` is present. A token
/// without a cached identity (or the reverse) is corrupt state and reads as
/// the fully-empty record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CredentialRecord {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserRecord>,
}

impl CredentialRecord {
    /// The logged-out record: all three fields absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A complete signed-in record.
    pub fn signed_in(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        user: UserRecord,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
            user: Some(user),
        }
    }

    /// True when both the token and the cached identity are present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    /// Enforce the token/user invariant.
    ///
    /// A dangling token or dangling identity collapses to the fully-empty
    /// record — "logged out", never a half-session.
    pub fn normalized(self) -> Self {
        if self.access_token.is_some() == self.user.is_some() {
            self
        } else {
            Self::empty()
        }
    }
}

/// Synchronous credential persistence.
///
/// Injected into the session manager and the gateway so tests can substitute
/// [`MemoryStore`]. Writes are all-or-nothing per record; there is no partial
/// update surface.
pub trait CredentialStore {
    /// Current record, normalized. Missing or corrupt data reads as empty.
    fn get(&self) -> CredentialRecord;
    /// Replace the whole record.
    fn set(&self, record: &CredentialRecord);
    /// Drop all three fields. Clearing an already-empty store is a no-op.
    fn clear(&self);
}

/// In-memory store for tests and the SSR pass.
#[derive(Default)]
pub struct MemoryStore {
    record: RefCell<CredentialRecord>,
}

impl MemoryStore {
    pub fn new(record: CredentialRecord) -> Self {
        Self { record: RefCell::new(record) }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> CredentialRecord {
        self.record.borrow().clone().normalized()
    }

    fn set(&self, record: &CredentialRecord) {
        *self.record.borrow_mut() = record.clone();
    }

    fn clear(&self) {
        *self.record.borrow_mut() = CredentialRecord::empty();
    }
}

/// Browser store backed by `localStorage`.
///
/// Storage failures (quota, disabled storage, private mode quirks) are
/// swallowed on write and read as empty, matching the degrade-to-logged-out
/// contract.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageStore;

#[cfg(feature = "hydrate")]
impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl CredentialStore for LocalStorageStore {
    fn get(&self) -> CredentialRecord {
        let Some(storage) = Self::storage() else {
            return CredentialRecord::empty();
        };

        let read = |key: &str| storage.get_item(key).ok().flatten();

        let access_token = read(ACCESS_TOKEN_KEY);
        let refresh_token = read(REFRESH_TOKEN_KEY);
        let user = match read(USER_KEY) {
            Some(raw) => match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    // Unreadable cached identity: treat the whole record as
                    // corrupt rather than keeping a token with no user.
                    leptos::logging::warn!("discarding corrupt cached user: {e}");
                    None
                }
            },
            None => None,
        };

        CredentialRecord { access_token, refresh_token, user }.normalized()
    }

    fn set(&self, record: &CredentialRecord) {
        let Some(storage) = Self::storage() else {
            return;
        };

        match &record.access_token {
            Some(token) => {
                let _ = storage.set_item(ACCESS_TOKEN_KEY, token);
            }
            None => {
                let _ = storage.remove_item(ACCESS_TOKEN_KEY);
            }
        }
        match &record.refresh_token {
            Some(token) => {
                let _ = storage.set_item(REFRESH_TOKEN_KEY, token);
            }
            None => {
                let _ = storage.remove_item(REFRESH_TOKEN_KEY);
            }
        }
        match record.user.as_ref().and_then(|u| serde_json::to_string(u).ok()) {
            Some(json) => {
                let _ = storage.set_item(USER_KEY, &json);
            }
            None => {
                let _ = storage.remove_item(USER_KEY);
            }
        }
    }

    fn clear(&self) {
        let Some(storage) = Self::storage() else {
            return;
        };
        let _ = storage.remove_item(ACCESS_TOKEN_KEY);
        let _ = storage.remove_item(REFRESH_TOKEN_KEY);
        let _ = storage.remove_item(USER_KEY);
    }
}

/// Store the running binary actually uses.
#[cfg(feature = "hydrate")]
pub fn platform_store() -> std::rc::Rc<dyn CredentialStore> {
    std::rc::Rc::new(LocalStorageStore)
}

/// SSR pass renders logged-out; the browser re-reads localStorage on hydrate.
#[cfg(not(feature = "hydrate"))]
pub fn platform_store() -> std::rc::Rc<dyn CredentialStore> {
    std::rc::Rc::new(MemoryStore::default())
}
