//! Hard navigation helpers for outside-the-Router contexts.
//!
//! The session-expiry handler runs from arbitrary async tasks where no
//! Router context is available, so it navigates through `window.location`.

/// Send the user to the login page. No-op when already there, so concurrent
/// expiry signals collapse into one navigation.
pub fn redirect_to_login() {
    #[cfg(feature = "hydrate")]
    {
        if let Some(window) = web_sys::window() {
            let location = window.location();
            let path = location.pathname().unwrap_or_default();
            if path != "/login" {
                let _ = location.set_href("/login");
            }
        }
    }
}
