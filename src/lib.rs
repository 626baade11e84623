//! # rentdesk-client
//!
//! Leptos + WASM frontend for the RentDesk rental-management backend.
//!
//! The interesting layer is the session core: a credential store persisted in
//! `localStorage`, a request gateway that normalizes every network outcome
//! into one result type, a session manager for login/register/logout/refresh/
//! profile, and a reactive session view that renders optimistically from the
//! store and verifies against the server in the background. Pages and
//! components are thin consumers of that layer.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered page.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
