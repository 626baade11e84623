//! Dashboard page: the authenticated landing view.
//!
//! Business data (properties, tenants, payments) lives on the server and is
//! rendered by dedicated components out of scope here; this page owns only
//! the auth guard and the session-aware chrome.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::nav_bar::NavBar;
use crate::state::session::use_session;

/// Dashboard page — redirects to `/login` when there is no session.
#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    // Redirect to login if not authenticated.
    {
        let view = session.view;
        Effect::new(move || {
            let state = view.get();
            if !state.is_loading && !state.is_authenticated {
                navigate("/login", NavigateOptions::default());
            }
        });
    }

    let greeting = move || {
        session
            .view
            .get()
            .user
            .map(|u| format!("Welcome back, {}", u.display_name()))
            .unwrap_or_default()
    };

    view! {
        <div class="dashboard-page">
            <NavBar/>
            <header class="dashboard-page__header">
                <h1>"Dashboard"</h1>
                <p class="dashboard-page__greeting">{greeting}</p>
            </header>

            <div class="dashboard-page__grid">
                <section class="dashboard-card">
                    <h2>"Properties"</h2>
                    <a href="/properties">"Manage properties"</a>
                </section>
                <section class="dashboard-card">
                    <h2>"Tenants"</h2>
                    <a href="/tenants">"Manage tenants"</a>
                </section>
                <section class="dashboard-card">
                    <h2>"Payments"</h2>
                    <a href="/payments">"Review payments"</a>
                </section>
            </div>
        </div>
    }
}
