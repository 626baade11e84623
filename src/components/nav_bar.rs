//! Top navigation bar with theme toggle and sign-out.

use leptos::prelude::*;

use crate::state::session::use_session;
use crate::util::theme;

/// Shared navigation chrome for authenticated pages.
#[component]
pub fn NavBar() -> impl IntoView {
    let session = use_session();

    let current_theme = RwSignal::new(theme::current());
    theme::apply(current_theme.get_untracked());

    let on_toggle_theme = move |_| {
        let next = current_theme.get_untracked().toggled();
        theme::set(next);
        current_theme.set(next);
    };

    let on_logout = move |_| {
        #[cfg(feature = "hydrate")]
        {
            let session = session.clone();
            leptos::task::spawn_local(async move {
                session.logout().await;
                crate::util::navigation::redirect_to_login();
            });
        }

        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &session;
        }
    };

    view! {
        <nav class="nav-bar">
            <a class="nav-bar__brand" href="/">"RentDesk"</a>
            <div class="nav-bar__actions">
                <a href="/profile">"Profile"</a>
                <button class="btn" on:click=on_toggle_theme>
                    {move || if current_theme.get().is_dark() { "Light" } else { "Dark" }}
                </button>
                <button class="btn" on:click=on_logout>
                    "Sign out"
                </button>
            </div>
        </nav>
    }
}
