//! Profile page: view and update the current identity.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::nav_bar::NavBar;
use crate::state::session::use_session;

/// Profile page — partial update of the server-side profile; the cached
/// identity refreshes from the response.
#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    {
        let view = session.view;
        Effect::new(move || {
            let state = view.get();
            if !state.is_loading && !state.is_authenticated {
                navigate("/login", NavigateOptions::default());
            }
        });
    }

    let current = session.view.get_untracked().user;
    let name = RwSignal::new(
        current
            .as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_default(),
    );
    let email_label = current
        .as_ref()
        .and_then(|u| u.email.clone())
        .unwrap_or_default();
    let notice = RwSignal::new(Option::<String>::None);

    let submit = {
        let session = session.clone();
        Callback::new(move |()| {
            let new_name = name.get().trim().to_owned();
            if new_name.is_empty() {
                notice.set(Some("Name cannot be empty.".to_owned()));
                return;
            }

            #[cfg(feature = "hydrate")]
            {
                let session = session.clone();
                leptos::task::spawn_local(async move {
                    match session
                        .update_profile(serde_json::json!({ "name": new_name }))
                        .await
                    {
                        Ok(_) => notice.set(Some("Profile updated.".to_owned())),
                        Err(err) => notice.set(Some(err.message.clone())),
                    }
                });
            }

            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&session, new_name);
            }
        })
    };

    let view = session.view;
    let is_loading = move || view.get().is_loading;

    view! {
        <div class="profile-page">
            <NavBar/>
            <header class="profile-page__header">
                <h1>"Profile"</h1>
                <p class="profile-page__email">{email_label}</p>
            </header>

            <form class="auth-form" on:submit=move |ev| {
                ev.prevent_default();
                submit.run(());
            }>
                <label class="auth-form__label">
                    "Full name"
                    <input
                        class="auth-form__input"
                        type="text"
                        prop:value=move || name.get()
                        on:input=move |ev| name.set(event_target_value(&ev))
                    />
                </label>

                <Show when=move || notice.get().is_some()>
                    <p class="auth-form__notice">{move || notice.get().unwrap_or_default()}</p>
                </Show>

                <button class="btn btn--primary" type="submit" disabled=is_loading>
                    {move || if is_loading() { "Saving..." } else { "Save" }}
                </button>
            </form>
        </div>
    }
}
