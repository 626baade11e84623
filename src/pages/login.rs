//! Login page with an email/password form driving the session manager.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::session::use_session;

/// Login page — authenticates and redirects to the dashboard on success.
/// Already-authenticated visitors are sent straight to the dashboard.
#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(Option::<String>::None);

    // Skip the form entirely for a live session.
    {
        let navigate = navigate.clone();
        let view = session.view;
        Effect::new(move || {
            let state = view.get();
            if state.is_authenticated && !state.is_loading {
                navigate("/", NavigateOptions::default());
            }
        });
    }

    let submit = {
        let session = session.clone();
        Callback::new(move |()| {
            let email_value = email.get();
            let password_value = password.get();
            if email_value.trim().is_empty() || password_value.is_empty() {
                error.set(Some("Email and password are required.".to_owned()));
                return;
            }

            #[cfg(feature = "hydrate")]
            {
                let session = session.clone();
                error.set(None);
                leptos::task::spawn_local(async move {
                    match session.login(email_value.trim(), &password_value).await {
                        Ok(user) => {
                            leptos::logging::log!("signed in as {}", user.display_name());
                        }
                        Err(err) => error.set(Some(err.message.clone())),
                    }
                });
            }

            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&session, email_value, password_value);
            }
        })
    };

    let view = session.view;
    let is_loading = move || view.get().is_loading;

    view! {
        <div class="auth-page">
            <h1>"RentDesk"</h1>
            <p>"Rental management"</p>

            <form class="auth-form" on:submit=move |ev| {
                ev.prevent_default();
                submit.run(());
            }>
                <label class="auth-form__label">
                    "Email"
                    <input
                        class="auth-form__input"
                        type="email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </label>
                <label class="auth-form__label">
                    "Password"
                    <input
                        class="auth-form__input"
                        type="password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>

                <Show when=move || error.get().is_some()>
                    <p class="auth-form__error">{move || error.get().unwrap_or_default()}</p>
                </Show>

                <button class="btn btn--primary" type="submit" disabled=is_loading>
                    {move || if is_loading() { "Signing in..." } else { "Sign in" }}
                </button>
            </form>

            <p class="auth-page__switch">
                <a href="/register">"Need an account? Register"</a>
            </p>
        </div>
    }
}
