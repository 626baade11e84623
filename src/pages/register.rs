//! Registration page. Field-level validation is the server's job; the form
//! only refuses to submit obviously empty credentials.

use leptos::prelude::*;

use crate::net::types::RegisterPayload;
use crate::state::session::use_session;

/// Registration page — creates an account and lands on the dashboard with a
/// live session (the register response carries tokens, same as login).
#[component]
pub fn RegisterPage() -> impl IntoView {
    let session = use_session();

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(Option::<String>::None);

    {
        use leptos_router::NavigateOptions;
        use leptos_router::hooks::use_navigate;
        let navigate = use_navigate();
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
            let payload = RegisterPayload {
                email: email.get().trim().to_owned(),
                password: password.get(),
                name: name.get().trim().to_owned(),
                phone: Some(phone.get().trim().to_owned()).filter(|p| !p.is_empty()),
            };
            if payload.email.is_empty() || payload.password.is_empty() || payload.name.is_empty() {
                error.set(Some("Name, email, and password are required.".to_owned()));
                return;
            }

            #[cfg(feature = "hydrate")]
            {
                let session = session.clone();
                error.set(None);
                leptos::task::spawn_local(async move {
                    if let Err(err) = session.register(&payload).await {
                        error.set(Some(err.message.clone()));
                    }
                });
            }

            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&session, payload);
            }
        })
    };

    let view = session.view;
    let is_loading = move || view.get().is_loading;

    view! {
        <div class="auth-page">
            <h1>"Create your account"</h1>

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
                    "Phone (optional)"
                    <input
                        class="auth-form__input"
                        type="tel"
                        prop:value=move || phone.get()
                        on:input=move |ev| phone.set(event_target_value(&ev))
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
                    {move || if is_loading() { "Creating account..." } else { "Register" }}
                </button>
            </form>

            <p class="auth-page__switch">
                <a href="/login">"Already have an account? Sign in"</a>
            </p>
        </div>
    }
}
