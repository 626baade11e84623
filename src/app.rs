//! Root application component with routing and context providers.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::net::gateway::Gateway;
use crate::pages::{
    dashboard::DashboardPage, login::LoginPage, profile::ProfilePage, register::RegisterPage,
};
use crate::session::manager::SessionManager;
use crate::session::store::platform_store;
use crate::state::session::{SessionContext, SessionView};

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Wires the credential store, gateway, and session manager together,
/// performs the optimistic session startup, and provides the session context
/// to every page.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let store = platform_store();
    let gateway = Rc::new(Gateway::same_origin(store.clone()));
    let manager = Rc::new(SessionManager::new(gateway.clone(), store.clone()));

    // Optimistic read: render from persisted credentials before any network
    // round trip, then verify in the background.
    let (initial, verify) = SessionView::startup(&store.get());
    let session_view = RwSignal::new(initial);

    // Any Unauthorized outcome, from any endpoint, lands here.
    gateway.set_session_expired_handler(move || {
        session_view.update(SessionView::apply_signed_out);
        crate::util::navigation::redirect_to_login();
    });

    let session = SessionContext {
        view: session_view,
        manager: send_wrapper::SendWrapper::new(manager),
    };
    provide_context(session.clone());

    if verify {
        #[cfg(feature = "hydrate")]
        {
            let session = session.clone();
            leptos::task::spawn_local(async move {
                session.verify().await;
            });
        }
    }

    view! {
        <Stylesheet id="leptos" href="/pkg/rentdesk.css"/>
        <Title text="RentDesk"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("register") view=RegisterPage/>
                <Route path=StaticSegment("profile") view=ProfilePage/>
                <Route path=StaticSegment("") view=DashboardPage/>
            </Routes>
        </Router>
    }
}
