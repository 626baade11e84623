//! Light/dark theme preference.
//!
//! Resolution order: the value persisted under [`THEME_KEY`] wins, then the
//! OS-level `prefers-color-scheme` query. The active theme is reflected as a
//! `theme-dark` class on `<html>`. Resolution is a pure function over the
//! two inputs; only the glue that reads and writes the browser is
//! hydrate-gated.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

/// localStorage key for the persisted theme choice.
pub const THEME_KEY: &str = "rentdesk_theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Persisted form under [`THEME_KEY`].
    pub fn as_stored(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Resolve the effective theme from the persisted value and the system
    /// preference. Anything other than the two known stored values (missing
    /// key, stale format) defers to the system.
    pub fn resolve(stored: Option<&str>, system_prefers_dark: bool) -> Self {
        match stored {
            Some("dark") => Self::Dark,
            Some("light") => Self::Light,
            _ if system_prefers_dark => Self::Dark,
            _ => Self::Light,
        }
    }
}

#[cfg(feature = "hydrate")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Effective theme for this browser session.
pub fn current() -> Theme {
    #[cfg(feature = "hydrate")]
    {
        let stored = storage().and_then(|s| s.get_item(THEME_KEY).ok().flatten());
        let system_prefers_dark = web_sys::window()
            .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .map_or(false, |mq| mq.matches());
        Theme::resolve(stored.as_deref(), system_prefers_dark)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Theme::default()
    }
}

/// Sync the `theme-dark` class on `<html>` with the given theme.
pub fn apply(theme: Theme) {
    #[cfg(feature = "hydrate")]
    {
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element());
        if let Some(element) = element {
            let classes = element.class_list();
            if theme.is_dark() {
                let _ = classes.add_1("theme-dark");
            } else {
                let _ = classes.remove_1("theme-dark");
            }
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = theme;
    }
}

/// Apply the theme and persist the choice.
pub fn set(theme: Theme) {
    apply(theme);
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = storage() {
            let _ = storage.set_item(THEME_KEY, theme.as_stored());
        }
    }
}
