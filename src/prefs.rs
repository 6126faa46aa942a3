//! Durable visitor preferences (theme, display name, counters).
//!
//! The site keeps a handful of strings under stable keys in `localStorage`.
//! Everything above this module talks to the `PreferenceStore` trait so the console
//! and theme logic run against `MemoryStore` in tests.

use std::collections::HashMap;

use crate::error::SiteError;

pub const KEY_THEME: &str = "theme";
pub const KEY_USER_NAME: &str = "userName";
pub const KEY_COMMAND_COUNT: &str = "commandCount";
pub const KEY_SECRETS_FOUND: &str = "secretsFound";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SiteError>;

    /// Read a counter, treating missing or garbled values as zero.
    fn get_count(&self, key: &str) -> u64 {
        self.get(key).and_then(|v| v.trim().parse().ok()).unwrap_or(0)
    }

    /// Add one to a counter and return the new value. A failed write is logged;
    /// the caller still gets the value it would have stored.
    fn increment(&mut self, key: &str) -> u64 {
        let next = self.get_count(key).saturating_add(1);
        if let Err(e) = self.set(key, &next.to_string()) {
            log::warn!("could not persist {key}: {e}");
        }
        next
    }
}

#[derive(Default, Debug)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SiteError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.localStorage`. Private browsing modes may refuse writes; those come
/// back as `SiteError::Storage`.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, SiteError> {
        let win = web_sys::window().ok_or(SiteError::MissingElement("window"))?;
        let storage = win
            .local_storage()
            .map_err(SiteError::from)?
            .ok_or_else(|| SiteError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl PreferenceStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SiteError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| SiteError::Storage(format!("{e:?}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    /// Dark unless the visitor explicitly chose light.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        match store.get(KEY_THEME).as_deref() {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Flip and persist. The new theme applies even if persisting fails.
    pub fn toggle(self, store: &mut dyn PreferenceStore) -> Self {
        let next = match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        if let Err(e) = store.set(KEY_THEME, next.as_str()) {
            log::warn!("theme not saved: {e}");
        }
        next
    }

    /// The icon element inside the toggle button.
    pub const ICON_SELECTOR: &'static str = "#theme-toggle div";

    /// Font Awesome icon class shown on the toggle button.
    pub fn icon_class(self) -> &'static str {
        match self {
            Theme::Dark => "fa-moon",
            Theme::Light => "fa-sun",
        }
    }

    /// `(class to remove, class to add)` when showing this theme's icon.
    pub fn icon_swap(self) -> (&'static str, &'static str) {
        let other = match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        (other.icon_class(), self.icon_class())
    }
}
