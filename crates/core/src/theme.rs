//! Light/dark theme preference and its toggle.
//!
//! The preference is persisted through a [`ThemeStore`] under
//! [`THEME_KEY`]. An absent or unreadable value means [`Theme::Light`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::color::Srgb;
use crate::error::BackdropError;

/// Storage key of the persisted preference.
pub const THEME_KEY: &str = "theme";

/// Page color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Toggle button icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Sun,
    Moon,
}

impl Icon {
    /// Font Awesome class for the icon.
    pub fn class(self) -> &'static str {
        match self {
            Icon::Sun => "fa-sun",
            Icon::Moon => "fa-moon",
        }
    }
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// The icon shown on the toggle: a sun offers to leave dark mode.
    pub fn icon(self) -> Icon {
        match self {
            Theme::Dark => Icon::Sun,
            Theme::Light => Icon::Moon,
        }
    }

    /// Page background behind the canvas, used by offline renderers.
    pub fn background(self) -> Srgb {
        match self {
            Theme::Light => Srgb::from_rgb8(0xfa, 0xfa, 0xfa),
            Theme::Dark => Srgb::from_rgb8(0x12, 0x12, 0x14),
        }
    }

    pub fn all() -> [Theme; 2] {
        [Theme::Light, Theme::Dark]
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(BackdropError::UnknownTheme(other.to_string())),
        }
    }
}

/// Key-value persistence for the theme preference.
pub trait ThemeStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

/// In-memory store for hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThemeStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Current theme backed by a store.
#[derive(Debug)]
pub struct ThemeToggle<S: ThemeStore> {
    store: S,
    current: Theme,
}

impl<S: ThemeStore> ThemeToggle<S> {
    /// Reads the persisted theme, defaulting to light.
    ///
    /// Unknown stored values are logged and treated as absent; the store is
    /// not written until the first toggle.
    pub fn load(store: S) -> Self {
        let current = match store.load(THEME_KEY) {
            None => Theme::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("ignoring stored theme: {e}");
                Theme::default()
            }),
        };
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn icon(&self) -> Icon {
        self.current.icon()
    }

    /// Flips the theme, persists it, and returns the new value.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        self.store.save(THEME_KEY, self.current.as_str());
        self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
