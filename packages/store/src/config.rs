//! Client-side preferences.
//!
//! The dashboard persists exactly one preference on the client: the theme.
//! It lives in the browser's `localStorage` under
//! [`ThemePreference::STORAGE_KEY`], is read once at startup, and is written
//! back on every change. The stored form is the plain strings `"light"`,
//! `"dark"`, `"system"`; anything else (including a missing key) falls back
//! to following the OS.

use serde::{Deserialize, Serialize};

/// The user's theme choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    /// The fixed `localStorage` key.
    pub const STORAGE_KEY: &'static str = "conductor-theme";

    pub const ALL: [ThemePreference; 3] = [
        ThemePreference::Light,
        ThemePreference::Dark,
        ThemePreference::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// Parse a stored value; unknown strings mean "system".
    pub fn from_stored(value: &str) -> Self {
        match value {
            "light" => ThemePreference::Light,
            "dark" => ThemePreference::Dark,
            _ => ThemePreference::System,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_stored_string() {
        for pref in ThemePreference::ALL {
            assert_eq!(ThemePreference::from_stored(pref.as_str()), pref);
        }
    }

    #[test]
    fn unknown_values_fall_back_to_system() {
        assert_eq!(ThemePreference::from_stored(""), ThemePreference::System);
        assert_eq!(ThemePreference::from_stored("solarized"), ThemePreference::System);
    }
}
