//! Theme preference: load at startup, persist on change, apply to the
//! document.

use dioxus::prelude::*;
use store::ThemePreference;

/// App-wide theme signal, provided at the root.
pub type ThemeSignal = Signal<ThemePreference>;

/// Read the stored preference. Missing or unrecognised values mean
/// "system".
pub fn load_theme_from_storage() -> ThemePreference {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(value) = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(ThemePreference::STORAGE_KEY).ok().flatten())
        {
            return ThemePreference::from_stored(&value);
        }
    }
    ThemePreference::default()
}

fn store_theme(preference: ThemePreference) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(ThemePreference::STORAGE_KEY, preference.as_str());
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = preference;
    }
}

/// Toggle the `data-theme` attribute on the document root. "System" removes
/// the override so the CSS media query decides.
pub fn apply_theme(preference: ThemePreference) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            match preference {
                ThemePreference::System => {
                    let _ = root.remove_attribute("data-theme");
                }
                other => {
                    let _ = root.set_attribute("data-theme", other.as_str());
                }
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = preference;
    }
}

/// Change the theme: apply it, persist it, update the signal.
pub fn set_theme(signal: &mut ThemeSignal, preference: ThemePreference) {
    apply_theme(preference);
    store_theme(preference);
    signal.set(preference);
}
