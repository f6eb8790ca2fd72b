//! Settings view: profile, avatar, theme.

use dioxus::prelude::*;

use store::{AvatarFile, ProfileUpdate, ThemePreference};

use crate::{set_theme, use_session, Navbar, ThemeSignal};

#[component]
pub fn Settings() -> Element {
    let session = use_session();
    let identity = session.identity();

    let mut first_name = use_signal(String::new);
    let mut last_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut profile_status = use_signal(|| Option::<String>::None);
    let mut avatar_status = use_signal(|| Option::<String>::None);
    let mut loaded = use_signal(|| false);

    // Prefill the form once the session check has resolved.
    if let Some(identity) = &identity {
        if !loaded() {
            first_name.set(identity.first_name.clone());
            last_name.set(identity.last_name.clone());
            email.set(identity.email.clone().unwrap_or_default());
            loaded.set(true);
        }
    }

    let save_identity = identity.clone();
    let handle_save = move |evt: FormEvent| {
        evt.prevent_default();
        let mut session = session.clone();
        let current = save_identity.clone();
        spawn(async move {
            profile_status.set(None);
            let Some(current) = current else { return };

            // Send only what changed; the store merges only what the server
            // confirms.
            let fields = ProfileUpdate {
                first_name: Some(first_name()).filter(|v| *v != current.first_name),
                last_name: Some(last_name()).filter(|v| *v != current.last_name),
                email: Some(email())
                    .filter(|v| *v != current.email.clone().unwrap_or_default()),
            };
            if fields.is_empty() {
                profile_status.set(Some("Nothing to save".to_string()));
                return;
            }

            match session.update_profile(fields).await {
                Ok(()) => profile_status.set(Some("Saved".to_string())),
                Err(err) => profile_status.set(Some(err.to_string())),
            }
        });
    };

    let upload_session = use_session();
    let handle_avatar = move |evt: FormEvent| {
        let mut session = upload_session.clone();
        async move {
            avatar_status.set(None);
            let files = evt.files();
            let Some(file) = files.first() else { return };
            let filename = file.name();
            let Ok(bytes) = file.read_bytes().await else {
                avatar_status.set(Some("Could not read file".to_string()));
                return;
            };
            let bytes = bytes.to_vec();

            match session.update_avatar(AvatarFile { filename, bytes }).await {
                Ok(()) => avatar_status.set(Some("Avatar updated".to_string())),
                Err(err) => avatar_status.set(Some(err.to_string())),
            }
        }
    };

    rsx! {
        Navbar {
            a { href: "/projects", "Projects" }
            a { href: "/clients", "Clients" }
            a { href: "/settings", class: "nav-active", "Settings" }
        }
        div {
            class: "view",
            h1 { class: "view-title", "Settings" }

            div {
                class: "view-section",
                h2 { class: "view-section-title", "Profile" }
                form {
                    class: "settings-form",
                    onsubmit: handle_save,
                    label { "First name" }
                    input {
                        value: first_name(),
                        oninput: move |evt: FormEvent| first_name.set(evt.value()),
                    }
                    label { "Last name" }
                    input {
                        value: last_name(),
                        oninput: move |evt: FormEvent| last_name.set(evt.value()),
                    }
                    label { "Email" }
                    input {
                        r#type: "email",
                        value: email(),
                        oninput: move |evt: FormEvent| email.set(evt.value()),
                    }
                    button { r#type: "submit", "Save profile" }
                    if let Some(status) = profile_status() {
                        span { class: "form-status", "{status}" }
                    }
                }
            }

            div {
                class: "view-section",
                h2 { class: "view-section-title", "Avatar" }
                input {
                    r#type: "file",
                    accept: "image/*",
                    onchange: handle_avatar,
                }
                if let Some(status) = avatar_status() {
                    span { class: "form-status", "{status}" }
                }
            }

            div {
                class: "view-section",
                h2 { class: "view-section-title", "Theme" }
                ThemeSelector {}
            }
        }
    }
}

/// Three-way theme picker. Persists the choice and re-applies it to the
/// document immediately.
#[component]
fn ThemeSelector() -> Element {
    let theme = use_context::<ThemeSignal>();
    let current = theme();

    rsx! {
        div {
            class: "theme-cards",
            for preference in ThemePreference::ALL {
                button {
                    key: "{preference.as_str()}",
                    class: if current == preference { "theme-card theme-card-active" } else { "theme-card" },
                    onclick: move |_| {
                        let mut theme = theme;
                        set_theme(&mut theme, preference);
                    },
                    "{preference.as_str()}"
                }
            }
        }
    }
}
