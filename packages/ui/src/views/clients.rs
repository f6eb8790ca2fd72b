//! Client list view with a small create form.

use dioxus::prelude::*;

use api::NewClient;

use crate::Navbar;

#[component]
pub fn Clients() -> Element {
    let mut refresh = use_signal(|| 0u32);
    let mut name = use_signal(String::new);
    let mut company = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);

    let clients = use_resource(move || {
        let _ = refresh();
        async move { api::list_clients().await }
    });

    let handle_create = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);
            let data = NewClient {
                name: name().trim().to_string(),
                company: Some(company()).filter(|c| !c.trim().is_empty()),
                email: Some(email()).filter(|e| !e.trim().is_empty()),
                ..Default::default()
            };
            match api::create_client(data).await {
                Ok(_) => {
                    name.set(String::new());
                    company.set(String::new());
                    email.set(String::new());
                    refresh += 1;
                }
                Err(err) => error.set(Some(err.to_string())),
            }
        });
    };

    rsx! {
        Navbar {
            a { href: "/projects", "Projects" }
            a { href: "/clients", class: "nav-active", "Clients" }
            a { href: "/settings", "Settings" }
        }
        div {
            class: "view",
            h1 { class: "view-title", "Clients" }

            form {
                class: "inline-form",
                onsubmit: handle_create,
                input {
                    placeholder: "Name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
                input {
                    placeholder: "Company",
                    value: company(),
                    oninput: move |evt: FormEvent| company.set(evt.value()),
                }
                input {
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                button { r#type: "submit", "Add client" }
            }
            if let Some(err) = error() {
                div { class: "view-error", "{err}" }
            }

            match &*clients.read_unchecked() {
                Some(Ok(list)) if list.is_empty() => rsx! {
                    p { class: "view-empty", "No clients yet." }
                },
                Some(Ok(list)) => rsx! {
                    table {
                        class: "data-table",
                        thead {
                            tr {
                                th { "Name" }
                                th { "Company" }
                                th { "Email" }
                                th { "Phone" }
                            }
                        }
                        tbody {
                            for client in list.iter() {
                                tr {
                                    key: "{client.id}",
                                    td { "{client.name}" }
                                    td { {client.company.clone().unwrap_or_default()} }
                                    td { {client.email.clone().unwrap_or_default()} }
                                    td { {client.phone.clone().unwrap_or_default()} }
                                }
                            }
                        }
                    }
                },
                Some(Err(err)) => rsx! {
                    div { class: "view-error", "Failed to load clients: {err}" }
                },
                None => rsx! {
                    p { class: "view-empty", "Loading…" }
                },
            }
        }
    }
}
