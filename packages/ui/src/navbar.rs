use dioxus::prelude::*;

use crate::{use_session, LogoutButton};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Top navigation bar: links on the left, the signed-in employee and the
/// logout button on the right.
#[component]
pub fn Navbar(children: Element) -> Element {
    let session = use_session();
    let snapshot = session.snapshot();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "navbar",
            div {
                class: "navbar-links",
                {children}
            }
            div {
                class: "navbar-user",
                if let Some(identity) = &snapshot.identity {
                    if let Some(avatar_url) = &identity.avatar_url {
                        img {
                            class: "navbar-avatar",
                            src: "{avatar_url}",
                            alt: "avatar",
                        }
                    }
                    span { class: "navbar-name", "{identity.display_name()}" }
                    LogoutButton { class: "navbar-logout" }
                }
            }
        }
    }
}
