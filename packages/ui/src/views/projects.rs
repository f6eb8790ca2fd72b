//! Project list view: every active project with its derived money totals.

use dioxus::prelude::*;

use crate::Navbar;

#[component]
pub fn Projects() -> Element {
    let projects = use_resource(|| async move { api::list_projects().await });

    rsx! {
        Navbar {
            a { href: "/projects", class: "nav-active", "Projects" }
            a { href: "/clients", "Clients" }
            a { href: "/settings", "Settings" }
        }
        div {
            class: "view",
            h1 { class: "view-title", "Projects" }

            match &*projects.read_unchecked() {
                Some(Ok(list)) if list.is_empty() => rsx! {
                    p { class: "view-empty", "No projects yet." }
                },
                Some(Ok(list)) => rsx! {
                    table {
                        class: "data-table",
                        thead {
                            tr {
                                th { "#" }
                                th { "Project" }
                                th { "Client" }
                                th { "Status" }
                                th { class: "num", "Contracted" }
                                th { class: "num", "Invoiced" }
                                th { class: "num", "Paid" }
                                th { class: "num", "Outstanding" }
                            }
                        }
                        tbody {
                            for project in list.iter() {
                                tr {
                                    key: "{project.id}",
                                    td { {project.project_number.clone().unwrap_or_default()} }
                                    td {
                                        a {
                                            href: "/projects/{project.id}",
                                            "{project.project_name}"
                                        }
                                    }
                                    td { {project.client_company.clone().or(project.client_name.clone()).unwrap_or_default()} }
                                    td {
                                        span { class: "status status-{project.status}", "{project.status}" }
                                    }
                                    td { class: "num", "${project.total_contracted:.2}" }
                                    td { class: "num", "${project.total_invoiced:.2}" }
                                    td { class: "num", "${project.total_paid:.2}" }
                                    td { class: "num", "${project.total_outstanding:.2}" }
                                }
                            }
                        }
                    }
                },
                Some(Err(err)) => rsx! {
                    div { class: "view-error", "Failed to load projects: {err}" }
                },
                None => rsx! {
                    p { class: "view-empty", "Loading…" }
                },
            }
        }
    }
}
