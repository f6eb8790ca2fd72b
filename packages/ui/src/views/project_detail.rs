//! Project detail view: totals, contracts with per-task billing, the
//! invoice chain, proposals, and the status-advance control.

use dioxus::prelude::*;

use api::{InvoicePatch, ProjectPatch};
use store::{PaidStatus, SentStatus};

use crate::Navbar;

#[component]
pub fn ProjectDetail(project_id: String) -> Element {
    let mut refresh = use_signal(|| 0u32);
    let mut action_error = use_signal(|| Option::<String>::None);

    let load_id = project_id.clone();
    let project = use_resource(move || {
        let id = load_id.clone();
        let _ = refresh();
        async move { api::get_project(id).await }
    });

    rsx! {
        Navbar {
            a { href: "/projects", "Projects" }
            a { href: "/clients", "Clients" }
            a { href: "/settings", "Settings" }
        }
        div {
            class: "view",

            if let Some(err) = action_error() {
                div { class: "view-error", "{err}" }
            }

            match &*project.read_unchecked() {
                Some(Ok(summary)) => {
                    let summary = summary.clone();
                    let advance_id = project_id.clone();
                    rsx! {
                        div {
                            class: "detail-header",
                            h1 { class: "view-title", "{summary.project_name}" }
                            span { class: "status status-{summary.status}", "{summary.status}" }
                            if let Some(next) = summary.status.next() {
                                button {
                                    class: "advance-btn",
                                    onclick: move |_| {
                                        let id = advance_id.clone();
                                        async move {
                                            action_error.set(None);
                                            let patch = ProjectPatch {
                                                status: Some(next),
                                                ..Default::default()
                                            };
                                            match api::update_project(id, patch).await {
                                                Ok(_) => refresh += 1,
                                                Err(err) => action_error.set(Some(err.to_string())),
                                            }
                                        }
                                    },
                                    "Advance to {next}"
                                }
                            }
                        }

                        div {
                            class: "totals-row",
                            div { class: "totals-card",
                                span { class: "totals-label", "Contracted" }
                                span { class: "totals-value", "${summary.total_contracted:.2}" }
                            }
                            div { class: "totals-card",
                                span { class: "totals-label", "Invoiced" }
                                span { class: "totals-value", "${summary.total_invoiced:.2}" }
                            }
                            div { class: "totals-card",
                                span { class: "totals-label", "Paid" }
                                span { class: "totals-value", "${summary.total_paid:.2}" }
                            }
                            div { class: "totals-card",
                                span { class: "totals-label", "Outstanding" }
                                span { class: "totals-value", "${summary.total_outstanding:.2}" }
                            }
                        }

                        h2 { class: "view-section-title", "Contracts" }
                        if summary.contracts.is_empty() {
                            p { class: "view-empty", "No contracts." }
                        }
                        for contract in summary.contracts.iter() {
                            div {
                                key: "{contract.id}",
                                class: "card",
                                div { class: "card-header",
                                    span { "Contract ${contract.total_amount:.2}" }
                                    if let Some(signed_at) = &contract.signed_at {
                                        span { class: "muted", "signed {signed_at}" }
                                    }
                                }
                                table {
                                    class: "data-table",
                                    thead {
                                        tr {
                                            th { "Task" }
                                            th { class: "num", "Amount" }
                                            th { class: "num", "Billed" }
                                            th { class: "num", "Billed %" }
                                            th { class: "num", "Paid %" }
                                        }
                                    }
                                    tbody {
                                        for task in contract.tasks.iter() {
                                            tr {
                                                key: "{task.id}",
                                                td { "{task.name}" }
                                                td { class: "num", "${task.amount:.2}" }
                                                td { class: "num", "${task.billed_amount:.2}" }
                                                td { class: "num", "{task.billed_percent:.1}%" }
                                                td { class: "num", "{task.paid_percent:.1}%" }
                                            }
                                        }
                                    }
                                }
                            }
                        }

                        h2 { class: "view-section-title", "Invoices" }
                        if summary.invoices.is_empty() {
                            p { class: "view-empty", "No invoices." }
                        }
                        for invoice in summary.invoices.iter() {
                            {
                                let invoice = invoice.clone();
                                let mark_sent_id = invoice.id.clone();
                                let mark_paid_id = invoice.id.clone();
                                let next_id = invoice.id.clone();
                                rsx! {
                                    div {
                                        key: "{invoice.id}",
                                        class: "card invoice-row",
                                        span { class: "invoice-number", "{invoice.invoice_number}" }
                                        span { class: "num", "${invoice.total_due:.2}" }
                                        span { class: "status status-{invoice.sent_status}", "{invoice.sent_status}" }
                                        span { class: "status status-{invoice.paid_status}", "{invoice.paid_status}" }
                                        if invoice.sent_status == SentStatus::Unsent {
                                            button {
                                                onclick: move |_| {
                                                    let id = mark_sent_id.clone();
                                                    async move {
                                                        action_error.set(None);
                                                        let patch = InvoicePatch {
                                                            sent_status: Some(SentStatus::Sent),
                                                            ..Default::default()
                                                        };
                                                        match api::update_invoice(id, patch).await {
                                                            Ok(_) => refresh += 1,
                                                            Err(err) => action_error.set(Some(err.to_string())),
                                                        }
                                                    }
                                                },
                                                "Mark sent"
                                            }
                                        }
                                        if invoice.paid_status != PaidStatus::Paid {
                                            button {
                                                onclick: move |_| {
                                                    let id = mark_paid_id.clone();
                                                    async move {
                                                        action_error.set(None);
                                                        let patch = InvoicePatch {
                                                            paid_status: Some(PaidStatus::Paid),
                                                            ..Default::default()
                                                        };
                                                        match api::update_invoice(id, patch).await {
                                                            Ok(_) => refresh += 1,
                                                            Err(err) => action_error.set(Some(err.to_string())),
                                                        }
                                                    }
                                                },
                                                "Mark paid"
                                            }
                                        }
                                        if invoice.sent_status == SentStatus::Sent {
                                            button {
                                                onclick: move |_| {
                                                    let id = next_id.clone();
                                                    async move {
                                                        action_error.set(None);
                                                        match api::create_next_invoice(id).await {
                                                            Ok(_) => refresh += 1,
                                                            Err(err) => action_error.set(Some(err.to_string())),
                                                        }
                                                    }
                                                },
                                                "Next invoice"
                                            }
                                        }
                                    }
                                }
                            }
                        }

                        h2 { class: "view-section-title", "Proposals" }
                        if summary.proposals.is_empty() {
                            p { class: "view-empty", "No proposals." }
                        }
                        for proposal in summary.proposals.iter() {
                            div {
                                key: "{proposal.id}",
                                class: "card invoice-row",
                                span { {proposal.client_company.clone().unwrap_or_else(|| "Proposal".to_string())} }
                                span { class: "num", "${proposal.total_fee:.2}" }
                                span { class: "status", "{proposal.status}" }
                            }
                        }
                    }
                }
                Some(Err(err)) => rsx! {
                    div { class: "view-error", "Failed to load project: {err}" }
                },
                None => rsx! {
                    p { class: "view-empty", "Loading…" }
                },
            }
        }
    }
}
