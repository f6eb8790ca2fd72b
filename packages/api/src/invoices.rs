//! Invoice server functions.
//!
//! Edits to line items always recompute the per-line amount and the invoice
//! total through the billing calculator; status changes stamp their
//! timestamps on the way through.

use dioxus::prelude::*;

use crate::models::{InvoiceInfo, InvoicePatch};

#[cfg(feature = "server")]
pub(crate) use server::{invoice_info, invoice_infos_for_project};

#[cfg(feature = "server")]
mod server {
    use sqlx::PgPool;

    use crate::error::DataError;
    use crate::models::invoice::{Invoice, InvoiceLineItem};
    use crate::models::{InvoiceInfo, LineItemInfo};

    pub(crate) async fn line_item_infos(
        pool: &PgPool,
        invoice_id: &str,
    ) -> Result<Vec<LineItemInfo>, DataError> {
        let items: Vec<InvoiceLineItem> = sqlx::query_as(
            "SELECT * FROM invoice_line_items WHERE invoice_id = $1 ORDER BY sort_order",
        )
        .bind(invoice_id)
        .fetch_all(pool)
        .await?;
        Ok(items.iter().map(|li| li.to_info()).collect())
    }

    /// Load one invoice with its line items.
    pub(crate) async fn invoice_info(
        pool: &PgPool,
        invoice_id: &str,
    ) -> Result<InvoiceInfo, DataError> {
        let invoice: Option<Invoice> =
            sqlx::query_as("SELECT * FROM invoices WHERE id = $1 AND deleted_at IS NULL")
                .bind(invoice_id)
                .fetch_optional(pool)
                .await?;
        let Some(invoice) = invoice else {
            return Err(DataError::NotFound("invoice"));
        };
        let line_items = line_item_infos(pool, invoice_id).await?;
        Ok(invoice.to_info(line_items)?)
    }

    /// Load every active invoice of a project, oldest first.
    pub(crate) async fn invoice_infos_for_project(
        pool: &PgPool,
        project_id: &str,
    ) -> Result<Vec<InvoiceInfo>, DataError> {
        let invoices: Vec<Invoice> = sqlx::query_as(
            "SELECT * FROM invoices WHERE project_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let mut infos = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            let line_items = line_item_infos(pool, &invoice.id).await?;
            infos.push(invoice.to_info(line_items)?);
        }
        Ok(infos)
    }
}

/// Get one invoice with its line items.
#[cfg(feature = "server")]
#[get("/api/invoices/:invoice_id")]
pub async fn get_invoice(invoice_id: String) -> Result<InvoiceInfo, ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(invoice_info(pool, &invoice_id).await?)
}

#[cfg(not(feature = "server"))]
#[get("/api/invoices/:invoice_id")]
pub async fn get_invoice(invoice_id: String) -> Result<InvoiceInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Look an invoice up by its human-facing number.
#[cfg(feature = "server")]
#[get("/api/invoices/by-number/:invoice_number")]
pub async fn get_invoice_by_number(invoice_number: String) -> Result<InvoiceInfo, ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let row: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM invoices WHERE invoice_number = $1 AND deleted_at IS NULL",
    )
    .bind(&invoice_number)
    .fetch_optional(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some((invoice_id,)) = row else {
        return Err(ServerFnError::new("Invoice not found"));
    };
    Ok(invoice_info(pool, &invoice_id).await?)
}

#[cfg(not(feature = "server"))]
#[get("/api/invoices/by-number/:invoice_number")]
pub async fn get_invoice_by_number(invoice_number: String) -> Result<InvoiceInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Update an invoice. Line-item patches are positional against the current
/// items; amounts and the total are recomputed, not taken from the input.
/// Marking the invoice sent stamps `sent_at`; marking it paid stamps
/// `paid_at`.
#[cfg(feature = "server")]
#[post("/api/invoices/:invoice_id/update")]
pub async fn update_invoice(
    invoice_id: String,
    data: InvoicePatch,
) -> Result<InvoiceInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::invoice::{Invoice, InvoiceLineItem};
    use store::{LineAmounts, PaidStatus, SentStatus};

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let existing: Option<Invoice> =
        sqlx::query_as("SELECT * FROM invoices WHERE id = $1 AND deleted_at IS NULL")
            .bind(&invoice_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    let Some(existing) = existing else {
        return Err(ServerFnError::new("Invoice not found"));
    };

    // Line items first: the new total falls out of them.
    let mut computed_total = None;
    if let Some(patches) = &data.line_items {
        let items: Vec<InvoiceLineItem> = sqlx::query_as(
            "SELECT * FROM invoice_line_items WHERE invoice_id = $1 ORDER BY sort_order",
        )
        .bind(&invoice_id)
        .fetch_all(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

        let mut amounts: Vec<LineAmounts> = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let patch = patches.get(i);
            let line = LineAmounts {
                quantity: patch.and_then(|p| p.quantity).unwrap_or(item.quantity),
                unit_price: patch.and_then(|p| p.unit_price).unwrap_or(item.unit_price),
                previous_billing: patch
                    .and_then(|p| p.previous_billing)
                    .unwrap_or(item.previous_billing),
            };
            let amount = store::billing::line_amount(line);

            sqlx::query(
                "UPDATE invoice_line_items SET quantity = $1, unit_price = $2, \
                 previous_billing = $3, amount = $4 WHERE id = $5",
            )
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.previous_billing)
            .bind(amount)
            .bind(&item.id)
            .execute(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;

            amounts.push(line);
        }
        computed_total = Some(store::billing::invoice_total(&amounts));
    }

    let sent_status = data
        .sent_status
        .map(|s| s.as_str().to_string())
        .unwrap_or(existing.sent_status.clone());
    let paid_status = data
        .paid_status
        .map(|s| s.as_str().to_string())
        .unwrap_or(existing.paid_status.clone());

    let becomes_sent =
        data.sent_status == Some(SentStatus::Sent) && existing.sent_at.is_none();
    let becomes_paid =
        data.paid_status == Some(PaidStatus::Paid) && existing.paid_at.is_none();

    let total_due = data
        .total_due
        .or(computed_total)
        .unwrap_or(existing.total_due);

    sqlx::query(
        "UPDATE invoices SET description = $1, data_path = $2, pdf_path = $3, \
         sent_status = $4, paid_status = $5, total_due = $6, \
         sent_at = CASE WHEN $7 THEN now() ELSE sent_at END, \
         paid_at = CASE WHEN $8 THEN now() ELSE paid_at END, \
         updated_at = now() WHERE id = $9",
    )
    .bind(data.description.or(existing.description))
    .bind(data.data_path.or(existing.data_path))
    .bind(data.pdf_path.or(existing.pdf_path))
    .bind(&sent_status)
    .bind(&paid_status)
    .bind(total_due)
    .bind(becomes_sent)
    .bind(becomes_paid)
    .bind(&invoice_id)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(invoice_info(pool, &invoice_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/invoices/:invoice_id/update")]
pub async fn update_invoice(
    invoice_id: String,
    data: InvoicePatch,
) -> Result<InvoiceInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Create the next invoice in the chain from a sent invoice: previous
/// billing rolls forward (`previous_billing + amount`), the new amounts
/// start at zero, and the new invoice becomes the project's current one.
#[cfg(feature = "server")]
#[post("/api/invoices/:invoice_id/create-next")]
pub async fn create_next_invoice(invoice_id: String) -> Result<InvoiceInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::ids::{generate_id, next_invoice_number};
    use crate::models::invoice::{Invoice, InvoiceLineItem};

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let invoice: Option<Invoice> =
        sqlx::query_as("SELECT * FROM invoices WHERE id = $1 AND deleted_at IS NULL")
            .bind(&invoice_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    let Some(invoice) = invoice else {
        return Err(ServerFnError::new("Invoice not found"));
    };

    if invoice.sent_status != "sent" {
        return Err(ServerFnError::new("Invoice must be sent before creating next"));
    }

    let items: Vec<InvoiceLineItem> = sqlx::query_as(
        "SELECT * FROM invoice_line_items WHERE invoice_id = $1 ORDER BY sort_order",
    )
    .bind(&invoice_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;
    if items.is_empty() {
        return Err(ServerFnError::new("No line items on current invoice"));
    }

    let new_invoice_number = next_invoice_number(pool, &invoice.project_id).await?;
    let new_invoice_id = generate_id("inv-");

    sqlx::query(
        "INSERT INTO invoices (id, invoice_number, project_id, contract_id, \
         previous_invoice_id, type, total_due) VALUES ($1, $2, $3, $4, $5, 'task', 0)",
    )
    .bind(&new_invoice_id)
    .bind(&new_invoice_number)
    .bind(&invoice.project_id)
    .bind(&invoice.contract_id)
    .bind(&invoice.id)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    for (i, item) in items.iter().enumerate() {
        let previous_billing = item.previous_billing + item.amount;
        // Carried-forward lines start at "everything billed so far, nothing
        // new": quantity stays the cumulative fraction so the line amount
        // works out to zero.
        let quantity = if item.unit_price == 0.0 {
            0.0
        } else {
            previous_billing / item.unit_price
        };

        sqlx::query(
            "INSERT INTO invoice_line_items (id, invoice_id, sort_order, name, description, \
             quantity, unit_price, amount, previous_billing) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)",
        )
        .bind(generate_id("li-"))
        .bind(&new_invoice_id)
        .bind((i + 1) as i32)
        .bind(&item.name)
        .bind(&item.description)
        .bind(quantity)
        .bind(item.unit_price)
        .bind(previous_billing)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    }

    sqlx::query("UPDATE projects SET current_invoice_id = $1, updated_at = now() WHERE id = $2")
        .bind(&new_invoice_id)
        .bind(&invoice.project_id)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    tracing::info!(
        "created next invoice {new_invoice_number} (chain from {})",
        invoice.invoice_number
    );
    Ok(invoice_info(pool, &new_invoice_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/invoices/:invoice_id/create-next")]
pub async fn create_next_invoice(invoice_id: String) -> Result<InvoiceInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Soft-delete an invoice. Billing figures are derived from active invoices
/// only, so no reversal is needed; the project's current-invoice pointer is
/// cleared if it pointed here.
#[cfg(feature = "server")]
#[post("/api/invoices/:invoice_id/delete")]
pub async fn delete_invoice(invoice_id: String) -> Result<(), ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let row: Option<(String,)> = sqlx::query_as(
        "UPDATE invoices SET deleted_at = now() \
         WHERE id = $1 AND deleted_at IS NULL RETURNING project_id",
    )
    .bind(&invoice_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some((project_id,)) = row else {
        return Err(ServerFnError::new("Invoice not found"));
    };

    sqlx::query(
        "UPDATE projects SET current_invoice_id = NULL \
         WHERE id = $1 AND current_invoice_id = $2",
    )
    .bind(&project_id)
    .bind(&invoice_id)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/invoices/:invoice_id/delete")]
pub async fn delete_invoice(invoice_id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
