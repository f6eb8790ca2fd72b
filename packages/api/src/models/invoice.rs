//! Invoice and line-item models.

use serde::{Deserialize, Serialize};
use store::{LineAmounts, PaidStatus, SentStatus};

#[cfg(feature = "server")]
use chrono::{DateTime, Utc};
#[cfg(feature = "server")]
use sqlx::FromRow;
#[cfg(feature = "server")]
use store::status::UnknownStatus;

/// Full invoice record from the database. Status columns are plain text in
/// storage and parsed into the typed enums on projection.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub project_id: String,
    pub contract_id: Option<String>,
    pub previous_invoice_id: Option<String>,
    #[sqlx(rename = "type")]
    pub invoice_type: String,
    pub description: Option<String>,
    pub data_path: Option<String>,
    pub pdf_path: Option<String>,
    pub sent_status: String,
    pub paid_status: String,
    pub total_due: f64,
    pub sent_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(feature = "server")]
impl Invoice {
    /// Project into the client shape with the given line items. Fails only
    /// when a status column holds a value outside the known sets.
    pub fn to_info(&self, line_items: Vec<LineItemInfo>) -> Result<InvoiceInfo, UnknownStatus> {
        Ok(InvoiceInfo {
            id: self.id.clone(),
            invoice_number: self.invoice_number.clone(),
            project_id: self.project_id.clone(),
            contract_id: self.contract_id.clone(),
            previous_invoice_id: self.previous_invoice_id.clone(),
            invoice_type: self.invoice_type.clone(),
            description: self.description.clone(),
            data_path: self.data_path.clone(),
            pdf_path: self.pdf_path.clone(),
            sent_status: self.sent_status.parse()?,
            paid_status: self.paid_status.parse()?,
            total_due: self.total_due,
            sent_at: self.sent_at.map(|t| t.to_rfc3339()),
            paid_at: self.paid_at.map(|t| t.to_rfc3339()),
            created_at: self.created_at.to_rfc3339(),
            line_items,
        })
    }
}

/// Full line-item record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceLineItem {
    pub id: String,
    pub invoice_id: String,
    pub sort_order: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
    pub previous_billing: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "server")]
impl InvoiceLineItem {
    pub fn to_info(&self) -> LineItemInfo {
        LineItemInfo {
            id: self.id.clone(),
            sort_order: self.sort_order,
            name: self.name.clone(),
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            amount: self.amount,
            previous_billing: self.previous_billing,
        }
    }
}

/// Invoice with its line items, safe to send to the browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceInfo {
    pub id: String,
    pub invoice_number: String,
    pub project_id: String,
    pub contract_id: Option<String>,
    pub previous_invoice_id: Option<String>,
    /// `"task"` (percent-of-contract-task) or `"list"` (ad-hoc quantities).
    pub invoice_type: String,
    pub description: Option<String>,
    pub data_path: Option<String>,
    pub pdf_path: Option<String>,
    pub sent_status: SentStatus,
    pub paid_status: PaidStatus,
    pub total_due: f64,
    pub sent_at: Option<String>,
    pub paid_at: Option<String>,
    pub created_at: String,
    pub line_items: Vec<LineItemInfo>,
}

/// One invoice line as shown and edited in the browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemInfo {
    pub id: String,
    pub sort_order: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
    pub previous_billing: f64,
}

impl LineItemInfo {
    /// The numeric fields as the billing calculator sees them.
    pub fn amounts(&self) -> LineAmounts {
        LineAmounts {
            quantity: self.quantity,
            unit_price: self.unit_price,
            previous_billing: self.previous_billing,
        }
    }
}

/// One task's share when invoicing from a contract: bill this percent of
/// the task on the new invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceTaskShare {
    pub task_id: String,
    pub percent_this_invoice: f64,
}

/// Partial invoice update. Line-item patches are positional against the
/// invoice's current items, mirroring the editing grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvoicePatch {
    pub description: Option<String>,
    pub data_path: Option<String>,
    pub pdf_path: Option<String>,
    pub sent_status: Option<SentStatus>,
    pub paid_status: Option<PaidStatus>,
    pub total_due: Option<f64>,
    pub line_items: Option<Vec<LineItemPatch>>,
}

/// Partial line-item update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineItemPatch {
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub previous_billing: Option<f64>,
}
