//! Contract and contract-task models.
//!
//! A contract is the billing backbone of a project: an ordered list of
//! tasks, each with a contracted amount. How much of a task has been
//! invoiced or paid is never stored on the task; it is derived from the
//! line items of the project's active invoices when the record is read.

use serde::{Deserialize, Serialize};
use store::TaskBilling;

#[cfg(feature = "server")]
use chrono::{DateTime, Utc};
#[cfg(feature = "server")]
use sqlx::FromRow;

/// Full contract record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct Contract {
    pub id: String,
    pub project_id: String,
    pub file_path: Option<String>,
    pub total_amount: f64,
    pub signed_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Full contract-task record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct ContractTask {
    pub id: String,
    pub contract_id: String,
    pub sort_order: i32,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "server")]
impl ContractTask {
    /// Project into the client shape, attaching the derived billing figures.
    pub fn to_info(&self, billed_amount: f64, paid_amount: f64) -> ContractTaskInfo {
        ContractTaskInfo {
            id: self.id.clone(),
            sort_order: self.sort_order,
            name: self.name.clone(),
            description: self.description.clone(),
            amount: self.amount,
            billed_amount,
            billed_percent: store::billing::billed_percent(billed_amount, self.amount),
            paid_amount,
            paid_percent: store::billing::billed_percent(paid_amount, self.amount),
        }
    }
}

/// Contract task with its derived billed/paid figures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractTaskInfo {
    pub id: String,
    pub sort_order: i32,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub billed_amount: f64,
    pub billed_percent: f64,
    pub paid_amount: f64,
    pub paid_percent: f64,
}

impl ContractTaskInfo {
    /// The task as the billing calculator sees it.
    pub fn billing(&self) -> TaskBilling {
        TaskBilling {
            amount: self.amount,
            invoiced_percent: self.billed_percent,
            paid_percent: self.paid_percent,
        }
    }
}

/// Contract with its tasks, safe to send to the browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractInfo {
    pub id: String,
    pub project_id: String,
    pub file_path: Option<String>,
    pub signed_at: Option<String>,
    pub notes: Option<String>,
    pub total_amount: f64,
    pub tasks: Vec<ContractTaskInfo>,
}

/// Input for creating a contract. When `tasks` is given the contract total
/// is the sum of the task amounts, whatever `total_amount` says.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewContract {
    pub project_id: String,
    pub total_amount: f64,
    pub signed_at: Option<String>,
    pub file_path: Option<String>,
    pub notes: Option<String>,
    pub tasks: Option<Vec<NewContractTask>>,
}

/// Input for one contract task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewContractTask {
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
}

/// Partial contract-task update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContractTaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub sort_order: Option<i32>,
}
