//! Project models.

use serde::{Deserialize, Serialize};
use store::{ProjectStatus, ProjectTotals};

use super::contract::{ContractInfo, NewContractTask};
use super::invoice::InvoiceInfo;
use super::proposal::ProposalInfo;

#[cfg(feature = "server")]
use chrono::{DateTime, Utc};
#[cfg(feature = "server")]
use sqlx::FromRow;

/// Full project record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub project_number: Option<String>,
    pub job_code: Option<String>,
    pub client_id: Option<String>,
    pub client_project_number: Option<String>,
    pub pm_id: Option<String>,
    pub pm_name: Option<String>,
    pub pm_email: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub data_path: Option<String>,
    pub notes: Option<String>,
    pub current_invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A project with everything the dashboard list and detail pages need:
/// client and PM context, the derived money totals, and the ordered
/// contract / invoice / proposal collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub id: String,
    pub project_number: Option<String>,
    pub job_code: Option<String>,
    pub project_name: String,
    pub status: ProjectStatus,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub client_company: Option<String>,
    pub client_email: Option<String>,
    pub pm_id: Option<String>,
    pub pm_name: Option<String>,
    pub pm_email: Option<String>,
    pub pm_avatar_url: Option<String>,
    pub client_project_number: Option<String>,
    pub location: Option<String>,
    pub data_path: Option<String>,
    pub notes: Option<String>,
    pub current_invoice_id: Option<String>,
    /// Sum of contract-task amounts (`total_amount` of the calculator).
    pub total_contracted: f64,
    pub total_invoiced: f64,
    pub total_paid: f64,
    /// Contracted minus paid (`outstanding` of the calculator).
    pub total_outstanding: f64,
    pub contracts: Vec<ContractInfo>,
    pub invoices: Vec<InvoiceInfo>,
    pub proposals: Vec<ProposalInfo>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProjectSummary {
    /// Copy the calculator's output onto the summary fields.
    pub fn apply_totals(&mut self, totals: ProjectTotals) {
        self.total_contracted = totals.total_amount;
        self.total_invoiced = totals.total_invoiced;
        self.total_paid = totals.total_paid;
        self.total_outstanding = totals.outstanding;
    }
}

/// Input for creating a project. When `contract_tasks` is given a signed
/// contract is created alongside, totalled from the tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewProject {
    pub project_name: String,
    pub job_code: Option<String>,
    pub client_id: Option<String>,
    pub pm_id: Option<String>,
    pub location: Option<String>,
    pub status: Option<ProjectStatus>,
    pub data_path: Option<String>,
    pub notes: Option<String>,
    pub contract_tasks: Option<Vec<NewContractTask>>,
}

/// Partial project update. A `status` change must be the immediate next
/// step of the progression or the whole update is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub client_id: Option<String>,
    pub location: Option<String>,
    pub project_number: Option<String>,
    pub job_code: Option<String>,
    pub status: Option<ProjectStatus>,
    pub data_path: Option<String>,
    pub notes: Option<String>,
    pub pm_id: Option<String>,
    pub pm_name: Option<String>,
    pub pm_email: Option<String>,
    pub client_project_number: Option<String>,
}
