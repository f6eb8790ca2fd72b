//! Proposal models. Proposal status is its own small world (`draft` /
//! `sent`), distinct from the project progression.

use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use chrono::{DateTime, Utc};
#[cfg(feature = "server")]
use sqlx::FromRow;

/// Full proposal record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct Proposal {
    pub id: String,
    pub project_id: String,
    pub data_path: Option<String>,
    pub pdf_path: Option<String>,
    pub client_company: Option<String>,
    pub client_contact_email: Option<String>,
    pub total_fee: f64,
    pub engineer_name: Option<String>,
    pub engineer_title: Option<String>,
    pub contact_method: Option<String>,
    pub proposal_date: Option<String>,
    pub status: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(feature = "server")]
impl Proposal {
    pub fn to_info(&self, tasks: Vec<ProposalTaskInfo>) -> ProposalInfo {
        ProposalInfo {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            data_path: self.data_path.clone(),
            pdf_path: self.pdf_path.clone(),
            client_company: self.client_company.clone(),
            client_contact_email: self.client_contact_email.clone(),
            total_fee: self.total_fee,
            engineer_name: self.engineer_name.clone(),
            engineer_title: self.engineer_title.clone(),
            contact_method: self.contact_method.clone(),
            proposal_date: self.proposal_date.clone(),
            status: self.status.clone(),
            sent_at: self.sent_at.map(|t| t.to_rfc3339()),
            tasks,
        }
    }
}

/// Full proposal-task record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct ProposalTask {
    pub id: String,
    pub proposal_id: String,
    pub sort_order: i32,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "server")]
impl ProposalTask {
    pub fn to_info(&self) -> ProposalTaskInfo {
        ProposalTaskInfo {
            id: self.id.clone(),
            sort_order: self.sort_order,
            name: self.name.clone(),
            description: self.description.clone(),
            amount: self.amount,
        }
    }
}

/// Proposal with its tasks, safe to send to the browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposalInfo {
    pub id: String,
    pub project_id: String,
    pub data_path: Option<String>,
    pub pdf_path: Option<String>,
    pub client_company: Option<String>,
    pub client_contact_email: Option<String>,
    pub total_fee: f64,
    pub engineer_name: Option<String>,
    pub engineer_title: Option<String>,
    pub contact_method: Option<String>,
    pub proposal_date: Option<String>,
    pub status: String,
    pub sent_at: Option<String>,
    pub tasks: Vec<ProposalTaskInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposalTaskInfo {
    pub id: String,
    pub sort_order: i32,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
}

/// Input for creating a proposal. When `tasks` is given the fee is the sum
/// of the task amounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewProposal {
    pub project_id: String,
    pub client_company: Option<String>,
    pub client_contact_email: Option<String>,
    pub total_fee: f64,
    pub engineer_name: Option<String>,
    pub engineer_title: Option<String>,
    pub contact_method: Option<String>,
    pub proposal_date: Option<String>,
    pub status: Option<String>,
    pub tasks: Option<Vec<NewProposalTask>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewProposalTask {
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
}

/// Partial proposal update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProposalPatch {
    pub client_company: Option<String>,
    pub client_contact_email: Option<String>,
    pub total_fee: Option<f64>,
    pub engineer_name: Option<String>,
    pub engineer_title: Option<String>,
    pub contact_method: Option<String>,
    pub proposal_date: Option<String>,
    pub status: Option<String>,
    pub data_path: Option<String>,
    pub pdf_path: Option<String>,
}
