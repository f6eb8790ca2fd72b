//! Database models and their client-safe projections.
//!
//! Each entity comes in up to three shapes: the full database row
//! (server-only, derives [`sqlx::FromRow`]), a `*Info` projection that is
//! safe to cross the server/client boundary, and the `New*`/`*Patch` input
//! types the server functions accept. Derived billing figures only ever
//! appear on `*Info` types: they are computed on read, never stored.

pub mod client;
pub mod contract;
pub mod employee;
pub mod invoice;
pub mod project;
pub mod proposal;

pub use client::{ClientInfo, ClientPatch, NewClient};
pub use contract::{
    ContractInfo, ContractTaskInfo, ContractTaskPatch, NewContract, NewContractTask,
};
pub use employee::EmployeeInfo;
pub use invoice::{InvoiceInfo, InvoicePatch, InvoiceTaskShare, LineItemInfo, LineItemPatch};
pub use project::{NewProject, ProjectPatch, ProjectSummary};
pub use proposal::{NewProposal, NewProposalTask, ProposalInfo, ProposalPatch, ProposalTaskInfo};
