//! Proposal server functions.

use dioxus::prelude::*;

use crate::models::{NewProposal, ProposalInfo, ProposalPatch};

#[cfg(feature = "server")]
pub(crate) use server::proposal_infos_for_project;

#[cfg(feature = "server")]
mod server {
    use sqlx::PgPool;

    use crate::error::DataError;
    use crate::models::proposal::{Proposal, ProposalTask};
    use crate::models::ProposalInfo;

    pub(crate) async fn proposal_info(
        pool: &PgPool,
        proposal_id: &str,
    ) -> Result<ProposalInfo, DataError> {
        let proposal: Option<Proposal> =
            sqlx::query_as("SELECT * FROM proposals WHERE id = $1 AND deleted_at IS NULL")
                .bind(proposal_id)
                .fetch_optional(pool)
                .await?;
        let Some(proposal) = proposal else {
            return Err(DataError::NotFound("proposal"));
        };
        assemble(pool, proposal).await
    }

    pub(crate) async fn proposal_infos_for_project(
        pool: &PgPool,
        project_id: &str,
    ) -> Result<Vec<ProposalInfo>, DataError> {
        let proposals: Vec<Proposal> = sqlx::query_as(
            "SELECT * FROM proposals WHERE project_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let mut infos = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            infos.push(assemble(pool, proposal).await?);
        }
        Ok(infos)
    }

    async fn assemble(pool: &PgPool, proposal: Proposal) -> Result<ProposalInfo, DataError> {
        let tasks: Vec<ProposalTask> = sqlx::query_as(
            "SELECT * FROM proposal_tasks WHERE proposal_id = $1 ORDER BY sort_order",
        )
        .bind(&proposal.id)
        .fetch_all(pool)
        .await?;
        Ok(proposal.to_info(tasks.iter().map(|t| t.to_info()).collect()))
    }
}

/// List a project's active proposals, oldest first.
#[cfg(feature = "server")]
#[get("/api/projects/:project_id/proposals")]
pub async fn list_proposals(project_id: String) -> Result<Vec<ProposalInfo>, ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(proposal_infos_for_project(pool, &project_id).await?)
}

#[cfg(not(feature = "server"))]
#[get("/api/projects/:project_id/proposals")]
pub async fn list_proposals(project_id: String) -> Result<Vec<ProposalInfo>, ServerFnError> {
    Ok(Vec::new())
}

/// Create a proposal. With inline tasks the fee is the sum of the task
/// amounts.
#[cfg(feature = "server")]
#[post("/api/proposals")]
pub async fn create_proposal(data: NewProposal) -> Result<ProposalInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::ids::generate_id;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let project: Option<(String,)> =
        sqlx::query_as("SELECT id FROM projects WHERE id = $1 AND deleted_at IS NULL")
            .bind(&data.project_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    if project.is_none() {
        return Err(ServerFnError::new("Project not found"));
    }

    let total_fee = match &data.tasks {
        Some(tasks) => tasks.iter().map(|t| t.amount).sum(),
        None => data.total_fee,
    };
    let status = data.status.unwrap_or_else(|| "draft".to_string());

    let proposal_id = generate_id("prop-");
    sqlx::query(
        "INSERT INTO proposals (id, project_id, client_company, client_contact_email, \
         total_fee, engineer_name, engineer_title, contact_method, proposal_date, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(&proposal_id)
    .bind(&data.project_id)
    .bind(&data.client_company)
    .bind(&data.client_contact_email)
    .bind(total_fee)
    .bind(&data.engineer_name)
    .bind(&data.engineer_title)
    .bind(&data.contact_method)
    .bind(&data.proposal_date)
    .bind(&status)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    if let Some(tasks) = &data.tasks {
        for (i, task) in tasks.iter().enumerate() {
            sqlx::query(
                "INSERT INTO proposal_tasks (id, proposal_id, sort_order, name, description, amount) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(generate_id("pt-"))
            .bind(&proposal_id)
            .bind((i + 1) as i32)
            .bind(&task.name)
            .bind(&task.description)
            .bind(task.amount)
            .execute(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
        }
    }

    Ok(server::proposal_info(pool, &proposal_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/proposals")]
pub async fn create_proposal(data: NewProposal) -> Result<ProposalInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Update a proposal. Moving it to `sent` stamps `sent_at`.
#[cfg(feature = "server")]
#[post("/api/proposals/:proposal_id/update")]
pub async fn update_proposal(
    proposal_id: String,
    data: ProposalPatch,
) -> Result<ProposalInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::proposal::Proposal;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let existing: Option<Proposal> =
        sqlx::query_as("SELECT * FROM proposals WHERE id = $1 AND deleted_at IS NULL")
            .bind(&proposal_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    let Some(existing) = existing else {
        return Err(ServerFnError::new("Proposal not found"));
    };

    let becomes_sent = data.status.as_deref() == Some("sent") && existing.sent_at.is_none();

    sqlx::query(
        "UPDATE proposals SET client_company = $1, client_contact_email = $2, total_fee = $3, \
         engineer_name = $4, engineer_title = $5, contact_method = $6, proposal_date = $7, \
         status = $8, data_path = $9, pdf_path = $10, \
         sent_at = CASE WHEN $11 THEN now() ELSE sent_at END, \
         updated_at = now() WHERE id = $12",
    )
    .bind(data.client_company.or(existing.client_company))
    .bind(data.client_contact_email.or(existing.client_contact_email))
    .bind(data.total_fee.unwrap_or(existing.total_fee))
    .bind(data.engineer_name.or(existing.engineer_name))
    .bind(data.engineer_title.or(existing.engineer_title))
    .bind(data.contact_method.or(existing.contact_method))
    .bind(data.proposal_date.or(existing.proposal_date))
    .bind(data.status.unwrap_or(existing.status))
    .bind(data.data_path.or(existing.data_path))
    .bind(data.pdf_path.or(existing.pdf_path))
    .bind(becomes_sent)
    .bind(&proposal_id)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(server::proposal_info(pool, &proposal_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/proposals/:proposal_id/update")]
pub async fn update_proposal(
    proposal_id: String,
    data: ProposalPatch,
) -> Result<ProposalInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Soft-delete a proposal.
#[cfg(feature = "server")]
#[post("/api/proposals/:proposal_id/delete")]
pub async fn delete_proposal(proposal_id: String) -> Result<(), ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let result = sqlx::query(
        "UPDATE proposals SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(&proposal_id)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(ServerFnError::new("Proposal not found"));
    }
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/proposals/:proposal_id/delete")]
pub async fn delete_proposal(proposal_id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
