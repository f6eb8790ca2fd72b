//! Project server functions.
//!
//! A project's money figures (`total_contracted`, `total_invoiced`,
//! `total_paid`, `total_outstanding`) are derived on every read: contract
//! tasks are annotated with their billed/paid amounts from active invoice
//! line items, then run through `store::billing::project_totals`. Nothing
//! derived is ever written back.

use dioxus::prelude::*;

use crate::models::{NewProject, ProjectPatch, ProjectSummary};

#[cfg(feature = "server")]
pub(crate) use server::project_summary;

#[cfg(feature = "server")]
mod server {
    use sqlx::PgPool;
    use store::ProjectStatus;

    use crate::contracts::contract_infos_for_project;
    use crate::error::DataError;
    use crate::invoices::invoice_infos_for_project;
    use crate::models::project::Project;
    use crate::models::ProjectSummary;
    use crate::proposals::proposal_infos_for_project;

    /// Assemble the full summary for one project: row, client and PM
    /// context, nested collections, derived totals.
    pub(crate) async fn project_summary(
        pool: &PgPool,
        project_id: &str,
    ) -> Result<ProjectSummary, DataError> {
        let project: Option<Project> =
            sqlx::query_as("SELECT * FROM projects WHERE id = $1 AND deleted_at IS NULL")
                .bind(project_id)
                .fetch_optional(pool)
                .await?;
        let Some(project) = project else {
            return Err(DataError::NotFound("project"));
        };

        let status: ProjectStatus = project.status.parse()?;

        let mut client_name = None;
        let mut client_company = None;
        let mut client_email = None;
        if let Some(client_id) = &project.client_id {
            let row: Option<(String, Option<String>, Option<String>)> =
                sqlx::query_as("SELECT name, company, email FROM clients WHERE id = $1")
                    .bind(client_id)
                    .fetch_optional(pool)
                    .await?;
            if let Some((name, company, email)) = row {
                client_name = Some(name);
                client_company = company;
                client_email = email;
            }
        }

        let mut pm_name = project.pm_name.clone();
        let mut pm_email = project.pm_email.clone();
        let mut pm_avatar_url = None;
        if let Some(pm_id) = &project.pm_id {
            let row: Option<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
                "SELECT first_name, last_name, email, avatar_url FROM employees WHERE id = $1",
            )
            .bind(pm_id)
            .fetch_optional(pool)
            .await?;
            if let Some((first_name, last_name, email, avatar_url)) = row {
                if pm_name.is_none() {
                    pm_name = Some(format!("{first_name} {last_name}").trim().to_string());
                }
                if pm_email.is_none() {
                    pm_email = email;
                }
                pm_avatar_url = avatar_url;
            }
        }

        let contracts = contract_infos_for_project(pool, project_id).await?;
        let invoices = invoice_infos_for_project(pool, project_id).await?;
        let proposals = proposal_infos_for_project(pool, project_id).await?;

        let tasks: Vec<store::TaskBilling> = contracts
            .iter()
            .flat_map(|c| c.tasks.iter().map(|t| t.billing()))
            .collect();
        let totals = store::billing::project_totals(&tasks);

        let mut summary = ProjectSummary {
            id: project.id,
            project_number: project.project_number,
            job_code: project.job_code,
            project_name: project.name,
            status,
            client_id: project.client_id,
            client_name,
            client_company,
            client_email,
            pm_id: project.pm_id,
            pm_name,
            pm_email,
            pm_avatar_url,
            client_project_number: project.client_project_number,
            location: project.location,
            data_path: project.data_path,
            notes: project.notes,
            current_invoice_id: project.current_invoice_id,
            total_contracted: 0.0,
            total_invoiced: 0.0,
            total_paid: 0.0,
            total_outstanding: 0.0,
            contracts,
            invoices,
            proposals,
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        };
        summary.apply_totals(totals);
        Ok(summary)
    }
}

/// List all active projects with their nested records and derived totals.
#[cfg(feature = "server")]
#[get("/api/projects")]
pub async fn list_projects() -> Result<Vec<ProjectSummary>, ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let ids: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM projects WHERE deleted_at IS NULL ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;

    let mut projects = Vec::with_capacity(ids.len());
    for (id,) in ids {
        projects.push(project_summary(pool, &id).await?);
    }
    Ok(projects)
}

#[cfg(not(feature = "server"))]
#[get("/api/projects")]
pub async fn list_projects() -> Result<Vec<ProjectSummary>, ServerFnError> {
    Ok(Vec::new())
}

/// Get one project with its nested records and derived totals.
#[cfg(feature = "server")]
#[get("/api/projects/:project_id")]
pub async fn get_project(project_id: String) -> Result<ProjectSummary, ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(project_summary(pool, &project_id).await?)
}

#[cfg(not(feature = "server"))]
#[get("/api/projects/:project_id")]
pub async fn get_project(project_id: String) -> Result<ProjectSummary, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Create a project, optionally with a contract built from inline tasks.
#[cfg(feature = "server")]
#[post("/api/projects")]
pub async fn create_project(data: NewProject) -> Result<ProjectSummary, ServerFnError> {
    use crate::db::get_pool;
    use crate::ids::{generate_id, next_project_number};

    let name = data.project_name.trim().to_string();
    if name.is_empty() {
        return Err(ServerFnError::new("Project name is required"));
    }

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let project_id = generate_id("p-");
    let project_number = next_project_number(pool).await?;
    let status = data.status.unwrap_or(store::ProjectStatus::Proposal);

    sqlx::query(
        "INSERT INTO projects (id, name, project_number, job_code, client_id, pm_id, \
         location, status, data_path, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(&project_id)
    .bind(&name)
    .bind(&project_number)
    .bind(&data.job_code)
    .bind(&data.client_id)
    .bind(&data.pm_id)
    .bind(&data.location)
    .bind(status.as_str())
    .bind(&data.data_path)
    .bind(&data.notes)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    // Inline contract: total is the sum of the task amounts.
    if let Some(tasks) = &data.contract_tasks {
        let contract_id = generate_id("con-");
        let total: f64 = tasks.iter().map(|t| t.amount).sum();
        sqlx::query(
            "INSERT INTO contracts (id, project_id, total_amount) VALUES ($1, $2, $3)",
        )
        .bind(&contract_id)
        .bind(&project_id)
        .bind(total)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

        for (i, task) in tasks.iter().enumerate() {
            sqlx::query(
                "INSERT INTO contract_tasks (id, contract_id, sort_order, name, description, amount) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(generate_id("ctask-"))
            .bind(&contract_id)
            .bind((i + 1) as i32)
            .bind(&task.name)
            .bind(&task.description)
            .bind(task.amount)
            .execute(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
        }
    }

    tracing::info!("created project {project_id} ({name})");
    Ok(project_summary(pool, &project_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/projects")]
pub async fn create_project(data: NewProject) -> Result<ProjectSummary, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Update a project. A status change must follow the progression one step
/// at a time; anything else rejects the whole update and writes nothing.
#[cfg(feature = "server")]
#[post("/api/projects/:project_id/update")]
pub async fn update_project(
    project_id: String,
    data: ProjectPatch,
) -> Result<ProjectSummary, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::project::Project;
    use store::ProjectStatus;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let existing: Option<Project> =
        sqlx::query_as("SELECT * FROM projects WHERE id = $1 AND deleted_at IS NULL")
            .bind(&project_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    let Some(existing) = existing else {
        return Err(ServerFnError::new("Project not found"));
    };

    let status = match data.status {
        Some(next) => {
            let current: ProjectStatus = existing
                .status
                .parse()
                .map_err(|e: store::status::UnknownStatus| ServerFnError::new(e.to_string()))?;
            current
                .advance_to(next)
                .map_err(|e| ServerFnError::new(e.to_string()))?
        }
        None => existing
            .status
            .parse()
            .map_err(|e: store::status::UnknownStatus| ServerFnError::new(e.to_string()))?,
    };

    sqlx::query(
        "UPDATE projects SET name = $1, client_id = $2, location = $3, project_number = $4, \
         job_code = $5, status = $6, data_path = $7, notes = $8, pm_id = $9, pm_name = $10, \
         pm_email = $11, client_project_number = $12, updated_at = now() WHERE id = $13",
    )
    .bind(data.name.unwrap_or(existing.name))
    .bind(data.client_id.or(existing.client_id))
    .bind(data.location.or(existing.location))
    .bind(data.project_number.or(existing.project_number))
    .bind(data.job_code.or(existing.job_code))
    .bind(status.as_str())
    .bind(data.data_path.or(existing.data_path))
    .bind(data.notes.or(existing.notes))
    .bind(data.pm_id.or(existing.pm_id))
    .bind(data.pm_name.or(existing.pm_name))
    .bind(data.pm_email.or(existing.pm_email))
    .bind(data.client_project_number.or(existing.client_project_number))
    .bind(&project_id)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(project_summary(pool, &project_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/projects/:project_id/update")]
pub async fn update_project(
    project_id: String,
    data: ProjectPatch,
) -> Result<ProjectSummary, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Soft-delete a project.
#[cfg(feature = "server")]
#[post("/api/projects/:project_id/delete")]
pub async fn delete_project(project_id: String) -> Result<(), ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let result = sqlx::query(
        "UPDATE projects SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(&project_id)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(ServerFnError::new("Project not found"));
    }
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/projects/:project_id/delete")]
pub async fn delete_project(project_id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
