//! Contract server functions: contracts, their tasks, and turning a slice
//! of a contract into the next invoice in the chain.

use dioxus::prelude::*;

use crate::models::{ContractInfo, ContractTaskPatch, InvoiceInfo, InvoiceTaskShare, NewContract, NewContractTask};

#[cfg(feature = "server")]
pub(crate) use server::{contract_info, contract_infos_for_project};

#[cfg(feature = "server")]
mod server {
    use std::collections::HashMap;

    use sqlx::PgPool;

    use crate::error::DataError;
    use crate::models::contract::{Contract, ContractTask};
    use crate::models::ContractInfo;

    /// Billed and paid dollars per task name, from the line items of the
    /// contract's active invoices. Line items are matched to contract tasks
    /// by name; that is the invariant the invoicing flow maintains.
    async fn billing_by_task_name(
        pool: &PgPool,
        contract_id: &str,
    ) -> Result<HashMap<String, (f64, f64)>, DataError> {
        let rows: Vec<(String, f64, f64)> = sqlx::query_as(
            "SELECT li.name, \
                    COALESCE(SUM(li.amount), 0) AS billed, \
                    COALESCE(SUM(li.amount) FILTER (WHERE inv.paid_status = 'paid'), 0) AS paid \
             FROM invoice_line_items li \
             JOIN invoices inv ON li.invoice_id = inv.id \
             WHERE inv.contract_id = $1 AND inv.deleted_at IS NULL \
             GROUP BY li.name",
        )
        .bind(contract_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, billed, paid)| (name, (billed, paid)))
            .collect())
    }

    /// Load one contract with its tasks and their derived billing figures.
    pub(crate) async fn contract_info(
        pool: &PgPool,
        contract_id: &str,
    ) -> Result<ContractInfo, DataError> {
        let contract: Option<Contract> =
            sqlx::query_as("SELECT * FROM contracts WHERE id = $1 AND deleted_at IS NULL")
                .bind(contract_id)
                .fetch_optional(pool)
                .await?;
        let Some(contract) = contract else {
            return Err(DataError::NotFound("contract"));
        };
        assemble(pool, contract).await
    }

    /// Load every active contract of a project, oldest first.
    pub(crate) async fn contract_infos_for_project(
        pool: &PgPool,
        project_id: &str,
    ) -> Result<Vec<ContractInfo>, DataError> {
        let contracts: Vec<Contract> = sqlx::query_as(
            "SELECT * FROM contracts WHERE project_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let mut infos = Vec::with_capacity(contracts.len());
        for contract in contracts {
            infos.push(assemble(pool, contract).await?);
        }
        Ok(infos)
    }

    async fn assemble(pool: &PgPool, contract: Contract) -> Result<ContractInfo, DataError> {
        let tasks: Vec<ContractTask> = sqlx::query_as(
            "SELECT * FROM contract_tasks WHERE contract_id = $1 ORDER BY sort_order",
        )
        .bind(&contract.id)
        .fetch_all(pool)
        .await?;

        let billing = billing_by_task_name(pool, &contract.id).await?;
        let tasks = tasks
            .iter()
            .map(|task| {
                let (billed, paid) = billing.get(&task.name).copied().unwrap_or((0.0, 0.0));
                task.to_info(billed, paid)
            })
            .collect();

        Ok(ContractInfo {
            id: contract.id,
            project_id: contract.project_id,
            file_path: contract.file_path,
            signed_at: contract.signed_at,
            notes: contract.notes,
            total_amount: contract.total_amount,
            tasks,
        })
    }

    /// Recompute a contract's stored total from its tasks.
    pub(crate) async fn refresh_contract_total(
        pool: &PgPool,
        contract_id: &str,
    ) -> Result<(), DataError> {
        sqlx::query(
            "UPDATE contracts SET total_amount = \
             (SELECT COALESCE(SUM(amount), 0) FROM contract_tasks WHERE contract_id = $1), \
             updated_at = now() WHERE id = $1",
        )
        .bind(contract_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Get one contract with tasks and their billed-to-date figures.
#[cfg(feature = "server")]
#[get("/api/contracts/:contract_id")]
pub async fn get_contract(contract_id: String) -> Result<ContractInfo, ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(contract_info(pool, &contract_id).await?)
}

#[cfg(not(feature = "server"))]
#[get("/api/contracts/:contract_id")]
pub async fn get_contract(contract_id: String) -> Result<ContractInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Create a contract under a project. With inline tasks the total is the
/// sum of the task amounts, whatever the input says.
#[cfg(feature = "server")]
#[post("/api/contracts")]
pub async fn create_contract(data: NewContract) -> Result<ContractInfo, ServerFnError> {
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

    let total = match &data.tasks {
        Some(tasks) => tasks.iter().map(|t| t.amount).sum(),
        None => data.total_amount,
    };

    let contract_id = generate_id("con-");
    sqlx::query(
        "INSERT INTO contracts (id, project_id, total_amount, signed_at, file_path, notes) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&contract_id)
    .bind(&data.project_id)
    .bind(total)
    .bind(&data.signed_at)
    .bind(&data.file_path)
    .bind(&data.notes)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    if let Some(tasks) = &data.tasks {
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

    Ok(contract_info(pool, &contract_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/contracts")]
pub async fn create_contract(data: NewContract) -> Result<ContractInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Append a task to a contract and refresh the contract total.
#[cfg(feature = "server")]
#[post("/api/contracts/:contract_id/tasks")]
pub async fn add_contract_task(
    contract_id: String,
    data: NewContractTask,
) -> Result<ContractInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::ids::generate_id;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let contract: Option<(String,)> =
        sqlx::query_as("SELECT id FROM contracts WHERE id = $1 AND deleted_at IS NULL")
            .bind(&contract_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    if contract.is_none() {
        return Err(ServerFnError::new("Contract not found"));
    }

    let (max_order,): (i32,) = sqlx::query_as(
        "SELECT COALESCE(MAX(sort_order), 0) FROM contract_tasks WHERE contract_id = $1",
    )
    .bind(&contract_id)
    .fetch_one(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    sqlx::query(
        "INSERT INTO contract_tasks (id, contract_id, sort_order, name, description, amount) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(generate_id("ctask-"))
    .bind(&contract_id)
    .bind(max_order + 1)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.amount)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    server::refresh_contract_total(pool, &contract_id).await?;
    Ok(contract_info(pool, &contract_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/contracts/:contract_id/tasks")]
pub async fn add_contract_task(
    contract_id: String,
    data: NewContractTask,
) -> Result<ContractInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Update a contract task and refresh the contract total.
#[cfg(feature = "server")]
#[post("/api/contracts/:contract_id/tasks/:task_id")]
pub async fn update_contract_task(
    contract_id: String,
    task_id: String,
    data: ContractTaskPatch,
) -> Result<ContractInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::contract::ContractTask;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let existing: Option<ContractTask> =
        sqlx::query_as("SELECT * FROM contract_tasks WHERE id = $1 AND contract_id = $2")
            .bind(&task_id)
            .bind(&contract_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    let Some(existing) = existing else {
        return Err(ServerFnError::new("Task not found"));
    };

    sqlx::query(
        "UPDATE contract_tasks SET name = $1, description = $2, amount = $3, sort_order = $4, \
         updated_at = now() WHERE id = $5",
    )
    .bind(data.name.unwrap_or(existing.name))
    .bind(data.description.or(existing.description))
    .bind(data.amount.unwrap_or(existing.amount))
    .bind(data.sort_order.unwrap_or(existing.sort_order))
    .bind(&task_id)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    server::refresh_contract_total(pool, &contract_id).await?;
    Ok(contract_info(pool, &contract_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/contracts/:contract_id/tasks/:task_id")]
pub async fn update_contract_task(
    contract_id: String,
    task_id: String,
    data: ContractTaskPatch,
) -> Result<ContractInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Remove a contract task and refresh the contract total.
#[cfg(feature = "server")]
#[post("/api/contracts/:contract_id/tasks/:task_id/delete")]
pub async fn delete_contract_task(
    contract_id: String,
    task_id: String,
) -> Result<ContractInfo, ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let result = sqlx::query("DELETE FROM contract_tasks WHERE id = $1 AND contract_id = $2")
        .bind(&task_id)
        .bind(&contract_id)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    if result.rows_affected() == 0 {
        return Err(ServerFnError::new("Task not found"));
    }

    server::refresh_contract_total(pool, &contract_id).await?;
    Ok(contract_info(pool, &contract_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/contracts/:contract_id/tasks/:task_id/delete")]
pub async fn delete_contract_task(
    contract_id: String,
    task_id: String,
) -> Result<ContractInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Create the next invoice in a contract's chain, billing the given percent
/// of each chosen task. Line items carry `previous_billing` from the
/// contract's active invoices; the new invoice becomes the project's
/// current invoice.
#[cfg(feature = "server")]
#[post("/api/contracts/:contract_id/invoices")]
pub async fn create_invoice_from_contract(
    contract_id: String,
    tasks: Vec<InvoiceTaskShare>,
) -> Result<InvoiceInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::ids::{generate_id, next_invoice_number};
    use crate::models::contract::{Contract, ContractTask};
    use store::LineAmounts;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let contract: Option<Contract> =
        sqlx::query_as("SELECT * FROM contracts WHERE id = $1 AND deleted_at IS NULL")
            .bind(&contract_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    let Some(contract) = contract else {
        return Err(ServerFnError::new("Contract not found"));
    };
    let project_id = contract.project_id.clone();

    let invoice_number = next_invoice_number(pool, &project_id).await?;

    // Previous invoice in this contract's chain, if any.
    let previous: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM invoices WHERE project_id = $1 AND contract_id = $2 \
         AND deleted_at IS NULL ORDER BY created_at DESC LIMIT 1",
    )
    .bind(&project_id)
    .bind(&contract_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;
    let previous_invoice_id = previous.map(|(id,)| id);

    struct PendingLine {
        name: String,
        description: Option<String>,
        quantity: f64,
        unit_price: f64,
        amount: f64,
        previous_billing: f64,
    }

    let mut lines: Vec<PendingLine> = Vec::with_capacity(tasks.len());
    for share in &tasks {
        let task: Option<ContractTask> =
            sqlx::query_as("SELECT * FROM contract_tasks WHERE id = $1 AND contract_id = $2")
                .bind(&share.task_id)
                .bind(&contract_id)
                .fetch_optional(pool)
                .await
                .map_err(|e| ServerFnError::new(e.to_string()))?;
        let Some(task) = task else {
            return Err(ServerFnError::new(format!("Task {} not found", share.task_id)));
        };

        let (previous_billing,): (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(li.amount), 0) \
             FROM invoice_line_items li JOIN invoices inv ON li.invoice_id = inv.id \
             WHERE inv.contract_id = $1 AND inv.deleted_at IS NULL AND li.name = $2",
        )
        .bind(&contract_id)
        .bind(&task.name)
        .fetch_one(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

        let amount = task.amount * share.percent_this_invoice / 100.0;
        // Cumulative billed fraction to date, so that
        // amount == quantity * unit_price - previous_billing.
        let quantity = if task.amount == 0.0 {
            0.0
        } else {
            (previous_billing + amount) / task.amount
        };

        lines.push(PendingLine {
            name: task.name,
            description: task.description,
            quantity,
            unit_price: task.amount,
            amount,
            previous_billing,
        });
    }

    let amounts: Vec<LineAmounts> = lines
        .iter()
        .map(|l| LineAmounts {
            quantity: l.quantity,
            unit_price: l.unit_price,
            previous_billing: l.previous_billing,
        })
        .collect();
    let total_due = store::billing::invoice_total(&amounts);

    let invoice_id = generate_id("inv-");
    sqlx::query(
        "INSERT INTO invoices (id, invoice_number, project_id, contract_id, \
         previous_invoice_id, type, total_due) VALUES ($1, $2, $3, $4, $5, 'task', $6)",
    )
    .bind(&invoice_id)
    .bind(&invoice_number)
    .bind(&project_id)
    .bind(&contract_id)
    .bind(&previous_invoice_id)
    .bind(total_due)
    .execute(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    for (i, line) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO invoice_line_items (id, invoice_id, sort_order, name, description, \
             quantity, unit_price, amount, previous_billing) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(generate_id("li-"))
        .bind(&invoice_id)
        .bind((i + 1) as i32)
        .bind(&line.name)
        .bind(&line.description)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.amount)
        .bind(line.previous_billing)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    }

    sqlx::query("UPDATE projects SET current_invoice_id = $1, updated_at = now() WHERE id = $2")
        .bind(&invoice_id)
        .bind(&project_id)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    tracing::info!("created invoice {invoice_number} from contract {contract_id}");
    Ok(crate::invoices::invoice_info(pool, &invoice_id).await?)
}

#[cfg(not(feature = "server"))]
#[post("/api/contracts/:contract_id/invoices")]
pub async fn create_invoice_from_contract(
    contract_id: String,
    tasks: Vec<InvoiceTaskShare>,
) -> Result<InvoiceInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
