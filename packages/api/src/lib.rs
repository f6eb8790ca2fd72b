//! # API crate: shared fullstack server functions for Conductor
//!
//! This crate is the backbone of the Conductor fullstack architecture. It
//! defines every Dioxus server function the dashboard calls, along with the
//! supporting modules they depend on.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | — | Argon2 password hashing and session-key constants |
//! | [`db`] | — | PostgreSQL connection pool (lazy `OnceCell` singleton) and migrations |
//! | [`models`] | — | Database rows and their client-safe `*Info` projections |
//! | [`clients`] | — | Client (customer) CRUD |
//! | [`projects`] | — | Project CRUD with derived billing totals |
//! | [`contracts`] | — | Contracts, contract tasks, invoicing from a contract |
//! | [`invoices`] | — | Invoice reads, edits, chaining, deletion |
//! | [`proposals`] | — | Proposal CRUD |
//!
//! ## Server functions exposed here
//!
//! Every public `async fn` in this file is a Dioxus server function,
//! annotated with `#[get(...)]` or `#[post(...)]` and compiled twice: once
//! with full server logic (behind `#[cfg(feature = "server")]`) and once as
//! a thin client stub that forwards the call over HTTP.
//!
//! - **Session**: `get_current_employee`, `login`, `signup`, `logout`
//! - **Profile**: `upload_avatar`, `update_employee_profile`
//! - **Password reset**: `request_password_reset`, `reset_password`
//!
//! All money figures anywhere in this crate are derived on read through
//! `store::billing`; nothing stored is trusted as a total.

use dioxus::prelude::*;

pub mod auth;
pub mod clients;
pub mod contracts;
pub mod db;
#[cfg(feature = "server")]
mod error;
#[cfg(feature = "server")]
mod ids;
pub mod invoices;
pub mod models;
pub mod projects;
pub mod proposals;

pub use models::{
    ClientInfo, ClientPatch, ContractInfo, ContractTaskInfo, ContractTaskPatch, EmployeeInfo,
    InvoiceInfo, InvoicePatch, InvoiceTaskShare, LineItemInfo, LineItemPatch, NewClient,
    NewContract, NewContractTask, NewProject, NewProposal, NewProposalTask, ProjectPatch,
    ProjectSummary, ProposalInfo, ProposalPatch, ProposalTaskInfo,
};
pub use store::ProfileUpdate;

pub use clients::{create_client, delete_client, get_client, list_clients, update_client};
pub use contracts::*;
pub use invoices::{create_next_invoice, update_invoice};
pub use projects::{get_project, list_projects, update_project};
pub use proposals::*;

/// Lifetime of a password-reset token.
#[cfg(feature = "server")]
const RESET_TOKEN_HOURS: i64 = 1;

/// Load an employee that can still sign in: not soft-deleted, still active.
#[cfg(feature = "server")]
async fn load_active_employee(
    pool: &sqlx::PgPool,
    employee_id: &str,
) -> Result<Option<models::employee::Employee>, error::DataError> {
    let employee = sqlx::query_as(
        "SELECT * FROM employees WHERE id = $1 AND deleted_at IS NULL AND is_active = TRUE",
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

/// Get the current authenticated employee from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_employee() -> Result<Option<EmployeeInfo>, ServerFnError> {
    use crate::db::get_pool;

    let employee_id: Option<String> = session
        .get(auth::SESSION_EMPLOYEE_ID_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some(employee_id) = employee_id else {
        return Ok(None);
    };

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let employee = load_active_employee(pool, &employee_id).await?;
    Ok(employee.map(|e| e.to_info()))
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_employee() -> Result<Option<EmployeeInfo>, ServerFnError> {
    Ok(None)
}

/// Log in with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/login", session: tower_sessions::Session)]
pub async fn login(email: String, password: String) -> Result<EmployeeInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::employee::Employee;

    let email = email.trim().to_lowercase();

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let employee: Option<Employee> =
        sqlx::query_as("SELECT * FROM employees WHERE email = $1 AND deleted_at IS NULL")
            .bind(&email)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;

    // Same message for unknown email, passwordless account, and bad
    // password, so the form does not leak which emails exist.
    let Some(employee) = employee else {
        return Err(ServerFnError::new("Invalid email or password"));
    };
    let Some(ref hash) = employee.password_hash else {
        return Err(ServerFnError::new("Invalid email or password"));
    };

    let valid = auth::verify_password(&password, hash).map_err(ServerFnError::new)?;
    if !valid {
        return Err(ServerFnError::new("Invalid email or password"));
    }

    session
        .insert(auth::SESSION_EMPLOYEE_ID_KEY, employee.id.clone())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(employee.to_info())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/login")]
pub async fn login(email: String, password: String) -> Result<EmployeeInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Register a new employee account with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/signup", session: tower_sessions::Session)]
pub async fn signup(email: String, password: String) -> Result<EmployeeInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::employee::Employee;

    let email = email.trim().to_lowercase();

    if email.is_empty() || !email.contains('@') {
        return Err(ServerFnError::new("Invalid email address"));
    }
    if password.len() < 8 {
        return Err(ServerFnError::new(
            "Password must be at least 8 characters",
        ));
    }

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM employees WHERE email = $1 AND deleted_at IS NULL")
            .bind(&email)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;

    if existing.is_some() {
        return Err(ServerFnError::new("An account with this email already exists"));
    }

    let password_hash = auth::hash_password(&password).map_err(ServerFnError::new)?;

    // Default the first name to the email's local part; the profile page
    // fixes it up later.
    let first_name = email.split('@').next().unwrap_or("").to_string();
    let employee_id = ids::generate_id("emp-");

    let employee: Employee = sqlx::query_as(
        "INSERT INTO employees (id, first_name, last_name, email, password_hash) \
         VALUES ($1, $2, '', $3, $4) RETURNING *",
    )
    .bind(&employee_id)
    .bind(&first_name)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    session
        .insert(auth::SESSION_EMPLOYEE_ID_KEY, employee.id.clone())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(employee.to_info())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/signup")]
pub async fn signup(email: String, password: String) -> Result<EmployeeInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log out the current employee by clearing the session.
#[cfg(feature = "server")]
#[post("/api/auth/logout", session: tower_sessions::Session)]
pub async fn logout() -> Result<(), ServerFnError> {
    session
        .flush()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/logout")]
pub async fn logout() -> Result<(), ServerFnError> {
    Ok(())
}

/// Upload an avatar image for the current employee. Returns the public URL
/// of the stored image.
#[cfg(feature = "server")]
#[post("/api/auth/avatar", session: tower_sessions::Session)]
pub async fn upload_avatar(filename: String, bytes: Vec<u8>) -> Result<String, ServerFnError> {
    use crate::db::get_pool;

    let employee_id: Option<String> = session
        .get(auth::SESSION_EMPLOYEE_ID_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some(employee_id) = employee_id else {
        return Err(ServerFnError::new("Not authenticated"));
    };

    let ext = std::path::Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
    let avatars_dir = std::path::Path::new(&upload_dir).join("avatars");
    tokio::fs::create_dir_all(&avatars_dir)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let stored_name = format!("{employee_id}.{ext}");
    tokio::fs::write(avatars_dir.join(&stored_name), &bytes)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let avatar_url = format!("/uploads/avatars/{stored_name}");

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    sqlx::query("UPDATE employees SET avatar_url = $1, updated_at = now() WHERE id = $2")
        .bind(&avatar_url)
        .bind(&employee_id)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    tracing::info!("stored avatar for {employee_id} at {avatar_url}");
    Ok(avatar_url)
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/avatar")]
pub async fn upload_avatar(filename: String, bytes: Vec<u8>) -> Result<String, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Update an employee's profile fields. Returns the fields that were
/// actually applied, read back from the updated row.
#[cfg(feature = "server")]
#[post("/api/employees/profile")]
pub async fn update_employee_profile(
    employee_id: String,
    fields: ProfileUpdate,
) -> Result<ProfileUpdate, ServerFnError> {
    use crate::db::get_pool;

    if fields.is_empty() {
        return Ok(ProfileUpdate::default());
    }

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<String> = Vec::new();
    if let Some(first_name) = &fields.first_name {
        values.push(first_name.clone());
        sets.push(format!("first_name = ${}", values.len()));
    }
    if let Some(last_name) = &fields.last_name {
        values.push(last_name.clone());
        sets.push(format!("last_name = ${}", values.len()));
    }
    if let Some(email) = &fields.email {
        values.push(email.trim().to_lowercase());
        sets.push(format!("email = ${}", values.len()));
    }

    let sql = format!(
        "UPDATE employees SET {}, updated_at = now() \
         WHERE id = ${} AND deleted_at IS NULL \
         RETURNING first_name, last_name, email",
        sets.join(", "),
        values.len() + 1,
    );

    let mut query = sqlx::query_as::<_, (String, String, Option<String>)>(&sql);
    for value in &values {
        query = query.bind(value);
    }
    let row = query
        .bind(&employee_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some((first_name, last_name, email)) = row else {
        return Err(ServerFnError::new("Employee not found"));
    };

    // Echo back only the fields the caller asked to change, with the
    // values the database actually holds now.
    Ok(ProfileUpdate {
        first_name: fields.first_name.is_some().then_some(first_name),
        last_name: fields.last_name.is_some().then_some(last_name),
        email: fields.email.is_some().then(|| email.unwrap_or_default()),
    })
}

#[cfg(not(feature = "server"))]
#[post("/api/employees/profile")]
pub async fn update_employee_profile(
    employee_id: String,
    fields: ProfileUpdate,
) -> Result<ProfileUpdate, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Generate a single-use password reset link for an employee. Caller must
/// be signed in (an admin hands the link to the locked-out employee).
#[cfg(feature = "server")]
#[post("/api/auth/reset-request", session: tower_sessions::Session)]
pub async fn request_password_reset(employee_id: String) -> Result<String, ServerFnError> {
    use crate::db::get_pool;
    use rand::RngCore;

    let caller: Option<String> = session
        .get(auth::SESSION_EMPLOYEE_ID_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    if caller.is_none() {
        return Err(ServerFnError::new("Not authenticated"));
    }

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let target: Option<(String,)> =
        sqlx::query_as("SELECT id FROM employees WHERE id = $1 AND deleted_at IS NULL")
            .bind(&employee_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    if target.is_none() {
        return Err(ServerFnError::new("Employee not found"));
    }

    let mut raw = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut raw);
    let token: String = raw.iter().map(|b| format!("{b:02x}")).collect();

    let expires = chrono::Utc::now() + chrono::Duration::hours(RESET_TOKEN_HOURS);
    sqlx::query("INSERT INTO password_resets (token, employee_id, expires_at) VALUES ($1, $2, $3)")
        .bind(&token)
        .bind(&employee_id)
        .bind(expires)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(format!("/reset-password?token={token}"))
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/reset-request")]
pub async fn request_password_reset(employee_id: String) -> Result<String, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Consume a reset token and set a new password.
#[cfg(feature = "server")]
#[post("/api/auth/reset-password")]
pub async fn reset_password(token: String, password: String) -> Result<(), ServerFnError> {
    use crate::db::get_pool;

    if password.len() < 8 {
        return Err(ServerFnError::new(
            "Password must be at least 8 characters",
        ));
    }

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    // Validate and consume in one statement so a token can never be used
    // twice, even by racing requests.
    let row: Option<(String,)> = sqlx::query_as(
        "UPDATE password_resets SET used_at = now() \
         WHERE token = $1 AND expires_at > now() AND used_at IS NULL \
         RETURNING employee_id",
    )
    .bind(&token)
    .fetch_optional(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some((employee_id,)) = row else {
        return Err(ServerFnError::new("Invalid or expired reset token"));
    };

    let password_hash = auth::hash_password(&password).map_err(ServerFnError::new)?;
    sqlx::query("UPDATE employees SET password_hash = $1, updated_at = now() WHERE id = $2")
        .bind(&password_hash)
        .bind(&employee_id)
        .execute(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/reset-password")]
pub async fn reset_password(token: String, password: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
