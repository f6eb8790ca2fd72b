//! Client (customer) server functions.

use dioxus::prelude::*;

use crate::models::{ClientInfo, ClientPatch, NewClient};

/// List all active clients, alphabetical by name.
#[cfg(feature = "server")]
#[get("/api/clients")]
pub async fn list_clients() -> Result<Vec<ClientInfo>, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::client::Client;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let clients: Vec<Client> =
        sqlx::query_as("SELECT * FROM clients WHERE deleted_at IS NULL ORDER BY name")
            .fetch_all(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(clients.iter().map(|c| c.to_info()).collect())
}

#[cfg(not(feature = "server"))]
#[get("/api/clients")]
pub async fn list_clients() -> Result<Vec<ClientInfo>, ServerFnError> {
    Ok(Vec::new())
}

/// Get one client.
#[cfg(feature = "server")]
#[get("/api/clients/:client_id")]
pub async fn get_client(client_id: String) -> Result<ClientInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::client::Client;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let client: Option<Client> =
        sqlx::query_as("SELECT * FROM clients WHERE id = $1 AND deleted_at IS NULL")
            .bind(&client_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;

    match client {
        Some(client) => Ok(client.to_info()),
        None => Err(ServerFnError::new("Client not found")),
    }
}

#[cfg(not(feature = "server"))]
#[get("/api/clients/:client_id")]
pub async fn get_client(client_id: String) -> Result<ClientInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Create a client.
#[cfg(feature = "server")]
#[post("/api/clients")]
pub async fn create_client(data: NewClient) -> Result<ClientInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::ids::generate_id;
    use crate::models::client::Client;

    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err(ServerFnError::new("Client name is required"));
    }

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let client: Client = sqlx::query_as(
        "INSERT INTO clients (id, name, email, company, phone, address, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(generate_id("c-"))
    .bind(&name)
    .bind(&data.email)
    .bind(&data.company)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(&data.notes)
    .fetch_one(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(client.to_info())
}

#[cfg(not(feature = "server"))]
#[post("/api/clients")]
pub async fn create_client(data: NewClient) -> Result<ClientInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Update a client. `None` fields are left unchanged.
#[cfg(feature = "server")]
#[post("/api/clients/:client_id/update")]
pub async fn update_client(client_id: String, data: ClientPatch) -> Result<ClientInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::client::Client;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let existing: Option<Client> =
        sqlx::query_as("SELECT * FROM clients WHERE id = $1 AND deleted_at IS NULL")
            .bind(&client_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    let Some(existing) = existing else {
        return Err(ServerFnError::new("Client not found"));
    };

    let client: Client = sqlx::query_as(
        "UPDATE clients SET name = $1, email = $2, company = $3, phone = $4, \
         address = $5, notes = $6, updated_at = now() WHERE id = $7 RETURNING *",
    )
    .bind(data.name.unwrap_or(existing.name))
    .bind(data.email.or(existing.email))
    .bind(data.company.or(existing.company))
    .bind(data.phone.or(existing.phone))
    .bind(data.address.or(existing.address))
    .bind(data.notes.or(existing.notes))
    .bind(&client_id)
    .fetch_one(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(client.to_info())
}

#[cfg(not(feature = "server"))]
#[post("/api/clients/:client_id/update")]
pub async fn update_client(client_id: String, data: ClientPatch) -> Result<ClientInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Soft-delete a client. Its projects keep their reference.
#[cfg(feature = "server")]
#[post("/api/clients/:client_id/delete")]
pub async fn delete_client(client_id: String) -> Result<(), ServerFnError> {
    use crate::db::get_pool;

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let result =
        sqlx::query("UPDATE clients SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(&client_id)
            .execute(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(ServerFnError::new("Client not found"));
    }
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/clients/:client_id/delete")]
pub async fn delete_client(client_id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
