//! Short prefixed record ids and the numbering helpers built on them.

use sqlx::PgPool;

use crate::error::DataError;

/// Generate a short unique id: 8 hex chars of a v4 UUID behind a type
/// prefix (`c-`, `con-`, `ctask-`, `inv-`, `li-`, `prop-`, `pt-`, `emp-`).
pub fn generate_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &hex[..8])
}

/// Next invoice number for a project: `<project-id>-<n>`, where `n` counts
/// every invoice ever created for the project. Soft-deleted invoices count
/// too, so a number is never reused.
pub async fn next_invoice_number(pool: &PgPool, project_id: &str) -> Result<String, DataError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM invoices WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;
    Ok(format!("{project_id}-{}", count + 1))
}

/// Next sequential project number, rendered as text.
pub async fn next_project_number(pool: &PgPool) -> Result<String, DataError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
        .fetch_one(pool)
        .await?;
    Ok(format!("{}", count + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_their_prefix() {
        let id = generate_id("inv-");
        assert!(id.starts_with("inv-"));
        assert_eq!(id.len(), "inv-".len() + 8);
        assert!(id["inv-".len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ids_are_unique_enough() {
        let a = generate_id("c-");
        let b = generate_id("c-");
        assert_ne!(a, b);
    }
}
