//! Server-side error type for the data-assembly helpers.
//!
//! Server functions ultimately answer with `ServerFnError` strings; this
//! type exists so the helpers that load and assemble records can use `?`
//! over database and status-parsing failures and convert once at the edge.

use dioxus::prelude::ServerFnError;
use store::status::UnknownStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Status(#[from] UnknownStatus),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl From<DataError> for ServerFnError {
    fn from(err: DataError) -> Self {
        ServerFnError::new(err.to_string())
    }
}
