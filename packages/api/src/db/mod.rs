//! PostgreSQL connection pool management.
//!
//! Entirely gated behind `feature = "server"` so client (WASM) builds never
//! pull in SQLx or Tokio networking code. The pool is a lazy process-wide
//! singleton: the first [`get_pool`] call reads `DATABASE_URL` (via
//! `dotenvy`), opens the pool, and caches it for all later callers.

#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pool::get_pool;
