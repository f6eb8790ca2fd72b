//! # Employee model
//!
//! The two representations of a Conductor employee:
//!
//! - [`Employee`] (server only) — the complete `employees` row, loaded
//!   straight from queries via [`sqlx::FromRow`]. Includes the Argon2
//!   `password_hash` (present only for accounts that can log in), audit
//!   timestamps, and the soft-delete marker.
//! - [`EmployeeInfo`] — the client-safe subset that crosses the
//!   server/client boundary. It omits the hash and timestamps and converts
//!   into [`store::Identity`], which is what the session store holds.

use serde::{Deserialize, Serialize};
use store::Identity;

#[cfg(feature = "server")]
use chrono::{DateTime, Utc};
#[cfg(feature = "server")]
use sqlx::FromRow;

/// Full employee record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(feature = "server")]
impl Employee {
    /// Convert to EmployeeInfo for client consumption.
    pub fn to_info(&self) -> EmployeeInfo {
        EmployeeInfo {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
            is_active: self.is_active,
        }
    }
}

/// Employee information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeInfo {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
}

impl From<EmployeeInfo> for Identity {
    fn from(info: EmployeeInfo) -> Self {
        Identity {
            id: info.id,
            first_name: info.first_name,
            last_name: info.last_name,
            email: info.email,
            avatar_url: info.avatar_url,
            is_active: info.is_active,
        }
    }
}
