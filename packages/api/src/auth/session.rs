//! Session keys.

/// Key for storing the signed-in employee's ID in the session.
pub const SESSION_EMPLOYEE_ID_KEY: &str = "employee_id";
