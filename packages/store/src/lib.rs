pub mod billing;
pub mod config;
pub mod session;
pub mod status;

pub use billing::{invoice_total, line_amount, project_totals, LineAmounts, ProjectTotals, TaskBilling};
pub use config::ThemePreference;
pub use session::{
    AuthError, AuthService, AvatarFile, Identity, ProfileUpdate, SessionCheckFailure,
    SessionSnapshot, SessionStore, UploadError,
};
pub use status::{can_advance, InvalidTransition, PaidStatus, ProjectStatus, SentStatus};
