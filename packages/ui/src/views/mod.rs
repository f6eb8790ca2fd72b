//! Shared page views. The platform shell maps routes onto these.

mod clients;
mod login;
mod project_detail;
mod projects;
mod settings;
mod signup;

pub use clients::Clients;
pub use login::Login;
pub use project_detail::ProjectDetail;
pub use projects::Projects;
pub use settings::Settings;
pub use signup::Signup;
