//! This crate contains all shared UI for the workspace.

mod auth;
pub use auth::{use_session, LogoutButton, ServerAuth, SessionHandle, SessionProvider};

mod theme;
pub use theme::{apply_theme, load_theme_from_storage, set_theme, ThemeSignal};

mod navbar;
pub use navbar::Navbar;

pub mod views;
