//! Session context and hooks for the UI.
//!
//! The session logic itself lives in [`store::SessionStore`]; this module
//! wires it to Dioxus. [`SessionProvider`] owns the one store instance for
//! the whole app, mirrors its state into a [`Signal`] so components
//! re-render on changes, and kicks off the initial session check. Any
//! component that also calls [`SessionHandle::check_session`] while that
//! first check is in flight joins it; the store guarantees a single
//! backend fetch per check cycle.

use dioxus::prelude::*;
use store::{
    AuthError, AuthService, AvatarFile, Identity, ProfileUpdate, SessionCheckFailure,
    SessionSnapshot, SessionStore, UploadError,
};

/// [`store::AuthService`] implementation backed by the `api` server
/// functions.
#[derive(Clone, Copy, Default)]
pub struct ServerAuth;

impl AuthService for ServerAuth {
    async fn fetch_current_identity(&self) -> Result<Identity, SessionCheckFailure> {
        match api::get_current_employee().await {
            Ok(Some(info)) => Ok(info.into()),
            Ok(None) => Err(SessionCheckFailure("no active session".to_string())),
            Err(e) => Err(SessionCheckFailure(e.to_string())),
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        api::login(email.to_string(), password.to_string())
            .await
            .map(Into::into)
            .map_err(|e| AuthError::Rejected(e.to_string()))
    }

    async fn signup(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        api::signup(email.to_string(), password.to_string())
            .await
            .map(Into::into)
            .map_err(|e| AuthError::Rejected(e.to_string()))
    }

    async fn logout(&self) -> Result<(), AuthError> {
        api::logout()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))
    }

    async fn upload_avatar(&self, file: AvatarFile) -> Result<String, UploadError> {
        api::upload_avatar(file.filename, file.bytes)
            .await
            .map_err(|e| UploadError::Failed(e.to_string()))
    }

    async fn update_profile(
        &self,
        employee_id: &str,
        fields: ProfileUpdate,
    ) -> Result<ProfileUpdate, AuthError> {
        api::update_employee_profile(employee_id.to_string(), fields)
            .await
            .map_err(|e| AuthError::Rejected(e.to_string()))
    }
}

/// The session store plus a reactive mirror of its state. Cloning is cheap;
/// all clones share the same store and signal.
#[derive(Clone)]
pub struct SessionHandle {
    store: SessionStore<ServerAuth>,
    state: Signal<SessionSnapshot>,
}

impl SessionHandle {
    fn sync(&mut self) {
        self.state.set(self.store.snapshot());
    }

    /// Reactive read of the current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        (self.state)()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.snapshot().identity
    }

    pub async fn check_session(&mut self) {
        self.store.check_session().await;
        self.sync();
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let result = self.store.login(email, password).await;
        self.sync();
        result
    }

    pub async fn signup(&mut self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let result = self.store.signup(email, password).await;
        self.sync();
        result
    }

    pub async fn logout(&mut self) {
        self.store.logout().await;
        self.sync();
    }

    pub async fn update_avatar(&mut self, file: AvatarFile) -> Result<(), UploadError> {
        let result = self.store.update_avatar(file).await;
        self.sync();
        result
    }

    pub async fn update_profile(&mut self, fields: ProfileUpdate) -> Result<(), AuthError> {
        let result = self.store.update_profile(fields).await;
        self.sync();
        result
    }

    pub fn clear_user(&mut self) {
        self.store.clear_user();
        self.sync();
    }
}

/// Get the app-wide session handle.
pub fn use_session() -> SessionHandle {
    use_context::<SessionHandle>()
}

fn redirect_to_login() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href("/login");
        }
    }
}

/// Provider component that owns the session store.
/// Wrap the app with this component to enable authentication.
#[component]
pub fn SessionProvider(children: Element) -> Element {
    let state = use_signal(SessionSnapshot::default);
    let handle = use_context_provider(|| SessionHandle {
        store: SessionStore::with_navigator(ServerAuth, redirect_to_login),
        state,
    });

    // Check the session on mount. Components that ask again while this is
    // in flight share the same fetch.
    let _ = use_resource(move || {
        let mut handle = handle.clone();
        async move {
            handle.check_session().await;
        }
    });

    rsx! {
        {children}
    }
}

/// Button to log out the current employee.
#[component]
pub fn LogoutButton(
    #[props(default = "Log out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let session = use_session();

    let onclick = move |_| {
        let mut session = session.clone();
        async move {
            // Always succeeds from the client's point of view; the store
            // clears local state and redirects even if the server is down.
            session.logout().await;
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
