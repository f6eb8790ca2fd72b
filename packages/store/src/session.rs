//! # Session lifecycle
//!
//! [`SessionStore`] owns the client's view of "who is signed in". It is a
//! single instance shared by every component in the app (the UI layer puts it
//! in context) and is the only place that mutates session state.
//!
//! Three fields make up the state:
//!
//! - `identity` — the signed-in employee, or `None`.
//! - `checked` — whether an identity check has completed (either way) since
//!   the last reset.
//! - `pending` — the in-flight identity check, present exactly while one is
//!   outstanding.
//!
//! The check is **single-flight**: however many components call
//! [`SessionStore::check_session`] while the first check is still running,
//! exactly one `fetch_current_identity` request is issued. Later callers
//! clone the shared future in the `pending` slot and await the same result.
//! `checked == true` always implies the slot is empty; both are written in
//! the same critical section.
//!
//! A failed check is not an error (it just means "not signed in"), so
//! `check_session` never returns one. Explicit user actions (login, signup,
//! avatar upload, profile update) do surface their failures to the caller.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The signed-in employee as the client sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
}

impl Identity {
    /// Full name, falling back to the email address when both name parts are
    /// blank.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone().unwrap_or_default()
        } else {
            name.to_string()
        }
    }
}

/// Partial profile fields. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

/// An avatar image picked by the user, ready to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Failure of an explicit auth action (login, signup, profile update).
/// Surfaced to the caller for display; session state is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// The backend rejected the request (bad credentials, duplicate email).
    #[error("{0}")]
    Rejected(String),
    /// The backend could not be reached.
    #[error("connection failed: {0}")]
    Transport(String),
}

/// Failure of an avatar upload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("upload failed: {0}")]
    Failed(String),
}

/// Failure of a background identity check. Never propagated out of
/// [`SessionStore::check_session`]: the outcome is simply "not signed in".
#[derive(Debug, Clone, PartialEq, Error)]
#[error("session check failed: {0}")]
pub struct SessionCheckFailure(pub String);

/// The auth backend the store drives. The production implementation forwards
/// to the `api` server functions; tests use an in-memory fake.
pub trait AuthService {
    /// Resolve the current session to an identity. Fails when there is no
    /// valid session.
    async fn fetch_current_identity(&self) -> Result<Identity, SessionCheckFailure>;
    async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
    async fn signup(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
    async fn logout(&self) -> Result<(), AuthError>;
    /// Upload an avatar image; returns the stored image URL.
    async fn upload_avatar(&self, file: AvatarFile) -> Result<String, UploadError>;
    /// Persist partial profile fields for an employee; returns the fields the
    /// backend actually confirmed.
    async fn update_profile(
        &self,
        employee_id: &str,
        fields: ProfileUpdate,
    ) -> Result<ProfileUpdate, AuthError>;
}

/// A point-in-time copy of the session state, cheap to compare and hand to
/// reactive UI code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub checked: bool,
}

type PendingCheck = Shared<LocalBoxFuture<'static, ()>>;

struct SessionState {
    identity: Option<Identity>,
    checked: bool,
    pending: Option<PendingCheck>,
}

/// Shared session state plus the operations that mutate it.
///
/// Cloning is shallow: clones share the same state and backing service. The
/// store is single-threaded (`Rc`); all suspension happens at the network
/// boundary inside the service.
pub struct SessionStore<S> {
    service: Rc<S>,
    state: Rc<RefCell<SessionState>>,
    navigate: Option<Rc<dyn Fn()>>,
}

impl<S> Clone for SessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            service: Rc::clone(&self.service),
            state: Rc::clone(&self.state),
            navigate: self.navigate.clone(),
        }
    }
}

impl<S: AuthService + 'static> SessionStore<S> {
    /// A fresh store: unauthenticated, unchecked, no check in flight.
    pub fn new(service: S) -> Self {
        Self {
            service: Rc::new(service),
            state: Rc::new(RefCell::new(SessionState {
                identity: None,
                checked: false,
                pending: None,
            })),
            navigate: None,
        }
    }

    /// As [`SessionStore::new`], with a navigation hook invoked as the final
    /// step of [`SessionStore::logout`]. The web shell passes a redirect to
    /// the login view.
    pub fn with_navigator(service: S, navigate: impl Fn() + 'static) -> Self {
        let mut store = Self::new(service);
        store.navigate = Some(Rc::new(navigate));
        store
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// Whether an identity check has completed since the last reset.
    pub fn is_checked(&self) -> bool {
        self.state.borrow().checked
    }

    /// Whether an identity check is currently in flight.
    pub fn check_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.borrow();
        SessionSnapshot {
            identity: state.identity.clone(),
            checked: state.checked,
        }
    }

    /// Ensure the session has been checked against the backend.
    ///
    /// Completes immediately once a check has already run. If a check is in
    /// flight, joins it instead of issuing another request. Otherwise issues
    /// exactly one `fetch_current_identity`; on any failure the identity is
    /// simply `None`. Either way `checked` is true and the pending slot is
    /// empty by the time the returned future resolves.
    pub async fn check_session(&self) {
        let pending = {
            let mut state = self.state.borrow_mut();
            if state.checked {
                return;
            }
            match &state.pending {
                Some(pending) => pending.clone(),
                None => {
                    let service = Rc::clone(&self.service);
                    let shared = Rc::clone(&self.state);
                    let check = async move {
                        let fetched = service.fetch_current_identity().await;
                        if let Err(err) = &fetched {
                            tracing::debug!("identity check: {err}");
                        }
                        let mut state = shared.borrow_mut();
                        state.identity = fetched.ok();
                        state.checked = true;
                        state.pending = None;
                    }
                    .boxed_local()
                    .shared();
                    state.pending = Some(check.clone());
                    check
                }
            }
        };
        pending.await
    }

    /// Exchange credentials for a session. On success the identity is stored
    /// and the session counts as checked; on failure nothing changes, and in
    /// particular a pre-existing identity survives. The pending-check slot is
    /// left alone either way.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.service.login(email, password).await?;
        let mut state = self.state.borrow_mut();
        state.identity = Some(identity.clone());
        state.checked = true;
        Ok(identity)
    }

    /// Register a new account. Same contract as [`SessionStore::login`].
    pub async fn signup(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.service.signup(email, password).await?;
        let mut state = self.state.borrow_mut();
        state.identity = Some(identity.clone());
        state.checked = true;
        Ok(identity)
    }

    /// Sign out. The server-side invalidation is best-effort; local state is
    /// cleared no matter what, and the navigation hook runs last.
    pub async fn logout(&self) {
        if let Err(err) = self.service.logout().await {
            tracing::warn!("server logout failed, clearing local session anyway: {err}");
        }
        self.clear_user();
        if let Some(navigate) = &self.navigate {
            navigate();
        }
    }

    /// Upload a new avatar and swap the URL on the current identity. Only the
    /// avatar field changes; everything else is untouched.
    pub async fn update_avatar(&self, file: AvatarFile) -> Result<(), UploadError> {
        if self.state.borrow().identity.is_none() {
            return Err(UploadError::NotSignedIn);
        }
        let avatar_url = self.service.upload_avatar(file).await?;
        if let Some(identity) = self.state.borrow_mut().identity.as_mut() {
            identity.avatar_url = Some(avatar_url);
        }
        Ok(())
    }

    /// Persist profile changes and merge the confirmed fields back into the
    /// identity. A no-op when signed out. On failure nothing is merged; the
    /// local identity only ever reflects what the backend confirmed.
    pub async fn update_profile(&self, fields: ProfileUpdate) -> Result<(), AuthError> {
        let Some(id) = self.state.borrow().identity.as_ref().map(|i| i.id.clone()) else {
            return Ok(());
        };
        let confirmed = self.service.update_profile(&id, fields).await?;
        if let Some(identity) = self.state.borrow_mut().identity.as_mut() {
            if let Some(first_name) = confirmed.first_name {
                identity.first_name = first_name;
            }
            if let Some(last_name) = confirmed.last_name {
                identity.last_name = last_name;
            }
            if let Some(email) = confirmed.email {
                identity.email = Some(email);
            }
        }
        Ok(())
    }

    /// Synchronous local reset: no network call, no navigation. Used when a
    /// 401 is detected elsewhere and the session must be dropped on the spot.
    pub fn clear_user(&self) {
        let mut state = self.state.borrow_mut();
        state.identity = None;
        state.checked = false;
        state.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::future::Future;
    use std::task::Poll;

    fn employee(id: &str) -> Identity {
        Identity {
            id: id.to_string(),
            first_name: "Tim".to_string(),
            last_name: "Grote".to_string(),
            email: Some("tim@example.com".to_string()),
            avatar_url: Some("/uploads/avatars/emp-1.png".to_string()),
            is_active: true,
        }
    }

    /// Suspend exactly once, so a caller polling two joined checks can
    /// observe the pending slot being shared.
    fn yield_once() -> impl Future<Output = ()> {
        let mut yielded = false;
        futures::future::poll_fn(move |cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
    }

    #[derive(Default)]
    struct FakeInner {
        identity: RefCell<Option<Identity>>,
        fetch_calls: Cell<usize>,
        logout_calls: Cell<usize>,
        fail_logout: Cell<bool>,
        reject_login: Cell<bool>,
        fail_profile: Cell<bool>,
        profile_calls: RefCell<Vec<(String, ProfileUpdate)>>,
        upload_calls: Cell<usize>,
    }

    #[derive(Clone, Default)]
    struct FakeAuth {
        inner: Rc<FakeInner>,
    }

    impl FakeAuth {
        fn signed_in(identity: Identity) -> Self {
            let fake = Self::default();
            *fake.inner.identity.borrow_mut() = Some(identity);
            fake
        }
    }

    impl AuthService for FakeAuth {
        async fn fetch_current_identity(&self) -> Result<Identity, SessionCheckFailure> {
            self.inner.fetch_calls.set(self.inner.fetch_calls.get() + 1);
            yield_once().await;
            self.inner
                .identity
                .borrow()
                .clone()
                .ok_or_else(|| SessionCheckFailure("no session".to_string()))
        }

        async fn login(&self, email: &str, _password: &str) -> Result<Identity, AuthError> {
            if self.inner.reject_login.get() {
                return Err(AuthError::Rejected("Invalid email or password".to_string()));
            }
            let mut identity = employee("emp-login");
            identity.email = Some(email.to_string());
            Ok(identity)
        }

        async fn signup(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
            self.login(email, password).await
        }

        async fn logout(&self) -> Result<(), AuthError> {
            self.inner.logout_calls.set(self.inner.logout_calls.get() + 1);
            if self.inner.fail_logout.get() {
                Err(AuthError::Transport("connection reset".to_string()))
            } else {
                Ok(())
            }
        }

        async fn upload_avatar(&self, file: AvatarFile) -> Result<String, UploadError> {
            self.inner.upload_calls.set(self.inner.upload_calls.get() + 1);
            Ok(format!("/uploads/avatars/{}", file.filename))
        }

        async fn update_profile(
            &self,
            employee_id: &str,
            fields: ProfileUpdate,
        ) -> Result<ProfileUpdate, AuthError> {
            if self.inner.fail_profile.get() {
                return Err(AuthError::Transport("timed out".to_string()));
            }
            self.inner
                .profile_calls
                .borrow_mut()
                .push((employee_id.to_string(), fields.clone()));
            Ok(fields)
        }
    }

    #[tokio::test]
    async fn concurrent_checks_share_one_fetch() {
        let fake = FakeAuth::signed_in(employee("emp-1"));
        let store = SessionStore::new(fake.clone());

        futures::join!(store.check_session(), store.check_session(), store.check_session());

        assert_eq!(fake.inner.fetch_calls.get(), 1);
        assert!(store.is_checked());
        assert!(!store.check_pending());
        assert_eq!(store.identity().unwrap().id, "emp-1");
    }

    #[tokio::test]
    async fn checked_session_skips_the_backend() {
        let fake = FakeAuth::signed_in(employee("emp-1"));
        let store = SessionStore::new(fake.clone());

        store.check_session().await;
        store.check_session().await;
        store.check_session().await;

        assert_eq!(fake.inner.fetch_calls.get(), 1);
    }

    #[tokio::test]
    async fn failed_check_means_signed_out() {
        let fake = FakeAuth::default();
        let store = SessionStore::new(fake.clone());

        futures::join!(store.check_session(), store.check_session());

        assert_eq!(fake.inner.fetch_calls.get(), 1);
        assert!(store.identity().is_none());
        assert!(store.is_checked());
        assert!(!store.check_pending());
    }

    #[tokio::test]
    async fn clear_user_starts_a_new_check_cycle() {
        let fake = FakeAuth::signed_in(employee("emp-1"));
        let store = SessionStore::new(fake.clone());

        store.check_session().await;
        store.clear_user();

        assert!(store.identity().is_none());
        assert!(!store.is_checked());
        assert!(!store.check_pending());

        store.check_session().await;
        assert_eq!(fake.inner.fetch_calls.get(), 2);
        assert!(store.is_checked());
    }

    #[tokio::test]
    async fn login_success_stores_identity() {
        let fake = FakeAuth::default();
        let store = SessionStore::new(fake.clone());

        let identity = store.login("ally@example.com", "hunter22").await.unwrap();
        assert_eq!(identity.email.as_deref(), Some("ally@example.com"));
        assert_eq!(store.identity(), Some(identity));
        assert!(store.is_checked());
    }

    #[tokio::test]
    async fn failed_login_preserves_existing_identity() {
        let fake = FakeAuth::signed_in(employee("emp-1"));
        let store = SessionStore::new(fake.clone());
        store.check_session().await;

        fake.inner.reject_login.set(true);
        let err = store.login("tim@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));

        assert_eq!(store.identity().unwrap().id, "emp-1");
        assert!(store.is_checked());
    }

    #[tokio::test]
    async fn logout_clears_even_when_the_server_is_down() {
        let fake = FakeAuth::signed_in(employee("emp-1"));
        fake.inner.fail_logout.set(true);

        let navigated = Rc::new(Cell::new(false));
        let flag = Rc::clone(&navigated);
        let store = SessionStore::with_navigator(fake.clone(), move || flag.set(true));
        store.check_session().await;
        assert!(store.identity().is_some());

        store.logout().await;

        assert_eq!(fake.inner.logout_calls.get(), 1);
        assert!(store.identity().is_none());
        assert!(!store.is_checked());
        assert!(!store.check_pending());
        assert!(navigated.get());
    }

    #[tokio::test]
    async fn avatar_upload_requires_a_session() {
        let fake = FakeAuth::default();
        let store = SessionStore::new(fake.clone());

        let file = AvatarFile {
            filename: "me.png".to_string(),
            bytes: vec![1, 2, 3],
        };
        let err = store.update_avatar(file).await.unwrap_err();
        assert_eq!(err, UploadError::NotSignedIn);
        assert_eq!(fake.inner.upload_calls.get(), 0);
    }

    #[tokio::test]
    async fn avatar_upload_replaces_only_the_avatar() {
        let fake = FakeAuth::signed_in(employee("emp-1"));
        let store = SessionStore::new(fake.clone());
        store.check_session().await;
        let before = store.identity().unwrap();

        let file = AvatarFile {
            filename: "emp-1.jpg".to_string(),
            bytes: vec![0xff, 0xd8],
        };
        store.update_avatar(file).await.unwrap();

        let after = store.identity().unwrap();
        assert_eq!(after.avatar_url.as_deref(), Some("/uploads/avatars/emp-1.jpg"));
        assert_eq!(after.first_name, before.first_name);
        assert_eq!(after.email, before.email);
    }

    #[tokio::test]
    async fn profile_update_is_a_noop_when_signed_out() {
        let fake = FakeAuth::default();
        let store = SessionStore::new(fake.clone());

        store
            .update_profile(ProfileUpdate {
                first_name: Some("Jo".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(fake.inner.profile_calls.borrow().is_empty());
        assert!(store.identity().is_none());
    }

    #[tokio::test]
    async fn profile_update_merges_only_confirmed_fields() {
        let fake = FakeAuth::signed_in(employee("emp-1"));
        let store = SessionStore::new(fake.clone());
        store.check_session().await;

        store
            .update_profile(ProfileUpdate {
                first_name: Some("Jo".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let identity = store.identity().unwrap();
        assert_eq!(identity.first_name, "Jo");
        assert_eq!(identity.last_name, "Grote");
        assert_eq!(identity.avatar_url.as_deref(), Some("/uploads/avatars/emp-1.png"));

        let calls = fake.inner.profile_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "emp-1");
    }

    #[tokio::test]
    async fn failed_profile_update_mutates_nothing() {
        let fake = FakeAuth::signed_in(employee("emp-1"));
        let store = SessionStore::new(fake.clone());
        store.check_session().await;
        let before = store.identity().unwrap();

        fake.inner.fail_profile.set(true);
        let err = store
            .update_profile(ProfileUpdate {
                first_name: Some("Jo".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
        assert_eq!(store.identity().unwrap(), before);
    }
}
