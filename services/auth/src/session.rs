//! Session store
//!
//! Owns the signed-in session: in memory on a `watch` channel, and durably
//! under the `session` and `token` storage keys.

use std::sync::Arc;

use api::{
    ApiError, Backend, UnauthorizedSignal,
    models::{LoginRequest, RegisterRequest},
};
use common::{
    config::OfflineRestore,
    error::StorageResult,
    storage::{KeyValueStore, SESSION_KEY, TOKEN_KEY, load_json, save_json},
};
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::{AuthError, AuthResult},
    jwt::{TokenExpiry, inspect_expiry_now},
    models::{LoginCredentials, RegisterData, Session, StoredProfile},
    validation::{validate_login, validate_registration},
};

/// Signed-in state shared by every dashboard component
pub struct SessionStore {
    backend: Arc<dyn Backend>,
    storage: Arc<dyn KeyValueStore>,
    offline_restore: OfflineRestore,
    sender: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Create a signed-out store
    pub fn new(
        backend: Arc<dyn Backend>,
        storage: Arc<dyn KeyValueStore>,
        offline_restore: OfflineRestore,
    ) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            backend,
            storage,
            offline_restore,
            sender,
        }
    }

    /// Sign in with email and password
    pub async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Session> {
        validate_login(&credentials.email, &credentials.password).map_err(AuthError::Validation)?;

        let request = LoginRequest {
            email: credentials.email.trim().to_string(),
            password: credentials.password.clone(),
        };
        let response = self.backend.login(&request).await?;

        let session = Session::from_user(response.user, response.token).ok_or_else(|| {
            AuthError::Api(ApiError::InvalidResponse(
                "login response carried an empty token".to_string(),
            ))
        })?;
        self.establish(session.clone())?;

        info!("User signed in: {}", session.email);
        Ok(session)
    }

    /// Create an account
    ///
    /// Returns the new session when the backend signs the user in right away,
    /// `None` when the user still has to log in.
    pub async fn register(&self, data: RegisterData) -> AuthResult<Option<Session>> {
        validate_registration(&data).map_err(AuthError::Validation)?;

        let request = RegisterRequest {
            usuario: data.name.trim().to_string(),
            email: data.email.trim().to_string(),
            password: data.password,
            role: data.role.to_string(),
            artistic_name: data.artistic_name,
            musical_genre: data.musical_genre,
            company_name: data.company_name,
            managed_artists_count: data.managed_artists_count,
        };
        let response = self.backend.register(&request).await?;
        info!("Account registered: {}", request.email);

        let session = match (response.user, response.token) {
            (Some(user), Some(token)) => Session::from_user(user, token),
            _ => None,
        };
        if let Some(session) = &session {
            self.establish(session.clone())?;
            info!("User signed in after registration: {}", session.email);
        }
        Ok(session)
    }

    /// Bring back the session stored by a previous run
    ///
    /// The stored token is checked against the backend. A rejected token
    /// clears storage; an unreachable backend is handled according to the
    /// configured [`OfflineRestore`] policy.
    pub async fn restore(&self) -> Option<Session> {
        let session = match self.read_stored() {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                warn!("Discarding unreadable stored session: {}", e);
                self.clear_storage();
                return None;
            }
        };

        if inspect_expiry_now(session.token()) == TokenExpiry::Expired {
            info!("Stored token has expired; signing out");
            self.clear_storage();
            return None;
        }

        match self.backend.validate_token(session.token()).await {
            Ok(()) => {
                info!("Restored session for {}", session.email);
                self.sender.send_replace(Some(session.clone()));
                Some(session)
            }
            Err(e) if e.is_network() => match self.offline_restore {
                OfflineRestore::TrustStored => {
                    warn!("Backend unreachable, trusting stored session: {}", e);
                    self.sender.send_replace(Some(session.clone()));
                    Some(session)
                }
                OfflineRestore::Distrust => {
                    warn!("Backend unreachable, starting signed out: {}", e);
                    None
                }
            },
            Err(e) => {
                info!("Stored session rejected: {}", e);
                self.clear_storage();
                None
            }
        }
    }

    /// Sign out; storage failures are logged, never returned
    pub fn logout(&self) {
        let previous = self.sender.send_replace(None);
        self.clear_storage();
        if let Some(session) = previous {
            info!("User signed out: {}", session.email);
        }
    }

    /// Session currently signed in, if any
    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    /// Receiver of every session change
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    /// Sign out whenever `signal` is raised
    pub fn watch_unauthorized(self: &Arc<Self>, signal: &UnauthorizedSignal) -> JoinHandle<()> {
        let mut receiver = signal.subscribe();
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        if store.current().is_some() {
                            warn!("Backend rejected the session token; signing out");
                            store.logout();
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn establish(&self, session: Session) -> StorageResult<()> {
        save_json(self.storage.as_ref(), SESSION_KEY, &session.profile())?;
        self.storage.set(TOKEN_KEY, session.token())?;
        self.sender.send_replace(Some(session));
        Ok(())
    }

    fn read_stored(&self) -> StorageResult<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY)?;
        let profile: Option<StoredProfile> = load_json(self.storage.as_ref(), SESSION_KEY)?;

        match (profile, token) {
            (Some(profile), Some(token)) => {
                let session = Session::new(profile, token);
                if session.is_none() {
                    debug!("Stored token is blank");
                    self.clear_storage();
                }
                Ok(session)
            }
            (None, None) => Ok(None),
            _ => {
                debug!("Stored session is incomplete");
                self.clear_storage();
                Ok(None)
            }
        }
    }

    fn clear_storage(&self) {
        for key in [SESSION_KEY, TOKEN_KEY] {
            if let Err(e) = self.storage.delete(key) {
                warn!("Failed to remove {} from storage: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::{
        mock::{Call, MockBackend},
        models::{AuthResponse, UserProfile},
    };
    use common::storage::MemoryStore;

    fn user() -> UserProfile {
        UserProfile {
            id: "7".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: Some("artist".to_string()),
        }
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn store(backend: Arc<MockBackend>) -> (SessionStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backend, storage.clone(), OfflineRestore::TrustStored);
        (store, storage)
    }

    #[tokio::test]
    async fn test_login_validation_skips_network() {
        let backend = Arc::new(MockBackend::new());
        let (store, _) = store(backend.clone());

        let result = store.login(&credentials("", "secret")).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_login_persists_and_publishes() {
        let backend = Arc::new(MockBackend::new());
        backend.set_login(Ok(AuthResponse {
            token: "tok".to_string(),
            user: user(),
        }));
        let (store, storage) = store(backend.clone());
        let mut changes = store.subscribe();

        let session = store
            .login(&credentials(" ana@example.com ", "secret"))
            .await
            .expect("login succeeds");

        assert_eq!(session.token(), "tok");
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), Some("tok".to_string()));
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().as_ref(), Some(&session));
        assert_eq!(
            backend.calls(),
            vec![Call::Login(LoginRequest {
                email: "ana@example.com".to_string(),
                password: "secret".to_string(),
            })]
        );
    }

    #[tokio::test]
    async fn test_login_without_user_id_falls_back_to_email() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"token":"tok","user":{"name":"Ana","email":"ana@example.com"}}"#,
        )
        .expect("login body without an id");
        let backend = Arc::new(MockBackend::new());
        backend.set_login(Ok(response));
        let (store, _) = store(backend);

        let session = store
            .login(&credentials("ana@example.com", "secret"))
            .await
            .expect("login succeeds");

        assert_eq!(session.trigger_user(), "ana@example.com");
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_server_message() {
        let backend = Arc::new(MockBackend::new());
        let (store, storage) = store(backend);

        let err = store
            .login(&credentials("ana@example.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert!(store.current().is_none());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let backend = Arc::new(MockBackend::new());
        backend.set_login(Ok(AuthResponse {
            token: "tok".to_string(),
            user: user(),
        }));
        let (store, storage) = store(backend);
        store
            .login(&credentials("ana@example.com", "secret"))
            .await
            .expect("login succeeds");

        store.logout();

        assert!(store.current().is_none());
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_partial_storage_is_cleared() {
        let backend = Arc::new(MockBackend::new());
        let (store, storage) = store(backend.clone());
        storage.set(TOKEN_KEY, "orphan").unwrap();

        assert!(store.restore().await.is_none());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert!(backend.calls().is_empty());
    }
}
