//! Session state container
//!
//! All writes go through three actions (`login`, `check_auth`, `logout`);
//! callers only get read selectors. Each action takes a generation number
//! when dispatched, and a login that resolves after a newer action is
//! dropped without touching state or storage.

use crate::auth::models::{Credentials, User};
use crate::auth::service::AuthService;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Anonymous => write!(f, "anonymous"),
            SessionStatus::Authenticating => write!(f, "authenticating"),
            SessionStatus::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Snapshot of the session.
///
/// `is_authenticated` holds exactly when both `user` and `token` are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            is_authenticated: true,
            loading: false,
            error: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.loading {
            SessionStatus::Authenticating
        } else if self.is_authenticated {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }

    fn clear(&mut self) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
        self.loading = false;
    }
}

/// Single-writer session store
#[derive(Clone)]
pub struct SessionStore {
    auth: Arc<AuthService>,
    state: Arc<RwLock<SessionState>>,
    generation: Arc<AtomicU64>,
}

impl SessionStore {
    /// Create an empty (anonymous) store
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            auth,
            state: Arc::new(RwLock::new(SessionState::anonymous())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Log in; on success the token is persisted before the state commits
    pub async fn login(&self, credentials: Credentials) -> Result<User> {
        let generation = self.next_generation();
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.auth.login(&credentials).await;

        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            debug!(
                "Discarding login for '{}' superseded by a newer action",
                credentials.username
            );
            return Err(Error::LoginSuperseded);
        }

        match result {
            Ok(response) => {
                if let Err(e) = self.auth.set_token(&response.token) {
                    warn!("Failed to persist token: {}", e);
                    state.clear();
                    state.error = Some(e.to_string());
                    return Err(e);
                }
                *state = SessionState::authenticated(response.user.clone(), response.token);
                Ok(response.user)
            }
            Err(e) => {
                state.clear();
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Restore the session from the persisted token.
    ///
    /// Returns whether the session is authenticated afterwards. A missing,
    /// malformed, expired or orphaned token leaves the session anonymous and
    /// is removed from storage.
    pub async fn check_auth(&self) -> bool {
        self.next_generation();
        let mut state = self.state.write().await;

        let Some(token) = self.auth.get_token() else {
            state.clear();
            return false;
        };

        match self.auth.restore(&token) {
            Ok(user) => {
                debug!("Restored session for '{}'", user.username);
                *state = SessionState::authenticated(user, token);
                true
            }
            Err(e) => {
                info!("Discarding persisted token: {}", e);
                if let Err(e) = self.auth.remove_token() {
                    warn!("Failed to remove persisted token: {}", e);
                }
                state.clear();
                false
            }
        }
    }

    /// Clear the persisted token and the session; always succeeds
    pub async fn logout(&self) {
        self.next_generation();
        let mut state = self.state.write().await;
        if let Err(e) = self.auth.remove_token() {
            warn!("Failed to remove persisted token: {}", e);
        }
        if let Some(user) = &state.user {
            info!("User '{}' logged out", user.username);
        }
        *state = SessionState::anonymous();
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status()
    }
}
