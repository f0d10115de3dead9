//! Auth service: credential checks, token issue/restore and token persistence

use crate::auth::directory::CredentialVerifier;
use crate::auth::models::{Credentials, LoginResponse, User};
use crate::auth::token;
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AuthService {
    verifier: Arc<dyn CredentialVerifier>,
    storage: Arc<dyn KeyValueStore>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        storage: Arc<dyn KeyValueStore>,
        config: AuthConfig,
    ) -> Self {
        Self {
            verifier,
            storage,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.verifier.as_ref()
    }

    /// Check credentials after the simulated network latency and issue a token.
    ///
    /// Does not persist the token; the session store does that when it
    /// commits the login.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        tokio::time::sleep(self.config.login_latency()).await;

        let user = match self.verifier.verify(credentials) {
            Some(user) => user,
            None => {
                info!("Rejected login for '{}'", credentials.username);
                return Err(Error::InvalidCredentials);
            }
        };

        let token = self.issue_token(&user)?;
        info!("User '{}' logged in as {}", user.username, user.role);
        Ok(LoginResponse { user, token })
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        token::issue_token(user, self.config.token_ttl()?)
    }

    /// Resolve the user a token names.
    ///
    /// The user is looked up again by the payload's username, not its `sub`,
    /// so a token outlives a change of id but follows a reused username.
    pub fn decode_token(&self, token: &str) -> Option<User> {
        let payload = match token::decode_payload(token) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Cannot decode token: {}", e);
                return None;
            }
        };
        let user = self.verifier.find_by_username(&payload.username);
        if user.is_none() {
            debug!("Token names unknown user '{}'", payload.username);
        }
        user
    }

    pub fn is_expired(&self, token: &str) -> bool {
        token::is_expired(token)
    }

    /// The user behind a token that is both unexpired and decodable
    pub fn restore(&self, token: &str) -> Result<User> {
        let payload = token::decode_payload(token)?;
        if payload.is_expired() {
            return Err(Error::TokenExpired);
        }
        self.verifier
            .find_by_username(&payload.username)
            .ok_or(Error::UnknownUser(payload.username))
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.storage.set(&self.config.token_key, token)
    }

    /// The persisted token; unreadable storage counts as no token
    pub fn get_token(&self) -> Option<String> {
        match self.storage.get(&self.config.token_key) {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read persisted token: {}", e);
                None
            }
        }
    }

    pub fn remove_token(&self) -> Result<()> {
        self.storage.remove(&self.config.token_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::directory::StaticDirectory;
    use crate::auth::models::UserRole;
    use crate::auth::token::{encode, TokenPayload};
    use crate::storage::MemoryStore;

    fn service() -> AuthService {
        let config = AuthConfig {
            login_latency_ms: 0,
            ..AuthConfig::default()
        };
        AuthService::new(
            Arc::new(StaticDirectory::seeded()),
            Arc::new(MemoryStore::new()),
            config,
        )
    }

    #[tokio::test]
    async fn test_login_valid_credentials() {
        let auth = service();
        let response = auth
            .login(&Credentials::new("maker1", "password"))
            .await
            .unwrap();
        assert_eq!(response.user.role, UserRole::Maker);
        assert_eq!(auth.decode_token(&response.token).unwrap().username, "maker1");
        // login alone does not persist
        assert!(auth.get_token().is_none());
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let auth = service();
        let result = auth.login(&Credentials::new("maker1", "nope")).await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_waits_for_latency() {
        let config = AuthConfig {
            login_latency_ms: 50,
            ..AuthConfig::default()
        };
        let auth = AuthService::new(
            Arc::new(StaticDirectory::seeded()),
            Arc::new(MemoryStore::new()),
            config,
        );
        let start = std::time::Instant::now();
        auth.login(&Credentials::new("checker1", "password"))
            .await
            .unwrap();
        assert!(start.elapsed() >= std::time::Duration::from_millis(50));
    }

    #[test]
    fn test_decode_looks_up_by_username() {
        let auth = service();
        let payload = TokenPayload {
            sub: 999,
            username: "checker1".to_string(),
            role: "admin".to_string(),
            exp: chrono::Utc::now().timestamp_millis() + 60_000,
        };
        let user = auth.decode_token(&encode(&payload).unwrap()).unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(user.role, UserRole::Checker);
    }

    #[test]
    fn test_restore_rejects_expired_and_unknown() {
        let auth = service();
        let expired = TokenPayload {
            sub: 1,
            username: "maker1".to_string(),
            role: "maker".to_string(),
            exp: 0,
        };
        assert!(matches!(
            auth.restore(&encode(&expired).unwrap()),
            Err(Error::TokenExpired)
        ));

        let ghost = TokenPayload {
            username: "ghost".to_string(),
            exp: chrono::Utc::now().timestamp_millis() + 60_000,
            ..expired
        };
        assert!(matches!(
            auth.restore(&encode(&ghost).unwrap()),
            Err(Error::UnknownUser(_))
        ));
        assert!(matches!(auth.restore("garbage"), Err(Error::TokenMalformed(_))));
    }

    #[test]
    fn test_token_persistence() {
        let auth = service();
        assert!(auth.get_token().is_none());
        auth.set_token("a.b.c").unwrap();
        assert_eq!(auth.get_token().as_deref(), Some("a.b.c"));
        auth.remove_token().unwrap();
        assert!(auth.get_token().is_none());
    }
}
