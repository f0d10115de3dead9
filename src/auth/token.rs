//! Mock session token handling
//!
//! Tokens look like a JWT (`header.payload.signature`, each segment base64
//! encoded) but the signature is a constant placeholder and is never
//! verified. Anyone can forge one; it only stands in for a backend-issued
//! token.

use crate::auth::models::{User, UserRole};
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MOCK_SIGNATURE: &str = "mock-signature";

/// Header segment, always the same
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Payload segment
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenPayload {
    /// Subject (user ID)
    pub sub: u64,
    pub username: String,
    pub role: String,
    /// Expiration, epoch milliseconds
    pub exp: i64,
}

impl TokenPayload {
    /// Create a payload for `user` valid for `ttl` from now
    pub fn from_user(user: &User, ttl: chrono::Duration) -> Result<Self> {
        Self::from_user_at(user, ttl, Utc::now())
    }

    /// A token must outlive the moment it is issued
    pub fn from_user_at(user: &User, ttl: chrono::Duration, now: DateTime<Utc>) -> Result<Self> {
        if ttl <= chrono::Duration::zero() {
            return Err(Error::Config(format!("token TTL must be positive, got {}", ttl)));
        }
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::Config(format!("token TTL {} is out of range", ttl)))?;
        Ok(Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.to_string(),
            exp: expires.timestamp_millis(),
        })
    }

    pub fn get_role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.exp
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Encode a payload into a three-segment token
pub fn encode(payload: &TokenPayload) -> Result<String> {
    let header = serde_json::to_vec(&TokenHeader::default())?;
    let payload = serde_json::to_vec(payload)?;
    Ok(format!(
        "{}.{}.{}",
        STANDARD.encode(header),
        STANDARD.encode(payload),
        STANDARD.encode(MOCK_SIGNATURE)
    ))
}

/// Issue a token for `user` that expires after `ttl`
pub fn issue_token(user: &User, ttl: chrono::Duration) -> Result<String> {
    encode(&TokenPayload::from_user(user, ttl)?)
}

/// Decode the payload segment without checking expiry
pub fn decode_payload(token: &str) -> Result<TokenPayload> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(Error::TokenMalformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let bytes = STANDARD
        .decode(segments[1])
        .map_err(|e| Error::TokenMalformed(format!("payload is not base64: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::TokenMalformed(format!("payload is not valid JSON: {}", e)))
}

/// Whether `token` is expired; anything unparseable counts as expired
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_payload(token) {
        Ok(payload) => payload.is_expired_at(now),
        Err(e) => {
            tracing::debug!("Treating unreadable token as expired: {}", e);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::directory::{CredentialVerifier, StaticDirectory};

    fn maker() -> User {
        StaticDirectory::seeded().find_by_username("maker1").unwrap()
    }

    #[test]
    fn test_issue_and_decode_token() {
        let user = maker();
        let token = issue_token(&user, chrono::Duration::hours(24)).unwrap();
        let payload = decode_payload(&token).unwrap();

        assert_eq!(payload.username, "maker1");
        assert_eq!(payload.role, "maker");
        assert_eq!(payload.sub, user.id);
        assert_eq!(payload.get_role(), Some(UserRole::Maker));
        assert!(!is_expired(&token));
    }

    #[test]
    fn test_token_layout() {
        let token = issue_token(&maker(), chrono::Duration::hours(1)).unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2], STANDARD.encode("mock-signature"));

        let header: TokenHeader =
            serde_json::from_slice(&STANDARD.decode(segments[0]).unwrap()).unwrap();
        assert_eq!(header, TokenHeader::default());
    }

    #[test]
    fn test_expiry_is_ttl_from_now() {
        let now = Utc::now();
        let payload =
            TokenPayload::from_user_at(&maker(), chrono::Duration::hours(24), now).unwrap();
        assert_eq!(payload.exp - now.timestamp_millis(), 24 * 60 * 60 * 1000);
        assert!(!payload.is_expired_at(now));
        assert!(payload.is_expired_at(now + chrono::Duration::hours(24)));
    }

    #[test]
    fn test_unusable_ttl_is_an_error() {
        let user = maker();
        for ttl in [
            chrono::Duration::zero(),
            chrono::Duration::hours(-1),
            chrono::Duration::MAX,
        ] {
            assert!(matches!(issue_token(&user, ttl), Err(Error::Config(_))), "{}", ttl);
        }
    }

    #[test]
    fn test_past_exp_is_expired() {
        let payload = TokenPayload {
            sub: 1,
            username: "maker1".to_string(),
            role: "maker".to_string(),
            exp: Utc::now().timestamp_millis() - 1,
        };
        assert!(is_expired(&encode(&payload).unwrap()));
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        for token in ["", "not.a.token", "only-one-segment", "a.b", "a.b.c.d"] {
            assert!(is_expired(token), "{:?} should count as expired", token);
            assert!(decode_payload(token).is_err());
        }
    }

    #[test]
    fn test_payload_must_be_payload_json() {
        let not_payload = format!("x.{}.y", STANDARD.encode(r#"{"hello":"world"}"#));
        assert!(matches!(
            decode_payload(&not_payload),
            Err(Error::TokenMalformed(_))
        ));
    }
}
