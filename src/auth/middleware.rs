//! Authentication middleware and extractors

use crate::api::server::SharedState;
use crate::auth::{guards, AuthService, SessionState, UserRole};
use crate::error::{Error, Result};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Extract the session token from the Authorization header or the token cookie
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    let prefix = format!("{}=", cookie_name);
    for cookie_header in headers.get_all("Cookie") {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                if let Some(token) = cookie.trim().strip_prefix(prefix.as_str()) {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Build the session a request carries; any token problem means anonymous
pub fn session_from_headers(auth: &AuthService, headers: &HeaderMap) -> SessionState {
    let Some(token) = extract_token(headers, &auth.config().token_key) else {
        return SessionState::anonymous();
    };

    match auth.restore(&token) {
        Ok(user) => SessionState::authenticated(user, token),
        Err(e) => {
            tracing::debug!("Request token rejected: {}", e);
            SessionState::anonymous()
        }
    }
}

/// The request's session, or the reason it is not authenticated
pub fn authenticated_session(auth: &AuthService, headers: &HeaderMap) -> Result<SessionState> {
    let token = extract_token(headers, &auth.config().token_key)
        .ok_or(Error::Unauthenticated)?;
    let user = auth.restore(&token)?;
    Ok(SessionState::authenticated(user, token))
}

/// Require the session to hold one of `allowed`
pub fn require_role(state: &SessionState, allowed: &[UserRole], path: &str) -> Result<()> {
    match guards::require_role(state, allowed, path) {
        guards::GuardOutcome::Allow => Ok(()),
        guards::GuardOutcome::RedirectToLogin { .. } => Err(Error::Unauthenticated),
        guards::GuardOutcome::RedirectToLanding => Err(Error::AccessDenied {
            role: state
                .user
                .as_ref()
                .map(|u| u.role.to_string())
                .unwrap_or_default(),
            path: path.to_string(),
        }),
    }
}

/// Middleware for requiring authentication; handlers read the session from
/// the request extensions
pub async fn require_auth(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let session = authenticated_session(&state.auth, req.headers())?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
