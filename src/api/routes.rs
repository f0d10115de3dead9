//! API route handlers

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::server::SharedState;
use crate::auth::middleware::require_role;
use crate::auth::{session_from_headers, Credentials, SessionState, User, UserRole};
use crate::error::Error;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_unauthenticated() => StatusCode::UNAUTHORIZED,
            Error::AccessDenied { .. } => StatusCode::FORBIDDEN,
            Error::InvalidFilters(_) | Error::UnknownRole(_) => StatusCode::BAD_REQUEST,
            Error::LoginSuperseded => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

/// `Set-Cookie` value carrying the session token
pub fn token_cookie(name: &str, token: &str, max_age_secs: i64) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, token, max_age_secs
    ))
    .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// `Set-Cookie` value removing the session token
pub fn clear_token_cookie(name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name))
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

// Session routes

pub async fn login(
    State(state): State<SharedState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error> {
    match state.auth.login(&credentials).await {
        Ok(response) => {
            state
                .notifications
                .success(format!("Welcome back, {}", response.user.full_name));
            let cookie = token_cookie(
                &state.config.auth.token_key,
                &response.token,
                state.config.auth.token_max_age_secs(),
            );
            Ok(([(header::SET_COOKIE, cookie)], Json(ApiResponse::ok(response))))
        }
        Err(e) => {
            state.notifications.error(e.to_string());
            Err(e)
        }
    }
}

pub async fn me(Extension(session): Extension<SessionState>) -> impl IntoResponse {
    Json(ApiResponse::ok(session.user))
}

/// Always succeeds, with or without a session
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(user) = session_from_headers(&state.auth, &headers).user {
        tracing::info!("User '{}' logged out", user.username);
        state.notifications.info("Signed out");
    }
    (
        [(header::SET_COOKIE, clear_token_cookie(&state.config.auth.token_key))],
        Json(ApiResponse::ok("logged out")),
    )
}

/// What the caller would see when opening `path`
pub async fn navigate(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<NavigateQuery>,
) -> impl IntoResponse {
    let session = session_from_headers(&state.auth, &headers);
    Json(ApiResponse::ok(state.views.navigate(&query.path, &session)))
}

// Administration

pub async fn list_users(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionState>,
) -> Result<Json<ApiResponse<Vec<User>>>, Error> {
    require_role(&session, &[UserRole::Admin], "/api/users")?;
    Ok(Json(ApiResponse::ok(state.auth.verifier().users())))
}
