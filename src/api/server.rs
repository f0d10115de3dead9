//! HTTP server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AuthService, StaticDirectory};
use crate::config::Config;
use crate::error::Result;
use crate::notify::NotificationService;
use crate::reports::ReportQueryStore;
use crate::router::ViewTable;
use crate::storage::MemoryStore;

use super::{events, routes};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub auth: Arc<AuthService>,
    pub views: ViewTable,
    pub notifications: NotificationService,
    /// Session-scoped filters, namespaced per user
    pub report_queries: ReportQueryStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        // Requests carry their token in the cookie; nothing persists it here,
        // so the service's token store stays empty.
        let auth = AuthService::new(
            Arc::new(StaticDirectory::seeded()),
            Arc::new(MemoryStore::new()),
            config.auth.clone(),
        );
        Self {
            views: ViewTable::leap(&config.auth),
            notifications: NotificationService::new(config.notifications.clone()),
            report_queries: ReportQueryStore::new(Arc::new(MemoryStore::new())),
            auth: Arc::new(auth),
            config,
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Run the HTTP server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    serve(listener, Arc::new(AppState::new(config))).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: SharedState) -> Result<()> {
    events::start_notification_logging(&state.notifications);

    let app = create_router(state);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let login_path = state.config.auth.login_path.clone();
    let protected = Router::new()
        .route("/api/auth/me", get(routes::me))
        .route("/api/users", get(routes::list_users))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        // API routes
        .route("/api/health", get(routes::health))
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/logout", post(routes::logout))
        .route("/api/navigate", get(routes::navigate))
        .merge(protected)
        // UI routes
        .route("/", get(crate::ui::root))
        .route(
            &login_path,
            get(crate::ui::login_page).post(crate::ui::login_submit),
        )
        .route("/logout", get(crate::ui::logout))
        .fallback(crate::ui::view)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
