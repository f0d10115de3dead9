//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use crate::auth::{AuthService, Credentials, SessionStore, StaticDirectory};
use crate::cli::{
    info, print_route_table, print_session_detail, print_user_table, success, toast, warn,
    OutputFormat,
};
use crate::config::{self, Config};
use crate::notify::NotificationService;
use crate::router::{Navigation, ViewTable};
use crate::storage::FileStore;

/// CLI-side session backed by the persistent store
struct Context {
    config: Config,
    session: SessionStore,
    notifications: NotificationService,
}

fn context_from(config: Config) -> Context {
    let auth = AuthService::new(
        Arc::new(StaticDirectory::seeded()),
        Arc::new(FileStore::new(&config.storage.path)),
        config.auth.clone(),
    );
    Context {
        session: SessionStore::new(Arc::new(auth)),
        notifications: NotificationService::new(config.notifications.clone()),
        config,
    }
}

async fn restore(ctx: Context) -> Context {
    ctx.session.check_auth().await;
    ctx
}

/// Context with the persisted session restored; every command starts here
async fn restored_context() -> Result<Context> {
    let config = config::load_config_or_default()?;
    Ok(restore(context_from(config)).await)
}

fn print_serialized<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Table => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(value)?);
            Ok(true)
        }
    }
}

/// Initialize a new leap.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("leap.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created leap.toml");
    info("Run 'leap login --username maker1' to start a session");

    Ok(())
}

/// Sign in
pub async fn login(username: &str, password: &str) -> Result<()> {
    let ctx = restored_context().await?;
    if let Some(current) = ctx.session.user().await {
        info(&format!("Replacing session of {}", current.username));
    }
    let mut toasts = ctx.notifications.subscribe();

    info(&format!("Signing in as {}", username));

    let result = ctx
        .session
        .login(Credentials::new(username, password))
        .await;

    match &result {
        Ok(user) => ctx
            .notifications
            .success(format!("Welcome back, {} ({})", user.full_name, user.role)),
        Err(e) => ctx.notifications.error(format!("Sign-in failed: {}", e)),
    };
    while let Ok(notification) = toasts.try_recv() {
        toast(&notification);
    }

    result?;
    Ok(())
}

/// Sign out; succeeds without a session too
pub async fn logout() -> Result<()> {
    let ctx = restored_context().await?;
    let was_signed_in = ctx.session.is_authenticated().await;

    ctx.session.logout().await;

    if was_signed_in {
        success("Signed out");
    } else {
        info("No active session");
    }
    Ok(())
}

/// Show the current session
pub async fn whoami(format: OutputFormat) -> Result<()> {
    let ctx = restored_context().await?;
    let state = ctx.session.state().await;

    if print_serialized(&state.user, format)? {
        return Ok(());
    }

    if !state.is_authenticated {
        warn("Not signed in. Run 'leap login --username <user>'");
        return Ok(());
    }
    print_session_detail(&state);
    Ok(())
}

/// List directory users
pub async fn users(format: OutputFormat) -> Result<()> {
    let ctx = restored_context().await?;
    let users = ctx.session.auth().verifier().users();

    if !print_serialized(&users, format)? {
        print_user_table(&users);
    }
    Ok(())
}

/// List views with the current session's outcome
pub async fn routes() -> Result<()> {
    let ctx = restored_context().await?;
    let state = ctx.session.state().await;
    let views = ViewTable::leap(&ctx.config.auth);

    let rows: Vec<_> = views
        .routes()
        .iter()
        .map(|route| (route.clone(), views.navigate(&route.path, &state)))
        .collect();

    info(&format!("Session: {}", state.status()));
    print_route_table(&rows);
    Ok(())
}

/// Show what opening `path` would do
pub async fn visit(path: &str) -> Result<()> {
    let ctx = restored_context().await?;
    let state = ctx.session.state().await;
    let views = ViewTable::leap(&ctx.config.auth);

    report_visit(views.navigate(path, &state))
}

/// Print a navigation outcome; an unknown view is an error
fn report_visit(navigation: Navigation) -> Result<()> {
    match navigation {
        Navigation::Render { title, .. } => success(&format!("Opens {}", title)),
        Navigation::Redirect { to, from } => {
            let message = match from {
                Some(from) => format!("Redirected to {} (returns to {} after sign-in)", to, from),
                None => format!("Redirected to {}", to),
            };
            warn(&message);
        }
        Navigation::NotFound { path } => anyhow::bail!("No view at {}", path),
    }
    Ok(())
}

/// Start the HTTP server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = config::load_config_or_default()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting LEAP on http://{}:{}", host, port));
    crate::api::run_server(config, &host, port).await?;
    Ok(())
}
