//! Web UI handlers
//!
//! Every view goes through the view table; guard redirects become HTTP
//! redirects and the token lives in the `auth_token` cookie.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::api::routes::{clear_token_cookie, token_cookie};
use crate::api::server::SharedState;
use crate::auth::{session_from_headers, Credentials, SessionState, UserRole};
use crate::reports::{ReportFilters, ReportKind};
use crate::router::{Access, Navigation};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub from: Option<String>,
}

pub async fn root(State(state): State<SharedState>) -> Redirect {
    Redirect::to(state.views.landing_path())
}

/// Sign-in page; signed-in users go straight to the landing view
pub async fn login_page(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    let session = session_from_headers(&state.auth, &headers);
    if session.is_authenticated {
        return Redirect::to(state.views.landing_path()).into_response();
    }
    Html(login_html(&state, query.from.as_deref(), None)).into_response()
}

pub async fn login_submit(State(state): State<SharedState>, Form(form): Form<LoginForm>) -> Response {
    let credentials = Credentials::new(form.username, form.password);
    match state.auth.login(&credentials).await {
        Ok(response) => {
            state
                .notifications
                .success(format!("Welcome back, {}", response.user.full_name));
            let target = form
                .from
                .as_deref()
                .filter(|from| is_local_path(from))
                .unwrap_or(state.views.landing_path())
                .to_string();
            let cookie = token_cookie(
                &state.config.auth.token_key,
                &response.token,
                state.config.auth.token_max_age_secs(),
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response()
        }
        Err(e) => {
            state.notifications.error(e.to_string());
            (
                StatusCode::UNAUTHORIZED,
                Html(login_html(&state, form.from.as_deref(), Some(&e.to_string()))),
            )
                .into_response()
        }
    }
}

pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Some(user) = session_from_headers(&state.auth, &headers).user {
        tracing::info!("User '{}' logged out", user.username);
        state.notifications.info("Signed out");
    }
    (
        [(header::SET_COOKIE, clear_token_cookie(&state.config.auth.token_key))],
        Redirect::to(state.views.login_path()),
    )
        .into_response()
}

/// Any other path: run the view's guard, then render or redirect
pub async fn view(State(state): State<SharedState>, headers: HeaderMap, uri: Uri) -> Response {
    let requested = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let session = session_from_headers(&state.auth, &headers);

    match state.views.navigate(requested, &session) {
        Navigation::Redirect { to, from } => Redirect::to(&redirect_target(&to, from.as_deref())).into_response(),
        Navigation::NotFound { path } => (
            StatusCode::NOT_FOUND,
            Html(page(
                "Not found",
                Some(&session),
                &format!(
                    r#"<p class="text-gray-400">No view at <code>{}</code>.</p>"#,
                    escape_html(&path)
                ),
            )),
        )
            .into_response(),
        Navigation::Render { path, title } => match ReportKind::from_path(&path) {
            Some(kind) => report_view(&state, &session, kind, uri.query().unwrap_or("")),
            None => Html(page(&title, Some(&session), &view_body(&state, &session, &path))).into_response(),
        },
    }
}

fn report_view(state: &SharedState, session: &SessionState, kind: ReportKind, query: &str) -> Response {
    let Some(user) = &session.user else {
        return Redirect::to(state.views.login_path()).into_response();
    };
    let queries = state.report_queries.scoped(&user.username);

    let filters = match ReportFilters::from_query(query) {
        Ok(filters) if filters.is_empty() => queries.load(kind).ok().flatten().unwrap_or_default(),
        Ok(filters) => {
            if let Err(e) = queries.save(kind, &filters) {
                tracing::warn!("Failed to remember {} filters: {}", kind, e);
            }
            filters
        }
        Err(e) => {
            state.notifications.warning(e.to_string());
            return (
                StatusCode::BAD_REQUEST,
                Html(page(
                    kind.title(),
                    Some(session),
                    &format!(
                        r#"<p class="text-red-400">{}</p>{}"#,
                        escape_html(&e.to_string()),
                        filter_form(kind, &ReportFilters::default())
                    ),
                )),
            )
                .into_response();
        }
    };

    let body = format!(
        r#"{}
        <div class="mt-6 bg-gray-800 rounded-lg p-4 text-sm text-gray-400">
            Showing {} for region <b>{}</b>, segment <b>{}</b>, {} &rarr; {}
        </div>"#,
        filter_form(kind, &filters),
        kind.title(),
        escape_html(filters.region.as_deref().unwrap_or("all")),
        escape_html(filters.segment.as_deref().unwrap_or("all")),
        filters.prior_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        filters.current_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
    );
    Html(page(&format!("{} report", kind.title()), Some(session), &body)).into_response()
}

fn filter_form(kind: ReportKind, filters: &ReportFilters) -> String {
    let input = |name: &str, input_type: &str, value: String| {
        format!(
            r#"<label class="block text-sm">{name}
                <input name="{name}" type="{input_type}" value="{value}" class="w-full px-3 py-1 bg-gray-700 border border-gray-600 rounded" />
            </label>"#,
            name = name,
            input_type = input_type,
            value = escape_html(&value)
        )
    };
    format!(
        r#"<form method="get" action="{}" class="grid grid-cols-5 gap-4 items-end bg-gray-800 rounded-lg p-4">
            {}{}{}{}
            <button class="px-4 py-2 bg-blue-600 hover:bg-blue-700 rounded">Apply</button>
        </form>"#,
        kind.path(),
        input("region", "text", filters.region.clone().unwrap_or_default()),
        input("segment", "text", filters.segment.clone().unwrap_or_default()),
        input("priorDate", "date", filters.prior_date.map(|d| d.to_string()).unwrap_or_default()),
        input("currentDate", "date", filters.current_date.map(|d| d.to_string()).unwrap_or_default()),
    )
}

fn view_body(state: &SharedState, session: &SessionState, path: &str) -> String {
    if path == state.config.auth.landing_path {
        let links: String = state
            .views
            .routes()
            .iter()
            .filter(|r| r.path != state.views.login_path() && r.path != path)
            .filter(|r| can_open(&r.access, session))
            .map(|r| {
                format!(
                    r#"<a href="{}" class="block px-4 py-3 bg-gray-800 hover:bg-gray-700 rounded">{}</a>"#,
                    r.path,
                    escape_html(&r.title)
                )
            })
            .collect();
        return format!(r#"<div class="grid grid-cols-3 gap-4">{}</div>"#, links);
    }

    if path == "/admin/users" {
        let rows: String = state
            .auth
            .verifier()
            .users()
            .iter()
            .map(|u| {
                format!(
                    r#"<tr class="border-b border-gray-700"><td class="px-4 py-2">{}</td><td class="px-4 py-2">{}</td><td class="px-4 py-2">{}</td><td class="px-4 py-2">{}</td></tr>"#,
                    escape_html(&u.username),
                    escape_html(&u.full_name),
                    u.role,
                    escape_html(&u.regions.join(", "))
                )
            })
            .collect();
        return format!(
            r#"<table class="w-full bg-gray-800 rounded-lg"><thead class="bg-gray-700"><tr><th class="px-4 py-2 text-left">Username</th><th class="px-4 py-2 text-left">Name</th><th class="px-4 py-2 text-left">Role</th><th class="px-4 py-2 text-left">Regions</th></tr></thead><tbody>{}</tbody></table>"#,
            rows
        );
    }

    r#"<p class="text-gray-400">No items waiting.</p>"#.to_string()
}

fn can_open(access: &Access, session: &SessionState) -> bool {
    match access {
        Access::Public => true,
        Access::Authenticated => session.is_authenticated,
        Access::Roles(roles) => session.user.as_ref().is_some_and(|u| u.has_role(roles)),
    }
}

fn login_html(state: &SharedState, from: Option<&str>, error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!(r#"<p class="mb-4 text-red-400">{}</p>"#, escape_html(e)))
        .unwrap_or_default();
    let from_html = from
        .filter(|f| is_local_path(f))
        .map(|f| format!(r#"<input type="hidden" name="from" value="{}" />"#, escape_html(f)))
        .unwrap_or_default();
    let body = format!(
        r#"<form method="post" action="{}" class="max-w-sm bg-gray-800 rounded-lg p-6 space-y-4">
            {}
            {}
            <input name="username" placeholder="Username" class="w-full px-4 py-2 bg-gray-700 border border-gray-600 rounded" />
            <input name="password" type="password" placeholder="Password" class="w-full px-4 py-2 bg-gray-700 border border-gray-600 rounded" />
            <button class="w-full px-4 py-2 bg-blue-600 hover:bg-blue-700 rounded font-medium">Sign in</button>
        </form>"#,
        state.views.login_path(),
        error_html,
        from_html
    );
    page("Sign in", None, &body)
}

fn page(title: &str, session: Option<&SessionState>, body: &str) -> String {
    let user_html = session
        .and_then(|s| s.user.as_ref())
        .map(|u| {
            format!(
                r#"<span class="text-sm text-gray-400 mr-4">{} ({})</span><a href="/logout" class="text-sm text-blue-400 hover:underline">Sign out</a>"#,
                escape_html(&u.full_name),
                role_label(u.role)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en" class="dark">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - LEAP</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-900 text-gray-100 min-h-screen">
    <header class="flex justify-between items-center px-8 py-4 bg-gray-800 border-b border-gray-700">
        <a href="/" class="text-xl font-bold">LEAP</a>
        <div>{user_html}</div>
    </header>
    <main class="container mx-auto px-8 py-8 max-w-6xl">
        <h2 class="text-3xl font-bold mb-6">{title}</h2>
        {body}
    </main>
</body>
</html>"#,
        title = escape_html(title),
        user_html = user_html,
        body = body
    )
}

fn role_label(role: UserRole) -> &'static str {
    match role {
        UserRole::Maker => "Maker",
        UserRole::Checker => "Checker",
        UserRole::Finance => "Finance",
        UserRole::Regulatory => "Regulatory",
        UserRole::Admin => "Administrator",
    }
}

/// Login redirect carrying the original destination
fn redirect_target(to: &str, from: Option<&str>) -> String {
    match from {
        Some(from) => match serde_urlencoded::to_string(vec![("from", from)]) {
            Ok(query) => format!("{}?{}", to, query),
            Err(_) => to.to_string(),
        },
        None => to.to_string(),
    }
}

/// Only same-site absolute paths are followed after login
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_target_encodes_from() {
        assert_eq!(redirect_target("/dashboard", None), "/dashboard");
        assert_eq!(
            redirect_target("/login", Some("/reports/lcr?region=EMEA&segment=Retail")),
            "/login?from=%2Freports%2Flcr%3Fregion%3DEMEA%26segment%3DRetail"
        );
    }

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/reports/lcr"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path("/\\evil.example"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
