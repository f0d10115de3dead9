//! View table and guarded navigation

use crate::auth::guards::{self, GuardOutcome};
use crate::auth::{SessionState, UserRole};
use crate::config::AuthConfig;
use crate::reports::ReportKind;
use serde::Serialize;

/// Who may open a view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "roles", rename_all = "snake_case")]
pub enum Access {
    Public,
    Authenticated,
    Roles(Vec<UserRole>),
}

impl Access {
    pub fn describe(&self) -> String {
        match self {
            Access::Public => "public".to_string(),
            Access::Authenticated => "any signed-in user".to_string(),
            Access::Roles(roles) => roles
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewRoute {
    pub path: String,
    pub title: String,
    pub access: Access,
}

impl ViewRoute {
    pub fn new(path: impl Into<String>, title: impl Into<String>, access: Access) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            access,
        }
    }
}

/// Result of asking for a view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Navigation {
    Render { path: String, title: String },
    Redirect { to: String, from: Option<String> },
    NotFound { path: String },
}

#[derive(Debug, Clone)]
pub struct ViewTable {
    routes: Vec<ViewRoute>,
    login_path: String,
    landing_path: String,
}

impl ViewTable {
    pub fn new(login_path: impl Into<String>, landing_path: impl Into<String>) -> Self {
        Self {
            routes: Vec::new(),
            login_path: login_path.into(),
            landing_path: landing_path.into(),
        }
    }

    pub fn route(mut self, route: ViewRoute) -> Self {
        self.routes.push(route);
        self
    }

    /// The LEAP dashboard views
    pub fn leap(config: &AuthConfig) -> Self {
        let mut table = Self::new(&config.login_path, &config.landing_path)
            .route(ViewRoute::new(&config.login_path, "Sign in", Access::Public))
            .route(ViewRoute::new(
                &config.landing_path,
                "Dashboard",
                Access::Authenticated,
            ));

        for kind in ReportKind::ALL {
            table = table.route(ViewRoute::new(kind.path(), kind.title(), Access::Authenticated));
        }

        table
            .route(ViewRoute::new(
                "/maker/submissions",
                "Maker submissions",
                Access::Roles(vec![UserRole::Maker, UserRole::Admin]),
            ))
            .route(ViewRoute::new(
                "/checker/approvals",
                "Checker approvals",
                Access::Roles(vec![UserRole::Checker, UserRole::Admin]),
            ))
            .route(ViewRoute::new(
                "/admin/users",
                "User administration",
                Access::Roles(vec![UserRole::Admin]),
            ))
    }

    pub fn routes(&self) -> &[ViewRoute] {
        &self.routes
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    pub fn find(&self, path: &str) -> Option<&ViewRoute> {
        let path = normalize(path);
        self.routes.iter().find(|r| r.path == path)
    }

    /// Run the guard of the view at `path` against `state`
    pub fn navigate(&self, requested: &str, state: &SessionState) -> Navigation {
        let path = normalize(requested);
        let Some(route) = self.find(path) else {
            return Navigation::NotFound {
                path: path.to_string(),
            };
        };

        let outcome = match &route.access {
            Access::Public if route.path == self.login_path && state.is_authenticated => {
                GuardOutcome::RedirectToLanding
            }
            Access::Public => GuardOutcome::Allow,
            Access::Authenticated => guards::require_authenticated(state, requested),
            Access::Roles(roles) => guards::require_role(state, roles, requested),
        };

        match outcome {
            GuardOutcome::Allow => Navigation::Render {
                path: route.path.clone(),
                title: route.title.clone(),
            },
            GuardOutcome::RedirectToLogin { from } => Navigation::Redirect {
                to: self.login_path.clone(),
                from,
            },
            GuardOutcome::RedirectToLanding => Navigation::Redirect {
                to: self.landing_path.clone(),
                from: None,
            },
        }
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::directory::{CredentialVerifier, StaticDirectory};

    fn table() -> ViewTable {
        ViewTable::leap(&AuthConfig::default())
    }

    fn session_for(username: &str) -> SessionState {
        let user = StaticDirectory::seeded().find_by_username(username).unwrap();
        SessionState::authenticated(user, "a.b.c".to_string())
    }

    #[test]
    fn test_anonymous_role_view_goes_to_login() {
        let nav = table().navigate("/maker/submissions", &SessionState::anonymous());
        assert_eq!(
            nav,
            Navigation::Redirect {
                to: "/login".to_string(),
                from: Some("/maker/submissions".to_string())
            }
        );
    }

    #[test]
    fn test_checker_on_maker_view_goes_to_landing() {
        let nav = table().navigate("/maker/submissions", &session_for("checker1"));
        assert_eq!(
            nav,
            Navigation::Redirect {
                to: "/dashboard".to_string(),
                from: None
            }
        );
    }

    #[test]
    fn test_reports_open_to_any_signed_in_user() {
        let t = table();
        for username in ["maker1", "checker1", "finance1", "regulatory1", "admin1"] {
            let nav = t.navigate("/reports/nsfr", &session_for(username));
            assert!(matches!(nav, Navigation::Render { .. }), "{}", username);
        }
    }

    #[test]
    fn test_login_view_sends_signed_in_users_home() {
        let t = table();
        assert!(matches!(
            t.navigate("/login", &SessionState::anonymous()),
            Navigation::Render { .. }
        ));
        assert_eq!(
            t.navigate("/login", &session_for("maker1")),
            Navigation::Redirect {
                to: "/dashboard".to_string(),
                from: None
            }
        );
    }

    #[test]
    fn test_login_redirect_keeps_query() {
        let nav = table().navigate("/reports/lcr?region=EMEA", &SessionState::anonymous());
        assert_eq!(
            nav,
            Navigation::Redirect {
                to: "/login".to_string(),
                from: Some("/reports/lcr?region=EMEA".to_string())
            }
        );
    }

    #[test]
    fn test_path_normalization_and_unknown() {
        let t = table();
        assert!(t.find("/admin/users/").is_some());
        assert!(t.find("/reports/lcr?region=EMEA").is_some());
        assert_eq!(
            t.navigate("/nowhere", &session_for("admin1")),
            Navigation::NotFound {
                path: "/nowhere".to_string()
            }
        );
    }
}
