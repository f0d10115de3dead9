//! Route guards
//!
//! Pure predicates over a session snapshot. They never mutate state; the
//! caller turns the outcome into a redirect.

use crate::auth::models::UserRole;
use crate::auth::session::SessionState;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuardOutcome {
    Allow,
    /// Send to the login view, remembering where the user was going
    RedirectToLogin { from: Option<String> },
    /// Send to the default landing view
    RedirectToLanding,
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardOutcome::Allow)
    }
}

/// Require an authenticated session
pub fn require_authenticated(state: &SessionState, requested: &str) -> GuardOutcome {
    if state.is_authenticated {
        GuardOutcome::Allow
    } else {
        GuardOutcome::RedirectToLogin {
            from: Some(requested.to_string()),
        }
    }
}

/// Require a user whose role is in `allowed`.
///
/// A role mismatch goes to the landing view without keeping `requested`.
pub fn require_role(state: &SessionState, allowed: &[UserRole], requested: &str) -> GuardOutcome {
    match &state.user {
        None => GuardOutcome::RedirectToLogin {
            from: Some(requested.to_string()),
        },
        Some(user) if allowed.contains(&user.role) => GuardOutcome::Allow,
        Some(_) => GuardOutcome::RedirectToLanding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::directory::{CredentialVerifier, StaticDirectory};

    fn session_for(username: &str) -> SessionState {
        let user = StaticDirectory::seeded().find_by_username(username).unwrap();
        SessionState::authenticated(user, "a.b.c".to_string())
    }

    #[test]
    fn test_auth_guard_keeps_requested_path() {
        assert_eq!(
            require_authenticated(&SessionState::anonymous(), "/reports/lcr"),
            GuardOutcome::RedirectToLogin {
                from: Some("/reports/lcr".to_string())
            }
        );
        assert!(require_authenticated(&session_for("finance1"), "/reports/lcr").is_allowed());
    }

    #[test]
    fn test_role_guard_anonymous_goes_to_login() {
        let outcome = require_role(&SessionState::anonymous(), &[UserRole::Maker], "/maker/submissions");
        assert!(matches!(outcome, GuardOutcome::RedirectToLogin { .. }));
    }

    #[test]
    fn test_role_guard_mismatch_goes_to_landing() {
        let outcome = require_role(&session_for("checker1"), &[UserRole::Maker], "/maker/submissions");
        assert_eq!(outcome, GuardOutcome::RedirectToLanding);
    }

    #[test]
    fn test_role_guard_allows_listed_roles() {
        let allowed = [UserRole::Maker, UserRole::Admin];
        assert!(require_role(&session_for("maker1"), &allowed, "/maker/submissions").is_allowed());
        assert!(require_role(&session_for("admin1"), &allowed, "/maker/submissions").is_allowed());
    }
}
