//! Credential verification against a user directory

use crate::auth::models::{Credentials, User, UserRole};

/// Identity provider consulted at login and when a token is restored
pub trait CredentialVerifier: Send + Sync {
    /// The user matching both username and password
    fn verify(&self, credentials: &Credentials) -> Option<User>;

    fn find_by_username(&self, username: &str) -> Option<User>;

    fn users(&self) -> Vec<User>;
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    user: User,
    password: String,
}

/// Fixed in-memory user table
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: Vec<DirectoryEntry>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with a plaintext password
    pub fn with_user(mut self, user: User, password: impl Into<String>) -> Self {
        self.entries.push(DirectoryEntry {
            user,
            password: password.into(),
        });
        self
    }

    /// The demo table: one account per role, all with password `password`
    pub fn seeded() -> Self {
        let seed = [
            (
                1u64,
                "maker1",
                "Morgan Reyes",
                UserRole::Maker,
                &["Treasury", "Retail Banking"][..],
                &["EMEA", "APAC"][..],
                &["reports:view", "submissions:create", "submissions:edit"][..],
            ),
            (
                2,
                "checker1",
                "Jordan Patel",
                UserRole::Checker,
                &["Treasury", "Retail Banking"][..],
                &["EMEA", "APAC"][..],
                &["reports:view", "submissions:approve", "submissions:reject"][..],
            ),
            (
                3,
                "finance1",
                "Sam Okafor",
                UserRole::Finance,
                &["Treasury", "Corporate Banking"][..],
                &["EMEA", "AMER"][..],
                &["reports:view", "reports:export"][..],
            ),
            (
                4,
                "regulatory1",
                "Casey Lindqvist",
                UserRole::Regulatory,
                &["Treasury", "Retail Banking", "Corporate Banking"][..],
                &["EMEA", "APAC", "AMER"][..],
                &["reports:view", "reports:export", "reports:attest"][..],
            ),
            (
                5,
                "admin1",
                "Riley Chen",
                UserRole::Admin,
                &["Treasury", "Retail Banking", "Corporate Banking"][..],
                &["EMEA", "APAC", "AMER"][..],
                &[
                    "reports:view",
                    "reports:export",
                    "submissions:approve",
                    "users:manage",
                    "settings:manage",
                ][..],
            ),
        ];

        seed.into_iter().fold(
            Self::new(),
            |dir, (id, username, full_name, role, product_lines, regions, permissions)| {
                let to_vec = |items: &[&str]| -> Vec<String> {
                    items.iter().map(|s| s.to_string()).collect()
                };
                dir.with_user(
                    User {
                        id,
                        username: username.to_string(),
                        email: format!("{}@leap.local", username),
                        full_name: full_name.to_string(),
                        role,
                        product_lines: to_vec(product_lines),
                        regions: to_vec(regions),
                        permissions: to_vec(permissions),
                    },
                    "password",
                )
            },
        )
    }
}

impl CredentialVerifier for StaticDirectory {
    fn verify(&self, credentials: &Credentials) -> Option<User> {
        self.entries
            .iter()
            .find(|e| e.user.username == credentials.username && e.password == credentials.password)
            .map(|e| e.user.clone())
    }

    fn find_by_username(&self, username: &str) -> Option<User> {
        self.entries
            .iter()
            .find(|e| e.user.username == username)
            .map(|e| e.user.clone())
    }

    fn users(&self) -> Vec<User> {
        self.entries.iter().map(|e| e.user.clone()).collect()
    }
}
