//! Authentication, session state and route guards

pub mod directory;
pub mod guards;
pub mod middleware;
pub mod models;
pub mod service;
pub mod session;
pub mod token;

pub use directory::{CredentialVerifier, StaticDirectory};
pub use guards::{require_authenticated, require_role, GuardOutcome};
pub use middleware::{extract_token, require_auth, session_from_headers};
pub use models::{Credentials, LoginResponse, User, UserRole};
pub use service::AuthService;
pub use session::{SessionState, SessionStatus, SessionStore};
pub use token::{is_expired, issue_token, TokenPayload};
