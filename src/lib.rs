//! LEAP - Liquidity Explain & Analytics Platform
//!
//! Session and access core of the LEAP dashboard: a user directory, mock
//! session tokens, a session state container, role-based view guards and
//! report filter storage, served over HTTP and driven from the CLI.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod reports;
pub mod router;
pub mod storage;
pub mod ui;

pub use config::Config;
pub use error::Error;
pub use router::ViewTable;
