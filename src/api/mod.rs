//! HTTP API server

pub mod events;
pub mod routes;
pub mod server;

pub use server::*;
