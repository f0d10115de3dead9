//! Server-rendered views

mod handlers;

pub use handlers::*;
