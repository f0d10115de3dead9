//! CLI interface for LEAP

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "leap")]
#[command(version)]
#[command(about = "Liquidity Explain & Analytics Platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new leap.toml configuration file
    Init,

    /// Sign in and keep the session token in local storage
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "LEAP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored token
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List the users of the directory
    Users {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List the views and whether the current session may open them
    Routes,

    /// Show what opening a view would do for the current session
    Visit {
        /// View path, e.g. /reports/lcr
        path: String,
    },

    /// Start the HTTP API server and web UI
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
