//! Command-line interface, parsed with clap.

use clap::{Parser, Subcommand};

/// GreenLedger - ESG consultancy platform backend
#[derive(Parser)]
#[command(name = "greenledger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "-s", alias = "--serve")]
    Serve,

    /// Create a default config file if none exists
    #[command(alias = "--init")]
    Init,

    /// Create an admin account (or promote an existing one)
    CreateAdmin {
        /// Account email
        email: String,
        /// Display name
        name: String,
        /// Plaintext password, hashed before storage
        password: String,
    },
}
