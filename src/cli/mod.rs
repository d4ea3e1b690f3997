//! Command-line entry points
//!
//! - `serve`: run the HTTP command API
//! - `migrate`: manage the PostgreSQL schema

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// League roster service
#[derive(Parser)]
#[command(name = "league-roster")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP command API
    Serve,

    /// Apply, revert or inspect database migrations
    Migrate(migrate::MigrateArgs),
}
