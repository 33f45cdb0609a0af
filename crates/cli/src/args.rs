//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

/// storectl - inspect and exercise the user/order store
#[derive(Parser, Debug)]
#[command(name = "storectl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database URL
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Use a throwaway in-memory store instead of the database
    #[arg(long, global = true)]
    pub in_memory: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the users and orders tables if missing
    Init,

    /// Print one record as JSON
    Get(RecordArgs),

    /// Delete one record (no-op when it does not exist)
    Delete(RecordArgs),

    /// Run the create/read/update/delete walkthrough
    Demo,
}

/// Record kinds addressable from the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    User,
    Order,
}

/// Arguments addressing one record
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Record kind
    #[arg(value_enum)]
    pub kind: Kind,

    /// Primary key
    pub id: i32,
}
