//! CLI command definitions for the game task board.
//!
//! The main entry point is the `Cli` struct; running without a subcommand
//! starts the web server.

use clap::{Parser, Subcommand};

use crate::config::Config;

/// Game development task board
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Directory for uploaded files (overrides config)
    #[arg(short, long, global = true)]
    pub upload_dir: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server (default if no subcommand given)
    Serve,

    /// Create the database and apply migrations, then exit
    InitDb,
}

impl Cli {
    /// Apply path and port flags on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(db_path) = &self.database {
            config.server.db_path = db_path.into();
        }
        if let Some(upload_dir) = &self.upload_dir {
            config.server.upload_dir = upload_dir.into();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
