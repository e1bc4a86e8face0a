//! CLI module for the Task Tracker API
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `inspect`: print the users, tasks and categories in the configured store

pub mod inspect;
pub mod serve;

use clap::{Parser, Subcommand};

/// Task Tracker API - personal task management backend
#[derive(Parser)]
#[command(name = "tasktracker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Print the contents of the configured store
    Inspect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["tasktracker", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from(["tasktracker", "inspect"]).unwrap();
        assert!(matches!(cli.command, Command::Inspect));

        assert!(Cli::try_parse_from(["tasktracker"]).is_err());
    }
}
