//! CLI module - Command-line interface for waytohome
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// waytohome - personal trip planner
/// Places, ways and weekly trip reminders over a JSON API
#[derive(Parser)]
#[command(name = "waytohome")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and the reminder scheduler
    #[command(alias = "daemon", alias = "-d", alias = "--daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an already activated account
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}
