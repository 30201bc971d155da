//! Command-line interface for acts
//!
//! This module defines the CLI structure using clap derive macros.
//! Subcommand implementations live in their own submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod activity;
mod config;

/// acts - add, display and delete activities to do
///
/// Every change is appended to a plain-text log; the current list is
/// rebuilt from that log on each run.
#[derive(Parser, Debug)]
#[command(name = "acts")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    /// Log file to read and append to (overrides ACTS_LOGFILE and config)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Config file (overrides ACTS_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an activity: `now <body>`, `HH:MM <body>` or `YYYY-MM-DD HH:MM <body>`
    #[command(visible_alias = "add")]
    New {
        /// Time and body words; the body may start with `@rtask:<tag>`
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Mark an activity done
    #[command(visible_aliases = ["del", "delete"])]
    Done {
        /// Activity id or id prefix
        id: String,
    },

    /// Reschedule an activity
    Delay {
        /// Activity id or id prefix
        id: String,

        /// How many units to delay by (negative moves it earlier)
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        count: i64,

        /// Unit: minute, hour, day, week or month (plural forms accepted)
        #[arg(default_value = "day")]
        unit: String,
    },

    /// Search live activities by regular expression
    Grep {
        /// Pattern, appended to the configured literal prefix
        #[arg(allow_hyphen_values = true)]
        pattern: String,
    },

    /// List activities that are due
    Get,

    /// Check the log for unparseable lines and id mismatches
    Check,

    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = activity::GlobalOptions {
            log_file: self.log_file,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::New { words } => activity::run_new(global, words),
            Commands::Done { id } => activity::run_done(global, id),
            Commands::Delay { id, count, unit } => activity::run_delay(global, id, count, unit),
            Commands::Grep { pattern } => activity::run_grep(global, pattern),
            Commands::Get => activity::run_get(global),
            Commands::Check => activity::run_check(global),
            Commands::Config(cmd) => match cmd {
                ConfigCommands::Show => config::run_show(global),
                ConfigCommands::Init { force } => config::run_init(global, force),
            },
        }
    }
}
