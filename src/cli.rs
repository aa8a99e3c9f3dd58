//! Command-line interface definitions using clap
//!
//! The binary is meant to be driven by cron or a similar scheduler:
//! `ctapulse cleanup` and `ctapulse publish-due` are the periodic jobs, the
//! rest are maintenance helpers.

use std::fmt;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod context;

pub use context::AppContext;

/// ctapulse - CTA lifecycle and analytics maintenance
#[derive(Parser)]
#[command(name = "ctapulse")]
#[command(version)]
#[command(about = "CTA lifecycle, analytics retention and event rollups", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Delete expired events and purge old trashed CTAs
    Cleanup {
        /// What to clean up
        #[arg(value_enum, default_value_t = CleanupTarget::All)]
        target: CleanupTarget,

        /// Override the trash retention from the configuration (days)
        #[arg(long)]
        trash_days: Option<u32>,
    },

    /// Publish scheduled CTAs whose start date has arrived
    PublishDue,

    /// Record one event given as JSON
    ///
    /// Example: record '{"cta_id":1,"event_type":"click","page_url":"https://example.com/"}'
    Record {
        /// Event payload
        payload: String,
    },

    /// Show analytics for a reporting range
    Stats {
        /// Range start (YYYY-MM-DD or RFC3339)
        #[arg(long)]
        start: Option<String>,

        /// Range end (YYYY-MM-DD or RFC3339)
        #[arg(long)]
        end: Option<String>,

        /// Show the dashboard summary instead of the raw rollup
        #[arg(long)]
        dashboard: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or change the analytics retention setting
    Retention {
        #[command(subcommand)]
        action: RetentionCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CleanupTarget {
    Events,
    Trash,
    All,
}

/// Retention setting commands
#[derive(Subcommand)]
pub enum RetentionCommands {
    /// Show the stored setting and the effective cleanup window
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the retention category (1, 7, 14, 30, 60, 90, 180, 365, custom, unlimited)
    Set {
        category: String,

        /// Days to keep when the category is `custom`
        #[arg(long)]
        custom_days: Option<u32>,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// CLI error types
#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as plain text (no colors)
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::CtaError> for CliError {
    fn from(err: crate::errors::CtaError) -> Self {
        match err {
            crate::errors::CtaError::Validation(msg) | crate::errors::CtaError::DateParse(msg) => {
                CliError::ParseError(msg)
            }
            other if other.is_storage_failure() => CliError::StorageError(other.to_string()),
            other => CliError::CommandError(other.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(
    cmd: Commands,
    config: &crate::config::StaticConfig,
) -> Result<(), CliError> {
    // Generate doesn't need a database connection
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return commands::generate_config(output_path, force);
    }

    let storage = crate::storage::StorageFactory::create(config)
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;
    let ctx = AppContext::from_storage(storage, &config.retention);
    let now = chrono::Utc::now();

    match cmd {
        Commands::Cleanup { target, trash_days } => {
            let trash_days = trash_days.unwrap_or(config.retention.trash_retention_days);
            commands::run_cleanup(&ctx, target, trash_days, now).await
        }
        Commands::PublishDue => commands::publish_due(&ctx, now).await,
        Commands::Record { payload } => commands::record_event(&ctx, &payload, now).await,
        Commands::Stats {
            start,
            end,
            dashboard,
            json,
        } => {
            commands::show_stats(&ctx, start.as_deref(), end.as_deref(), dashboard, json, now)
                .await
        }
        Commands::Retention { action } => match action {
            RetentionCommands::Show { json } => commands::show_retention(&ctx, json, now).await,
            RetentionCommands::Set {
                category,
                custom_days,
            } => commands::set_retention(&ctx, &category, custom_days, now).await,
        },
        Commands::Config { .. } => unreachable!("handled above"),
    }
}
