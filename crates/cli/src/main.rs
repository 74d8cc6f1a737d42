//! Contact list generator for Wikimedia Cloud Services.
//!
//! One subcommand per list: email or username lists of Cloud VPS project
//! admins and Toolforge members (minus accounts that disabled email
//! contact), and the survey opt-out lists derived from the wiki page.
//!
//! Every list is printed one entry per line on stdout, ready to feed a
//! mailing tool; diagnostics go to stderr.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wmcs_contact_core::AppConfig;

/// Generate contact lists for Cloud VPS and Toolforge users.
#[derive(Parser, Debug)]
#[command(
    name = "wmcs-contact",
    version,
    about = "Generate contact and opt-out lists for Cloud VPS and Toolforge users"
)]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults are used when
    /// the file does not exist.
    #[arg(
        short,
        long,
        global = true,
        default_value = "/etc/wmcs-contact/config.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Email addresses of all Cloud VPS project admins who accept email.
    CloudvpsEmails,

    /// Email addresses of all Toolforge members who accept email.
    ToolforgeEmails,

    /// Usernames of all Toolforge members who accept email.
    ToolforgeUsers,

    /// Sorted, deduplicated email addresses of accounts listed on the
    /// survey opt-out page.
    OptoutEmails,

    /// Filter-escaped identifiers listed on the survey opt-out page.
    OptoutUsers,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config =
        AppConfig::load_or_default(&cli.config).context("loading configuration")?;

    match cli.command {
        Commands::CloudvpsEmails => commands::cloudvps::emails(&config).await,
        Commands::ToolforgeEmails => commands::toolforge::emails(&config).await,
        Commands::ToolforgeUsers => commands::toolforge::users(&config).await,
        Commands::OptoutEmails => commands::optout::emails(&config).await,
        Commands::OptoutUsers => commands::optout::users(&config).await,
    }
}
