//! Basecamp - command-line client for the Basecamp 3 API.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{config, get, people, projects};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Basecamp - command-line client for the Basecamp 3 API
#[derive(Parser)]
#[command(name = "basecamp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log every outgoing request
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ~/.config/basecamp/config.toml)
    #[arg(long, global = true, env = "BASECAMP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse projects
    Projects(projects::ProjectsArgs),

    /// Browse people
    People(people::PeopleArgs),

    /// GET an arbitrary API path
    Get(get::GetArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --debug request lines are logged at info level by the client.
    let filter = if cli.verbose {
        "basecamp=debug,basecamp_client=debug,basecamp_auth=debug,basecamp_config=debug,warn"
    } else {
        "basecamp=info,basecamp_client=info,basecamp_auth=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        json_output: cli.json,
        verbose: cli.verbose,
        debug: cli.debug,
    };

    match cli.command {
        Commands::Projects(args) => projects::run(args, &ctx),
        Commands::People(args) => people::run(args, &ctx),
        Commands::Get(args) => get::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
