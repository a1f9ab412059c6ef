mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Dependency-aware workspace orchestration for monorepos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory scanned for workspaces.
    #[arg(long, default_value = "./packages")]
    root: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all workspaces.
    List {
        #[arg(long, action)]
        json: bool,
    },
    /// Show direct dependencies and dependents per workspace.
    Graph {
        #[arg(long, action)]
        json: bool,
    },
    /// Check that every internal dependency range admits the current
    /// version of its target.
    Validate,
    /// Run a manifest script across workspaces in dependency order.
    Run {
        script: String,
        /// Glob patterns of workspace names/paths to include.
        #[arg(short, long)]
        filter: Vec<String>,
        /// Glob patterns of workspace names/paths to exclude.
        #[arg(short = 'x', long)]
        exclude: Vec<String>,
    },
    /// Apply version bumps and propagate them through internal
    /// dependency ranges.
    Version {
        /// `name=version` pairs of packages to update.
        updates: Vec<String>,
        #[arg(long, action)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    match cli.command {
        Commands::List { json } => commands::cmd_list(cli.root, json)?,
        Commands::Graph { json } => commands::cmd_graph(cli.root, json)?,
        Commands::Validate => commands::cmd_validate(cli.root)?,
        Commands::Run {
            script,
            filter,
            exclude,
        } => commands::cmd_run(cli.root, script, filter, exclude).await?,
        Commands::Version { updates, dry_run } => {
            commands::cmd_version(cli.root, updates, dry_run)?
        }
    }

    Ok(())
}
