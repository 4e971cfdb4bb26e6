//! Marksync CLI
//!
//! Command-line front end for the watermarked sync engine.
//!
//! # Commands
//!
//! - `doc` - Sync a local markdown artifact with its remote document
//! - `tasks` - Reconcile a local checklist with the remote task collection
//! - `status` - Show an artifact's watermark and conflict state
//! - `unbind` - Remove an anchor/remote binding from the link store

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Marksync command-line sync tools.
#[derive(Parser)]
#[command(name = "marksync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the remote side (documents and task collection)
    #[arg(global = true, short, long)]
    remote_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a local markdown artifact with its remote document
    Doc {
        /// Artifact path, or artifact plus remote reference in either order
        #[arg(required = true, num_args = 1..=2)]
        targets: Vec<String>,

        /// Watermark key prefix
        #[arg(long, default_value = "gdoc")]
        prefix: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Reconcile a local checklist with the remote task collection
    Tasks {
        /// Checklist artifact path
        tasks_file: PathBuf,

        /// Artifact receiving captured remote tasks
        #[arg(short, long)]
        capture: PathBuf,

        /// Link store JSON file
        #[arg(short, long)]
        links: PathBuf,

        /// Anchor service name
        #[arg(long, default_value = "gtask")]
        service: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show an artifact's watermark and conflict state
    Status {
        /// Artifact path
        artifact: PathBuf,

        /// Watermark key prefix
        #[arg(long, default_value = "gdoc")]
        prefix: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Remove an anchor/remote binding from the link store
    Unbind {
        /// Remote id whose binding should be removed
        remote_id: String,

        /// Link store JSON file
        #[arg(short, long)]
        links: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Doc {
            targets,
            prefix,
            format,
        } => {
            let root = cli.remote_root.ok_or("Remote root required for doc sync")?;
            commands::doc::run(&root, &targets, &prefix, &format)?;
        }
        Commands::Tasks {
            tasks_file,
            capture,
            links,
            service,
            format,
        } => {
            let root = cli
                .remote_root
                .ok_or("Remote root required for task sync")?;
            commands::tasks::run(&root, &tasks_file, &capture, &links, &service, &format)?;
        }
        Commands::Status {
            artifact,
            prefix,
            format,
        } => {
            commands::status::run(&artifact, &prefix, &format)?;
        }
        Commands::Unbind { remote_id, links } => {
            commands::unbind::run(&links, &remote_id)?;
        }
        Commands::Version => {
            println!("marksync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
