//! Vocdag CLI - command-line interface for ontology graphs
//!
//! Loads OBO files into an ontology DAG and answers structural questions:
//! cycles, roots, closures, trees, and flat exports for bulk loading.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::LoadConfig;

#[derive(Parser)]
#[command(name = "vocdag")]
#[command(author = "Vocdag Contributors")]
#[command(version)]
#[command(about = "Ontology DAG loading, checking and closure", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./.vocdag/config.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default config in a directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Check an ontology file for cycles
    Check {
        /// OBO file to load
        file: PathBuf,
    },

    /// Show term and relationship statistics
    Stats {
        /// OBO file to load
        file: PathBuf,
    },

    /// List root terms
    Roots {
        /// OBO file to load
        file: PathBuf,

        /// Only roots in this namespace
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// List every term below (or above) a term
    Closure {
        /// OBO file to load
        file: PathBuf,

        /// Term id, e.g. GO:0008150
        term: String,

        /// Walk towards the roots instead
        #[arg(long)]
        ancestors: bool,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Print the tree below a term
    Tree {
        /// OBO file to load
        file: PathBuf,

        /// Term id to start from
        term: String,
    },

    /// Export terms, relationships and closure rows to JSON
    Export {
        /// OBO file to load
        file: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "vocdag-export.json")]
        output: PathBuf,
    },
}

fn run(command: Commands, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Init { path } = &command {
        return commands::init(path);
    }

    let config = LoadConfig::load(config_path)?;
    match command {
        Commands::Init { .. } => Ok(()),
        Commands::Check { file } => commands::check(&file, &config),
        Commands::Stats { file } => commands::stats(&file, &config),
        Commands::Roots { file, namespace } => {
            commands::roots(&file, namespace.as_deref(), &config)
        }
        Commands::Closure {
            file,
            term,
            ancestors,
            json,
        } => commands::closure(&file, &term, ancestors, json, &config),
        Commands::Tree { file, term } => commands::tree(&file, &term, &config),
        Commands::Export { file, output } => commands::export(&file, &output, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if let Err(e) = run(cli.command, cli.config.as_deref()) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
