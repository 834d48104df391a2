//! Docdex CLI
//!
//! Thin wrapper over the index engine: every subcommand goes through the
//! same scan/fingerprint/diff pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docdex_engine::{IndexConfig, IndexEngine, ScanOptions};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "docdex")]
#[command(about = "Docdex - per-directory extraction indexes for document trees")]
#[command(version)]
struct Cli {
    /// Optional YAML config file overriding the built-in conventions
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan and write indexes unconditionally
    Create {
        /// Root directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Dry run: report changes without persisting
        #[arg(long)]
        test: bool,
    },

    /// Scan and write indexes, skipping directories with a fresh index file
    Update {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(short, long)]
        recursive: bool,

        #[arg(long)]
        test: bool,

        /// Freshness window in seconds (overrides the config value)
        #[arg(long)]
        max_age: Option<u64>,
    },

    /// Print aggregate statistics for a tree
    Stats {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(short, long)]
        recursive: bool,
    },

    /// List files with no extraction output yet
    Unparsed {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(short, long)]
        recursive: bool,
    },

    /// List files with no category annotation
    Uncategorized {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(short, long)]
        recursive: bool,
    },

    /// Delete index files
    Clear {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(short, long)]
        recursive: bool,
    },
}

fn main() -> Result<()> {
    // Simple logging for CLI
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt().with_target(false).init();
    }

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => IndexConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => IndexConfig::default(),
    };
    let engine = IndexEngine::new(config);

    match cli.command {
        Commands::Create {
            path,
            recursive,
            test,
        } => {
            let opts = ScanOptions {
                recursive,
                test_mode: test,
                max_age: None,
            };
            engine.create(&path, &opts)?;
        }
        Commands::Update {
            path,
            recursive,
            test,
            max_age,
        } => {
            let opts = ScanOptions {
                recursive,
                test_mode: test,
                max_age: max_age.map(Duration::from_secs),
            };
            engine.update(&path, &opts)?;
        }
        Commands::Stats { path, recursive } => {
            let stats = engine.stats(&path, recursive)?;

            println!("Index statistics: {}", path.display());
            println!();
            println!("  Files:          {}", stats.files);
            println!("  Parsed:         {}", stats.parsed);
            println!("  Unparsed:       {}", stats.unparsed);
            println!("  Uncategorized:  {}", stats.uncategorized);
            println!("  Directories:    {}", stats.directories);
            println!(
                "  Total size:     {:.1} MB",
                stats.total_bytes as f64 / 1024.0 / 1024.0
            );
            if !stats.by_parser.is_empty() {
                println!();
                println!("  By default parser:");
                for (parser, count) in &stats.by_parser {
                    println!("    {parser}: {count}");
                }
            }
        }
        Commands::Unparsed { path, recursive } => {
            let paths = engine.unparsed(&path, recursive)?;
            if paths.is_empty() {
                println!("All files have extraction output.");
            } else {
                for p in paths {
                    println!("{}", p.display());
                }
            }
        }
        Commands::Uncategorized { path, recursive } => {
            let paths = engine.uncategorized(&path, recursive)?;
            if paths.is_empty() {
                println!("All files are categorized.");
            } else {
                for p in paths {
                    println!("{}", p.display());
                }
            }
        }
        Commands::Clear { path, recursive } => {
            let cleared = engine.clear(&path, recursive)?;
            if cleared.is_empty() {
                println!("No index files found.");
            }
        }
    }

    Ok(())
}
