use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gstindex::corpus::{build_split, Corpus};
use gstindex::output::{print_occurrences, print_summary};
use gstindex::tree::TreeMode;
use gstindex::utils::{get_config_path, AppConfig};
use gstindex::Interrupt;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

const LOG_ENV: &str = "GSTINDEX_LOG";

#[derive(Parser)]
#[command(name = "gstindex")]
#[command(about = "Generalized suffix tree index with streaming occurrence reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a tree from files and write the node report as JSON
    Report {
        /// Input files (one unit per file, one text per line)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file, or output directory with --split (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tree mode: simple or generalized
        #[arg(short, long)]
        mode: Option<TreeMode>,

        /// Build one tree per file in parallel and write <stem>.json for each
        #[arg(long)]
        split: bool,

        /// Abort construction after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Print every occurrence of a pattern
    Search {
        /// Pattern to look for
        pattern: String,

        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Highlight matches
        #[arg(long)]
        color: bool,
    },
    /// Show tree statistics
    Stats {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Tree mode: simple or generalized
        #[arg(short, long)]
        mode: Option<TreeMode>,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or initialize the configuration file
    Config {
        /// Print the effective configuration (default)
        #[arg(long, conflicts_with = "init")]
        show: bool,

        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Report {
            files,
            output,
            mode,
            split,
            timeout_secs,
        } => {
            run_report(files, output, mode, split, timeout_secs, !cli.quiet)?;
        }
        Commands::Search {
            pattern,
            files,
            color,
        } => {
            let config = AppConfig::load()?;
            let corpus = Corpus::from_files(&files, config.tree.mode)?;
            let tree = corpus.build_tree(&config.tree, None, !cli.quiet)?;
            let found = tree.locate(&pattern)?;
            print_occurrences(&corpus, &found, &pattern, color)?;
        }
        Commands::Stats { files, mode, json } => {
            let mut config = AppConfig::load()?;
            if let Some(mode) = mode {
                config.tree.mode = mode;
            }
            let corpus = Corpus::from_files(&files, config.tree.mode)?;
            let tree = corpus.build_tree(&config.tree, None, !cli.quiet)?;
            let summary = tree.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary)?;
            }
        }
        Commands::Config { show, init } => {
            if init {
                let path = AppConfig::default().save()?;
                println!("Wrote default configuration to {}", path.display());
            }
            if show || !init {
                let config = AppConfig::load()?;
                println!("# {}", get_config_path()?.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// Install the stderr fmt subscriber; `GSTINDEX_LOG` wins over `-v`
fn init_logging(verbose: u8) -> Result<()> {
    let level = match std::env::var(LOG_ENV) {
        Ok(value) => value
            .parse::<Level>()
            .with_context(|| format!("Invalid {}: {}", LOG_ENV, value))?,
        Err(_) => match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        },
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn run_report(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    mode: Option<TreeMode>,
    split: bool,
    timeout_secs: Option<u64>,
    show_progress: bool,
) -> Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(mode) = mode {
        config.tree.mode = mode;
    }
    let corpus = Corpus::from_files(&files, config.tree.mode)?;

    let interrupt = Interrupt::new();
    if let Some(secs) = timeout_secs {
        // Detached; the process exit ends it
        let _timer = interrupt.trigger_after(Duration::from_secs(secs));
    }

    if split {
        let out_dir = output.context("--split requires --output <DIR>")?;
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        let trees = build_split(
            &corpus,
            &config.tree,
            config.effective_build_threads(),
            Some(interrupt),
        )?;

        let mut used = HashSet::new();
        for (idx, (source, tree)) in trees.iter().enumerate() {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unit");
            let mut name = format!("{}.json", stem);
            if !used.insert(name.clone()) {
                name = format!("{}-{}.json", stem, idx);
                used.insert(name.clone());
            }

            let path = out_dir.join(&name);
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            tree.write_report(BufWriter::with_capacity(config.report_buffer_size, file))?;
        }
        println!("Wrote {} reports to {}", trees.len(), out_dir.display());
        return Ok(());
    }

    let tree = corpus.build_tree(&config.tree, Some(interrupt), show_progress)?;
    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            tree.write_report(BufWriter::with_capacity(config.report_buffer_size, file))?;
        }
        None => {
            let stdout = io::stdout().lock();
            tree.write_report(BufWriter::with_capacity(config.report_buffer_size, stdout))?;
        }
    }
    Ok(())
}
