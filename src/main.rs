//! Tyria CLI - index and extract game asset archives.
//!
//! `tyria <ARCHIVE> <OUTPUT>` scans the archive (or reuses the index cache
//! when the archive is unchanged) and extracts every entry below the chosen
//! category into `OUTPUT`, mirroring the category tree. Status and progress
//! lines go to stderr so stdout stays machine-readable for `list --json`.

mod progress;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tyria::dat::modified_timestamp;
use tyria::prelude::*;

use crate::progress::Supervisor;

/// Tyria - game asset archive extraction tool
#[derive(Parser)]
#[command(name = "tyria")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    extract: ExtractArgs,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct IndexArgs {
    /// Index cache file
    #[arg(long = "index", env = "TYRIA_INDEX", default_value = persist::DEFAULT_FILE_NAME)]
    index_path: PathBuf,

    /// Ignore the index cache and rescan the archive
    #[arg(long)]
    rescan: bool,

    /// Milliseconds between export progress lines; scanning reports 5x less often
    #[arg(long, default_value_t = 1000)]
    progress_interval_ms: u64,
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to the archive
    #[arg(env = "TYRIA_ARCHIVE", required = true)]
    archive: Option<PathBuf>,

    /// Output directory
    #[arg(env = "TYRIA_OUTPUT", required = true)]
    output: Option<PathBuf>,

    /// Extract only this category, e.g. "Textures/UI Textures"
    #[arg(short, long)]
    category: Option<String>,

    /// Number of worker threads [default: available parallelism]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Keep extracting when an entry fails and report failures at the end
    #[arg(long)]
    keep_going: bool,

    /// Write every entry's bytes unconverted with a .raw extension
    #[arg(long)]
    raw: bool,

    #[command(flatten)]
    index: IndexArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the category tree with entry counts
    List {
        /// Path to the archive
        #[arg(env = "TYRIA_ARCHIVE")]
        archive: PathBuf,

        /// Print JSON instead of an indented tree
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        index: IndexArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::List {
            archive,
            json,
            index,
        }) => cmd_list(&archive, json, &index),
        None => cmd_extract(cli.extract),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_extract(args: ExtractArgs) -> Result<()> {
    let (Some(archive), Some(output)) = (args.archive, args.output) else {
        bail!("both ARCHIVE and OUTPUT are required");
    };

    let index = load_index(&archive, &args.index)?;

    let category = match &args.category {
        Some(path) => {
            let path = CategoryPath::parse(path);
            index
                .find_category(&path.segments())
                .with_context(|| format!("Unknown category: {}", path))?
        }
        None => index.root(),
    };

    let options = ExtractOptions {
        workers: args.workers.unwrap_or_else(tyria::export::default_workers),
        policy: if args.keep_going {
            FailurePolicy::SkipAndReport
        } else {
            FailurePolicy::FailFast
        },
    };

    println!(
        "Extracting {} entries to {} with {} workers",
        index.num_entries(category, true),
        output.display(),
        options.workers
    );

    let registry = if args.raw {
        ExporterRegistry::new()
    } else {
        ExporterRegistry::with_defaults()
    };
    let extractor = Extractor::new(&index, &archive, &output, &registry).with_options(options);

    let progress = extractor.progress();
    let supervisor = Supervisor::spawn(
        "Export",
        Duration::from_millis(args.index.progress_interval_ms),
        move || (progress.completed() as u64, progress.total() as u64),
    );
    let start = Instant::now();
    let result = extractor.run(category);
    supervisor.finish();
    let report = result.context("Extraction failed")?;

    println!(
        "Extracted {} of {} entries ({} converted, {} raw) in {:?}",
        report.written(),
        report.total,
        report.converted,
        report.raw,
        start.elapsed()
    );

    if !report.failed.is_empty() {
        for failure in &report.failed {
            eprintln!("failed: {}", failure);
        }
        bail!("{} entries failed", report.failed.len());
    }

    Ok(())
}

#[derive(Serialize)]
struct CategoryNode {
    name: String,
    entries: usize,
    total: usize,
    children: Vec<CategoryNode>,
}

fn category_node(index: &Index, id: CategoryId) -> CategoryNode {
    let category = index.category(id);
    CategoryNode {
        name: category.name().to_string(),
        entries: index.num_entries(id, false),
        total: index.num_entries(id, true),
        children: category
            .sub_categories()
            .iter()
            .map(|&child| category_node(index, child))
            .collect(),
    }
}

fn print_tree(node: &CategoryNode, depth: usize) {
    println!(
        "{:indent$}{} ({} / {})",
        "",
        node.name,
        node.entries,
        node.total,
        indent = depth * 2
    );
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}

fn cmd_list(archive: &Path, json: bool, args: &IndexArgs) -> Result<()> {
    let index = load_index(archive, args)?;
    let root = category_node(&index, index.root());

    if json {
        println!("{}", serde_json::to_string_pretty(&root)?);
    } else {
        for child in &root.children {
            print_tree(child, 0);
        }
        println!("\nTotal: {} entries", root.total);
    }

    Ok(())
}

/// Reuse the index cache when it matches the archive, otherwise scan and
/// refresh it.
fn load_index(archive: &Path, args: &IndexArgs) -> Result<Index> {
    let timestamp = modified_timestamp(archive)
        .with_context(|| format!("Failed to open archive {}", archive.display()))?;

    if !args.rescan {
        match persist::load_cached(&args.index_path, timestamp) {
            CacheLookup::Fresh(index) => {
                eprintln!(
                    "Using cached index {} ({} entries)",
                    args.index_path.display(),
                    index.entry_count()
                );
                return Ok(index);
            }
            CacheLookup::Stale { cached, current } => {
                tracing::info!(cached, current, "index cache is stale");
            }
            CacheLookup::Missing => {
                tracing::info!(path = %args.index_path.display(), "no index cache");
            }
            CacheLookup::Unreadable(e) => {
                tracing::info!(error = %e, "index cache unusable");
            }
        }
    }

    eprintln!("Scanning archive: {}", archive.display());
    let start = Instant::now();

    let mut scanner = Scanner::new(archive);
    scanner.init().context("Failed to open archive")?;

    let progress = scanner.progress();
    let supervisor = Supervisor::spawn(
        "Scan",
        Duration::from_millis(args.progress_interval_ms.saturating_mul(5)),
        move || (progress.current(), progress.max()),
    );
    let result = scanner.run(&CancelFlag::new());
    supervisor.finish();
    result.context("Scan failed")?;

    let stats = scanner.stats();
    let index = scanner.into_index();
    eprintln!(
        "Indexed {} entries in {:?} ({} corrupt records skipped)",
        index.entry_count(),
        start.elapsed(),
        stats.corrupt
    );

    if let Err(e) = persist::save_to(&index, &args.index_path) {
        tracing::warn!(path = %args.index_path.display(), error = %e, "failed to write index cache");
    }

    Ok(index)
}
