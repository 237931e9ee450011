use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rdeep_common::{load_config, AppConfig};
use rdeep_core::convert::{load_document, to_json};
use rdeep_core::{deep_equal_except, deep_omit, IgnoreRules};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rdeep")]
#[command(author = "RDeep Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Structural comparison of JSON and YAML documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents, ignoring selected keys
    Compare {
        /// Left document (.json, .yaml or .yml)
        left: PathBuf,

        /// Right document (.json, .yaml or .yml)
        right: PathBuf,

        #[command(flatten)]
        ignore: IgnoreArgs,

        /// Output the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a document with selected keys removed
    Omit {
        /// Document to prune (.json, .yaml or .yml)
        file: PathBuf,

        #[command(flatten)]
        ignore: IgnoreArgs,
    },
}

#[derive(Args, Clone, Debug, Default)]
struct IgnoreArgs {
    /// Key to ignore wherever it occurs (can be specified multiple times)
    #[arg(short, long = "ignore")]
    ignore: Vec<String>,

    /// Glob over dotted key paths, e.g. "meta.updatedAt" or "items.*.id"
    /// (can be specified multiple times)
    #[arg(short = 'p', long = "ignore-path")]
    ignore_paths: Vec<String>,

    /// Named ignore profile from the config file
    #[arg(long)]
    profile: Option<String>,

    /// Config file (defaults to rdeep.toml in the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not read any config file
    #[arg(long, conflicts_with = "config")]
    no_config: bool,
}

#[derive(Debug, Serialize)]
struct CompareReport {
    left: String,
    right: String,
    equal: bool,
    ignore_keys: Vec<String>,
    ignore_paths: Vec<String>,
}

fn main() {
    // Initialize tracing to stderr (so JSON output can go cleanly to stdout)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Exit code 2 is reserved for "documents differ"
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Compare {
            left,
            right,
            ignore,
            json,
        } => match run_compare(&left, &right, &ignore, json) {
            Ok(true) => 0,
            Ok(false) => 2,
            Err(e) => {
                error!("Compare failed: {:#}", e);
                1
            }
        },
        Commands::Omit { file, ignore } => match run_omit(&file, &ignore) {
            Ok(()) => 0,
            Err(e) => {
                error!("Omit failed: {:#}", e);
                1
            }
        },
    };

    std::process::exit(code);
}

fn run_compare(left: &Path, right: &Path, ignore: &IgnoreArgs, json: bool) -> Result<bool> {
    let rules = build_rules(ignore)?;

    info!("Comparing:");
    info!("  Left:  {}", left.display());
    info!("  Right: {}", right.display());

    let left_value = load_document(left)
        .with_context(|| format!("Failed to load left document {}", left.display()))?;
    let right_value = load_document(right)
        .with_context(|| format!("Failed to load right document {}", right.display()))?;

    let equal = deep_equal_except(&left_value, &right_value, &rules.to_options());

    if json {
        let report = build_report(left, right, equal, &rules);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if equal {
        println!("equal");
    } else {
        println!("different");
    }

    Ok(equal)
}

fn run_omit(file: &Path, ignore: &IgnoreArgs) -> Result<()> {
    let rules = build_rules(ignore)?;

    let value = load_document(file)
        .with_context(|| format!("Failed to load document {}", file.display()))?;
    let pruned = deep_omit(&value, &rules.to_options());
    let rendered = to_json(&pruned).context("Failed to render pruned document")?;

    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn build_rules(args: &IgnoreArgs) -> Result<IgnoreRules> {
    let config = if args.no_config {
        AppConfig::default()
    } else {
        let loaded = load_config(args.config.as_deref())?;
        if loaded.exists {
            info!("Using config: {}", loaded.path.display());
        } else if args.config.is_some() {
            anyhow::bail!("Config file does not exist: {}", loaded.path.display());
        } else {
            debug!("No config at {}, using defaults", loaded.path.display());
        }
        loaded.config
    };

    let mut rules = IgnoreRules::from_config(&config, args.profile.as_deref())?;
    rules.extend(&args.ignore, &args.ignore_paths)?;
    debug!(
        "Ignoring {} keys and {} path patterns",
        rules.keys().len(),
        rules.path_patterns().count()
    );
    Ok(rules)
}

fn build_report(left: &Path, right: &Path, equal: bool, rules: &IgnoreRules) -> CompareReport {
    CompareReport {
        left: left.display().to_string(),
        right: right.display().to_string(),
        equal,
        ignore_keys: rules.keys().to_vec(),
        ignore_paths: rules.path_patterns().map(str::to_string).collect(),
    }
}
