//! CLI entrypoint for `breach-import`.
//!
//! `import` walks a directory of credential dumps, loads every recovered
//! account/password pair into a SQLite lookup store in batches, prints a
//! terminal summary, and optionally writes CSV/TXT reports. `check` answers
//! whether a password (or its SHA-512) is already in the store.
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use breach_import::{
    config::{DEFAULT_BATCH_SIZE, IngestConfig, Separators},
    digest::digest,
    export::{save_failures_txt, save_file_reports_csv},
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    report::render_summary,
    store::{CountingStore, SqliteStore},
    walker::{CorpusOutcome, collect_corpus, ingest_corpus, ingest_corpus_parallel},
};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::{LevelFilter, error, info};

#[derive(Parser, Debug)]
#[command(
    name = "breach-import",
    version,
    about = "Load credential dumps into a breached-password lookup store"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import every file under a directory
    Import(ImportArgs),
    /// Check whether a password has been seen
    Check(CheckArgs),
}

#[derive(ClapArgs, Debug)]
struct ImportArgs {
    /// Directory (or single file) holding the dumps
    import_directory: PathBuf,

    /// Path to the SQLite store
    #[arg(long = "db", default_value = "passwords.db")]
    db: PathBuf,

    /// Lines processed between two commits
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Field separator; repeat for several. Defaults to ';' and ':'
    #[arg(short = 's', long = "separator")]
    separators: Vec<String>,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Ingest files in parallel, one store connection per file
    #[arg(long = "parallel")]
    parallel: bool,

    /// Stop at the first file that fails
    #[arg(long = "fail-fast")]
    fail_fast: bool,

    /// Parse and hash without writing to the store
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Path to the output directory for CSV/TXT reports
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Suppress summary output (still writes reports if -o is provided)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(ClapArgs, Debug)]
struct CheckArgs {
    /// Path to the SQLite store
    #[arg(long = "db", default_value = "passwords.db")]
    db: PathBuf,

    /// Cleartext password to look up
    #[arg(long = "password", conflicts_with = "digest", required_unless_present = "digest")]
    password: Option<String>,

    /// SHA-512 hex digest to look up
    #[arg(long = "digest")]
    digest: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn build_config(args: &ImportArgs) -> Result<IngestConfig> {
    if !args.import_directory.exists() {
        bail!("import path not found: {}", args.import_directory.display());
    }
    let separators = if args.separators.is_empty() {
        Separators::default()
    } else {
        Separators::new(args.separators.iter().map(|s| s.as_bytes().to_vec()))?
    };
    Ok(IngestConfig::new(args.batch_size, separators)?.with_mmap_threshold(args.mmap_threshold))
}

fn run_import(args: ImportArgs) -> ExitCode {
    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };
    info!(
        "importing all accounts/passwords from {}",
        args.import_directory.display()
    );
    let paths = collect_corpus(&args.import_directory);
    info!("{} files found", paths.len());

    let outcome: CorpusOutcome = if args.dry_run {
        ingest_corpus(&paths, &config, &mut CountingStore::default(), args.fail_fast)
    } else if args.parallel {
        ingest_corpus_parallel(&paths, &config, || SqliteStore::open(&args.db), args.fail_fast)
    } else {
        match SqliteStore::open(&args.db) {
            Ok(mut store) => ingest_corpus(&paths, &config, &mut store, args.fail_fast),
            Err(e) => {
                error!("failed to open store {}: {}", args.db.display(), e);
                return ExitCode::from(2);
            }
        }
    };

    if !args.quiet {
        println!("{}", render_summary(&outcome));
    }

    if let Some(outdir) = &args.output {
        if let Err(e) = fs::create_dir_all(outdir) {
            error!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            );
            return ExitCode::from(4);
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S");
        let csv = outdir.join(format!("breach_import_files_{}.csv", ts));
        if let Err(e) = save_file_reports_csv(&outcome, &csv) {
            error!("failed to write {}: {}", csv.display(), e);
            return ExitCode::from(5);
        }
        if !outcome.is_success() {
            let txt = outdir.join(format!("breach_import_failures_{}.txt", ts));
            if let Err(e) = save_failures_txt(&outcome, &txt) {
                error!("failed to write {}: {}", txt.display(), e);
                return ExitCode::from(5);
            }
        }
    }

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        error!("{} file(s) failed to import", outcome.failures.len());
        ExitCode::from(3)
    }
}

fn run_check(args: CheckArgs) -> ExitCode {
    let wanted = match (&args.password, &args.digest) {
        (Some(pw), _) => digest(pw),
        (None, Some(d)) => d.clone(),
        (None, None) => {
            error!("either --password or --digest is required");
            return ExitCode::from(2);
        }
    };
    if !args.db.exists() {
        error!("store not found: {}", args.db.display());
        return ExitCode::from(2);
    }
    let found = SqliteStore::open(&args.db).and_then(|store| store.contains_digest(&wanted));
    match found {
        Ok(true) => {
            println!("{}", "FOUND".bold().red());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("{}", "NOT FOUND".bold().green());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("lookup failed: {}", e);
            ExitCode::from(2)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    // Configure color policy
    match cli.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    match cli.command {
        Command::Import(args) => run_import(args),
        Command::Check(args) => run_check(args),
    }
}
