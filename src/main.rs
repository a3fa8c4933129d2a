//! Vanity Commit CLI
//!
//! Rewrites the HEAD commit of the current repository so that its id starts
//! with a chosen hex prefix.
//!
//! # Commands
//!
//! - `mine` - Search for a nonce and amend HEAD with it
//! - `benchmark` - Measure incremental search throughput against direct hashing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use vanity::config::{default_config_path, MinerConfig};
use vanity::engine::{search, CommitPayload, DesiredPrefix, SearchParams};
use vanity::git::GitCli;
use vanity::rewrite::{self, Outcome};

/// Synthetic commit used by `benchmark`
const BENCH_BODY: &[u8] = b"tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
author Bench <bench@example.com> 1700000000 +0000\n\
committer Bench <bench@example.com> 1700000000 +0000\n\
\n\
benchmark\n";

/// Prefix no benchmark-sized nonce space is expected to hit
const BENCH_PREFIX: &str = "ffffffff";

#[derive(Parser)]
#[command(name = "vanity-commit")]
#[command(author = "Cyberia")]
#[command(version = "0.1.0")]
#[command(about = "Rewrite a git commit so its hash starts with a chosen hex prefix")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a nonce for HEAD and amend it
    Mine {
        /// Hex prefix the new commit id should start with
        prefix: String,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Nonce characters to append (default: prefix length + 2)
        #[arg(short, long)]
        nonce_length: Option<usize>,

        /// Nonce alphabet: `base36`, `hex`, or literal characters
        #[arg(short, long)]
        alphabet: Option<String>,

        /// Leading nonce characters fixed per work partition
        #[arg(long)]
        partition_chars: Option<usize>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Search only, leave the commit untouched
        #[arg(long)]
        dry_run: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Nonce length to enumerate exhaustively
        #[arg(short, long, default_value = "4")]
        depth: usize,
    },
}

/// Command-line overrides for [`MinerConfig`]
struct MineArgs {
    threads: Option<usize>,
    nonce_length: Option<usize>,
    alphabet: Option<String>,
    partition_chars: Option<usize>,
    timeout: Option<u64>,
    dry_run: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Mine {
            prefix,
            threads,
            nonce_length,
            alphabet,
            partition_chars,
            timeout,
            dry_run,
            json,
        } => {
            let args = MineArgs {
                threads,
                nonce_length,
                alphabet,
                partition_chars,
                timeout,
                dry_run,
            };
            cmd_mine(&prefix, args, json, cli.config)
        }
        Commands::Benchmark { depth } => cmd_benchmark(depth),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Merge the config file with command-line overrides.
fn build_config(config_path: Option<PathBuf>, args: MineArgs) -> anyhow::Result<MinerConfig> {
    let mut config = match config_path {
        Some(path) => MinerConfig::load(&path)?,
        None => match default_config_path() {
            Some(path) => MinerConfig::load_or_default(&path)?,
            None => MinerConfig::default(),
        },
    };

    if let Some(threads) = args.threads {
        config.workers = Some(threads);
    }
    if let Some(len) = args.nonce_length {
        config.nonce_length = Some(len);
    }
    if let Some(alphabet) = args.alphabet {
        config.alphabet = alphabet;
    }
    if let Some(chars) = args.partition_chars {
        config.partition_chars = chars;
    }
    if let Some(secs) = args.timeout {
        config.timeout_secs = Some(secs);
    }
    config.dry_run |= args.dry_run;

    Ok(config)
}

fn cmd_mine(
    prefix: &str,
    args: MineArgs,
    json: bool,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let prefix: DesiredPrefix = prefix.parse()?;
    let config = build_config(config_path, args)?;
    let workers = config.workers.unwrap_or_else(num_cpus::get).max(1);

    if !json {
        println!("Searching for prefix {}...", prefix);
        println!("Alphabet: {}", config.alphabet);
        println!("Threads: {}", workers);
    }

    let store = GitCli::new(".");
    let outcome = rewrite::run(&store, "HEAD", prefix, &config, workers)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    println!("\nFound nonce!");
    println!("Nonce: {}", outcome.nonce);
    println!("Commit: {}", outcome.digest);
    println!("Hashes computed: {}", outcome.candidates);
    println!("Time elapsed: {:.2}s", outcome.elapsed_secs);
    println!("Hashrate: {:.2} H/s", outcome.hashrate);

    if !outcome.applied {
        println!("\nDry run: commit left unchanged.");
    }
}

fn cmd_benchmark(depth: usize) -> anyhow::Result<()> {
    let payload = CommitPayload::new(BENCH_BODY);
    let params = SearchParams::new(BENCH_PREFIX.parse()?, Default::default(), Some(depth))?;
    let space = params.alphabet().space_size(depth);

    println!("Running benchmark over {} nonces...", space);

    let report = search(&payload, &params)?;

    // Same candidates, each hashed from scratch
    let chars = params.alphabet().as_bytes();
    let start = Instant::now();
    let mut nonce = vec![chars[0]; depth];
    let mut indices = vec![0usize; depth];
    for _ in 0..report.candidates {
        std::hint::black_box(payload.object_id(&nonce));
        for pos in (0..depth).rev() {
            indices[pos] += 1;
            if indices[pos] < chars.len() {
                nonce[pos] = chars[indices[pos]];
                break;
            }
            indices[pos] = 0;
            nonce[pos] = chars[0];
        }
    }
    let direct = start.elapsed();
    let direct_rate = report.candidates as f64 / direct.as_secs_f64().max(f64::EPSILON);

    println!("\nResults:");
    println!("  Total hashes: {}", report.candidates);
    println!("  Incremental: {:.2}s ({:.2} H/s)", report.elapsed.as_secs_f64(), report.hashrate());
    println!("  Direct:      {:.2}s ({:.2} H/s)", direct.as_secs_f64(), direct_rate);
    if direct_rate > 0.0 {
        println!("  Speedup: {:.2}x", report.hashrate() / direct_rate);
    }
    if report.result.is_found() {
        println!("\nNote: benchmark prefix was hit; timings cover a partial space.");
    }

    Ok(())
}
