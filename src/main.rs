/*!
 * Primeline CLI
 *
 * Sieves [2, MAX] through the concurrent stage pipeline and prints one
 * line per discovered prime to stdout, in ascending order, as stages
 * report them. Diagnostics go to stderr.
 */

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::thread;

use primeline::error::{Result, EXIT_SUCCESS};
use primeline::{logging, LogLevel, PipelineEvent, PipelineEventPublisher, SieveConfig};

#[derive(Parser)]
#[command(name = "primeline")]
#[command(version)]
#[command(about = "Self-extending concurrent prime sieve", long_about = None)]
struct Cli {
    /// Upper bound (inclusive) of the candidate range; sieves [2, MAX]
    #[arg(value_name = "MAX")]
    max_candidate: Option<u64>,

    /// Capacity of each stage-to-stage channel (0 = rendezvous)
    #[arg(short = 'c', long = "capacity", value_name = "N")]
    capacity: Option<usize>,

    /// Maximum number of stages the chain may grow to (0 = unlimited)
    #[arg(long = "max-stages", value_name = "N")]
    max_stages: Option<usize>,

    /// Log level
    #[arg(long = "log-level", value_enum, value_name = "LEVEL")]
    log_level: Option<LogLevelArg>,

    /// Write logs as JSON to a file instead of stderr
    #[arg(long = "log", value_name = "FILE")]
    log: Option<PathBuf>,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Load configuration from a TOML file
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a JSON run summary to stdout after the prime listing
    #[arg(long)]
    json: bool,

    /// Print a statistics summary to stderr after the run
    #[arg(long)]
    stats: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => SieveConfig::from_file(path)?,
        None => SieveConfig::default(),
    };

    // CLI flags override file values
    if let Some(max) = cli.max_candidate {
        config.max_candidate = max;
    }
    if let Some(capacity) = cli.capacity {
        config.channel_capacity = capacity;
    }
    if let Some(limit) = cli.max_stages {
        config.max_stages = limit;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.verbose {
        config.verbose = true;
    }
    if let Some(path) = cli.log {
        config.log_file = Some(path);
    }

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    // Stream one line per prime as stages report them, so everything
    // printed before a failure stands.
    let (publisher, subscriber) = PipelineEventPublisher::unbounded();
    let printer = thread::spawn(move || {
        for event in subscriber.receiver().iter() {
            if let PipelineEvent::PrimeFound { value, .. } = event {
                println!("prime {}", value);
            }
        }
    });

    let result = primeline::run_sieve_impl(&config, Some(&publisher));
    drop(publisher);
    let _ = printer.join();

    let report = result?;

    if cli.stats {
        eprintln!("{}", report.stats.format_summary());
    }

    if cli.json {
        let summary = serde_json::json!({
            "max_candidate": config.max_candidate,
            "primes_found": report.primes.len(),
            "primes": report.primes,
            "duration_ms": report.duration.as_millis() as u64,
            "stats": report.stats,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
