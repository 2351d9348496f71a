//! CoucheStor LRC CLI
//!
//! Small driver around the library: encode and repair a demo stripe, ask the
//! planner what to load for a set of broken shards, or dump a choice table.
//!
//! ```text
//! couchestor-lrc demo --payload love --lose 0,3
//! couchestor-lrc policy --available 1,2 --broken 0
//! couchestor-lrc --data-shards 6 --global-shards 2 choices
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use couchestor_lrc::ec::LocalGroup;
use couchestor_lrc::policy::choices;
use couchestor_lrc::{metrics, LrcCodec, LrcConfig, PolicyFactory, Result};

// =============================================================================
// CLI Arguments
// =============================================================================

/// CoucheStor LRC - local reconstruction codes and repair planning
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON or YAML); overrides the shard count flags
    #[arg(long, env = "LRC_CONFIG")]
    config: Option<PathBuf>,

    /// Number of data shards
    #[arg(long, env = "LRC_DATA_SHARDS", default_value = "4")]
    data_shards: usize,

    /// Number of local parity shards
    #[arg(long, env = "LRC_LOCAL_SHARDS", default_value = "2")]
    local_shards: usize,

    /// Number of global parity shards
    #[arg(long, env = "LRC_GLOBAL_SHARDS", default_value = "3")]
    global_shards: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Print Prometheus metrics after the command
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a payload, drop shards, repair and verify
    Demo {
        /// Payload to encode
        #[arg(long, default_value = "love")]
        payload: String,

        /// Shard indices to drop, comma separated
        #[arg(long, value_delimiter = ',')]
        lose: Vec<usize>,
    },

    /// Print the shards to load for a repair
    Policy {
        /// Shards already in hand, comma separated
        #[arg(long, value_delimiter = ',')]
        available: Vec<usize>,

        /// Shards known to be broken, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        broken: Vec<usize>,
    },

    /// Print the bit-packed choice table for the layout
    Choices,
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoReport {
    config: LrcConfig,
    lost: Vec<usize>,
    repair: &'static str,
    verified: bool,
    recovered: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PolicyReport {
    available: Vec<usize>,
    broken: Vec<usize>,
    load: Vec<usize>,
    /// Local group a lone broken shard is rebuilt in
    #[serde(skip_serializing_if = "Option::is_none")]
    repair_group: Option<LocalGroup>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChoicesReport {
    config: LrcConfig,
    embedded: bool,
    count: usize,
    choices: Vec<u64>,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = match &args.config {
        Some(path) => LrcConfig::from_file(path)?,
        None => LrcConfig::new(args.data_shards, args.local_shards, args.global_shards),
    };
    config.validate()?;
    info!(
        data_shards = config.data_shards,
        local_shards = config.local_shards,
        global_shards = config.global_shards,
        overhead = config.storage_overhead(),
        "Loaded LRC configuration"
    );

    let output = match &args.command {
        Command::Demo { payload, lose } => run_demo(config, payload, lose)?,
        Command::Policy { available, broken } => run_policy(config, available, broken)?,
        Command::Choices => run_choices(config)?,
    };
    println!("{}", output);

    if args.metrics {
        print!("{}", metrics::render()?);
    }
    Ok(())
}

fn run_demo(config: LrcConfig, payload: &str, lose: &[usize]) -> Result<String> {
    let codec = LrcCodec::with_layout(config.layout()?)?;
    let shards = codec.encode_data(payload.as_bytes())?;

    let mut stripe: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
    for &i in lose {
        match stripe.get_mut(i) {
            Some(slot) => *slot = None,
            None => warn!(shard = i, "Ignoring out-of-range shard"),
        }
    }

    let repair = if stripe.iter().all(Option::is_some) {
        "none"
    } else if codec.local_repair(&mut stripe).is_ok() && stripe.iter().all(Option::is_some) {
        "local"
    } else {
        codec.global_repair(&mut stripe)?;
        "global"
    };

    let repaired: Vec<Vec<u8>> = stripe.iter().flatten().cloned().collect();
    let verified = codec.verify(&repaired)?;
    let recovered = codec.decode_data(&mut stripe, payload.len())?;

    let report = DemoReport {
        config,
        lost: lose.to_vec(),
        repair,
        verified,
        recovered: String::from_utf8_lossy(&recovered).into_owned(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn run_policy(config: LrcConfig, available: &[usize], broken: &[usize]) -> Result<String> {
    let factory = build_factory(config)?;
    let load = factory.generate_policy(available, broken)?;
    let repair_group = match (available, broken) {
        ([], [single]) => factory.repair_group(*single),
        _ => None,
    };

    let report = PolicyReport {
        available: available.to_vec(),
        broken: broken.to_vec(),
        load,
        repair_group,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn run_choices(config: LrcConfig) -> Result<String> {
    let layout = config.layout()?;
    let (embedded, table) = match choices::precomputed(&layout) {
        Some(table) => (true, table.to_vec()),
        None => (false, choices::derive_table(&layout)?),
    };

    let report = ChoicesReport {
        config,
        embedded,
        count: table.len(),
        choices: table,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Embedded table when one ships, derived otherwise
fn build_factory(config: LrcConfig) -> Result<PolicyFactory> {
    let layout = config.layout()?;
    match choices::precomputed(&layout) {
        Some(_) => PolicyFactory::new(config.data_shards, config.local_shards, config.global_shards),
        None => {
            info!("No embedded choice table, deriving one");
            let table = choices::derive_table(&layout)?;
            PolicyFactory::with_table(
                config.data_shards,
                config.local_shards,
                config.global_shards,
                &table,
            )
        }
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries the JSON report
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
