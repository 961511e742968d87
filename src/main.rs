//! Entry point for the round-trip swap bot.
//!
//! Loads configuration, builds the signer and RPC client, runs exactly one
//! buy-then-sell round trip, and exits. A program error inside the landed
//! transaction is a reported outcome; only pipeline failures exit non-zero.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(dead_code)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roundtrip::config::Config;
use roundtrip::engine::{run_once, RunParams};
use roundtrip::rpc::RpcChainClient;
use roundtrip::wallet::Wallet;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("starting round-trip swap bot v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;
    let params = RunParams::from_config(&config).context("invalid run parameters")?;

    let wallet = load_wallet(&config).context("failed to load wallet")?;
    info!(wallet = %wallet.pubkey(), endpoint = %config.rpc.endpoint, "run configured");

    let client = RpcChainClient::new(&config.rpc.endpoint);

    match run_once(&client, &wallet, &params).await {
        Ok(outcome) => {
            match outcome.program_error {
                Some(err) => info!(signature = %outcome.signature, program_error = %err, "run finished"),
                None => info!(signature = %outcome.signature, "run finished"),
            }
            Ok(())
        }
        Err(e) => {
            error!(category = e.category(), error = %e, "run failed");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "roundtrip=debug,info"
    } else {
        "roundtrip=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Load configuration from file with fallback to defaults.
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("failed to load config from {path}"))
    } else {
        warn!("config file '{path}' not found, using defaults");
        dotenvy::dotenv().ok();
        let mut config = Config::default();
        if let Ok(endpoint) = std::env::var("RPC_URL") {
            config.rpc.endpoint = endpoint;
        }
        Ok(config)
    }
}

/// MAIN_KP takes precedence over the keypair file.
fn load_wallet(config: &Config) -> Result<Wallet> {
    match std::env::var("MAIN_KP") {
        Ok(encoded) if !encoded.trim().is_empty() => Wallet::from_base58(&encoded),
        _ => Wallet::from_file(&config.wallet.keypair_path),
    }
}
