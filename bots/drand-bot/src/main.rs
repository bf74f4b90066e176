use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cosmwasm_std::Timestamp;
use drand_bot::{plan_next_round, BeaconSource, BotConfig, FetchError, HttpBeaconSource};
use drand_common::verify_beacon;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// drand relay bot
#[derive(Parser, Debug)]
#[command(name = "drand-bot")]
#[command(about = "Relays drand beacons into a registry contract", long_about = None)]
struct Opts {
    /// Path to YAML config file
    #[arg(long, default_value = "drand-bot.yaml")]
    config: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a round and verify it against the configured network
    Check {
        #[arg(long)]
        round: u64,
    },
    /// Print the round the bot would submit next
    Plan {
        /// Highest round the registry has verified
        #[arg(long)]
        latest: Option<u64>,
        /// Lowest round the registry accepts
        #[arg(long, default_value = "1")]
        min_round: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&opts.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BotConfig::from_file(&opts.config)
        .with_context(|| format!("loading {}", opts.config.display()))?;
    let network = config.network()?;
    let settings = config.settings();

    match opts.command {
        Command::Check { round } => {
            let source = HttpBeaconSource::new(
                config.drand.endpoints.clone(),
                network.chain_hash.clone(),
                settings.fetch_timeout,
            )?;
            let beacon = settings
                .retry
                .retry("fetch", || source.fetch(round), |_: &FetchError| true)
                .await?;
            if beacon.round != round {
                bail!("endpoint returned round {} for {}", beacon.round, round);
            }
            let randomness = verify_beacon(&beacon, &network, 1)
                .with_context(|| format!("round {} failed verification", round))?;
            info!(round, scheme = %network.scheme, "beacon verified");
            println!("round:      {}", round);
            println!("randomness: {}", hex::encode(randomness));
            println!("published:  {}", network.time_of_round(round).nanos());
        }
        Command::Plan { latest, min_round } => {
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?;
            let current = network.current_round(Timestamp::from_nanos(now.as_nanos() as u64));
            match plan_next_round(latest, current, min_round, settings.max_gap) {
                Some(round) => println!("{}", round),
                None => println!("caught up at round {}", current),
            }
        }
    }

    Ok(())
}
