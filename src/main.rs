use clap::{Parser, Subcommand};
use memoless::application::tracker::DepositTracker;
use memoless::application::workflow::MemolessWorkflow;
use memoless::domain::encoding::{self, InputMode};
use memoless::domain::ports::{ApiHandle, ThornodeApi};
use memoless::infrastructure::thornode::{self, ThornodeClient};
use miette::{IntoDiagnostic, Result, miette};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Node base URL (use the stagenet URL to test against stagenet)
    #[arg(long, default_value = thornode::MAINNET_URL)]
    node: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode an amount so its trailing digits carry the reference ID
    Encode {
        /// Amount in asset units (or USD with --price)
        input: String,
        /// Reference ID digits, leading zeros significant
        reference_id: String,
        /// Decimal places of the target asset
        #[arg(long, default_value_t = 8)]
        decimals: u32,
        /// Treat the input as USD at this asset price
        #[arg(long)]
        price: Option<f64>,
    },
    /// Check whether an amount carries the given reference ID
    Validate {
        amount: String,
        reference_id: String,
        #[arg(long, default_value_t = 8)]
        decimals: u32,
    },
    /// List assets eligible for a memoless deposit
    Assets,
    /// Look up the reference registered by a transaction hash
    Reference { tx_hash: String },
    /// Follow a submitted deposit through the observation pipeline
    Track {
        hash: String,
        #[arg(long, default_value_t = 3)]
        interval_secs: u64,
        #[arg(long, default_value_t = 200)]
        max_attempts: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Encode {
            input,
            reference_id,
            decimals,
            price,
        } => {
            let mode = if price.is_some() {
                InputMode::Usd
            } else {
                InputMode::Asset
            };
            let enc = encoding::encode(&input, mode, &reference_id, decimals, price);
            for warning in &enc.warnings {
                println!("warning: {warning}");
            }
            if enc.is_valid() {
                println!("final amount: {}", enc.final_amount);
                println!("base amount:  {}", enc.base_amount);
            } else {
                for error in &enc.errors {
                    eprintln!("error: {error}");
                }
                return Err(miette!("encoding failed"));
            }
        }
        Command::Validate {
            amount,
            reference_id,
            decimals,
        } => {
            if encoding::validate(&amount, &reference_id, decimals) {
                println!("{amount} carries reference {reference_id}");
            } else {
                return Err(miette!("{amount} does not carry reference {reference_id}"));
            }
        }
        Command::Assets => {
            let api = client(&cli.node)?;
            let workflow = MemolessWorkflow::new(api, Arc::new(NoBroadcast));
            for asset in workflow.eligible_assets().await.into_diagnostic()? {
                println!("{asset}");
            }
        }
        Command::Reference { tx_hash } => {
            let api = client(&cli.node)?;
            let registration = api
                .memo_lookup(&tx_hash)
                .await
                .into_diagnostic()?
                .ok_or_else(|| miette!("no reference registered by {tx_hash}"))?;
            let height = api.last_block_height().await.into_diagnostic()?;
            println!("asset:        {}", registration.asset);
            println!("reference ID: {}", registration.reference_id);
            println!(
                "uses:         {}/{}",
                registration.usage_count, registration.max_use
            );
            println!(
                "expires:      height {} (~{}s)",
                registration.expiry_height,
                registration.estimated_time_remaining(height).as_secs()
            );
        }
        Command::Track {
            hash,
            interval_secs,
            max_attempts,
        } => {
            let api = client(&cli.node)?;
            let mut tracker = DepositTracker::new(api, &hash)
                .with_poll_interval(Duration::from_secs(interval_secs))
                .with_max_attempts(max_attempts);
            let terminal = tracker
                .track_with(|snapshot| {
                    if let Some(stage) = snapshot.progress.current() {
                        println!("[{}] {}", snapshot.attempts, stage.label());
                    }
                })
                .await;
            println!("finished: {:?}", terminal.status);
        }
    }

    Ok(())
}

fn client(node: &str) -> Result<ApiHandle> {
    let client = ThornodeClient::new(node).into_diagnostic()?;
    Ok(Arc::new(client))
}

/// The CLI has no signing collaborator; registration is wallet-side.
struct NoBroadcast;

#[async_trait::async_trait]
impl memoless::domain::ports::DepositBroadcaster for NoBroadcast {
    async fn broadcast_deposit(
        &self,
        _asset: &memoless::domain::asset::AssetId,
        _amount: &str,
        _memo: &str,
    ) -> memoless::error::Result<String> {
        Err(memoless::error::MemolessError::BroadcastFailed(
            "no signing wallet attached".to_string(),
        ))
    }
}
