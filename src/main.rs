//! Polymarket Redeemer — Entry Point
//!
//! Redeems resolved Polymarket positions, and splits or merges
//! collateral, through a gasless proxy or Safe wallet.
//!
//! Wiring sequence:
//! 1. Parse CLI arguments
//! 2. Load config.toml (defaults when absent) + validate
//! 3. Init tracing (JSON structured logging)
//! 4. Load signing key and funder from env (POLY_PRIVATE_KEY, POLYMARKET_PROXY_ADDRESS)
//! 5. Resolve network contracts and wallet type
//! 6. Load builder auth from env (BUILDER_KEY, BUILDER_SECRET, BUILDER_PASSPHRASE)
//! 7. Create data API and relay HTTP clients
//! 8. Connect the RPC provider (chain id checked) + gas estimator
//! 9. Build the wallet strategy for the wallet type
//! 10. Run the requested command and print a JSON report

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use polymarket_redeemer::adapters::api::auth::BuilderAuth;
use polymarket_redeemer::adapters::api::client::{ApiClient, ApiClientConfig};
use polymarket_redeemer::adapters::api::data_api::DataApiPositionIndex;
use polymarket_redeemer::adapters::api::relayer::{HttpRelayer, RelayerSafeExecutor};
use polymarket_redeemer::adapters::chain::{GasEstimator, PolygonChainClient, PolygonProvider};
use polymarket_redeemer::adapters::events::TracingEventSink;
use polymarket_redeemer::config::loader::{self, Secrets};
use polymarket_redeemer::config::AppConfig;
use polymarket_redeemer::domain::network::{NetworkConfig, SAFE_INIT_CODE_HASH};
use polymarket_redeemer::domain::position::parse_condition_id;
use polymarket_redeemer::domain::proxy::derive_safe_address;
use polymarket_redeemer::domain::signature::to_checksum_address;
use polymarket_redeemer::domain::wallet::WalletType;
use polymarket_redeemer::ports::chain_client::ChainClient;
use polymarket_redeemer::ports::relayer::{RelayerClient, SafeExecutor};
use polymarket_redeemer::usecases::redemption::{resolve_owner, RedemptionService, ReportSummary};
use polymarket_redeemer::usecases::resolution::ResolutionReader;
use polymarket_redeemer::usecases::wallet_strategy::{StrategyDeps, WalletStrategy};

/// Redeem, split and merge Polymarket conditional-token positions.
#[derive(Parser, Debug)]
#[command(name = "polymarket-redeemer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Redeem the given condition ids
    Redeem {
        /// Condition ids (0x-prefixed, 32 bytes)
        #[arg(required = true)]
        condition_ids: Vec<String>,
        /// Conditions per transaction (overrides config)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Redeem every redeemable position of the wallet
    RedeemAll {
        /// Conditions per transaction (overrides config)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Split collateral into a full set of outcome tokens
    Split(AmountArgs),
    /// Merge a full set of outcome tokens back into collateral
    Merge(AmountArgs),
    /// Show resolution state and redeemable balance of a condition
    Status {
        /// Condition id
        condition_id: String,
    },
}

#[derive(Args, Debug)]
struct AmountArgs {
    /// Condition id
    condition_id: String,
    /// Amount in USDC (6 decimals)
    amount: Decimal,
    /// Route through the neg-risk adapter
    #[arg(long)]
    neg_risk: bool,
}

#[derive(Serialize)]
struct StatusReport {
    condition_id: String,
    owner: String,
    resolved: bool,
    winning_outcomes: Vec<u64>,
    redeemable: Vec<BalanceLine>,
}

#[derive(Serialize)]
struct BalanceLine {
    outcome_index: u64,
    balance: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Parse CLI ────────────────────────────────────────
    let cli = Cli::parse();

    // ── 2. Load configuration ───────────────────────────────
    let config = loader::load_or_default(&cli.config).context("Failed to load configuration")?;

    // ── 3. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level)),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        chain_id = config.network.chain_id,
        "Starting Polymarket Redeemer"
    );

    // ── 4. Secrets from env ─────────────────────────────────
    let secrets = Secrets::from_env().context("Failed to load wallet secrets from env")?;
    let funder = secrets.funder_or(&config)?;
    let owner = resolve_owner(funder, secrets.signer.address());

    // ── 5. Network + wallet type ────────────────────────────
    let network = NetworkConfig::for_chain(config.network.chain_id)?;
    let wallet_type = WalletType::try_from(config.wallet.signature_type)?;
    info!(
        wallet = %wallet_type,
        signer = %to_checksum_address(&secrets.signer.address()),
        owner = %to_checksum_address(&owner),
        network = network.name,
        "Wallet resolved"
    );

    // ── 6–8. Clients and chain access ───────────────────────
    let chain = connect_chain(&config, &network).await?;

    if let Command::Status { condition_id } = &cli.command {
        return print_status(chain, network, condition_id, owner).await;
    }

    let service = build_service(&config, network, wallet_type, secrets, chain, owner)?;
    let batch_default = config.redeem.batch_size;

    // ── 10. Run the command ─────────────────────────────────
    match cli.command {
        Command::Redeem {
            condition_ids,
            batch_size,
        } => {
            let report = service
                .redeem(condition_ids, batch_size.unwrap_or(batch_default))
                .await
                .context("Redeem failed")?;
            print_json(&ReportSummary::from(&report))?;
        }
        Command::RedeemAll { batch_size } => {
            let report = service
                .redeem_all(batch_size.unwrap_or(batch_default))
                .await
                .context("Redeem-all failed")?;
            if report.is_empty() {
                info!("Nothing to redeem");
            }
            print_json(&ReportSummary::from(&report))?;
        }
        Command::Split(args) => {
            let result = service
                .split(&args.condition_id, args.amount, args.neg_risk)
                .await
                .context("Split failed")?;
            print_json(&result)?;
        }
        Command::Merge(args) => {
            let result = service
                .merge(&args.condition_id, args.amount, args.neg_risk)
                .await
                .context("Merge failed")?;
            print_json(&result)?;
        }
        Command::Status { .. } => {}
    }

    Ok(())
}

/// Connect the RPC provider and wrap it with the gas estimator.
async fn connect_chain(config: &AppConfig, network: &NetworkConfig) -> Result<Arc<dyn ChainClient>> {
    let provider = Arc::new(
        PolygonProvider::connect(&config.network.rpc_url, network)
            .await
            .context("Failed to connect RPC provider")?,
    );
    let gas = GasEstimator::new(config.network.rpc_url.clone(), config.network.timeout())?;
    Ok(Arc::new(PolygonChainClient::new(provider, gas)))
}

/// Wire the redemption service for `wallet_type`.
fn build_service(
    config: &AppConfig,
    network: NetworkConfig,
    wallet_type: WalletType,
    secrets: Secrets,
    chain: Arc<dyn ChainClient>,
    owner: Address,
) -> Result<RedemptionService> {
    let builder_auth = BuilderAuth::from_env()
        .context("Failed to load builder credentials from env")?
        .map(Arc::new);
    if builder_auth.is_none() && wallet_type.requires_relayer() {
        warn!("BUILDER_KEY not set, relay submissions will be unauthenticated");
    }

    let data_api = Arc::new(ApiClient::new(
        ApiClientConfig {
            timeout: config.network.timeout(),
            ..ApiClientConfig::with_base_url(&config.network.data_api_url)
        },
        None,
    )?);
    let relay_api = Arc::new(ApiClient::new(
        ApiClientConfig {
            timeout: config.network.timeout(),
            ..ApiClientConfig::with_base_url(&config.network.relayer_url)
        },
        builder_auth,
    )?);

    // ── 9. Wallet strategy ──────────────────────────────────
    let relayer = Arc::new(HttpRelayer::new(relay_api, config.redeem.poll_interval()));
    let (relayer_client, safe_executor): (Option<Arc<dyn RelayerClient>>, Option<Arc<dyn SafeExecutor>>) =
        match wallet_type {
            WalletType::Eoa => (None, None),
            WalletType::Proxy => (Some(relayer as Arc<dyn RelayerClient>), None),
            WalletType::Safe => {
                let executor = RelayerSafeExecutor::new(
                    relayer,
                    secrets.signer.clone(),
                    network.clone(),
                    config.redeem.max_polls,
                );
                info!(
                    safe = %derive_safe_address(&secrets.signer.address(), &network.safe.safe_factory, &SAFE_INIT_CODE_HASH),
                    "Safe wallet"
                );
                (None, Some(Arc::new(executor) as Arc<dyn SafeExecutor>))
            }
        };

    let strategy = WalletStrategy::new(
        wallet_type,
        StrategyDeps {
            chain,
            network: network.clone(),
            signer: secrets.signer,
            relayer: relayer_client,
            safe_executor,
            max_polls: config.redeem.max_polls,
        },
    )?;

    Ok(RedemptionService::new(
        strategy,
        Arc::new(DataApiPositionIndex::new(data_api)),
        Arc::new(TracingEventSink),
        network,
        owner,
    ))
}

/// Print resolution state and the owner's redeemable balance.
async fn print_status(
    chain: Arc<dyn ChainClient>,
    network: NetworkConfig,
    condition_id: &str,
    owner: Address,
) -> Result<()> {
    let condition = parse_condition_id(condition_id)?;
    let reader = ResolutionReader::new(chain, network);

    let resolved = reader.is_condition_resolved(condition).await?;
    let winning_outcomes = reader.winning_outcome_indexes(condition).await?;
    let redeemable = reader
        .redeemable_balance(condition, owner)
        .await?
        .into_iter()
        .map(|b| BalanceLine {
            outcome_index: b.index,
            balance: b.balance,
        })
        .collect();

    print_json(&StatusReport {
        condition_id: condition_id.to_string(),
        owner: to_checksum_address(&owner),
        resolved,
        winning_outcomes,
        redeemable,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{out}");
    Ok(())
}
