use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;
use serde_json::json;

use xchain_swap::balance::{BalanceService, BalanceSnapshot, RpcBalanceSource};
use xchain_swap::chain::ChainClient;
use xchain_swap::config::{Settings, PRIVATE_KEY_VAR};
use xchain_swap::core::wallet_manager::WalletManager;
use xchain_swap::pricing::QuoteEstimator;
use xchain_swap::registry::builtin::BSC_TESTNET_CHAIN_ID;
use xchain_swap::registry::ChainRegistry;
use xchain_swap::swap::{NotificationLevel, OrchestratorConfig, RpcGateway, SwapForm, SwapOrchestrator};
use xchain_swap::wallet::{LocalWalletProvider, WalletSession};

#[derive(Parser, Debug)]
#[command(name = "xchain-swap")]
#[command(about = "Swap tokens between BSC Testnet and BNW Chain", long_about = None)]
struct Args {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Chain the wallet starts on
    #[arg(long, global = true, default_value_t = BSC_TESTNET_CHAIN_ID)]
    chain: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show balances on the active chain
    Balances,
    /// Estimate the minimum output for an amount
    Quote { amount: String },
    /// Move the wallet to another chain
    Switch { chain_id: u64 },
    /// Swap to the paired chain
    Swap {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        min_out: Option<String>,
        /// Token address on the active chain (default: its native asset)
        #[arg(long)]
        from: Option<String>,
        /// Token address on the paired chain (default: its native asset)
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    if let Command::Quote { amount } = &args.command {
        let quote = QuoteEstimator::default()
            .estimate(xchain_swap::swap::request::parse_positive_amount(amount)?);
        if args.json {
            println!(
                "{}",
                json!({
                    "amount_in": quote.amount_in.to_string(),
                    "amount_out_min": quote.amount_out_min_display(),
                    "price_impact_pct": quote.price_impact_display(),
                })
            );
        } else {
            println!("Minimum received: {}", quote.amount_out_min_display());
            println!("Price impact:     {}%", quote.price_impact_display());
        }
        return Ok(());
    }

    let settings = Settings::from_env()?;
    let registry = Arc::new(settings.registry()?);
    let mut orchestrator = build_orchestrator(&settings, registry, args.chain)?;

    let result = run(&mut orchestrator, &args).await;
    for notification in orchestrator.drain_notifications() {
        let level = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{}] {}: {}", level, notification.title, notification.description);
    }
    result
}

fn build_orchestrator(
    settings: &Settings,
    registry: Arc<ChainRegistry>,
    initial_chain_id: u64,
) -> Result<SwapOrchestrator, Box<dyn Error>> {
    let wallet = Arc::new(WalletManager::from_env(PRIVATE_KEY_VAR)?);
    let mut clients = Vec::new();
    for chain in registry.chains() {
        let client = ChainClient::new(chain.id, settings.rpc_urls(chain)?, settings.rpc_timeout_secs)?;
        info!("chain {} ({}) via {:?}", chain.id, chain.name, client.rpc_urls());
        clients.push(Arc::new(client));
    }

    let provider = Arc::new(LocalWalletProvider::new(wallet.clone(), clients.clone(), initial_chain_id));
    let session = WalletSession::new(provider, registry.clone(), initial_chain_id)?;
    let balances = BalanceService::new(Arc::new(RpcBalanceSource::new(clients.clone())));
    let gateway = Arc::new(RpcGateway::new(
        wallet,
        clients,
        settings.confirmation_timeout_secs,
        settings.poll_interval_secs,
    ));
    let config = OrchestratorConfig {
        fee_value: settings.fee_value,
        ..OrchestratorConfig::default()
    };

    Ok(SwapOrchestrator::new(
        registry,
        session,
        balances,
        QuoteEstimator::default(),
        gateway,
        config,
    ))
}

async fn run(orchestrator: &mut SwapOrchestrator, args: &Args) -> Result<(), Box<dyn Error>> {
    orchestrator.connect().await?;

    match &args.command {
        Command::Quote { .. } => {}
        Command::Balances => print_snapshot(orchestrator, args.json),
        Command::Switch { chain_id } => {
            orchestrator.switch_chain(*chain_id).await?;
            print_snapshot(orchestrator, args.json);
        }
        Command::Swap { amount, min_out, from, to } => {
            let session = orchestrator.session().session();
            let default_from = session.from_token.map(|a| a.checksum()).unwrap_or_default();
            let default_to = session.to_token.map(|a| a.checksum()).unwrap_or_default();
            let mut form = SwapForm::new(
                from.as_deref().unwrap_or(&default_from),
                to.as_deref().unwrap_or(&default_to),
                amount,
            );
            if let Some(min_out) = min_out {
                form = form.with_min_out(min_out);
            }

            let outcome = orchestrator.submit(&form).await?;
            if args.json {
                println!(
                    "{}",
                    json!({
                        "tx_hash": outcome.receipt.tx_hash,
                        "block_number": outcome.receipt.block_number,
                        "amount_in": outcome.request.amount_in.human(),
                        "amount_out_min": outcome.request.amount_out_min.human(),
                        "dst_chain_id": outcome.request.dst_chain_id,
                        "deadline": outcome.request.deadline,
                        "balances": outcome.balances,
                    })
                );
            } else {
                println!("Swap confirmed: {} (block {})", outcome.receipt.tx_hash, outcome.receipt.block_number);
                if let Some(snapshot) = &outcome.balances {
                    print_text_snapshot(orchestrator.registry(), snapshot);
                }
            }
        }
    }
    Ok(())
}

fn print_snapshot(orchestrator: &SwapOrchestrator, as_json: bool) {
    let Some(snapshot) = orchestrator.snapshot() else {
        return;
    };
    if as_json {
        println!("{}", json!(snapshot));
    } else {
        print_text_snapshot(orchestrator.registry(), snapshot);
    }
}

fn print_text_snapshot(registry: &ChainRegistry, snapshot: &BalanceSnapshot) {
    let Ok(chain) = registry.resolve(snapshot.chain_id) else {
        return;
    };
    println!("{} on {} ({})", snapshot.account, chain.name, chain.id);
    for token in &chain.tokens {
        let balance = snapshot.get(&token.address).unwrap_or("-");
        println!("  {} {:<6} {}", token.glyph, token.symbol, balance);
    }
}
