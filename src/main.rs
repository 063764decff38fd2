//! `okx-dex` command line client.
//!
//! Settings come from the environment (and `.env`) unless `--config` names a
//! TOML file. Every command prints its result as pretty JSON on stdout; logs
//! go to stderr.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use okx_dex_sdk::models::TransactionOrdersQuery;
use okx_dex_sdk::observability::logging;
use okx_dex_sdk::{BalancePercent, OkxDexClient, Settings, Slippage};

#[derive(Parser)]
#[command(name = "okx-dex")]
#[command(about = "Quotes, swaps and wallet queries through the OKX DEX aggregator", long_about = None)]
struct Cli {
    /// TOML settings file; defaults to environment variables and `.env`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured log level when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List chains supported by the aggregator
    Chains,
    /// List tradable tokens on a chain
    Tokens {
        #[arg(long)]
        chain: String,
    },
    /// Quote a swap of a human-readable amount
    Quote {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        fee_percent: Option<String>,
    },
    /// Execute a swap of a human-readable amount
    Swap {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "0.005")]
        slippage: Slippage,
        /// Defaults to the configured wallet for the chain.
        #[arg(long)]
        wallet: Option<String>,
    },
    /// Swap a fraction (0, 1] of the wallet's from-token balance
    SwapPercent {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        percent: BalancePercent,
        #[arg(long, default_value = "0.005")]
        slippage: Slippage,
        #[arg(long)]
        wallet: Option<String>,
    },
    /// Approve the aggregator to spend a token (amount in base units)
    Approve {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        amount: String,
    },
    /// Token balances of a wallet
    Balance {
        /// Chain ids; with --token only the first is used.
        #[arg(long, value_delimiter = ',', required = true)]
        chains: Vec<String>,
        #[arg(long)]
        wallet: String,
        /// Query only these tokens instead of all holdings.
        #[arg(long, value_delimiter = ',')]
        token: Vec<String>,
    },
    /// Orders submitted through the OKX broadcast endpoint
    Orders {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        chain: Option<String>,
        #[arg(long)]
        order_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Latest token price, or the daily close on --date (YYYY-MM-DD)
    Price {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Status of a swap by transaction hash
    History {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        tx_hash: String,
        #[arg(long)]
        from_my_project: bool,
    },
    /// Wallet address derived from the configured private key
    Address {
        #[arg(long)]
        chain: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_toml_file(path)?,
        None => Settings::from_env()?,
    };
    let level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    logging::init(level)?;

    tracing::info!("okx-dex v{} starting", env!("CARGO_PKG_VERSION"));

    let client = OkxDexClient::new(settings)?;

    match cli.command {
        Commands::Chains => print_json(&client.get_supported_chains().await?)?,
        Commands::Tokens { chain } => print_json(&client.get_tokens(&chain).await?)?,
        Commands::Quote {
            chain,
            from,
            to,
            amount,
            fee_percent,
        } => {
            let quote = client
                .get_quote(&chain, &from, &to, &amount, fee_percent.as_deref())
                .await?;
            eprintln!("{}", quote.price_comparison());
            print_json(&quote)?;
        }
        Commands::Swap {
            chain,
            from,
            to,
            amount,
            slippage,
            wallet,
        } => {
            let wallet = resolve_wallet(&client, &chain, wallet)?;
            let result = client
                .execute_swap(&chain, &from, &to, &amount, slippage, &wallet)
                .await?;
            print_json(&result)?;
        }
        Commands::SwapPercent {
            chain,
            from,
            to,
            percent,
            slippage,
            wallet,
        } => {
            let wallet = resolve_wallet(&client, &chain, wallet)?;
            let result = client
                .execute_swap_via_balance_percent(&chain, &from, &to, percent, slippage, &wallet)
                .await?;
            print_json(&result)?;
        }
        Commands::Approve {
            chain,
            token,
            amount,
        } => {
            let tx_hash = client.approve(&chain, &token, &amount).await?;
            print_json(&serde_json::json!({ "txHash": tx_hash }))?;
        }
        Commands::Balance {
            chains,
            wallet,
            token,
        } => {
            let balances = if token.is_empty() {
                client.get_all_token_balances(&chains, &wallet).await?
            } else {
                client.get_token_balance(&chains[0], &wallet, &token).await?
            };
            print_json(&balances)?;
        }
        Commands::Orders {
            address,
            chain,
            order_id,
            status,
            limit,
        } => {
            let query = TransactionOrdersQuery {
                address,
                chain_index: chain,
                order_id,
                tx_status: status,
                limit,
                ..Default::default()
            };
            print_json(&client.get_transaction_orders(&query).await?)?;
        }
        Commands::Price { chain, token, date } => match date {
            Some(date) => {
                let price = client.get_historical_price(&chain, &token, date).await?;
                print_json(&serde_json::json!({ "date": date, "price": price }))?;
            }
            None => print_json(&client.get_token_price(&chain, &token).await?)?,
        },
        Commands::History {
            chain,
            tx_hash,
            from_my_project,
        } => {
            let history = client
                .get_swap_history(&chain, &tx_hash, from_my_project)
                .await?;
            print_json(&history)?;
        }
        Commands::Address { chain } => {
            let address = client.wallet_address(&chain)?;
            print_json(&serde_json::json!({ "chainId": chain, "address": address }))?;
        }
    }

    Ok(())
}

fn resolve_wallet(
    client: &OkxDexClient,
    chain: &str,
    wallet: Option<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    match wallet {
        Some(wallet) => Ok(wallet),
        None => Ok(client.wallet_address(chain)?),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
