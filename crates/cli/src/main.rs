//! Command Line Interface for the CLMM quote engine.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clmm_quote_domain::enums::SwapDirection;
use clmm_quote_domain::value_objects::{Price, TokenAmount};
use clmm_quote_protocols::raydium::{Cluster, RaydiumClmmAdapter, RaydiumClmmConfig};
use clmm_quote_protocols::rpc::RpcProvider;
use clmm_quote_protocols::{DexAdapter, SwapQuote};
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::env;
use tracing::debug;

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Parser)]
#[command(name = "clmm-quote")]
#[command(about = "Swap quotes for Raydium concentrated-liquidity pools", long_about = None)]
struct Cli {
    /// RPC endpoint, falls back to SOLANA_RPC_URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Cluster the pool lives on
    #[arg(long, global = true, value_enum, default_value_t = ClusterArg::Mainnet)]
    cluster: ClusterArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ClusterArg {
    Mainnet,
    Devnet,
}

impl From<ClusterArg> for Cluster {
    fn from(arg: ClusterArg) -> Self {
        match arg {
            ClusterArg::Mainnet => Cluster::Mainnet,
            ClusterArg::Devnet => Cluster::Devnet,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current pool price
    Price {
        /// Pool address
        #[arg(long)]
        pool: Pubkey,
    },
    /// Quote a swap
    Quote {
        /// Pool address
        #[arg(long)]
        pool: Pubkey,

        /// Mint paid in
        #[arg(long)]
        input_mint: Pubkey,

        /// Raw amount of the input mint (output mint with --exact-output)
        #[arg(long)]
        amount: u64,

        /// Slippage tolerance in basis points
        #[arg(long, default_value_t = 50)]
        slippage_bps: u32,

        /// Treat the amount as the exact output wanted
        #[arg(long)]
        exact_output: bool,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct QuoteReport {
    pool: String,
    input_mint: String,
    output_mint: String,
    mode: String,
    amount_in: u64,
    amount_out: u64,
    fee_amount: u64,
    other_amount_threshold: u64,
    slippage_bps: u32,
    fully_filled: bool,
    termination: String,
    price_after: Decimal,
    execution_price: Option<Decimal>,
    tick_after: i32,
    remaining_accounts: Vec<String>,
}

impl QuoteReport {
    fn new(adapter: &RaydiumClmmAdapter, quote: &SwapQuote) -> Result<Self> {
        let snapshot = adapter.snapshot();
        let result = &quote.quote.result;
        let (decimals_in, decimals_out) = if quote.input_mint == adapter.pool_state().token_mint_0() {
            (snapshot.mint_decimals_0, snapshot.mint_decimals_1)
        } else {
            (snapshot.mint_decimals_1, snapshot.mint_decimals_0)
        };
        let price_after = Price::from_sqrt_price_x64(
            result.sqrt_price_x64,
            snapshot.mint_decimals_0,
            snapshot.mint_decimals_1,
        )?;
        let execution_price = Price::execution(
            TokenAmount::new(result.amount_in, decimals_in),
            TokenAmount::new(result.amount_out, decimals_out),
        )?;

        Ok(Self {
            pool: adapter.pool_address().to_string(),
            input_mint: quote.input_mint.to_string(),
            output_mint: quote.output_mint.to_string(),
            mode: format!("{:?}", quote.quote.mode),
            amount_in: result.amount_in,
            amount_out: result.amount_out,
            fee_amount: result.fee_amount,
            other_amount_threshold: quote.quote.other_amount_threshold,
            slippage_bps: quote.quote.slippage.to_bps(),
            fully_filled: result.fully_filled,
            termination: format!("{:?}", result.termination),
            price_after: price_after.value,
            execution_price: execution_price.map(|p| p.value),
            tick_after: result.tick_current,
            remaining_accounts: quote
                .remaining_accounts
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let rpc_url = cli
        .rpc_url
        .clone()
        .or_else(|| env::var("SOLANA_RPC_URL").ok())
        .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
    debug!(rpc_url = %rpc_url, "Using RPC endpoint");
    let rpc = RpcProvider::new(rpc_url);
    let config = RaydiumClmmConfig::new().with_cluster(cli.cluster.into());

    match &cli.command {
        Commands::Price { pool } => {
            let adapter = RaydiumClmmAdapter::load(rpc, *pool, config)
                .await
                .with_context(|| format!("Failed to load pool {pool}"))?;
            let state = adapter.pool_state();
            let price = adapter.spot_price()?;

            println!("Pool:       {pool}");
            println!("Mint 0:     {}", state.token_mint_0());
            println!("Mint 1:     {}", state.token_mint_1());
            println!("Tick:       {}", adapter.snapshot().tick_current);
            println!("Liquidity:  {}", adapter.snapshot().liquidity);
            println!("Fee rate:   {} / 1000000", adapter.snapshot().fee_rate);
            println!("Price:      {price} (mint 1 per mint 0)");
        }
        Commands::Quote {
            pool,
            input_mint,
            amount,
            slippage_bps,
            exact_output,
            json,
        } => {
            let adapter = RaydiumClmmAdapter::load(rpc, *pool, config)
                .await
                .with_context(|| format!("Failed to load pool {pool}"))?;
            let quote = if *exact_output {
                let direction = adapter.direction_for_input(input_mint)?;
                let output_mint = match direction {
                    SwapDirection::ZeroForOne => adapter.pool_state().token_mint_1(),
                    SwapDirection::OneForZero => adapter.pool_state().token_mint_0(),
                };
                adapter.quote_exact_output(&output_mint, *amount, *slippage_bps)?
            } else {
                adapter.quote(input_mint, *amount, *slippage_bps)?
            };
            let report = QuoteReport::new(&adapter, &quote)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Quote");
            println!("════════════════════════════════════");
            println!("Mode:          {}", report.mode);
            println!("Amount in:     {}", report.amount_in);
            println!("Amount out:    {}", report.amount_out);
            println!("Fee:           {}", report.fee_amount);
            match quote.quote.min_amount_out() {
                Some(min) => println!("Min out:       {min} ({} bps)", report.slippage_bps),
                None => println!(
                    "Max in:        {} ({} bps)",
                    report.other_amount_threshold, report.slippage_bps
                ),
            }
            if let Some(price) = report.execution_price {
                println!("Exec price:    {price}");
            }
            println!("Price after:   {}", report.price_after);
            println!("Filled:        {} ({})", report.fully_filled, report.termination);
            println!("Tick arrays:   {}", quote.quote.result.touched_tick_arrays.len());
            println!("════════════════════════════════════");
        }
    }

    Ok(())
}
