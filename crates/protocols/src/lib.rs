//! On-chain protocol adapters.
//!
//! This crate loads concentrated-liquidity pool accounts over RPC, decodes
//! them into domain types and builds swap instructions from quotes.

/// Raydium CLMM adapter.
pub mod raydium;
/// RPC access.
pub mod rpc;

use anyhow::Result;
use async_trait::async_trait;
use clmm_quote_domain::enums::{Protocol, SwapDirection};
use clmm_quote_domain::entities::pool::PoolSnapshot;
use clmm_quote_simulation::quote::Quote;
use rust_decimal::Decimal;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

/// A quote bound to concrete mints and the accounts the swap will touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuote {
    /// Mint paid in.
    pub input_mint: Pubkey,
    /// Mint received.
    pub output_mint: Pubkey,
    /// Requested amount: input for exact input, output for exact output.
    pub amount: u64,
    /// Engine quote, including the slippage threshold.
    pub quote: Quote,
    /// Accounts appended after the fixed swap accounts.
    pub remaining_accounts: Vec<Pubkey>,
}

impl SwapQuote {
    #[must_use]
    pub fn direction(&self) -> SwapDirection {
        self.quote.direction
    }
}

/// Read and swap capability of one loaded pool.
#[async_trait]
pub trait DexAdapter: Send + Sync {
    /// Program family of the pool.
    fn protocol(&self) -> Protocol;

    /// Pool account address.
    fn pool_address(&self) -> Pubkey;

    /// Snapshot the quote engine runs against.
    fn snapshot(&self) -> &PoolSnapshot;

    /// Token 1 per token 0 in UI units.
    fn spot_price(&self) -> Result<Decimal>;

    /// Exact-input quote for `amount` of `input_mint`.
    fn quote(&self, input_mint: &Pubkey, amount: u64, slippage_bps: u32) -> Result<SwapQuote>;

    /// Swap instruction executing `quote` for `payer`.
    fn swap_instruction(&self, quote: &SwapQuote, payer: &Pubkey) -> Result<Instruction>;

    /// Reloads pool state from the chain.
    async fn refresh(&mut self) -> Result<()>;
}
