//! Loads a Raydium CLMM pool and quotes swaps against it.

use super::constants::Cluster;
use super::instruction::{SwapV2Accounts, SwapV2Args, swap_v2};
use super::layout::{
    AmmConfigLayout, PoolStateLayout, TickArrayBitmapExtensionLayout, TickArrayLayout,
};
use super::pda::{RaydiumPda, associated_token_address};
use crate::rpc::RpcProvider;
use crate::{DexAdapter, SwapQuote};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clmm_quote_domain::entities::bitmap_extension::TickArrayBitmapExtension;
use clmm_quote_domain::entities::pool::PoolSnapshot;
use clmm_quote_domain::entities::tick_array::tick_array_start_index;
use clmm_quote_domain::enums::{Protocol, SwapDirection, SwapMode};
use clmm_quote_simulation::bitmap::BitmapNavigator;
use clmm_quote_simulation::quote::{Quote, QuoteComputer};
use clmm_quote_simulation::state::EngineConfig;
use clmm_quote_simulation::store::InMemoryTickArrayStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

/// Adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaydiumClmmConfig {
    /// Cluster whose program id is used.
    pub cluster: Cluster,
    /// Initialised tick arrays fetched on each side of the current one.
    pub tick_arrays_per_side: usize,
    /// Quote engine settings.
    pub engine: EngineConfig,
}

impl Default for RaydiumClmmConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Mainnet,
            tick_arrays_per_side: 7,
            engine: EngineConfig::default(),
        }
    }
}

impl RaydiumClmmConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = cluster;
        self
    }

    #[must_use]
    pub fn with_tick_arrays_per_side(mut self, tick_arrays_per_side: usize) -> Self {
        self.tick_arrays_per_side = tick_arrays_per_side;
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

/// Decoded on-chain state of one pool.
#[derive(Debug, Clone)]
struct PoolAccounts {
    pool_state: PoolStateLayout,
    amm_config: AmmConfigLayout,
    snapshot: PoolSnapshot,
    extension: TickArrayBitmapExtension,
    store: InMemoryTickArrayStore,
}

/// Raydium CLMM pool loaded for quoting.
pub struct RaydiumClmmAdapter {
    rpc: RpcProvider,
    config: RaydiumClmmConfig,
    pda: RaydiumPda,
    accounts: PoolAccounts,
}

impl RaydiumClmmAdapter {
    /// Fetches and decodes the pool, its config, bitmap extension and the
    /// initialised tick arrays around the current price.
    pub async fn load(rpc: RpcProvider, pool: Pubkey, config: RaydiumClmmConfig) -> Result<Self> {
        let pda = RaydiumPda::new(config.cluster.program_id(), pool);
        let accounts = fetch_pool_accounts(&rpc, &pda, config.tick_arrays_per_side).await?;
        info!(
            pool = %pool,
            tick = accounts.snapshot.tick_current,
            liquidity = accounts.snapshot.liquidity,
            tick_arrays = accounts.store.len(),
            "Loaded Raydium CLMM pool"
        );
        Ok(Self {
            rpc,
            config,
            pda,
            accounts,
        })
    }

    /// Builds an adapter from already fetched account data.
    ///
    /// `tick_array_data` may contain `None` for arrays that do not exist.
    pub fn from_account_data(
        rpc: RpcProvider,
        pool: Pubkey,
        config: RaydiumClmmConfig,
        pool_data: &[u8],
        extension_data: Option<&[u8]>,
        amm_config_data: &[u8],
        tick_array_data: &[Option<Vec<u8>>],
    ) -> Result<Self> {
        let pda = RaydiumPda::new(config.cluster.program_id(), pool);
        let (pool_state, extension) = decode_pool(&pda, pool_data, extension_data)?;
        let accounts =
            assemble_accounts(&pda, pool_state, extension, amm_config_data, tick_array_data)?;
        Ok(Self {
            rpc,
            config,
            pda,
            accounts,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RaydiumClmmConfig {
        &self.config
    }

    #[must_use]
    pub fn pda(&self) -> &RaydiumPda {
        &self.pda
    }

    #[must_use]
    pub fn pool_state(&self) -> &PoolStateLayout {
        &self.accounts.pool_state
    }

    #[must_use]
    pub fn amm_config(&self) -> &AmmConfigLayout {
        &self.accounts.amm_config
    }

    #[must_use]
    pub fn extension(&self) -> &TickArrayBitmapExtension {
        &self.accounts.extension
    }

    #[must_use]
    pub fn tick_arrays(&self) -> &InMemoryTickArrayStore {
        &self.accounts.store
    }

    /// Swap direction for `input_mint`.
    pub fn direction_for_input(&self, input_mint: &Pubkey) -> Result<SwapDirection> {
        let state = &self.accounts.pool_state;
        if *input_mint == state.token_mint_0() {
            Ok(SwapDirection::ZeroForOne)
        } else if *input_mint == state.token_mint_1() {
            Ok(SwapDirection::OneForZero)
        } else {
            bail!("Mint {input_mint} is not part of pool {}", self.pda.pool())
        }
    }

    /// Exact-output quote for `amount_out` of `output_mint`.
    pub fn quote_exact_output(
        &self,
        output_mint: &Pubkey,
        amount_out: u64,
        slippage_bps: u32,
    ) -> Result<SwapQuote> {
        let direction = self.direction_for_input(output_mint)?.opposite();
        let quote = self
            .computer()
            .quote_exact_output_with_slippage(direction, amount_out, slippage_bps)
            .context("Failed to quote exact output swap")?;
        Ok(self.bind_quote(amount_out, quote))
    }

    fn computer(&self) -> QuoteComputer<'_, InMemoryTickArrayStore, RaydiumPda> {
        QuoteComputer::new(
            &self.accounts.snapshot,
            Some(&self.accounts.extension),
            &self.accounts.store,
            &self.pda,
        )
        .with_config(self.config.engine.clone())
    }

    fn bind_quote(&self, amount: u64, quote: Quote) -> SwapQuote {
        let state = &self.accounts.pool_state;
        let (input_mint, output_mint) = match quote.direction {
            SwapDirection::ZeroForOne => (state.token_mint_0(), state.token_mint_1()),
            SwapDirection::OneForZero => (state.token_mint_1(), state.token_mint_0()),
        };
        let remaining_accounts = self.remaining_accounts(&quote);
        SwapQuote {
            input_mint,
            output_mint,
            amount,
            quote,
            remaining_accounts,
        }
    }

    /// Bitmap extension, the nearest initialised array behind the current
    /// price if any, then every array the swap traverses.
    fn remaining_accounts(&self, quote: &Quote) -> Vec<Pubkey> {
        let snapshot = &self.accounts.snapshot;
        let navigator = BitmapNavigator::new(
            snapshot.tick_spacing,
            &snapshot.tick_array_bitmap,
            Some(&self.accounts.extension),
        );
        let current_start = tick_array_start_index(snapshot.tick_current, snapshot.tick_spacing);
        let behind = navigator
            .next_initialized_tick_array(current_start, quote.direction.opposite())
            .unwrap_or_else(|err| {
                debug!(error = %err, "No tick array behind the current price");
                None
            });

        let mut accounts = Vec::with_capacity(2 + quote.result.touched_tick_array_addresses.len());
        accounts.push(self.pda.tick_array_bitmap_extension());
        accounts.extend(behind.map(|start| self.pda.tick_array(start)));
        accounts.extend(quote.result.touched_tick_array_addresses.iter().copied());
        accounts
    }
}

#[async_trait]
impl DexAdapter for RaydiumClmmAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::RaydiumClmm
    }

    fn pool_address(&self) -> Pubkey {
        self.pda.pool()
    }

    fn snapshot(&self) -> &PoolSnapshot {
        &self.accounts.snapshot
    }

    fn spot_price(&self) -> Result<Decimal> {
        Ok(self.accounts.snapshot.spot_price()?)
    }

    fn quote(&self, input_mint: &Pubkey, amount: u64, slippage_bps: u32) -> Result<SwapQuote> {
        let direction = self.direction_for_input(input_mint)?;
        let quote = self
            .computer()
            .quote_with_slippage(direction, amount, slippage_bps)
            .context("Failed to quote swap")?;
        debug!(
            pool = %self.pda.pool(),
            amount_in = quote.result.amount_in,
            amount_out = quote.result.amount_out,
            threshold = quote.other_amount_threshold,
            "Quoted swap"
        );
        Ok(self.bind_quote(amount, quote))
    }

    fn swap_instruction(&self, quote: &SwapQuote, payer: &Pubkey) -> Result<Instruction> {
        let state = &self.accounts.pool_state;
        let (input_vault, output_vault) = match quote.direction() {
            SwapDirection::ZeroForOne => (state.token_vault_0(), state.token_vault_1()),
            SwapDirection::OneForZero => (state.token_vault_1(), state.token_vault_0()),
        };
        let accounts = SwapV2Accounts {
            program_id: self.pda.program_id(),
            payer: *payer,
            amm_config: state.amm_config(),
            pool_state: self.pda.pool(),
            input_token_account: associated_token_address(payer, &quote.input_mint),
            output_token_account: associated_token_address(payer, &quote.output_mint),
            input_vault,
            output_vault,
            observation_state: state.observation_key(),
            input_vault_mint: quote.input_mint,
            output_vault_mint: quote.output_mint,
            remaining_accounts: quote.remaining_accounts.clone(),
        };
        let args = SwapV2Args {
            amount: quote.amount,
            other_amount_threshold: quote.quote.other_amount_threshold,
            sqrt_price_limit_x64: 0,
            is_base_input: quote.quote.mode == SwapMode::ExactInput,
        };
        Ok(swap_v2(&accounts, &args))
    }

    async fn refresh(&mut self) -> Result<()> {
        self.accounts =
            fetch_pool_accounts(&self.rpc, &self.pda, self.config.tick_arrays_per_side).await?;
        debug!(
            pool = %self.pda.pool(),
            tick = self.accounts.snapshot.tick_current,
            "Refreshed pool state"
        );
        Ok(())
    }
}

async fn fetch_pool_accounts(
    rpc: &RpcProvider,
    pda: &RaydiumPda,
    tick_arrays_per_side: usize,
) -> Result<PoolAccounts> {
    let pool = pda.pool();
    let extension_address = pda.tick_array_bitmap_extension();
    let mut fetched = rpc
        .get_multiple_account_data(&[pool, extension_address])
        .await?
        .into_iter();
    let pool_data = fetched
        .next()
        .flatten()
        .with_context(|| format!("Pool account {pool} not found"))?;
    let extension_data = fetched.next().flatten();
    let (pool_state, extension) = decode_pool(pda, &pool_data, extension_data.as_deref())?;

    let starts = plan_tick_arrays(&pool_state, &extension, tick_arrays_per_side)?;
    let mut addresses = Vec::with_capacity(starts.len() + 1);
    addresses.push(pool_state.amm_config());
    addresses.extend(starts.iter().map(|start| pda.tick_array(*start)));
    let mut fetched = rpc.get_multiple_account_data(&addresses).await?.into_iter();
    let amm_config_data = fetched
        .next()
        .flatten()
        .with_context(|| format!("Amm config {} not found", pool_state.amm_config()))?;
    let tick_array_data: Vec<Option<Vec<u8>>> = fetched.collect();

    assemble_accounts(pda, pool_state, extension, &amm_config_data, &tick_array_data)
}

fn decode_pool(
    pda: &RaydiumPda,
    pool_data: &[u8],
    extension_data: Option<&[u8]>,
) -> Result<(PoolStateLayout, TickArrayBitmapExtension)> {
    let pool_state = PoolStateLayout::decode(pool_data)
        .with_context(|| format!("Failed to decode pool {}", pda.pool()))?;
    let extension = match extension_data {
        Some(data) => TickArrayBitmapExtensionLayout::decode(data)
            .context("Failed to decode tick array bitmap extension")?
            .into(),
        None => {
            warn!(pool = %pda.pool(), "Tick array bitmap extension not found, assuming empty");
            TickArrayBitmapExtension::default()
        }
    };
    Ok((pool_state, extension))
}

/// Start indices of the initialised arrays worth fetching.
fn plan_tick_arrays(
    pool_state: &PoolStateLayout,
    extension: &TickArrayBitmapExtension,
    per_side: usize,
) -> Result<Vec<i32>> {
    let navigator = BitmapNavigator::new(
        pool_state.tick_spacing,
        &pool_state.tick_array_bitmap,
        Some(extension),
    );
    let current_start = tick_array_start_index(pool_state.tick_current, pool_state.tick_spacing);
    let starts = navigator
        .initialized_tick_arrays_around(current_start, per_side)
        .context("Failed to plan tick arrays")?;
    debug!(current_start, count = starts.len(), "Planned tick arrays");
    Ok(starts)
}

fn assemble_accounts(
    pda: &RaydiumPda,
    pool_state: PoolStateLayout,
    extension: TickArrayBitmapExtension,
    amm_config_data: &[u8],
    tick_array_data: &[Option<Vec<u8>>],
) -> Result<PoolAccounts> {
    let amm_config = AmmConfigLayout::decode(amm_config_data).context("Failed to decode amm config")?;
    let snapshot = pool_state
        .to_snapshot(amm_config.trade_fee_rate)
        .with_context(|| format!("Invalid state for pool {}", pda.pool()))?;

    let mut store = InMemoryTickArrayStore::new();
    for data in tick_array_data {
        let Some(data) = data else {
            warn!(pool = %pda.pool(), "Planned tick array does not exist");
            continue;
        };
        let layout = TickArrayLayout::decode(data).context("Failed to decode tick array")?;
        if layout.pool_id() != pda.pool() {
            bail!(
                "Tick array {} belongs to pool {}",
                layout.start_tick_index,
                layout.pool_id()
            );
        }
        store.insert(layout.into_tick_array(snapshot.tick_spacing)?);
    }

    Ok(PoolAccounts {
        pool_state,
        amm_config,
        snapshot,
        extension,
        store,
    })
}
