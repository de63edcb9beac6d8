//! Fixed account layouts of the Raydium CLMM program.
//!
//! Every account starts with an 8-byte discriminator followed by the
//! borsh-encoded fields below. Trailing padding is not decoded.

use borsh::{BorshDeserialize, BorshSerialize};
use clmm_quote_domain::entities::bitmap_extension::{
    BitmapPage, EXTENSION_TICKARRAY_BITMAP_SIZE, TickArrayBitmapExtension,
};
use clmm_quote_domain::entities::pool::{PoolSnapshot, TICK_ARRAY_BITMAP_WORDS};
use clmm_quote_domain::entities::tick::{REWARD_NUM, Tick};
use clmm_quote_domain::entities::tick_array::{TICK_ARRAY_SIZE, TickArray};
use clmm_quote_domain::error::QuoteError;
use solana_sdk::pubkey::Pubkey;

/// Bytes before the first field.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Account sizes including discriminator and padding.
pub const POOL_STATE_LEN: usize = 1544;
pub const AMM_CONFIG_LEN: usize = 117;
pub const TICK_ARRAY_LEN: usize = 10240;
pub const TICK_ARRAY_BITMAP_EXTENSION_LEN: usize = 1832;

/// Errors raised while decoding account data.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("{account} account is {len} bytes, expected at least {min}")]
    TooShort {
        account: &'static str,
        len: usize,
        min: usize,
    },
    #[error("failed to decode {account} account: {source}")]
    Decode {
        account: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Domain(#[from] QuoteError),
}

/// Decodes `T` from raw account data, skipping the discriminator.
///
/// # Errors
/// Fails when the data is shorter than `min_len` or does not decode.
pub fn decode_account<T: BorshDeserialize>(
    account: &'static str,
    data: &[u8],
    min_len: usize,
) -> Result<T, LayoutError> {
    if data.len() < min_len {
        return Err(LayoutError::TooShort {
            account,
            len: data.len(),
            min: min_len,
        });
    }
    let mut body = &data[DISCRIMINATOR_LEN..];
    T::deserialize(&mut body).map_err(|source| LayoutError::Decode { account, source })
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardInfoLayout {
    pub reward_state: u8,
    pub open_time: u64,
    pub end_time: u64,
    pub last_update_time: u64,
    pub emissions_per_second_x64: u128,
    pub reward_total_emissioned: u64,
    pub reward_claimed: u64,
    pub token_mint: [u8; 32],
    pub token_vault: [u8; 32],
    pub authority: [u8; 32],
    pub reward_growth_global_x64: u128,
}

/// `PoolState` account.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolStateLayout {
    pub bump: u8,
    pub amm_config: [u8; 32],
    pub owner: [u8; 32],
    pub token_mint_0: [u8; 32],
    pub token_mint_1: [u8; 32],
    pub token_vault_0: [u8; 32],
    pub token_vault_1: [u8; 32],
    pub observation_key: [u8; 32],
    pub mint_decimals_0: u8,
    pub mint_decimals_1: u8,
    pub tick_spacing: u16,
    pub liquidity: u128,
    pub sqrt_price_x64: u128,
    pub tick_current: i32,
    pub observation_index: u16,
    pub observation_update_duration: u16,
    pub fee_growth_global_0_x64: u128,
    pub fee_growth_global_1_x64: u128,
    pub protocol_fees_token_0: u64,
    pub protocol_fees_token_1: u64,
    pub swap_in_amount_token_0: u128,
    pub swap_out_amount_token_1: u128,
    pub swap_in_amount_token_1: u128,
    pub swap_out_amount_token_0: u128,
    pub status: u8,
    pub padding: [u8; 7],
    pub reward_infos: [RewardInfoLayout; REWARD_NUM],
    pub tick_array_bitmap: [u64; TICK_ARRAY_BITMAP_WORDS],
    pub total_fees_token_0: u64,
    pub total_fees_claimed_token_0: u64,
    pub total_fees_token_1: u64,
    pub total_fees_claimed_token_1: u64,
    pub fund_fees_token_0: u64,
    pub fund_fees_token_1: u64,
    pub open_time: u64,
}

impl PoolStateLayout {
    /// Decodes a pool account.
    ///
    /// # Errors
    /// Fails on short or malformed data.
    pub fn decode(data: &[u8]) -> Result<Self, LayoutError> {
        decode_account("pool state", data, POOL_STATE_LEN)
    }

    #[must_use]
    pub fn amm_config(&self) -> Pubkey {
        Pubkey::new_from_array(self.amm_config)
    }

    #[must_use]
    pub fn token_mint_0(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_mint_0)
    }

    #[must_use]
    pub fn token_mint_1(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_mint_1)
    }

    #[must_use]
    pub fn token_vault_0(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_vault_0)
    }

    #[must_use]
    pub fn token_vault_1(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_vault_1)
    }

    #[must_use]
    pub fn observation_key(&self) -> Pubkey {
        Pubkey::new_from_array(self.observation_key)
    }

    /// Builds the engine snapshot with the config's trade fee rate.
    ///
    /// # Errors
    /// Fails when the decoded state is inconsistent.
    pub fn to_snapshot(&self, trade_fee_rate: u32) -> Result<PoolSnapshot, LayoutError> {
        let snapshot = PoolSnapshot {
            tick_current: self.tick_current,
            sqrt_price_x64: self.sqrt_price_x64,
            liquidity: self.liquidity,
            tick_spacing: self.tick_spacing,
            fee_rate: trade_fee_rate,
            tick_array_bitmap: self.tick_array_bitmap,
            mint_decimals_0: self.mint_decimals_0,
            mint_decimals_1: self.mint_decimals_1,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// `AmmConfig` account.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmConfigLayout {
    pub bump: u8,
    pub index: u16,
    pub owner: [u8; 32],
    pub protocol_fee_rate: u32,
    /// Trade fee in millionths.
    pub trade_fee_rate: u32,
    pub tick_spacing: u16,
    pub fund_fee_rate: u32,
    pub padding_u32: u32,
    pub fund_owner: [u8; 32],
}

impl AmmConfigLayout {
    /// Decodes a config account.
    ///
    /// # Errors
    /// Fails on short or malformed data.
    pub fn decode(data: &[u8]) -> Result<Self, LayoutError> {
        decode_account("amm config", data, AMM_CONFIG_LEN)
    }
}

/// One 168-byte tick record.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStateLayout {
    pub tick: i32,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside_0_x64: u128,
    pub fee_growth_outside_1_x64: u128,
    pub reward_growths_outside_x64: [u128; REWARD_NUM],
    pub padding: [u32; 13],
}

impl From<TickStateLayout> for Tick {
    fn from(layout: TickStateLayout) -> Self {
        Self {
            tick: layout.tick,
            liquidity_net: layout.liquidity_net,
            liquidity_gross: layout.liquidity_gross,
            fee_growth_outside_0_x64: layout.fee_growth_outside_0_x64,
            fee_growth_outside_1_x64: layout.fee_growth_outside_1_x64,
            reward_growths_outside_x64: layout.reward_growths_outside_x64,
        }
    }
}

/// `TickArrayState` account.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct TickArrayLayout {
    pub pool_id: [u8; 32],
    pub start_tick_index: i32,
    pub ticks: [TickStateLayout; TICK_ARRAY_SIZE],
    pub initialized_tick_count: u8,
    pub recent_epoch: u64,
}

impl TickArrayLayout {
    /// Decodes a tick array account.
    ///
    /// # Errors
    /// Fails on short or malformed data.
    pub fn decode(data: &[u8]) -> Result<Self, LayoutError> {
        decode_account("tick array", data, TICK_ARRAY_LEN)
    }

    #[must_use]
    pub fn pool_id(&self) -> Pubkey {
        Pubkey::new_from_array(self.pool_id)
    }

    /// Converts into the engine's tick array.
    ///
    /// # Errors
    /// Fails when the start index does not fit `tick_spacing`.
    pub fn into_tick_array(self, tick_spacing: u16) -> Result<TickArray, LayoutError> {
        let ticks = self.ticks.into_iter().map(Tick::from).collect();
        Ok(TickArray::new(self.start_tick_index, tick_spacing, ticks)?)
    }
}

/// `TickArrayBitmapExtension` account.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct TickArrayBitmapExtensionLayout {
    pub pool_id: [u8; 32],
    pub positive_tick_array_bitmap: [BitmapPage; EXTENSION_TICKARRAY_BITMAP_SIZE],
    pub negative_tick_array_bitmap: [BitmapPage; EXTENSION_TICKARRAY_BITMAP_SIZE],
}

impl TickArrayBitmapExtensionLayout {
    /// Decodes a bitmap extension account.
    ///
    /// # Errors
    /// Fails on short or malformed data.
    pub fn decode(data: &[u8]) -> Result<Self, LayoutError> {
        decode_account(
            "tick array bitmap extension",
            data,
            TICK_ARRAY_BITMAP_EXTENSION_LEN,
        )
    }
}

impl From<TickArrayBitmapExtensionLayout> for TickArrayBitmapExtension {
    fn from(layout: TickArrayBitmapExtensionLayout) -> Self {
        Self {
            positive_tick_array_bitmap: layout.positive_tick_array_bitmap,
            negative_tick_array_bitmap: layout.negative_tick_array_bitmap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q64: u128 = 1 << 64;

    fn encode<T: BorshSerialize>(value: &T, len: usize) -> Vec<u8> {
        let mut data = vec![0u8; DISCRIMINATOR_LEN];
        data.extend(borsh::to_vec(value).unwrap());
        data.resize(len, 0);
        data
    }

    fn pool_layout() -> PoolStateLayout {
        let mut tick_array_bitmap = [0u64; TICK_ARRAY_BITMAP_WORDS];
        tick_array_bitmap[8] = 1;
        PoolStateLayout {
            bump: 255,
            amm_config: [1; 32],
            owner: [2; 32],
            token_mint_0: [3; 32],
            token_mint_1: [4; 32],
            token_vault_0: [5; 32],
            token_vault_1: [6; 32],
            observation_key: [7; 32],
            mint_decimals_0: 9,
            mint_decimals_1: 6,
            tick_spacing: 60,
            liquidity: 5_000_000,
            sqrt_price_x64: Q64,
            tick_current: 0,
            observation_index: 0,
            observation_update_duration: 15,
            fee_growth_global_0_x64: 0,
            fee_growth_global_1_x64: 0,
            protocol_fees_token_0: 0,
            protocol_fees_token_1: 0,
            swap_in_amount_token_0: 0,
            swap_out_amount_token_1: 0,
            swap_in_amount_token_1: 0,
            swap_out_amount_token_0: 0,
            status: 0,
            padding: [0; 7],
            reward_infos: [RewardInfoLayout::default(); REWARD_NUM],
            tick_array_bitmap,
            total_fees_token_0: 0,
            total_fees_claimed_token_0: 0,
            total_fees_token_1: 0,
            total_fees_claimed_token_1: 0,
            fund_fees_token_0: 0,
            fund_fees_token_1: 0,
            open_time: 0,
        }
    }

    #[test]
    fn test_pool_state_field_offsets() {
        let data = encode(&pool_layout(), POOL_STATE_LEN);
        // mint decimals, tick spacing, liquidity and sqrt price follow the
        // seven pubkeys after the bump.
        assert_eq!(data[233], 9);
        assert_eq!(data[234], 6);
        assert_eq!(u16::from_le_bytes([data[235], data[236]]), 60);
        assert_eq!(data[237], 0x40);
        // Default bitmap starts at byte 904.
        assert_eq!(data[904 + 8 * 8], 1);

        let decoded = PoolStateLayout::decode(&data).unwrap();
        assert_eq!(decoded, pool_layout());
        assert_eq!(decoded.token_mint_0(), Pubkey::new_from_array([3; 32]));
    }

    #[test]
    fn test_pool_state_to_snapshot() {
        let snapshot = pool_layout().to_snapshot(2500).unwrap();
        assert_eq!(snapshot.fee_rate, 2500);
        assert_eq!(snapshot.tick_spacing, 60);
        assert_eq!(snapshot.tick_array_bitmap[8], 1);
        assert_eq!(snapshot.mint_decimals_0, 9);

        let mut broken = pool_layout();
        broken.tick_current = 500;
        assert!(matches!(
            broken.to_snapshot(2500),
            Err(LayoutError::Domain(QuoteError::InconsistentState(_)))
        ));
    }

    #[test]
    fn test_short_account_rejected() {
        assert!(matches!(
            PoolStateLayout::decode(&[0u8; 100]),
            Err(LayoutError::TooShort { len: 100, .. })
        ));
        assert!(matches!(
            TickArrayLayout::decode(&[]),
            Err(LayoutError::TooShort { .. })
        ));
    }

    #[test]
    fn test_tick_array_decode() {
        let mut ticks = [TickStateLayout::default(); TICK_ARRAY_SIZE];
        for (i, tick) in ticks.iter_mut().enumerate() {
            tick.tick = -3600 + 60 * i as i32;
        }
        ticks[3].liquidity_net = -42;
        ticks[3].liquidity_gross = 42;
        let layout = TickArrayLayout {
            pool_id: [9; 32],
            start_tick_index: -3600,
            ticks,
            initialized_tick_count: 1,
            recent_epoch: 7,
        };
        let data = encode(&layout, TICK_ARRAY_LEN);
        // Ticks start after pool id and start index; each record is 168 bytes.
        assert_eq!(
            i32::from_le_bytes(data[44 + 168..48 + 168].try_into().unwrap()),
            -3540
        );

        let decoded = TickArrayLayout::decode(&data).unwrap();
        assert_eq!(decoded.pool_id(), Pubkey::new_from_array([9; 32]));
        let array = decoded.into_tick_array(60).unwrap();
        assert_eq!(array.start_tick_index, -3600);
        assert_eq!(array.initialized_tick_count(), 1);
        assert_eq!(array.ticks()[3].liquidity_net, -42);
    }

    #[test]
    fn test_tick_array_rejects_wrong_spacing() {
        let layout = TickArrayLayout {
            pool_id: [0; 32],
            start_tick_index: 60,
            ticks: [TickStateLayout::default(); TICK_ARRAY_SIZE],
            initialized_tick_count: 0,
            recent_epoch: 0,
        };
        assert!(matches!(
            layout.into_tick_array(10),
            Err(LayoutError::Domain(QuoteError::InvalidTickArrayStartIndex { .. }))
        ));
    }

    #[test]
    fn test_amm_config_decode() {
        let config = AmmConfigLayout {
            bump: 1,
            index: 4,
            owner: [0; 32],
            protocol_fee_rate: 120_000,
            trade_fee_rate: 2_500,
            tick_spacing: 60,
            fund_fee_rate: 40_000,
            padding_u32: 0,
            fund_owner: [0; 32],
        };
        let data = encode(&config, AMM_CONFIG_LEN);
        assert_eq!(u32::from_le_bytes(data[47..51].try_into().unwrap()), 2_500);
        assert_eq!(AmmConfigLayout::decode(&data).unwrap(), config);
    }

    #[test]
    fn test_bitmap_extension_decode() {
        let mut layout = TickArrayBitmapExtensionLayout {
            pool_id: [0; 32],
            positive_tick_array_bitmap: [[0; 8]; EXTENSION_TICKARRAY_BITMAP_SIZE],
            negative_tick_array_bitmap: [[0; 8]; EXTENSION_TICKARRAY_BITMAP_SIZE],
        };
        layout.positive_tick_array_bitmap[0][0] = 1;
        layout.negative_tick_array_bitmap[13][7] = 1 << 63;
        let data = encode(&layout, TICK_ARRAY_BITMAP_EXTENSION_LEN);
        assert_eq!(data.len(), 8 + 32 + 2 * 14 * 8 * 8);

        let extension: TickArrayBitmapExtension =
            TickArrayBitmapExtensionLayout::decode(&data).unwrap().into();
        assert_eq!(extension.positive_tick_array_bitmap[0][0], 1);
        assert_eq!(extension.negative_tick_array_bitmap[13][7], 1 << 63);
        assert!(!extension.is_empty());
    }
}
