//! Program derived addresses of the Raydium CLMM program.

use super::constants::{
    AMM_CONFIG_SEED, ASSOCIATED_TOKEN_PROGRAM_ID, OBSERVATION_SEED, POOL_SEED,
    POOL_TICK_ARRAY_BITMAP_SEED, POOL_VAULT_SEED, TICK_ARRAY_SEED, TOKEN_PROGRAM_ID,
};
use clmm_quote_simulation::address::TickArrayAddressResolver;
use solana_sdk::pubkey::Pubkey;

/// Derives the accounts belonging to one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaydiumPda {
    program_id: Pubkey,
    pool: Pubkey,
}

impl RaydiumPda {
    #[must_use]
    pub fn new(program_id: Pubkey, pool: Pubkey) -> Self {
        Self { program_id, pool }
    }

    #[must_use]
    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    #[must_use]
    pub fn pool(&self) -> Pubkey {
        self.pool
    }

    /// Tick array account; the start index is seeded big-endian.
    #[must_use]
    pub fn tick_array(&self, start_index: i32) -> Pubkey {
        let (address, _bump) = Pubkey::find_program_address(
            &[
                TICK_ARRAY_SEED,
                self.pool.as_ref(),
                &start_index.to_be_bytes(),
            ],
            &self.program_id,
        );
        address
    }

    #[must_use]
    pub fn tick_array_bitmap_extension(&self) -> Pubkey {
        let (address, _bump) = Pubkey::find_program_address(
            &[POOL_TICK_ARRAY_BITMAP_SEED, self.pool.as_ref()],
            &self.program_id,
        );
        address
    }

    /// Token vault holding `mint` for this pool.
    #[must_use]
    pub fn pool_vault(&self, mint: &Pubkey) -> Pubkey {
        let (address, _bump) = Pubkey::find_program_address(
            &[POOL_VAULT_SEED, self.pool.as_ref(), mint.as_ref()],
            &self.program_id,
        );
        address
    }

    #[must_use]
    pub fn observation(&self) -> Pubkey {
        let (address, _bump) = Pubkey::find_program_address(
            &[OBSERVATION_SEED, self.pool.as_ref()],
            &self.program_id,
        );
        address
    }
}

impl TickArrayAddressResolver for RaydiumPda {
    fn tick_array_address(&self, start_index: i32) -> Pubkey {
        self.tick_array(start_index)
    }
}

/// Pool account for a config and an ordered mint pair.
#[must_use]
pub fn pool_address(program_id: &Pubkey, amm_config: &Pubkey, mint_0: &Pubkey, mint_1: &Pubkey) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(
        &[POOL_SEED, amm_config.as_ref(), mint_0.as_ref(), mint_1.as_ref()],
        program_id,
    );
    address
}

/// Config account at `index`; the index is seeded big-endian.
#[must_use]
pub fn amm_config_address(program_id: &Pubkey, index: u16) -> Pubkey {
    let (address, _bump) =
        Pubkey::find_program_address(&[AMM_CONFIG_SEED, &index.to_be_bytes()], program_id);
    address
}

/// Associated token account of `owner` for a classic SPL `mint`.
#[must_use]
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    );
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raydium::constants::RAYDIUM_CLMM_MAINNET_PROGRAM_ID;

    fn pda() -> RaydiumPda {
        RaydiumPda::new(RAYDIUM_CLMM_MAINNET_PROGRAM_ID, Pubkey::new_from_array([7; 32]))
    }

    #[test]
    fn test_tick_array_seeds() {
        let pda = pda();
        let (expected, _) = Pubkey::find_program_address(
            &[b"tick_array", pda.pool().as_ref(), &[0xff, 0xff, 0xff, 0xc4]],
            &RAYDIUM_CLMM_MAINNET_PROGRAM_ID,
        );
        assert_eq!(pda.tick_array(-60), expected);
        assert_ne!(pda.tick_array(0), pda.tick_array(60));
        assert_eq!(pda.tick_array_address(120), pda.tick_array(120));
    }

    #[test]
    fn test_pool_scoped_addresses_differ() {
        let pda = pda();
        let other = RaydiumPda::new(pda.program_id(), Pubkey::new_from_array([8; 32]));
        assert_ne!(pda.tick_array_bitmap_extension(), other.tick_array_bitmap_extension());
        assert_ne!(pda.observation(), other.observation());
        let mint = Pubkey::new_from_array([1; 32]);
        assert_ne!(pda.pool_vault(&mint), other.pool_vault(&mint));
    }

    #[test]
    fn test_pool_and_config_addresses() {
        let program = RAYDIUM_CLMM_MAINNET_PROGRAM_ID;
        let config = amm_config_address(&program, 0);
        assert_ne!(config, amm_config_address(&program, 1));
        let mint_0 = Pubkey::new_from_array([1; 32]);
        let mint_1 = Pubkey::new_from_array([2; 32]);
        assert_ne!(
            pool_address(&program, &config, &mint_0, &mint_1),
            pool_address(&program, &config, &mint_1, &mint_0)
        );
        let owner = Pubkey::new_from_array([3; 32]);
        assert_ne!(
            associated_token_address(&owner, &mint_0),
            associated_token_address(&owner, &mint_1)
        );
    }
}
