//! `swap_v2` instruction of the Raydium CLMM program.

use super::constants::{MEMO_PROGRAM_ID, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// Anchor discriminator of `swap_v2`.
pub const SWAP_V2_DISCRIMINATOR: [u8; 8] = [43, 4, 237, 11, 26, 201, 30, 98];

/// Fixed accounts before the remaining tick-array accounts.
pub const SWAP_V2_FIXED_ACCOUNTS: usize = 13;

/// Accounts of one `swap_v2` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapV2Accounts {
    pub program_id: Pubkey,
    pub payer: Pubkey,
    pub amm_config: Pubkey,
    pub pool_state: Pubkey,
    pub input_token_account: Pubkey,
    pub output_token_account: Pubkey,
    pub input_vault: Pubkey,
    pub output_vault: Pubkey,
    pub observation_state: Pubkey,
    pub input_vault_mint: Pubkey,
    pub output_vault_mint: Pubkey,
    /// Bitmap extension and tick arrays, in traversal order.
    pub remaining_accounts: Vec<Pubkey>,
}

/// Arguments of one `swap_v2` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapV2Args {
    pub amount: u64,
    /// Minimum output for exact input, maximum input for exact output.
    pub other_amount_threshold: u64,
    /// Zero lets the program pick the extreme limit.
    pub sqrt_price_limit_x64: u128,
    pub is_base_input: bool,
}

impl SwapV2Args {
    /// Serialises the instruction data.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(41);
        data.extend_from_slice(&SWAP_V2_DISCRIMINATOR);
        data.extend_from_slice(&self.amount.to_le_bytes());
        data.extend_from_slice(&self.other_amount_threshold.to_le_bytes());
        data.extend_from_slice(&self.sqrt_price_limit_x64.to_le_bytes());
        data.push(u8::from(self.is_base_input));
        data
    }
}

/// Builds a `swap_v2` instruction.
#[must_use]
pub fn swap_v2(accounts: &SwapV2Accounts, args: &SwapV2Args) -> Instruction {
    let mut metas = Vec::with_capacity(SWAP_V2_FIXED_ACCOUNTS + accounts.remaining_accounts.len());
    metas.extend([
        AccountMeta::new(accounts.payer, true),                       // payer
        AccountMeta::new_readonly(accounts.amm_config, false),        // amm_config
        AccountMeta::new(accounts.pool_state, false),                 // pool_state
        AccountMeta::new(accounts.input_token_account, false),        // input_token_account
        AccountMeta::new(accounts.output_token_account, false),       // output_token_account
        AccountMeta::new(accounts.input_vault, false),                // input_vault
        AccountMeta::new(accounts.output_vault, false),               // output_vault
        AccountMeta::new(accounts.observation_state, false),          // observation_state
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),           // token_program
        AccountMeta::new_readonly(TOKEN_2022_PROGRAM_ID, false),      // token_program_2022
        AccountMeta::new_readonly(MEMO_PROGRAM_ID, false),            // memo_program
        AccountMeta::new_readonly(accounts.input_vault_mint, false),  // input_vault_mint
        AccountMeta::new_readonly(accounts.output_vault_mint, false), // output_vault_mint
    ]);
    metas.extend(
        accounts
            .remaining_accounts
            .iter()
            .map(|key| AccountMeta::new(*key, false)),
    );

    Instruction {
        program_id: accounts.program_id,
        accounts: metas,
        data: args.data(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn accounts() -> SwapV2Accounts {
        SwapV2Accounts {
            program_id: key(0),
            payer: key(1),
            amm_config: key(2),
            pool_state: key(3),
            input_token_account: key(4),
            output_token_account: key(5),
            input_vault: key(6),
            output_vault: key(7),
            observation_state: key(8),
            input_vault_mint: key(9),
            output_vault_mint: key(10),
            remaining_accounts: vec![key(11), key(12)],
        }
    }

    #[test]
    fn test_swap_v2_data_layout() {
        let args = SwapV2Args {
            amount: 1_000,
            other_amount_threshold: 990,
            sqrt_price_limit_x64: (1u128 << 64) + 5,
            is_base_input: true,
        };
        let data = args.data();
        assert_eq!(data.len(), 41);
        assert_eq!(data[..8], SWAP_V2_DISCRIMINATOR);
        assert_eq!(u64::from_le_bytes(data[8..16].try_into().unwrap()), 1_000);
        assert_eq!(u64::from_le_bytes(data[16..24].try_into().unwrap()), 990);
        assert_eq!(
            u128::from_le_bytes(data[24..40].try_into().unwrap()),
            (1u128 << 64) + 5
        );
        assert_eq!(data[40], 1);
    }

    #[test]
    fn test_swap_v2_accounts() {
        let args = SwapV2Args {
            amount: 1,
            other_amount_threshold: 0,
            sqrt_price_limit_x64: 0,
            is_base_input: false,
        };
        let ix = swap_v2(&accounts(), &args);
        assert_eq!(ix.program_id, key(0));
        assert_eq!(ix.accounts.len(), SWAP_V2_FIXED_ACCOUNTS + 2);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_writable);
        assert_eq!(ix.accounts[8].pubkey, TOKEN_PROGRAM_ID);
        assert_eq!(ix.accounts[12].pubkey, key(10));
        assert!(ix.accounts[13..].iter().all(|m| m.is_writable && !m.is_signer));
        assert_eq!(ix.accounts[14].pubkey, key(12));
        assert_eq!(*ix.data.last().unwrap(), 0);
    }
}
