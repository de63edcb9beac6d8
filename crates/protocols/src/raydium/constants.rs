use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Raydium CLMM program (mainnet).
pub const RAYDIUM_CLMM_MAINNET_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK");

/// Raydium CLMM program (devnet).
pub const RAYDIUM_CLMM_DEVNET_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("devi51mZmdwUJGU9hjN27vEz64Gps7uUefqxg27EAtH");

/// SPL token program.
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// SPL token-2022 program.
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Associated token account program.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// SPL memo program.
pub const MEMO_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

pub const AMM_CONFIG_SEED: &[u8] = b"amm_config";
pub const POOL_SEED: &[u8] = b"pool";
pub const POOL_VAULT_SEED: &[u8] = b"pool_vault";
pub const TICK_ARRAY_SEED: &[u8] = b"tick_array";
pub const POOL_TICK_ARRAY_BITMAP_SEED: &[u8] = b"pool_tick_array_bitmap_extension";
pub const OBSERVATION_SEED: &[u8] = b"observation";

/// Solana cluster the program is deployed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cluster {
    #[default]
    Mainnet,
    Devnet,
}

impl Cluster {
    /// CLMM program id on this cluster.
    #[must_use]
    pub fn program_id(self) -> Pubkey {
        match self {
            Self::Mainnet => RAYDIUM_CLMM_MAINNET_PROGRAM_ID,
            Self::Devnet => RAYDIUM_CLMM_DEVNET_PROGRAM_ID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_program_ids() {
        assert_eq!(
            Cluster::Mainnet.program_id(),
            Pubkey::from_str("CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK").unwrap()
        );
        assert_ne!(Cluster::Mainnet.program_id(), Cluster::Devnet.program_id());
        assert_eq!(Cluster::default(), Cluster::Mainnet);
    }
}
