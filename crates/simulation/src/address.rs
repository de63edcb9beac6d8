//! Resolution of tick-array start indices to account addresses.

use solana_sdk::pubkey::Pubkey;

/// Maps a tick-array start index to the account that stores it.
pub trait TickArrayAddressResolver {
    fn tick_array_address(&self, start_index: i32) -> Pubkey;
}

impl<F> TickArrayAddressResolver for F
where
    F: Fn(i32) -> Pubkey,
{
    fn tick_array_address(&self, start_index: i32) -> Pubkey {
        self(start_index)
    }
}
