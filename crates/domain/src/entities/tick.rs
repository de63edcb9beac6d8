use serde::{Deserialize, Serialize};

/// Number of reward streams tracked per tick.
pub const REWARD_NUM: usize = 3;

/// One liquidity boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Tick index.
    pub tick: i32,
    /// Liquidity added when crossing upward, removed when crossing downward.
    pub liquidity_net: i128,
    /// Total liquidity referencing this tick.
    pub liquidity_gross: u128,
    /// Fee growth on the other side of this tick, token 0.
    pub fee_growth_outside_0_x64: u128,
    /// Fee growth on the other side of this tick, token 1.
    pub fee_growth_outside_1_x64: u128,
    /// Reward growth on the other side of this tick.
    pub reward_growths_outside_x64: [u128; REWARD_NUM],
}

impl Tick {
    /// Creates an initialised tick with the given liquidity deltas.
    #[must_use]
    pub fn new(tick: i32, liquidity_net: i128, liquidity_gross: u128) -> Self {
        Self {
            tick,
            liquidity_net,
            liquidity_gross,
            ..Self::default()
        }
    }

    /// A tick is initialised iff some position references it.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.liquidity_gross != 0
    }
}
