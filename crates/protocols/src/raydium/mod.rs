//! Raydium CLMM protocol adapter.
//!
//! This module provides functionality to interact with Raydium CLMM pools:
//! - Decode pool, config, tick array and bitmap extension accounts
//! - Derive program addresses
//! - Quote swaps against a loaded pool
//! - Build `swap_v2` instructions

/// Pool loading and quoting.
pub mod adapter;
/// Program ids and seeds.
pub mod constants;
/// Swap instruction builder.
pub mod instruction;
/// Account layouts.
pub mod layout;
/// Program derived addresses.
pub mod pda;

pub use adapter::{RaydiumClmmAdapter, RaydiumClmmConfig};
pub use constants::Cluster;
pub use pda::RaydiumPda;
