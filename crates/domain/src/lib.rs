//! Domain types and fixed-point math for concentrated-liquidity quoting.
//!
//! This crate provides:
//! - Tick ⇄ Q64.64 sqrt price conversion matching the on-chain program
//! - Token amount, next-price and single-step swap math with on-chain rounding
//! - Pool snapshot, tick, tick array and bitmap extension entities
//! - Slippage, price and token amount value objects

/// Prelude module for convenient imports.
pub mod prelude;

/// Pool state entities.
pub mod entities;
/// Shared enums.
pub mod enums;
/// Error taxonomy.
pub mod error;
/// Fixed-point math.
pub mod math;
/// Value objects.
pub mod value_objects;
