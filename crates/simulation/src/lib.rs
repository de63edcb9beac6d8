//! Swap simulation over concentrated-liquidity pool snapshots.
//!
//! This crate provides:
//! - Tick array bitmap navigation across the default bitmap and its extension
//! - Tick array storage keyed by start index
//! - A step-by-step swap simulator that crosses initialised ticks
//! - Quote computation with price limits and slippage bounds

/// Prelude module for convenient imports.
pub mod prelude;

/// Tick array address resolution.
pub mod address;
/// Tick array bitmap navigation.
pub mod bitmap;
/// Quote computation.
pub mod quote;
/// Swap state and engine configuration.
pub mod state;
/// Swap stepping loop.
pub mod stepper;
/// Tick array storage.
pub mod store;
