//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use clmm_quote_simulation::prelude::*;
//! ```

// Addresses
pub use crate::address::TickArrayAddressResolver;

// Bitmap
pub use crate::bitmap::{BitmapNavigator, TickArrayBitmap, mark_tick_array_initialized};

// Quotes
pub use crate::quote::{Quote, QuoteComputer, SwapRequest, SwapResult};

// State management
pub use crate::state::{EngineConfig, StepRecord, SwapState, SwapTermination};

// Stepper
pub use crate::stepper::SwapStepper;

// Storage
pub use crate::store::{InMemoryTickArrayStore, TickArrayStore};
