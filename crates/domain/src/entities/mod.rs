pub mod bitmap_extension;
pub mod pool;
pub mod tick;
pub mod tick_array;

// Re-export for easier access
pub use bitmap_extension::TickArrayBitmapExtension;
pub use pool::PoolSnapshot;
pub use tick::Tick;
pub use tick_array::TickArray;
