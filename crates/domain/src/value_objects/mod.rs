pub mod amount;
pub mod price;
pub mod slippage;

pub use amount::TokenAmount;
pub use price::Price;
pub use slippage::Slippage;
