//! Market - owner of many vendor ledgers
//!
//! The host game loop talks to vendors through this type. It creates ledgers
//! explicitly, routes player trades to the right vendor and checkpoints the
//! whole set.
//!
//! See `engine.rs` for the trade surface and `checkpoint.rs` for persistence.

pub mod checkpoint;
pub mod engine;

pub use checkpoint::{MarketSnapshot, VendorSnapshot};
pub use engine::{Market, MarketError, TradeReceipt, MAX_TRADE_PRICE};
