//! Domain types consumed from the trading bot's output files.

mod lenient;
pub mod position;
pub mod snapshot;
pub mod trade;

pub use position::OpenPosition;
pub use snapshot::{Account, BotSnapshot, TradingState};
pub use trade::{asset_of, parse_timestamp, TradeRecord, UNKNOWN_REASON};
