//! BotSnapshot: the bot's periodic `bot_data.json` state dump.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lenient;
use super::position::OpenPosition;
use super::trade::TradeRecord;

/// Account and trading state as last written by the bot.
///
/// Only `account.total_usd` and `trading_state.starting_balance` are
/// load-bearing; everything else is optional and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotSnapshot {
    #[serde(default)]
    pub account: Account,
    #[serde(default)]
    pub trading_state: TradingState,
    /// Legacy location for open positions (older bot versions).
    #[serde(default)]
    pub positions: BTreeMap<String, OpenPosition>,
    #[serde(default)]
    pub recent_trades: Vec<TradeRecord>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub total_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingState {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub starting_balance: Option<f64>,
    #[serde(default)]
    pub positions: BTreeMap<String, OpenPosition>,
}

impl BotSnapshot {
    pub fn new(current_balance: f64, starting_balance: f64) -> Self {
        Self {
            account: Account {
                total_usd: Some(current_balance),
            },
            trading_state: TradingState {
                starting_balance: Some(starting_balance),
                positions: BTreeMap::new(),
            },
            ..Self::default()
        }
    }

    /// Current account value; falls back to the starting balance, then zero.
    pub fn current_balance(&self) -> f64 {
        self.account
            .total_usd
            .or(self.trading_state.starting_balance)
            .unwrap_or(0.0)
    }

    /// Starting balance; falls back to the current balance, then zero.
    pub fn starting_balance(&self) -> f64 {
        self.trading_state
            .starting_balance
            .or(self.account.total_usd)
            .unwrap_or(0.0)
    }

    /// Open positions, preferring `trading_state.positions` over the
    /// top-level legacy map.
    pub fn open_positions(&self) -> &BTreeMap<String, OpenPosition> {
        if self.trading_state.positions.is_empty() {
            &self.positions
        } else {
            &self.trading_state.positions
        }
    }
}
