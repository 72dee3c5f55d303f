//! Daily-return series derived from a trade history.
//!
//! P&L is summed per calendar exit day (UTC). Days are visited in ascending
//! order and each day's return is relative to the running balance before that
//! day, starting from the starting balance. This series is what the Monte
//! Carlo projector resamples by default.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::TradeRecord;
use crate::metrics::{mean, sample_std_dev};
use crate::stats::chronological;

/// One calendar day of realized P&L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub pnl: f64,
    /// Fraction of the running balance (0.01 = 1%).
    pub return_frac: f64,
    /// Running balance after this day.
    pub balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReturns {
    pub days: Vec<DailyReturn>,
    pub mean: f64,
    /// Sample std of daily returns; 0 with fewer than two days.
    pub volatility: f64,
    pub trading_days: usize,
    /// Inclusive calendar span between the first and last trading day.
    pub calendar_span_days: i64,
}

impl DailyReturns {
    /// Build the series. Trades without a parseable exit time are skipped.
    pub fn from_trades(trades: &[TradeRecord], starting_balance: f64) -> Self {
        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for trade in chronological(trades) {
            if let Some(day) = trade.exit_day() {
                *per_day.entry(day).or_insert(0.0) += trade.pnl_or_zero();
            }
        }

        let mut running = starting_balance;
        let days: Vec<DailyReturn> = per_day
            .into_iter()
            .map(|(date, pnl)| {
                let return_frac = if running > 0.0 { pnl / running } else { 0.0 };
                running += pnl;
                DailyReturn {
                    date,
                    pnl,
                    return_frac,
                    balance: running,
                }
            })
            .collect();

        let calendar_span_days = match (days.first(), days.last()) {
            (Some(first), Some(last)) => (last.date - first.date).num_days() + 1,
            _ => 0,
        };

        let returns: Vec<f64> = days.iter().map(|d| d.return_frac).collect();
        Self {
            mean: mean(&returns),
            volatility: sample_std_dev(&returns),
            trading_days: days.len(),
            calendar_span_days,
            days,
        }
    }

    pub fn returns(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.return_frac).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
