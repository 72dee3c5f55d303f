//! Trade Statistics Aggregator: reduces a trade history to summary numbers.
//!
//! Conventions:
//! - A trade with `pnl <= 0` is a loss. Breakeven trades therefore lower the
//!   win rate. A missing `pnl` counts as 0.
//! - Rates are percentages (0–100). `loss_rate` is always `100 - win_rate`.
//! - Chronological order is by parsed `exit_time`, ascending. Trades whose exit
//!   time is missing or unparseable sort first, in their original order.
//! - Nothing here fails: empty or malformed input degrades to zeros.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::TradeRecord;
use crate::metrics::{mean, sample_std_dev};
use crate::ratio::Ratio;

/// Trades-per-day assumed when fewer than two distinct exit timestamps exist.
pub const DEFAULT_TRADES_PER_DAY: f64 = 1.0;

/// Win or loss, by the `pnl > 0` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn of(trade: &TradeRecord) -> Self {
        if trade.is_win() {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

/// A run of consecutive identical outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub outcome: Outcome,
    pub length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
    /// Streak in effect at the most recent trade. `None` when there are no trades.
    pub current: Option<Streak>,
}

/// Peak-to-trough decline of an equity curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    /// Absolute decline at the trough of `max_drawdown_pct`, in quote
    /// currency. Largest absolute decline when no peak was ever positive.
    pub max_drawdown: f64,
    /// Largest percentage decline from a running peak, clamped to [0, 100].
    pub max_drawdown_pct: f64,
}

/// Summary statistics for a trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStatistics {
    pub total_trades: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub win_rate: f64,
    pub loss_rate: f64,

    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_pnl: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    /// Mean of positive `pnl_pct` values, independent of `pnl`.
    pub avg_win_pct: f64,
    /// Mean of absolute negative `pnl_pct` values, independent of `pnl`.
    pub avg_loss_pct: f64,

    pub profit_factor: Ratio,
    pub risk_reward: Ratio,
    pub expectancy: f64,

    pub mean_pnl: f64,
    /// Sample standard deviation of per-trade P&L.
    pub std_dev: f64,
    pub best_trade: f64,
    pub worst_trade: f64,

    pub avg_trades_per_day: f64,

    pub starting_balance: f64,
    /// `starting_balance` followed by one running balance per trade, in
    /// chronological order.
    pub equity_curve: Vec<f64>,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub total_return_pct: f64,

    pub streaks: StreakSummary,
}

impl TradeStatistics {
    /// Aggregate `trades` starting from `starting_balance`.
    pub fn compute(trades: &[TradeRecord], starting_balance: f64) -> Self {
        Self::compute_with_fallback_rate(trades, starting_balance, DEFAULT_TRADES_PER_DAY)
    }

    /// As [`compute`](Self::compute), with an explicit trades-per-day fallback.
    pub fn compute_with_fallback_rate(
        trades: &[TradeRecord],
        starting_balance: f64,
        fallback_trades_per_day: f64,
    ) -> Self {
        let total_trades = trades.len();
        let pnls = Self::pnl_values(trades);

        let win_count = pnls.iter().filter(|&&p| p > 0.0).count();
        let loss_count = total_trades - win_count;

        let win_rate = if total_trades > 0 {
            win_count as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };
        let loss_rate = 100.0 - win_rate;

        let gross_profit: f64 = pnls.iter().filter(|&&p| p > 0.0).sum();
        let gross_loss: f64 = pnls.iter().filter(|&&p| p <= 0.0).map(|p| p.abs()).sum();

        let avg_win = if win_count > 0 {
            gross_profit / win_count as f64
        } else {
            0.0
        };
        let avg_loss = if loss_count > 0 {
            gross_loss / loss_count as f64
        } else {
            0.0
        };

        let expectancy = (win_rate / 100.0 * avg_win) - (loss_rate / 100.0 * avg_loss);

        let (avg_win_pct, avg_loss_pct) = pct_averages(trades);

        let ordered = chronological(trades);
        let equity_curve = equity_curve(&ordered, starting_balance);
        let dd = drawdown(&equity_curve);
        let final_equity = equity_curve.last().copied().unwrap_or(starting_balance);
        let total_return_pct = if starting_balance > 0.0 {
            (final_equity - starting_balance) / starting_balance * 100.0
        } else {
            0.0
        };

        Self {
            total_trades,
            win_count,
            loss_count,
            win_rate,
            loss_rate,
            gross_profit,
            gross_loss,
            net_pnl: gross_profit - gross_loss,
            avg_win,
            avg_loss,
            avg_win_pct,
            avg_loss_pct,
            profit_factor: Ratio::from_parts(gross_profit, gross_loss),
            risk_reward: Ratio::from_parts(avg_win, avg_loss),
            expectancy,
            mean_pnl: mean(&pnls),
            std_dev: sample_std_dev(&pnls),
            best_trade: pnls.iter().copied().reduce(f64::max).unwrap_or(0.0),
            worst_trade: pnls.iter().copied().reduce(f64::min).unwrap_or(0.0),
            avg_trades_per_day: avg_trades_per_day(trades, fallback_trades_per_day),
            starting_balance,
            equity_curve,
            max_drawdown: dd.max_drawdown,
            max_drawdown_pct: dd.max_drawdown_pct,
            total_return_pct,
            streaks: streaks(&ordered),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_trades == 0
    }

    /// Per-trade P&L values in input order (missing values as 0).
    pub fn pnl_values(trades: &[TradeRecord]) -> Vec<f64> {
        trades.iter().map(TradeRecord::pnl_or_zero).collect()
    }
}

// ─── Ordering ───────────────────────────────────────────────────────

/// Trades sorted by exit time, ascending.
///
/// Stable: undated trades come first in input order, and trades with equal
/// timestamps keep their relative order.
pub fn chronological(trades: &[TradeRecord]) -> Vec<&TradeRecord> {
    let mut keyed: Vec<(Option<NaiveDateTime>, &TradeRecord)> =
        trades.iter().map(|t| (t.exit_timestamp(), t)).collect();
    keyed.sort_by_key(|(ts, _)| *ts);
    keyed.into_iter().map(|(_, t)| t).collect()
}

// ─── Equity & drawdown ──────────────────────────────────────────────

/// Running balance after each trade, prefixed by the starting balance.
pub fn equity_curve(ordered: &[&TradeRecord], starting_balance: f64) -> Vec<f64> {
    let mut curve = Vec::with_capacity(ordered.len() + 1);
    let mut balance = starting_balance;
    curve.push(balance);
    for trade in ordered {
        balance += trade.pnl_or_zero();
        curve.push(balance);
    }
    curve
}

/// Max drawdown of an equity curve, tracking the running peak.
///
/// The absolute figure is taken at the same point as the worst percentage
/// decline, so both describe one trough. The percentage is measured against
/// the peak and is zero while the peak is non-positive. It is clamped to 100
/// for curves that go below zero.
pub fn drawdown(equity_curve: &[f64]) -> Drawdown {
    let Some(&first) = equity_curve.first() else {
        return Drawdown::default();
    };
    let mut peak = first;
    let mut worst_pct = 0.0_f64;
    let mut decline_at_worst = 0.0_f64;
    let mut largest_decline = 0.0_f64;

    for &balance in equity_curve {
        if balance > peak {
            peak = balance;
        }
        let decline = peak - balance;
        largest_decline = largest_decline.max(decline);
        if peak > 0.0 {
            let pct = decline / peak * 100.0;
            if pct > worst_pct {
                worst_pct = pct;
                decline_at_worst = decline;
            }
        }
    }

    if worst_pct > 0.0 {
        Drawdown {
            max_drawdown: decline_at_worst,
            max_drawdown_pct: worst_pct.min(100.0),
        }
    } else {
        Drawdown {
            max_drawdown: largest_decline,
            max_drawdown_pct: 0.0,
        }
    }
}

// ─── Streaks ────────────────────────────────────────────────────────

/// Longest win/loss runs and the run in effect at the last trade.
pub fn streaks(ordered: &[&TradeRecord]) -> StreakSummary {
    let mut summary = StreakSummary::default();
    let mut current: Option<Streak> = None;

    for trade in ordered {
        let outcome = Outcome::of(trade);
        current = match current {
            Some(s) if s.outcome == outcome => Some(Streak {
                outcome,
                length: s.length + 1,
            }),
            _ => Some(Streak { outcome, length: 1 }),
        };
        if let Some(s) = current {
            match s.outcome {
                Outcome::Win => summary.max_win_streak = summary.max_win_streak.max(s.length),
                Outcome::Loss => summary.max_loss_streak = summary.max_loss_streak.max(s.length),
            }
        }
    }

    summary.current = current;
    summary
}

// ─── Frequency ──────────────────────────────────────────────────────

/// Total trades divided by the inclusive calendar-day span of exit times.
///
/// Needs at least two distinct parseable exit timestamps; otherwise returns
/// `fallback`. Trades without a usable timestamp still count in the
/// numerator.
pub fn avg_trades_per_day(trades: &[TradeRecord], fallback: f64) -> f64 {
    let stamps: BTreeSet<NaiveDateTime> =
        trades.iter().filter_map(TradeRecord::exit_timestamp).collect();
    let (Some(first), Some(last)) = (stamps.first(), stamps.last()) else {
        return fallback;
    };
    if stamps.len() < 2 {
        return fallback;
    }
    let span_days = (last.date() - first.date()).num_days() + 1;
    trades.len() as f64 / span_days as f64
}

fn pct_averages(trades: &[TradeRecord]) -> (f64, f64) {
    let wins: Vec<f64> = trades
        .iter()
        .filter_map(|t| t.pnl_pct)
        .filter(|&p| p > 0.0)
        .collect();
    let losses: Vec<f64> = trades
        .iter()
        .filter_map(|t| t.pnl_pct)
        .filter(|&p| p < 0.0)
        .map(f64::abs)
        .collect();
    (mean(&wins), mean(&losses))
}
