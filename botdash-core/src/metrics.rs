//! Performance ratios: pure functions over daily returns and the equity curve.
//!
//! No dependencies on loading or rendering. Every function is total: short or
//! flat inputs return 0 (or a finite/infinite `Ratio`), never NaN.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::daily::DailyReturns;
use crate::domain::TradeRecord;
use crate::ratio::Ratio;
use crate::stats::TradeStatistics;

/// Crypto trades every calendar day.
pub const DEFAULT_ANNUALIZATION_DAYS: f64 = 365.0;

/// Annualized risk-adjusted ratios for a trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRatios {
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: Ratio,
    pub annualization_days: f64,
}

impl PerformanceRatios {
    pub fn compute(stats: &TradeStatistics, daily: &DailyReturns, annualization_days: f64) -> Self {
        let returns = daily.returns();
        Self {
            sharpe: sharpe_ratio(&returns, annualization_days),
            sortino: sortino_ratio(&returns, annualization_days),
            calmar: calmar_ratio(stats.total_return_pct, stats.max_drawdown_pct),
            annualization_days,
        }
    }
}

// ─── Ratios ─────────────────────────────────────────────────────────

/// Annualized Sharpe ratio: mean / sample std × sqrt(annualization_days).
///
/// Risk-free rate is taken as zero. Returns 0.0 with fewer than two
/// observations or zero variance.
pub fn sharpe_ratio(daily_returns: &[f64], annualization_days: f64) -> f64 {
    if daily_returns.len() < 2 {
        return 0.0;
    }
    let std = sample_std_dev(daily_returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean(daily_returns) / std * annualization_days.max(0.0).sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
///
/// Downside deviation = sqrt(sum(min(r, 0)^2) / n). Returns 0.0 when there are
/// no losing days or fewer than two observations.
pub fn sortino_ratio(daily_returns: &[f64], annualization_days: f64) -> f64 {
    if daily_returns.len() < 2 {
        return 0.0;
    }
    let downside_sq: f64 = daily_returns
        .iter()
        .filter(|&&r| r < 0.0)
        .map(|r| r * r)
        .sum();
    if downside_sq <= 0.0 {
        return 0.0;
    }
    let downside_std = (downside_sq / daily_returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    mean(daily_returns) / downside_std * annualization_days.max(0.0).sqrt()
}

/// Calmar ratio: total return % / max drawdown %.
///
/// Without a drawdown the ratio is infinite for a positive return and zero
/// otherwise.
pub fn calmar_ratio(total_return_pct: f64, max_drawdown_pct: f64) -> Ratio {
    Ratio::from_parts(total_return_pct, max_drawdown_pct)
}

// ─── Period filter ──────────────────────────────────────────────────

/// Trades whose exit falls within the last `days` days before `as_of`.
///
/// Trades with an unparseable exit time are dropped.
pub fn filter_recent(trades: &[TradeRecord], as_of: NaiveDateTime, days: u32) -> Vec<TradeRecord> {
    let cutoff = as_of - Duration::days(i64::from(days));
    trades
        .iter()
        .filter(|t| t.exit_timestamp().is_some_and(|ts| ts >= cutoff))
        .cloned()
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). Zero for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Population standard deviation (n). Zero for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn trade_exiting(day: u32, pnl: f64) -> TradeRecord {
        let mut t = TradeRecord::with_pnl("BTC/USDT", pnl);
        t.exit_time = Some(format!("2024-03-{day:02}T12:00:00Z"));
        t
    }

    // ── Helpers ──

    #[test]
    fn mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v) - 5.0).abs() < 1e-12);
        assert!((population_std_dev(&v) - 2.0).abs() < 1e-12);
        let expected_sample = (32.0_f64 / 7.0).sqrt();
        assert!((sample_std_dev(&v) - expected_sample).abs() < 1e-12);
    }

    #[test]
    fn helpers_on_short_input() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sample_std_dev(&[3.0]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[3.0]), 0.0);
    }

    // ── Sharpe ──

    #[test]
    fn sharpe_constant_return_is_zero() {
        assert_eq!(sharpe_ratio(&[0.01; 30], 365.0), 0.0);
    }

    #[test]
    fn sharpe_single_observation() {
        assert_eq!(sharpe_ratio(&[0.05], 365.0), 0.0);
    }

    #[test]
    fn sharpe_known_value() {
        let r = [0.01, -0.01, 0.02, 0.0];
        let expected = mean(&r) / sample_std_dev(&r) * 365.0_f64.sqrt();
        assert!((sharpe_ratio(&r, 365.0) - expected).abs() < 1e-12);
        assert!(sharpe_ratio(&r, 365.0) > 0.0);
    }

    // ── Sortino ──

    #[test]
    fn sortino_no_downside_is_zero() {
        assert_eq!(sortino_ratio(&[0.01, 0.02, 0.03], 365.0), 0.0);
    }

    #[test]
    fn sortino_with_downside() {
        let r = [0.02, -0.01, 0.03, -0.005];
        let s = sortino_ratio(&r, 365.0);
        assert!(s > 0.0, "Sortino should be positive, got {s}");
    }

    // ── Calmar ──

    #[test]
    fn calmar_rules() {
        assert_eq!(calmar_ratio(20.0, 10.0), Ratio::Finite(2.0));
        assert_eq!(calmar_ratio(20.0, 0.0), Ratio::Infinite);
        assert_eq!(calmar_ratio(-5.0, 0.0), Ratio::Finite(0.0));
        assert_eq!(calmar_ratio(0.0, 0.0), Ratio::Finite(0.0));
    }

    // ── Period filter ──

    #[test]
    fn filter_recent_keeps_window() {
        let trades = vec![
            trade_exiting(1, 1.0),
            trade_exiting(10, 2.0),
            trade_exiting(14, 3.0),
        ];
        let recent = filter_recent(&trades, at(15), 7);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].pnl, Some(2.0));
    }

    #[test]
    fn filter_recent_drops_unparseable() {
        let mut bad = TradeRecord::with_pnl("X", 1.0);
        bad.exit_time = Some("not a date".into());
        let no_time = TradeRecord::with_pnl("X", 1.0);
        let recent = filter_recent(&[bad, no_time, trade_exiting(14, 1.0)], at(15), 30);
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn filter_recent_boundary_inclusive() {
        let trades = vec![trade_exiting(8, 1.0)];
        assert_eq!(filter_recent(&trades, at(15), 7).len(), 1);
    }
}
