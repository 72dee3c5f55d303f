//! Closed-form projections: the compound growth fallback and the
//! volatility band.
//!
//! The compound estimate is a single deterministic figure used when the Monte
//! Carlo projector reports insufficient data. The band projection is a
//! separate analytic view over the daily-return series and never replaces a
//! simulation.

use serde::{Deserialize, Serialize};

use crate::daily::DailyReturns;
use crate::stats::TradeStatistics;

/// Two-sided 95% normal quantile.
pub const CONFIDENCE_Z: f64 = 1.96;

/// The band's lower bound never drops below this fraction of the balance.
pub const LOWER_BAND_FLOOR: f64 = 0.1;

/// Daily volatility assumed for the band when only one trading day exists.
pub const SINGLE_DAY_VOLATILITY: f64 = 0.01;

/// `balance * (1 + daily_return)^days`.
pub fn compound_growth(balance: f64, daily_return: f64, days: u32) -> f64 {
    balance * (1.0 + daily_return).powf(f64::from(days))
}

// ─── Fallback point estimate ────────────────────────────────────────

/// Where the fallback daily rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Mean of the historical daily-return series.
    HistoricalDailyMean,
    /// Expectancy × trades per day, relative to the balance.
    ExpectancyPerDay,
    /// No usable history or a non-positive balance.
    Zero,
}

/// Daily rate for the fallback: the historical daily mean when any dated
/// trades exist, otherwise expectancy scaled by trade frequency.
pub fn fallback_daily_return(
    daily: &DailyReturns,
    stats: &TradeStatistics,
    balance: f64,
) -> (f64, RateSource) {
    if !daily.is_empty() {
        return (daily.mean, RateSource::HistoricalDailyMean);
    }
    if stats.total_trades > 0 && balance > 0.0 {
        let rate = stats.expectancy * stats.avg_trades_per_day / balance;
        return (rate, RateSource::ExpectancyPerDay);
    }
    (0.0, RateSource::Zero)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundEstimate {
    pub horizon_days: u32,
    pub balance: f64,
    pub daily_return: f64,
    pub rate_source: RateSource,
    pub projected: f64,
    pub expected_pnl: f64,
    pub return_pct: f64,
}

impl CompoundEstimate {
    pub fn new(balance: f64, daily_return: f64, rate_source: RateSource, horizon_days: u32) -> Self {
        let projected = compound_growth(balance, daily_return, horizon_days);
        let return_pct = if balance != 0.0 {
            (projected / balance - 1.0) * 100.0
        } else {
            0.0
        };
        Self {
            horizon_days,
            balance,
            daily_return,
            rate_source,
            projected,
            expected_pnl: projected - balance,
            return_pct,
        }
    }
}

// ─── Volatility band ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandProjection {
    pub horizon_days: u32,
    pub balance: f64,
    pub projected: f64,
    pub upper: f64,
    /// Floored at `LOWER_BAND_FLOOR × balance`.
    pub lower: f64,
    pub expected_pnl: f64,
    pub upper_pnl: f64,
    pub lower_pnl: f64,
    pub return_pct: f64,
    pub upper_return_pct: f64,
    /// Return implied by the unfloored lower factor.
    pub lower_return_pct: f64,
}

/// Band of `balance * (1 + mean ± z·σ)^days` around the compound estimate.
pub fn band_projection(
    balance: f64,
    mean_daily: f64,
    volatility: f64,
    horizon_days: u32,
    z: f64,
) -> BandProjection {
    let days = f64::from(horizon_days);
    let growth = (1.0 + mean_daily).powf(days);
    let upper_factor = (1.0 + mean_daily + z * volatility).powf(days);
    let lower_factor = (1.0 + mean_daily - z * volatility).powf(days);

    let projected = balance * growth;
    let upper = balance * upper_factor;
    let lower = (balance * lower_factor).max(balance * LOWER_BAND_FLOOR);

    BandProjection {
        horizon_days,
        balance,
        projected,
        upper,
        lower,
        expected_pnl: projected - balance,
        upper_pnl: upper - balance,
        lower_pnl: lower - balance,
        return_pct: (growth - 1.0) * 100.0,
        upper_return_pct: (upper_factor - 1.0) * 100.0,
        lower_return_pct: (lower_factor - 1.0) * 100.0,
    }
}

impl BandProjection {
    /// Band over a daily-return series; `None` when the series is empty.
    ///
    /// A single trading day has no sample volatility, so the band uses
    /// [`SINGLE_DAY_VOLATILITY`] instead of collapsing to a point.
    pub fn from_daily(balance: f64, daily: &DailyReturns, horizon_days: u32) -> Option<Self> {
        if daily.is_empty() {
            return None;
        }
        let volatility = if daily.trading_days < 2 {
            SINGLE_DAY_VOLATILITY
        } else {
            daily.volatility
        };
        Some(band_projection(
            balance,
            daily.mean,
            volatility,
            horizon_days,
            CONFIDENCE_Z,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeRecord;

    #[test]
    fn compound_known_values() {
        assert!((compound_growth(100.0, 0.01, 2) - 102.01).abs() < 1e-9);
        assert_eq!(compound_growth(100.0, 0.05, 0), 100.0);
        assert_eq!(compound_growth(250.0, 0.0, 90), 250.0);
    }

    #[test]
    fn compound_negative_rate() {
        let v = compound_growth(1000.0, -0.01, 30);
        assert!(v < 1000.0 && v > 0.0);
    }

    #[test]
    fn estimate_fields() {
        let e = CompoundEstimate::new(100.0, 0.01, RateSource::HistoricalDailyMean, 2);
        assert!((e.projected - 102.01).abs() < 1e-9);
        assert!((e.expected_pnl - 2.01).abs() < 1e-9);
        assert!((e.return_pct - 2.01).abs() < 1e-9);
    }

    #[test]
    fn fallback_prefers_daily_mean() {
        let mut t = TradeRecord::with_pnl("BTC/USDT", 5.0);
        t.exit_time = Some("2024-01-01T00:00:00Z".into());
        let trades = vec![t];
        let daily = DailyReturns::from_trades(&trades, 100.0);
        let stats = TradeStatistics::compute(&trades, 100.0);
        let (rate, src) = fallback_daily_return(&daily, &stats, 105.0);
        assert_eq!(src, RateSource::HistoricalDailyMean);
        assert!((rate - 0.05).abs() < 1e-12);
    }

    #[test]
    fn fallback_uses_expectancy_without_dates() {
        let trades = vec![
            TradeRecord::with_pnl("BTC/USDT", 4.0),
            TradeRecord::with_pnl("BTC/USDT", -2.0),
        ];
        let daily = DailyReturns::from_trades(&trades, 100.0);
        let stats = TradeStatistics::compute(&trades, 100.0);
        let (rate, src) = fallback_daily_return(&daily, &stats, 100.0);
        assert_eq!(src, RateSource::ExpectancyPerDay);
        // expectancy 1.0, one trade per day by default
        assert!((rate - 0.01).abs() < 1e-12);
    }

    #[test]
    fn fallback_empty_is_zero() {
        let stats = TradeStatistics::compute(&[], 100.0);
        let (rate, src) = fallback_daily_return(&DailyReturns::default(), &stats, 100.0);
        assert_eq!((rate, src), (0.0, RateSource::Zero));
    }

    #[test]
    fn band_brackets_projection() {
        let b = band_projection(1000.0, 0.002, 0.01, 30, CONFIDENCE_Z);
        assert!(b.lower <= b.projected && b.projected <= b.upper);
        assert!((b.projected - compound_growth(1000.0, 0.002, 30)).abs() < 1e-9);
    }

    #[test]
    fn band_lower_floor() {
        let b = band_projection(1000.0, 0.0, 0.2, 90, CONFIDENCE_Z);
        assert_eq!(b.lower, 100.0);
        assert!(b.lower_return_pct < -90.0);
    }

    #[test]
    fn single_day_band_keeps_a_width() {
        let mut t = TradeRecord::with_pnl("BTC/USDT", 2.0);
        t.exit_time = Some("2024-01-01T00:00:00Z".into());
        let daily = DailyReturns::from_trades(&[t], 100.0);
        assert_eq!(daily.trading_days, 1);
        assert_eq!(daily.volatility, 0.0);

        let b = BandProjection::from_daily(100.0, &daily, 7).unwrap();
        let expected = band_projection(100.0, 0.02, SINGLE_DAY_VOLATILITY, 7, CONFIDENCE_Z);
        assert_eq!(b, expected);
        assert!(b.upper > b.projected && b.lower < b.projected);
    }

    #[test]
    fn band_requires_series() {
        assert!(BandProjection::from_daily(100.0, &DailyReturns::default(), 7).is_none());
    }
}
