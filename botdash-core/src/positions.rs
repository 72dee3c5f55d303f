//! Open-position analytics.
//!
//! Prices come from a [`PriceSource`]. A missing quote is never an error: the
//! position is valued at its entry price and marked `EntryFallback`. Holding
//! time is measured against an explicit `as_of`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::OpenPosition;
use crate::metrics::population_std_dev;

/// Quote for a pair symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    /// 24h change in percent.
    pub change_24h_pct: f64,
}

impl Quote {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            change_24h_pct: 0.0,
        }
    }
}

/// Anything that can price a symbol. Failure is `None`, never a panic.
pub trait PriceSource {
    fn quote(&self, symbol: &str) -> Option<Quote>;
}

/// In-memory quotes, e.g. from the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticPrices {
    quotes: BTreeMap<String, Quote>,
}

impl StaticPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, quote: Quote) {
        self.quotes.insert(symbol.into(), quote);
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl FromIterator<(String, Quote)> for StaticPrices {
    fn from_iter<I: IntoIterator<Item = (String, Quote)>>(iter: I) -> Self {
        Self {
            quotes: iter.into_iter().collect(),
        }
    }
}

impl PriceSource for StaticPrices {
    fn quote(&self, symbol: &str) -> Option<Quote> {
        self.quotes
            .get(symbol)
            .copied()
            .filter(|q| q.price.is_finite() && q.price > 0.0)
    }
}

// ─── Classification ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrigin {
    Live,
    EntryFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    fn classify(score: f64, size_pct: f64) -> Self {
        if score > 25.0 || size_pct > 25.0 {
            RiskLevel::Extreme
        } else if score > 15.0 || size_pct > 15.0 {
            RiskLevel::High
        } else if score > 8.0 || size_pct > 8.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Momentum bucket from the combined move since entry and over 24h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentumLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl MomentumLevel {
    fn classify(score: f64) -> Self {
        if score > 0.10 {
            MomentumLevel::Extreme
        } else if score > 0.05 {
            MomentumLevel::High
        } else if score > 0.02 {
            MomentumLevel::Medium
        } else {
            MomentumLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl PerformanceGrade {
    fn classify(unrealized_pnl_pct: f64) -> Self {
        match unrealized_pnl_pct {
            p if p > 10.0 => PerformanceGrade::APlus,
            p if p > 5.0 => PerformanceGrade::A,
            p if p > 0.0 => PerformanceGrade::B,
            p if p > -3.0 => PerformanceGrade::C,
            p if p > -8.0 => PerformanceGrade::D,
            _ => PerformanceGrade::F,
        }
    }
}

macro_rules! upper_display {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&format!("{self:?}").to_uppercase())
            }
        }
    )*};
}

upper_display!(RiskLevel, MomentumLevel);

impl fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PerformanceGrade::APlus => "A+",
            PerformanceGrade::A => "A",
            PerformanceGrade::B => "B",
            PerformanceGrade::C => "C",
            PerformanceGrade::D => "D",
            PerformanceGrade::F => "F",
        };
        f.pad(s)
    }
}

// ─── Per-position metrics ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMetrics {
    pub position_value: f64,
    pub entry_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
    /// Position value as % of the portfolio.
    pub size_pct: f64,
    /// Distance from price down to the stop, % of price. 0 without a stop.
    pub dist_to_stop_pct: f64,
    /// Distance from price up to the target, % of price. 0 without a target.
    pub dist_to_target_pct: f64,
    pub break_even_distance_pct: f64,
    /// Loss if stopped out.
    pub stop_loss_risk: f64,
    pub risk_reward: f64,
    pub target_profit_potential: f64,
    pub hours_held: f64,
    pub annualized_return_pct: f64,
    pub profit_per_hour: f64,
    pub capital_efficiency_pct: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub momentum_score: f64,
    pub momentum: MomentumLevel,
    pub grade: PerformanceGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub symbol: String,
    pub position: OpenPosition,
    pub price: f64,
    pub price_origin: PriceOrigin,
    pub change_24h_pct: f64,
    pub metrics: PositionMetrics,
}

/// Value one position.
///
/// Returns `None` when the entry price is missing or non-positive, since
/// nothing meaningful can be derived.
pub fn evaluate_position(
    symbol: &str,
    position: &OpenPosition,
    quote: Option<Quote>,
    portfolio_value: f64,
    as_of: NaiveDateTime,
) -> Option<PositionReport> {
    let entry = position.entry.filter(|e| *e > 0.0)?;
    let (quote, origin) = match quote {
        Some(q) if q.price > 0.0 => (q, PriceOrigin::Live),
        _ => (Quote::new(entry), PriceOrigin::EntryFallback),
    };
    let price = quote.price;
    let amount = position.amount.unwrap_or(0.0);
    let stop = position.stop.unwrap_or(0.0);
    let target = position.target.unwrap_or(0.0);

    let position_value = price * amount;
    let entry_value = entry * amount;
    let unrealized_pnl = (price - entry) * amount;
    let unrealized_pnl_pct = (price - entry) / entry * 100.0;
    let size_pct = if portfolio_value > 0.0 {
        position_value / portfolio_value * 100.0
    } else {
        0.0
    };

    let (dist_to_stop_pct, stop_loss_risk, risk_reward) = if stop > 0.0 {
        let rr = if target > 0.0 && entry != stop {
            ((target - entry) / (entry - stop)).abs()
        } else {
            0.0
        };
        (
            (price - stop) / price * 100.0,
            ((entry - stop) * amount).abs(),
            rr,
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    let (dist_to_target_pct, target_profit_potential) = if target > 0.0 {
        ((target - price) / price * 100.0, (target - entry) * amount)
    } else {
        (0.0, 0.0)
    };

    let hours_held = position
        .opened_at()
        .map(|opened| (as_of - opened).num_seconds() as f64 / 3600.0)
        .unwrap_or(0.0)
        .max(0.0);
    let annualized_return_pct = if hours_held > 0.0 {
        unrealized_pnl_pct / hours_held * 24.0 * 365.0
    } else {
        0.0
    };

    let risk_score = size_pct * 0.4 + unrealized_pnl_pct.abs() * 0.3 + hours_held / 24.0 * 0.3;
    let momentum_score =
        ((price - entry) / entry).abs() * 0.6 + (quote.change_24h_pct / 100.0).abs() * 0.4;

    let metrics = PositionMetrics {
        position_value,
        entry_value,
        unrealized_pnl,
        unrealized_pnl_pct,
        size_pct,
        dist_to_stop_pct,
        dist_to_target_pct,
        break_even_distance_pct: (price - entry).abs() / price * 100.0,
        stop_loss_risk,
        risk_reward,
        target_profit_potential,
        hours_held,
        annualized_return_pct,
        profit_per_hour: unrealized_pnl / hours_held.max(0.1),
        capital_efficiency_pct: if entry_value > 0.0 {
            unrealized_pnl.abs() / entry_value * 100.0
        } else {
            0.0
        },
        risk_score,
        risk_level: RiskLevel::classify(risk_score, size_pct),
        momentum_score,
        momentum: MomentumLevel::classify(momentum_score),
        grade: PerformanceGrade::classify(unrealized_pnl_pct),
    };

    Some(PositionReport {
        symbol: symbol.to_string(),
        position: position.clone(),
        price,
        price_origin: origin,
        change_24h_pct: quote.change_24h_pct,
        metrics,
    })
}

/// Value every position in symbol order, skipping ones without an entry price.
pub fn evaluate_positions(
    positions: &BTreeMap<String, OpenPosition>,
    prices: &dyn PriceSource,
    portfolio_value: f64,
    as_of: NaiveDateTime,
) -> Vec<PositionReport> {
    positions
        .iter()
        .filter_map(|(symbol, pos)| {
            evaluate_position(symbol, pos, prices.quote(symbol), portfolio_value, as_of)
        })
        .collect()
}

// ─── Portfolio risk ─────────────────────────────────────────────────

/// Symbols treated as one correlated bloc.
pub const MAJOR_CRYPTO: [&str; 5] = ["BTC", "ETH", "SOL", "DOGE", "ADA"];

/// VaR multiplier for a one-sided 95% bound.
pub const VAR_95_Z: f64 = 1.65;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrelationRisk {
    #[default]
    Low,
    Medium,
    High,
}

upper_display!(CorrelationRisk);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRisk {
    pub positions: usize,
    pub total_position_value: f64,
    pub total_unrealized_pnl: f64,
    /// Total position value as % of the portfolio.
    pub total_exposure_pct: f64,
    /// Largest single position as % of the portfolio.
    pub concentration_pct: f64,
    pub var_95: f64,
    /// Combined loss if every stop is hit.
    pub max_drawdown_risk: f64,
    pub correlation_risk: CorrelationRisk,
    pub leverage_ratio: f64,
    /// 0–100.
    pub risk_score: f64,
}

impl PortfolioRisk {
    pub fn assess(reports: &[PositionReport], portfolio_value: f64) -> Self {
        if reports.is_empty() {
            return Self::default();
        }

        let total_position_value: f64 = reports.iter().map(|r| r.metrics.position_value).sum();
        let pnls: Vec<f64> = reports.iter().map(|r| r.metrics.unrealized_pnl).collect();
        let concentration_pct = reports
            .iter()
            .map(|r| r.metrics.size_pct)
            .fold(0.0, f64::max);
        let total_exposure_pct = if portfolio_value > 0.0 {
            total_position_value / portfolio_value * 100.0
        } else {
            0.0
        };

        let pnl_spread = if pnls.len() > 1 {
            population_std_dev(&pnls)
        } else {
            pnls.iter().copied().fold(f64::NEG_INFINITY, f64::max).abs()
        };
        let var_95 = pnl_spread * VAR_95_Z;

        let max_drawdown_risk = reports
            .iter()
            .filter_map(|r| {
                let p = &r.position;
                match (p.stop, p.entry) {
                    (Some(stop), Some(entry)) if stop > 0.0 && entry > 0.0 => {
                        Some(((entry - stop) * p.amount.unwrap_or(0.0)).abs())
                    }
                    _ => None,
                }
            })
            .sum();

        let majors = reports
            .iter()
            .filter(|r| MAJOR_CRYPTO.iter().any(|m| r.symbol.contains(m)))
            .count();
        let correlation_risk = match majors {
            n if n >= 3 => CorrelationRisk::High,
            2 => CorrelationRisk::Medium,
            _ => CorrelationRisk::Low,
        };

        let var_pct = if portfolio_value > 0.0 {
            (var_95 / portfolio_value * 100.0).min(50.0)
        } else {
            0.0
        };
        let risk_score =
            (concentration_pct * 0.3 + total_exposure_pct * 0.3 + var_pct * 0.4).min(100.0);

        Self {
            positions: reports.len(),
            total_position_value,
            total_unrealized_pnl: pnls.iter().sum(),
            total_exposure_pct,
            concentration_pct,
            var_95,
            max_drawdown_risk,
            correlation_risk,
            leverage_ratio: total_exposure_pct / 100.0,
            risk_score,
        }
    }
}
