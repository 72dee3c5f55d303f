//! Monte Carlo Projector: bootstrap resampling of historical outcomes.
//!
//! Each trial walks the horizon drawing one historical value per step,
//! uniformly and with replacement. In `DailyReturns` mode the draw is a daily
//! return compounded into the balance; in `TradePnl` mode it is a trade P&L
//! added to the balance. The `N` final balances are reduced to percentiles and
//! threshold probabilities.
//!
//! Percentiles use the index `floor(p * (N - 1))` into the ascending sort
//! (no interpolation). A series with a single value is legal: every trial is
//! the same deterministic compounding of that value.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::daily::DailyReturns;
use crate::domain::TradeRecord;
use crate::metrics::mean;
use crate::rng::SeedHierarchy;
use crate::stats::{avg_trades_per_day, TradeStatistics, DEFAULT_TRADES_PER_DAY};

/// Trials per horizon.
pub const DEFAULT_TRIALS: usize = 5000;

/// Below this many trades the projector refuses to simulate.
pub const MIN_TRADES: usize = 10;

/// Reported percentiles, as fractions.
pub const PERCENTILES: [f64; 5] = [0.05, 0.25, 0.50, 0.75, 0.95];

// ─── Configuration ──────────────────────────────────────────────────

/// What each simulation step draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// One historical daily return per day, compounded.
    #[default]
    DailyReturns,
    /// `floor(days × trades_per_day)` historical trade P&Ls, added, with a
    /// per-horizon minimum (see [`min_trade_draws`]).
    TradePnl,
}

impl SamplingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplingMode::DailyReturns => "daily_returns",
            SamplingMode::TradePnl => "trade_pnl",
        }
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub trials: usize,
    pub min_trades: usize,
    pub sampling: SamplingMode,
    /// Master seed. `None` draws every horizon from OS entropy.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            min_trades: MIN_TRADES,
            sampling: SamplingMode::default(),
            seed: None,
        }
    }
}

// ─── Input sample ───────────────────────────────────────────────────

/// Historical values the projector resamples from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSample {
    pub sampling: SamplingMode,
    /// Daily returns (fractions) or trade P&Ls, depending on `sampling`.
    pub values: Vec<f64>,
    /// Number of trades behind the sample; gates simulation.
    pub trade_count: usize,
    pub trades_per_day: f64,
}

impl ReturnSample {
    /// Daily-return series measured against `starting_balance`.
    pub fn daily_returns(trades: &[TradeRecord], starting_balance: f64) -> Self {
        Self::from_daily(&DailyReturns::from_trades(trades, starting_balance), trades.len())
    }

    pub fn from_daily(daily: &DailyReturns, trade_count: usize) -> Self {
        Self {
            sampling: SamplingMode::DailyReturns,
            values: daily.returns(),
            trade_count,
            trades_per_day: DEFAULT_TRADES_PER_DAY,
        }
    }

    /// Per-trade P&L in input order.
    pub fn trade_pnl(trades: &[TradeRecord], trades_per_day: f64) -> Self {
        Self {
            sampling: SamplingMode::TradePnl,
            values: TradeStatistics::pnl_values(trades),
            trade_count: trades.len(),
            trades_per_day,
        }
    }

    pub fn from_trades(
        trades: &[TradeRecord],
        starting_balance: f64,
        sampling: SamplingMode,
        fallback_trades_per_day: f64,
    ) -> Self {
        match sampling {
            SamplingMode::DailyReturns => Self::daily_returns(trades, starting_balance),
            SamplingMode::TradePnl => {
                Self::trade_pnl(trades, avg_trades_per_day(trades, fallback_trades_per_day))
            }
        }
    }

    /// Draws per trial for a horizon.
    pub fn steps_for(&self, horizon_days: u32) -> usize {
        match self.sampling {
            SamplingMode::DailyReturns => horizon_days as usize,
            SamplingMode::TradePnl => {
                let n = (f64::from(horizon_days) * self.trades_per_day).floor();
                let n = if n.is_finite() && n > 0.0 { n as usize } else { 0 };
                n.max(min_trade_draws(horizon_days))
            }
        }
    }
}

/// Fewest trade draws per trial in `TradePnl` mode: 5 up to a week, 10 up to
/// a month, 20 beyond.
pub fn min_trade_draws(horizon_days: u32) -> usize {
    match horizon_days {
        0..=7 => 5,
        8..=30 => 10,
        _ => 20,
    }
}

// ─── Results ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

/// Share of trials (0–100) meeting each condition against the start balance.
/// Conditions are independent; one trial may count toward several.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProbabilities {
    /// Final > start.
    pub profit: f64,
    /// Final > 1.10 × start.
    pub gain_10: f64,
    /// Final < 0.90 × start.
    pub loss_10: f64,
    /// Final < 0.75 × start.
    pub loss_25: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub horizon_days: u32,
    pub sampling: SamplingMode,
    pub trials: usize,
    /// Draws per trial.
    pub steps: usize,
    pub sample_size: usize,
    pub starting_balance: f64,
    pub percentiles: Percentiles,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub probabilities: ThresholdProbabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsufficientReason {
    TooFewTrades { have: usize, need: usize },
    /// Enough trades, but none with a usable exit time.
    NoDatedTrades,
}

impl fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientReason::TooFewTrades { have, need } => {
                write!(f, "need at least {need} trades, have {have}")
            }
            InsufficientReason::NoDatedTrades => f.write_str("no trades with a valid exit time"),
        }
    }
}

/// A horizon's projection, or the explicit refusal to produce one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Projection {
    Simulated(SimulationResult),
    InsufficientData {
        horizon_days: u32,
        reason: InsufficientReason,
    },
}

impl Projection {
    pub fn horizon_days(&self) -> u32 {
        match self {
            Projection::Simulated(r) => r.horizon_days,
            Projection::InsufficientData { horizon_days, .. } => *horizon_days,
        }
    }

    pub fn simulated(&self) -> Option<&SimulationResult> {
        match self {
            Projection::Simulated(r) => Some(r),
            Projection::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Projection::InsufficientData { .. })
    }
}

// ─── Projector ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MonteCarloProjector {
    config: MonteCarloConfig,
}

impl MonteCarloProjector {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Why `sample` cannot be simulated, if it cannot.
    pub fn check(&self, sample: &ReturnSample) -> Option<InsufficientReason> {
        if sample.trade_count < self.config.min_trades {
            return Some(InsufficientReason::TooFewTrades {
                have: sample.trade_count,
                need: self.config.min_trades,
            });
        }
        if sample.values.is_empty() {
            return Some(InsufficientReason::NoDatedTrades);
        }
        None
    }

    /// Project one horizon. Seeded runs derive a per-horizon generator from
    /// the master seed; unseeded runs use OS entropy.
    pub fn project(&self, sample: &ReturnSample, balance: f64, horizon_days: u32) -> Projection {
        let mut rng = match self.config.seed {
            Some(seed) => SeedHierarchy::new(seed)
                .rng_for(sample.sampling.as_str(), u64::from(horizon_days)),
            None => StdRng::from_entropy(),
        };
        self.project_with_rng(sample, balance, horizon_days, &mut rng)
    }

    pub fn project_all(&self, sample: &ReturnSample, balance: f64, horizons: &[u32]) -> Vec<Projection> {
        horizons
            .iter()
            .map(|&h| self.project(sample, balance, h))
            .collect()
    }

    /// Project one horizon drawing from the supplied generator.
    pub fn project_with_rng<R: Rng + ?Sized>(
        &self,
        sample: &ReturnSample,
        balance: f64,
        horizon_days: u32,
        rng: &mut R,
    ) -> Projection {
        if let Some(reason) = self.check(sample) {
            return Projection::InsufficientData {
                horizon_days,
                reason,
            };
        }

        let trials = self.config.trials.max(1);
        let steps = sample.steps_for(horizon_days);
        let finals = match sample.sampling {
            SamplingMode::DailyReturns => {
                simulate_final_balances(&sample.values, balance, steps, trials, rng)
            }
            SamplingMode::TradePnl => {
                simulate_trade_pnl_balances(&sample.values, balance, steps, trials, rng)
            }
        };

        let mut result = summarize(finals, balance, horizon_days, sample.sampling);
        result.steps = steps;
        result.sample_size = sample.values.len();
        Projection::Simulated(result)
    }
}

// ─── Simulation kernels ─────────────────────────────────────────────

/// Compounding bootstrap: per trial, `days` draws of `balance *= 1 + r`.
///
/// Draw order is trial-major, then day. An empty series leaves every trial at
/// `balance`.
pub fn simulate_final_balances<R: Rng + ?Sized>(
    returns: &[f64],
    balance: f64,
    days: usize,
    trials: usize,
    rng: &mut R,
) -> Vec<f64> {
    if returns.is_empty() {
        return vec![balance; trials];
    }
    let mut finals = Vec::with_capacity(trials);
    for _ in 0..trials {
        let mut b = balance;
        for _ in 0..days {
            let idx = rng.gen_range(0..returns.len());
            b *= 1.0 + returns[idx];
        }
        finals.push(b);
    }
    finals
}

/// Additive bootstrap: per trial, `steps` draws of `balance += pnl`.
pub fn simulate_trade_pnl_balances<R: Rng + ?Sized>(
    pnls: &[f64],
    balance: f64,
    steps: usize,
    trials: usize,
    rng: &mut R,
) -> Vec<f64> {
    if pnls.is_empty() {
        return vec![balance; trials];
    }
    let mut finals = Vec::with_capacity(trials);
    for _ in 0..trials {
        let mut b = balance;
        for _ in 0..steps {
            b += pnls[rng.gen_range(0..pnls.len())];
        }
        finals.push(b);
    }
    finals
}

// ─── Reduction ──────────────────────────────────────────────────────

/// Reduce final balances to percentiles and threshold probabilities.
///
/// `steps` and `sample_size` are left at zero for the caller to fill.
pub fn summarize(
    mut finals: Vec<f64>,
    starting_balance: f64,
    horizon_days: u32,
    sampling: SamplingMode,
) -> SimulationResult {
    finals.sort_by(f64::total_cmp);
    let trials = finals.len();

    let [p5, p25, p50, p75, p95] = PERCENTILES.map(|p| percentile_sorted(&finals, p));

    let share = |pred: &dyn Fn(f64) -> bool| -> f64 {
        if trials == 0 {
            return 0.0;
        }
        finals.iter().filter(|&&b| pred(b)).count() as f64 / trials as f64 * 100.0
    };
    let probabilities = ThresholdProbabilities {
        profit: share(&|b| b > starting_balance),
        gain_10: share(&|b| b > starting_balance * 1.1),
        loss_10: share(&|b| b < starting_balance * 0.9),
        loss_25: share(&|b| b < starting_balance * 0.75),
    };

    SimulationResult {
        horizon_days,
        sampling,
        trials,
        steps: 0,
        sample_size: 0,
        starting_balance,
        percentiles: Percentiles {
            p5,
            p25,
            p50,
            p75,
            p95,
        },
        mean: mean(&finals),
        min: finals.first().copied().unwrap_or(starting_balance),
        max: finals.last().copied().unwrap_or(starting_balance),
        probabilities,
    }
}

/// Value at index `floor(p * (n - 1))` of an ascending slice; 0 when empty.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
