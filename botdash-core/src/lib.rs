//! Botdash Core: pure analytics over a trading bot's trade history.
//!
//! This crate holds every computation the dashboard performs and none of its
//! I/O:
//! - Domain types for trades, open positions and the bot snapshot
//! - Trade Statistics Aggregator (win rate, expectancy, profit factor, equity
//!   curve, drawdown, streaks)
//! - Daily-return series and annualized performance ratios
//! - Monte Carlo Projector with seedable bootstrap resampling
//! - Compound growth fallback and volatility-band projection
//! - Strategy/asset breakdowns and open-position risk analytics
//!
//! Every analytics function is total. Malformed fields degrade locally, and
//! the only non-numeric outcome is the projector's explicit insufficient-data
//! result.

pub mod breakdown;
pub mod compound;
pub mod daily;
pub mod domain;
pub mod metrics;
pub mod monte_carlo;
pub mod positions;
pub mod ratio;
pub mod rng;
pub mod stats;

pub use compound::{compound_growth, BandProjection, CompoundEstimate, RateSource};
pub use daily::DailyReturns;
pub use domain::{BotSnapshot, OpenPosition, TradeRecord};
pub use metrics::PerformanceRatios;
pub use monte_carlo::{
    MonteCarloConfig, MonteCarloProjector, Projection, ReturnSample, SamplingMode,
    SimulationResult,
};
pub use ratio::Ratio;
pub use stats::TradeStatistics;
