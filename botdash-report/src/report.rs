//! Dashboard report: one pass over the loaded inputs producing every number
//! the dashboard shows.
//!
//! The report is a plain value. Building it performs no I/O and reads no
//! clock; the caller supplies `as_of` and a price source.

use botdash_core::breakdown::{by_asset, by_reason, AssetStats, GroupStats};
use botdash_core::compound::{fallback_daily_return, BandProjection, CompoundEstimate};
use botdash_core::daily::DailyReturns;
use botdash_core::domain::{BotSnapshot, TradeRecord};
use botdash_core::metrics::{filter_recent, PerformanceRatios};
use botdash_core::monte_carlo::{MonteCarloProjector, Projection, ReturnSample};
use botdash_core::positions::{evaluate_positions, PortfolioRisk, PositionReport, PriceSource};
use botdash_core::stats::TradeStatistics;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::loader::TradeLog;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Where the analysed trades came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSource {
    TradeLog,
    /// The trade log was empty; the snapshot's `recent_trades` were used.
    SnapshotRecent,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub current: f64,
    pub starting: f64,
    pub total_pnl: f64,
    pub total_pnl_pct: f64,
}

impl Balances {
    fn from_snapshot(snapshot: &BotSnapshot) -> Self {
        let current = snapshot.current_balance();
        let starting = snapshot.starting_balance();
        let total_pnl = current - starting;
        Self {
            current,
            starting,
            total_pnl,
            total_pnl_pct: if starting > 0.0 {
                total_pnl / starting * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Statistics over the trades that exited in the last `days` days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStatistics {
    pub days: u32,
    pub stats: TradeStatistics,
}

/// Everything projected for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonProjection {
    pub horizon_days: u32,
    pub monte_carlo: Projection,
    /// Present only when the Monte Carlo projection is insufficient.
    pub compound: Option<CompoundEstimate>,
    /// Present whenever a daily-return series exists.
    pub band: Option<BandProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: NaiveDateTime,
    pub last_updated: Option<String>,
    pub balances: Balances,
    pub trade_source: TradeSource,
    pub skipped_lines: usize,
    pub all_time: TradeStatistics,
    pub periods: Vec<PeriodStatistics>,
    pub daily: DailyReturns,
    pub ratios: PerformanceRatios,
    pub projections: Vec<HorizonProjection>,
    pub strategies: Vec<GroupStats>,
    pub assets: Vec<AssetStats>,
    pub positions: Vec<PositionReport>,
    pub portfolio_risk: PortfolioRisk,
    pub trades: Vec<TradeRecord>,
}

/// Pick the trades to analyse: the log when it has any, else the snapshot's
/// recent trades.
pub fn select_trades(log: &TradeLog, snapshot: &BotSnapshot) -> (Vec<TradeRecord>, TradeSource) {
    if !log.trades.is_empty() {
        (log.trades.clone(), TradeSource::TradeLog)
    } else if !snapshot.recent_trades.is_empty() {
        (snapshot.recent_trades.clone(), TradeSource::SnapshotRecent)
    } else {
        (Vec::new(), TradeSource::None)
    }
}

/// Project every configured horizon from the current balance.
pub fn project_horizons(
    trades: &[TradeRecord],
    snapshot: &BotSnapshot,
    stats: &TradeStatistics,
    daily: &DailyReturns,
    config: &DashboardConfig,
) -> Vec<HorizonProjection> {
    let balance = snapshot.current_balance();
    let projection = &config.projection;
    let projector = MonteCarloProjector::new(projection.monte_carlo());
    let sample = ReturnSample::from_trades(
        trades,
        snapshot.starting_balance(),
        projection.sampling,
        projection.default_trades_per_day,
    );

    projection
        .horizons
        .iter()
        .map(|&horizon_days| {
            let monte_carlo = projector.project(&sample, balance, horizon_days);
            let compound = match &monte_carlo {
                Projection::Simulated(_) => None,
                Projection::InsufficientData { reason, .. } => {
                    info!(horizon_days, %reason, "insufficient data, using compound fallback");
                    let (rate, source) = fallback_daily_return(daily, stats, balance);
                    Some(CompoundEstimate::new(balance, rate, source, horizon_days))
                }
            };
            HorizonProjection {
                horizon_days,
                monte_carlo,
                compound,
                band: BandProjection::from_daily(balance, daily, horizon_days),
            }
        })
        .collect()
}

/// Assemble the full report.
pub fn build_report(
    snapshot: &BotSnapshot,
    log: &TradeLog,
    config: &DashboardConfig,
    prices: &dyn PriceSource,
    as_of: NaiveDateTime,
) -> DashboardReport {
    let (trades, trade_source) = select_trades(log, snapshot);
    let balances = Balances::from_snapshot(snapshot);
    let tpd = config.projection.default_trades_per_day;

    let all_time = TradeStatistics::compute_with_fallback_rate(&trades, balances.starting, tpd);
    let periods = config
        .metrics
        .periods
        .iter()
        .map(|&days| {
            let recent = filter_recent(&trades, as_of, days);
            PeriodStatistics {
                days,
                stats: TradeStatistics::compute_with_fallback_rate(&recent, balances.starting, tpd),
            }
        })
        .collect();

    let daily = DailyReturns::from_trades(&trades, balances.starting);
    let ratios = PerformanceRatios::compute(&all_time, &daily, config.metrics.annualization_days);
    let projections = project_horizons(&trades, snapshot, &all_time, &daily, config);

    let positions = evaluate_positions(snapshot.open_positions(), prices, balances.current, as_of);
    let portfolio_risk = PortfolioRisk::assess(&positions, balances.current);

    debug!(
        trades = trades.len(),
        positions = positions.len(),
        horizons = projections.len(),
        "built dashboard report"
    );

    DashboardReport {
        schema_version: SCHEMA_VERSION,
        generated_at: as_of,
        last_updated: snapshot.last_updated.clone(),
        balances,
        trade_source,
        skipped_lines: log.skipped.len(),
        all_time,
        periods,
        daily,
        ratios,
        projections,
        strategies: by_reason(&trades),
        assets: by_asset(&trades),
        positions,
        portfolio_risk,
        trades,
    }
}
