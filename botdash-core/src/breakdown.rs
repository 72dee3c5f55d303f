//! Strategy and asset breakdowns.
//!
//! Groups are keyed by the trade's opaque `reason` string or by the base asset
//! of its symbol. Output is sorted by total P&L descending, ties by name, so
//! the order is stable for a given input.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::TradeRecord;
use crate::metrics::{mean, sample_std_dev};

/// Aggregates for one group of trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub name: String,
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    /// Mean / sample std of per-trade P&L; 0 with fewer than two trades.
    pub sharpe: f64,
}

impl GroupStats {
    fn from_pnls(name: &str, pnls: &[f64]) -> Self {
        let trades = pnls.len();
        let wins = pnls.iter().filter(|&&p| p > 0.0).count();
        let std = sample_std_dev(pnls);
        Self {
            name: name.to_string(),
            trades,
            wins,
            win_rate: if trades > 0 {
                wins as f64 / trades as f64 * 100.0
            } else {
                0.0
            },
            total_pnl: pnls.iter().sum(),
            avg_pnl: mean(pnls),
            sharpe: if trades >= 2 && std > 1e-15 {
                mean(pnls) / std
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStats {
    #[serde(flatten)]
    pub stats: GroupStats,
    pub reasons: BTreeSet<String>,
    /// Most frequent reason; ties go to the lexicographically smallest.
    pub primary_reason: Option<String>,
}

/// Per-`reason` breakdown. Missing or empty reasons group under `unknown`.
pub fn by_reason(trades: &[TradeRecord]) -> Vec<GroupStats> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for trade in trades {
        groups
            .entry(trade.reason_key())
            .or_default()
            .push(trade.pnl_or_zero());
    }
    let mut out: Vec<GroupStats> = groups
        .into_iter()
        .map(|(name, pnls)| GroupStats::from_pnls(name, &pnls))
        .collect();
    sort_groups(&mut out, |g| g);
    out
}

/// Per-asset breakdown with the set of strategies seen on each asset.
pub fn by_asset(trades: &[TradeRecord]) -> Vec<AssetStats> {
    #[derive(Default)]
    struct Acc<'a> {
        pnls: Vec<f64>,
        reasons: BTreeMap<&'a str, usize>,
    }

    let mut groups: BTreeMap<&str, Acc<'_>> = BTreeMap::new();
    for trade in trades {
        let acc = groups.entry(trade.asset()).or_default();
        acc.pnls.push(trade.pnl_or_zero());
        *acc.reasons.entry(trade.reason_key()).or_insert(0) += 1;
    }

    let mut out: Vec<AssetStats> = groups
        .into_iter()
        .map(|(asset, acc)| {
            // First maximum in name order wins.
            let primary_reason = acc
                .reasons
                .iter()
                .fold(None::<(&str, usize)>, |best, (&name, &count)| match best {
                    Some((_, c)) if c >= count => best,
                    _ => Some((name, count)),
                })
                .map(|(name, _)| name.to_string());
            AssetStats {
                stats: GroupStats::from_pnls(asset, &acc.pnls),
                reasons: acc.reasons.keys().map(|r| r.to_string()).collect(),
                primary_reason,
            }
        })
        .collect();
    sort_groups(&mut out, |a| &a.stats);
    out
}

fn sort_groups<T>(items: &mut [T], key: impl Fn(&T) -> &GroupStats) {
    items.sort_by(|a, b| {
        let (a, b) = (key(a), key(b));
        b.total_pnl
            .total_cmp(&a.total_pnl)
            .then_with(|| a.name.cmp(&b.name))
    });
}
