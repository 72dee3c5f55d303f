//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: the full `DashboardReport`, schema-versioned
//! - **CSV**: trade tape, equity curve, and per-horizon projections
//! - **Markdown**: a human-readable dashboard summary
//!
//! Unknown (newer) schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use botdash_core::domain::TradeRecord;
use botdash_core::monte_carlo::Projection;
use tracing::info;

use crate::report::{DashboardReport, HorizonProjection, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize DashboardReport to JSON")
}

/// Deserialize a report, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<DashboardReport> {
    let report: DashboardReport =
        serde_json::from_str(json).context("failed to deserialize DashboardReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(v: Option<f64>, precision: usize) -> String {
    v.map(|x| format!("{x:.precision$}")).unwrap_or_default()
}

/// Columns: symbol, entry_time, exit_time, entry_price, exit_price, amount,
/// pnl, pnl_pct, reason. Missing values are empty cells.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "entry_time",
        "exit_time",
        "entry_price",
        "exit_price",
        "amount",
        "pnl",
        "pnl_pct",
        "reason",
    ])?;

    for t in trades {
        wtr.write_record([
            t.symbol.clone(),
            t.entry_time.clone().unwrap_or_default(),
            t.exit_time.clone().unwrap_or_default(),
            opt(t.entry_price, 6),
            opt(t.exit_price, 6),
            opt(t.amount, 6),
            opt(t.pnl, 2),
            opt(t.pnl_pct, 2),
            t.reason.clone().unwrap_or_default(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Equity after each trade; index 0 is the starting balance.
pub fn export_equity_csv(equity_curve: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade_index", "equity"])?;
    for (i, eq) in equity_curve.iter().enumerate() {
        wtr.write_record([&i.to_string(), &format!("{:.2}", eq)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per horizon. `kind` is `monte_carlo` or `compound`; the
/// percentile and probability columns are empty for the compound row.
pub fn export_projections_csv(projections: &[HorizonProjection]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "horizon_days",
        "kind",
        "p5",
        "p25",
        "p50",
        "p75",
        "p95",
        "prob_profit",
        "prob_gain_10",
        "prob_loss_10",
        "prob_loss_25",
        "point_estimate",
        "band_lower",
        "band_upper",
        "note",
    ])?;

    let money = |v: f64| format!("{v:.2}");
    for hp in projections {
        let (band_lower, band_upper) = hp
            .band
            .as_ref()
            .map(|b| (money(b.lower), money(b.upper)))
            .unwrap_or_default();
        let horizon = hp.horizon_days.to_string();

        let row: [String; 15] = match &hp.monte_carlo {
            Projection::Simulated(r) => {
                let p = &r.percentiles;
                let pr = &r.probabilities;
                [
                    horizon,
                    "monte_carlo".into(),
                    money(p.p5),
                    money(p.p25),
                    money(p.p50),
                    money(p.p75),
                    money(p.p95),
                    money(pr.profit),
                    money(pr.gain_10),
                    money(pr.loss_10),
                    money(pr.loss_25),
                    money(r.mean),
                    band_lower,
                    band_upper,
                    String::new(),
                ]
            }
            Projection::InsufficientData { reason, .. } => {
                let point = hp
                    .compound
                    .as_ref()
                    .map(|c| money(c.projected))
                    .unwrap_or_default();
                let mut row: [String; 15] = Default::default();
                row[0] = horizon;
                row[1] = "compound".into();
                row[11] = point;
                row[12] = band_lower;
                row[13] = band_upper;
                row[14] = reason.to_string();
                row
            }
        };
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown ───────────────────────────────────────────────────────

/// Human-readable dashboard summary.
pub fn generate_markdown(report: &DashboardReport) -> String {
    let mut md = String::with_capacity(4096);
    let b = &report.balances;
    let s = &report.all_time;

    md.push_str("# Trading Bot Report\n\n");
    md.push_str(&format!("Generated {}\n\n", report.generated_at));

    md.push_str("## Account\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Current Balance | ${:.2} |\n", b.current));
    md.push_str(&format!("| Starting Balance | ${:.2} |\n", b.starting));
    md.push_str(&format!(
        "| Total P&L | ${:+.2} ({:+.2}%) |\n",
        b.total_pnl, b.total_pnl_pct
    ));
    if let Some(ts) = &report.last_updated {
        md.push_str(&format!("| Last Updated | {ts} |\n"));
    }
    md.push('\n');

    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Trades | {} |\n", s.total_trades));
    md.push_str(&format!(
        "| Win Rate | {:.1}% ({}W / {}L) |\n",
        s.win_rate, s.win_count, s.loss_count
    ));
    md.push_str(&format!("| Net P&L | ${:+.2} |\n", s.net_pnl));
    md.push_str(&format!("| Profit Factor | {:.2} |\n", s.profit_factor));
    md.push_str(&format!("| Expectancy | ${:+.2} |\n", s.expectancy));
    md.push_str(&format!("| Avg Win / Loss | ${:.2} / ${:.2} |\n", s.avg_win, s.avg_loss));
    md.push_str(&format!("| Risk/Reward | {:.2} |\n", s.risk_reward));
    md.push_str(&format!(
        "| Max Drawdown | ${:.2} ({:.2}%) |\n",
        s.max_drawdown, s.max_drawdown_pct
    ));
    md.push_str(&format!("| Sharpe | {:.3} |\n", report.ratios.sharpe));
    md.push_str(&format!("| Sortino | {:.3} |\n", report.ratios.sortino));
    md.push_str(&format!("| Calmar | {:.3} |\n", report.ratios.calmar));
    md.push_str(&format!(
        "| Streaks | best {}W / worst {}L |\n",
        s.streaks.max_win_streak, s.streaks.max_loss_streak
    ));
    md.push_str(&format!("| Trades / Day | {:.2} |\n", s.avg_trades_per_day));
    md.push('\n');

    if !report.periods.is_empty() {
        md.push_str("## Recent Periods\n\n");
        md.push_str("| Window | Trades | Win Rate | Net P&L |\n");
        md.push_str("| --- | ---: | ---: | ---: |\n");
        for p in &report.periods {
            md.push_str(&format!(
                "| {}d | {} | {:.1}% | ${:+.2} |\n",
                p.days, p.stats.total_trades, p.stats.win_rate, p.stats.net_pnl
            ));
        }
        md.push('\n');
    }

    md.push_str("## Projections\n\n");
    md.push_str("| Horizon | Kind | P5 | P50 | P95 | P(profit) |\n");
    md.push_str("| --- | --- | ---: | ---: | ---: | ---: |\n");
    for hp in &report.projections {
        match &hp.monte_carlo {
            Projection::Simulated(r) => md.push_str(&format!(
                "| {}d | Monte Carlo | ${:.2} | ${:.2} | ${:.2} | {:.1}% |\n",
                hp.horizon_days,
                r.percentiles.p5,
                r.percentiles.p50,
                r.percentiles.p95,
                r.probabilities.profit
            )),
            Projection::InsufficientData { reason, .. } => {
                let point = hp
                    .compound
                    .as_ref()
                    .map(|c| format!("${:.2}", c.projected))
                    .unwrap_or_else(|| "-".into());
                md.push_str(&format!(
                    "| {}d | Compound estimate ({reason}) | - | {point} | - | - |\n",
                    hp.horizon_days
                ));
            }
        }
    }
    md.push('\n');

    if !report.strategies.is_empty() {
        md.push_str("## Strategies\n\n");
        md.push_str("| Reason | Trades | Win Rate | Total P&L | Sharpe |\n");
        md.push_str("| --- | ---: | ---: | ---: | ---: |\n");
        for g in &report.strategies {
            md.push_str(&format!(
                "| {} | {} | {:.1}% | ${:+.2} | {:.2} |\n",
                g.name, g.trades, g.win_rate, g.total_pnl, g.sharpe
            ));
        }
        md.push('\n');
    }

    if !report.positions.is_empty() {
        let risk = &report.portfolio_risk;
        md.push_str("## Open Positions\n\n");
        md.push_str("| Symbol | Price | Unrealized | Size | Risk | Grade |\n");
        md.push_str("| --- | ---: | ---: | ---: | --- | --- |\n");
        for p in &report.positions {
            md.push_str(&format!(
                "| {} | {:.4} | ${:+.2} ({:+.2}%) | {:.1}% | {} | {} |\n",
                p.symbol,
                p.price,
                p.metrics.unrealized_pnl,
                p.metrics.unrealized_pnl_pct,
                p.metrics.size_pct,
                p.metrics.risk_level,
                p.metrics.grade
            ));
        }
        md.push_str(&format!(
            "\nExposure {:.1}%, concentration {:.1}%, VaR95 ${:.2}, correlation {}, risk score {:.0}/100\n\n",
            risk.total_exposure_pct,
            risk.concentration_pct,
            risk.var_95,
            risk.correlation_risk,
            risk.risk_score
        ));
    }

    if report.skipped_lines > 0 {
        md.push_str(&format!(
            "> {} malformed trade line(s) were skipped.\n",
            report.skipped_lines
        ));
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a report.
///
/// Creates `report_{timestamp}/` under `output_dir` containing
/// `report.json`, `trades.csv`, `equity.csv`, `projections.csv` and
/// `report.md`. The timestamp is the report's `generated_at`.
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &DashboardReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("report_{}", report.generated_at.format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("report.json", export_json(report)?),
        ("trades.csv", export_trades_csv(&report.trades)?),
        ("equity.csv", export_equity_csv(&report.all_time.equity_curve)?),
        ("projections.csv", export_projections_csv(&report.projections)?),
        ("report.md", generate_markdown(report)),
    ];
    for (name, content) in files {
        let path = run_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!(dir = %run_dir.display(), "saved report artifacts");
    Ok(run_dir)
}

/// Load a report from an artifact directory's `report.json`.
pub fn load_artifacts(dir: &Path) -> Result<DashboardReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
