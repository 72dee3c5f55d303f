//! Botdash CLI: trading bot performance report, projections and position risk.
//!
//! Commands:
//! - `report`: full text dashboard (or `--json` for the report document)
//! - `project`: per-horizon Monte Carlo / compound projection table
//! - `positions`: open-position valuation and portfolio risk
//! - `export`: write the JSON/CSV/Markdown artifact bundle

use std::path::PathBuf;

use anyhow::{Context, Result};
use botdash_core::monte_carlo::Projection;
use botdash_core::positions::{Quote, StaticPrices};
use botdash_report::{
    build_report, load_snapshot, load_trades, save_artifacts, DashboardConfig, DashboardReport,
    HorizonProjection,
};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(
    name = "botdash",
    about = "Botdash: trade statistics, Monte Carlo projections and position risk for a trading bot"
)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full dashboard summary.
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print only the per-horizon projections.
    Project {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Value open positions and assess portfolio risk.
    Positions {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Write report.json, trades.csv, equity.csv, projections.csv and report.md.
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Directory under which the report_<timestamp> folder is created.
        #[arg(long, default_value = "reports")]
        output_dir: PathBuf,
    },
}

/// Input locations and projection overrides shared by every command.
#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Bot snapshot JSON (overrides `data.snapshot`).
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Trade log JSON-lines file (overrides `data.trades`).
    #[arg(long)]
    trades: Option<PathBuf>,

    /// Master seed for reproducible projections.
    #[arg(long)]
    seed: Option<u64>,

    /// Monte Carlo trials per horizon.
    #[arg(long)]
    trials: Option<usize>,

    /// Projection horizon in days; repeat for several.
    #[arg(long = "horizon")]
    horizons: Vec<u32>,

    /// Live quote as SYMBOL=PRICE; repeat for several. Unquoted positions
    /// are valued at their entry price.
    #[arg(long = "price", value_parser = parse_price)]
    prices: Vec<(String, Quote)>,
}

impl InputArgs {
    fn apply(&self, config: &mut DashboardConfig) {
        if let Some(path) = &self.snapshot {
            config.data.snapshot = path.clone();
        }
        if let Some(path) = &self.trades {
            config.data.trades = path.clone();
        }
        if let Some(seed) = self.seed {
            config.projection.seed = Some(seed);
        }
        if let Some(trials) = self.trials {
            config.projection.trials = trials;
        }
        if !self.horizons.is_empty() {
            config.projection.horizons = self.horizons.clone();
        }
    }
}

/// Parse `SYMBOL=PRICE`.
fn parse_price(raw: &str) -> Result<(String, Quote), String> {
    let (symbol, price) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=PRICE, got '{raw}'"))?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(format!("missing symbol in '{raw}'"));
    }
    let price: f64 = price
        .trim()
        .parse()
        .map_err(|_| format!("invalid price in '{raw}'"))?;
    if !(price.is_finite() && price > 0.0) {
        return Err(format!("price must be positive, got {price}"));
    }
    Ok((symbol.to_string(), Quote::new(price)))
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let base = DashboardConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Report { input, json } => {
            let report = generate(base, &input)?;
            if json {
                println!("{}", botdash_report::export_json(&report)?);
            } else {
                print_summary(&report);
                print_projections(&report.projections);
                print_positions(&report);
            }
        }
        Commands::Project { input } => {
            let report = generate(base, &input)?;
            print_projections(&report.projections);
        }
        Commands::Positions { input } => {
            let report = generate(base, &input)?;
            print_positions(&report);
        }
        Commands::Export { input, output_dir } => {
            let report = generate(base, &input)?;
            let run_dir = save_artifacts(&report, &output_dir)?;
            println!("Artifacts saved to: {}", run_dir.display());
        }
    }
    Ok(())
}

/// Apply overrides, validate, load inputs and build the report.
fn generate(mut config: DashboardConfig, input: &InputArgs) -> Result<DashboardReport> {
    input.apply(&mut config);
    config.validate()?;
    debug!(?config, "effective configuration");

    let snapshot = load_snapshot(&config.data.snapshot)?;
    let log = load_trades(&config.data.trades)
        .with_context(|| format!("failed to load trades from {}", config.data.trades.display()))?;
    if !log.skipped.is_empty() {
        info!(skipped = log.skipped.len(), "some trade lines could not be read");
    }

    let prices: StaticPrices = input.prices.iter().cloned().collect();
    let as_of = chrono::Utc::now().naive_utc();
    Ok(build_report(&snapshot, &log, &config, &prices, as_of))
}

fn print_summary(report: &DashboardReport) {
    let b = &report.balances;
    let s = &report.all_time;
    println!();
    println!("=== Trading Bot Dashboard ===");
    println!("Balance:        ${:.2}", b.current);
    println!("Starting:       ${:.2}", b.starting);
    println!("Total P&L:      ${:+.2} ({:+.2}%)", b.total_pnl, b.total_pnl_pct);
    if let Some(ts) = &report.last_updated {
        println!("Last Updated:   {ts}");
    }
    println!();
    println!("--- Performance ---");
    println!("Trades:         {}", s.total_trades);
    println!(
        "Win Rate:       {:.1}% ({}W / {}L)",
        s.win_rate, s.win_count, s.loss_count
    );
    println!("Net P&L:        ${:+.2}", s.net_pnl);
    println!("Profit Factor:  {:.2}", s.profit_factor);
    println!("Expectancy:     ${:+.2}", s.expectancy);
    println!("Risk/Reward:    {:.2}", s.risk_reward);
    println!(
        "Max Drawdown:   ${:.2} ({:.2}%)",
        s.max_drawdown, s.max_drawdown_pct
    );
    println!("Sharpe:         {:.3}", report.ratios.sharpe);
    println!("Sortino:        {:.3}", report.ratios.sortino);
    println!("Calmar:         {:.3}", report.ratios.calmar);
    println!("Max Consec Win: {}", s.streaks.max_win_streak);
    println!("Max Consec Loss:{}", s.streaks.max_loss_streak);
    println!("Trades/Day:     {:.2}", s.avg_trades_per_day);

    if !report.periods.is_empty() {
        println!();
        println!("{:<8} {:>8} {:>10} {:>12}", "Window", "Trades", "Win Rate", "Net P&L");
        println!("{}", "-".repeat(41));
        for p in &report.periods {
            println!(
                "{:<8} {:>8} {:>9.1}% {:>12.2}",
                format!("{}d", p.days),
                p.stats.total_trades,
                p.stats.win_rate,
                p.stats.net_pnl
            );
        }
    }

    if !report.strategies.is_empty() {
        println!();
        println!("{:<20} {:>7} {:>10} {:>12}", "Strategy", "Trades", "Win Rate", "Total P&L");
        println!("{}", "-".repeat(52));
        for g in &report.strategies {
            println!(
                "{:<20} {:>7} {:>9.1}% {:>12.2}",
                g.name, g.trades, g.win_rate, g.total_pnl
            );
        }
    }
    if report.skipped_lines > 0 {
        println!();
        println!("WARNING: {} malformed trade line(s) skipped", report.skipped_lines);
    }
    println!();
}

fn print_projections(projections: &[HorizonProjection]) {
    println!("--- Projections ---");
    println!(
        "{:<8} {:>12} {:>12} {:>12} {:>10} {:>10}",
        "Horizon", "P5", "P50", "P95", "P(profit)", "P(-10%)"
    );
    println!("{}", "-".repeat(69));
    for hp in projections {
        let horizon = format!("{}d", hp.horizon_days);
        match &hp.monte_carlo {
            Projection::Simulated(r) => println!(
                "{:<8} {:>12.2} {:>12.2} {:>12.2} {:>9.1}% {:>9.1}%",
                horizon,
                r.percentiles.p5,
                r.percentiles.p50,
                r.percentiles.p95,
                r.probabilities.profit,
                r.probabilities.loss_10
            ),
            Projection::InsufficientData { reason, .. } => {
                let estimate = hp
                    .compound
                    .as_ref()
                    .map(|c| format!("{:.2}", c.projected))
                    .unwrap_or_else(|| "-".into());
                println!("{horizon:<8} {estimate:>12} (compound estimate; {reason})");
            }
        }
        if let Some(band) = &hp.band {
            println!(
                "{:<8} band {:.2} .. {:.2}",
                "", band.lower, band.upper
            );
        }
    }
    println!();
}

fn print_positions(report: &DashboardReport) {
    if report.positions.is_empty() {
        println!("No open positions.");
        return;
    }
    println!("--- Open Positions ---");
    println!(
        "{:<12} {:>12} {:>12} {:>8} {:>8} {:>6}",
        "Symbol", "Price", "Unrealized", "Size", "Risk", "Grade"
    );
    println!("{}", "-".repeat(63));
    for p in &report.positions {
        println!(
            "{:<12} {:>12.4} {:>12.2} {:>7.1}% {:>8} {:>6}{}",
            p.symbol,
            p.price,
            p.metrics.unrealized_pnl,
            p.metrics.size_pct,
            p.metrics.risk_level,
            p.metrics.grade,
            match p.price_origin {
                botdash_core::positions::PriceOrigin::Live => "",
                botdash_core::positions::PriceOrigin::EntryFallback => "  (entry price)",
            }
        );
    }
    let risk = &report.portfolio_risk;
    println!();
    println!("Exposure:       {:.1}%", risk.total_exposure_pct);
    println!("Concentration:  {:.1}%", risk.concentration_pct);
    println!("VaR (95%):      ${:.2}", risk.var_95);
    println!("Stop Risk:      ${:.2}", risk.max_drawdown_risk);
    println!("Correlation:    {}", risk.correlation_risk);
    println!("Risk Score:     {:.0}/100", risk.risk_score);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_price_argument() {
        let (sym, q) = parse_price("SOL/USDT=245.5").unwrap();
        assert_eq!(sym, "SOL/USDT");
        assert_eq!(q.price, 245.5);
        assert_eq!(q.change_24h_pct, 0.0);
    }

    #[test]
    fn rejects_bad_price_arguments() {
        assert!(parse_price("SOL/USDT").is_err());
        assert!(parse_price("=10").is_err());
        assert!(parse_price("BTC/USDT=abc").is_err());
        assert!(parse_price("BTC/USDT=-1").is_err());
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::try_parse_from([
            "botdash", "project", "--seed", "42", "--trials", "100", "--horizon", "14",
            "--horizon", "60", "--trades", "t.jsonl",
        ])
        .unwrap();
        let Commands::Project { input } = cli.command else {
            panic!("expected project command");
        };
        let mut config = DashboardConfig::default();
        input.apply(&mut config);
        assert_eq!(config.projection.seed, Some(42));
        assert_eq!(config.projection.trials, 100);
        assert_eq!(config.projection.horizons, vec![14, 60]);
        assert_eq!(config.data.trades, PathBuf::from("t.jsonl"));
        assert_eq!(config.data.snapshot, PathBuf::from("bot_data.json"));
    }

    #[test]
    fn no_overrides_keep_defaults() {
        let mut config = DashboardConfig::default();
        InputArgs::default().apply(&mut config);
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
