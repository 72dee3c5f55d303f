use std::fs;
use std::path::Path;

use botdash_core::positions::{Quote, StaticPrices};
use botdash_report::export::{
    export_projections_csv, export_trades_csv, import_json, load_artifacts, save_artifacts,
};
use botdash_report::{
    build_report, load_snapshot, load_trades, DashboardConfig, DashboardReport, TradeSource,
};
use chrono::{NaiveDate, NaiveDateTime};

const SNAPSHOT: &str = r#"{
    "account": {"total_usd": 1103.0},
    "trading_state": {
        "starting_balance": 1000.0,
        "positions": {
            "SOL/USDT": {"entry": 100.0, "amount": 2.0, "stop": 95.0, "target": 110.0,
                         "time": "2024-01-20T00:00:00Z", "reason": "breakout"},
            "PEPE/USDT": {"amount": 1000.0}
        }
    },
    "last_updated": "2024-01-21T00:00:00Z"
}"#;

fn as_of() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 21)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn write_inputs(dir: &Path, trade_days: u32) {
    fs::write(dir.join("bot_data.json"), SNAPSHOT).unwrap();
    let mut lines = String::new();
    for day in 1..=trade_days {
        let pnl = if day % 4 == 0 { -6.0 } else { 11.0 };
        let reason = if day % 2 == 0 { "momentum" } else { "breakout" };
        lines.push_str(&format!(
            r#"{{"symbol":"BTC/USDT","entry":100,"exit":101,"amount":1,"pnl":{pnl},"reason":"{reason}","exit_time":"2024-01-{day:02}T12:00:00Z"}}"#
        ));
        lines.push('\n');
    }
    lines.push_str("garbage line\n");
    fs::write(dir.join("trades.jsonl"), lines).unwrap();
}

fn build(dir: &Path) -> DashboardReport {
    let mut config = DashboardConfig::default();
    config.projection.seed = Some(7);
    config.projection.trials = 500;
    let snapshot = load_snapshot(&dir.join("bot_data.json")).unwrap();
    let log = load_trades(&dir.join("trades.jsonl")).unwrap();
    let prices: StaticPrices = [("SOL/USDT".to_string(), Quote::new(104.0))]
        .into_iter()
        .collect();
    build_report(&snapshot, &log, &config, &prices, as_of())
}

#[test]
fn report_from_files() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), 12);
    let report = build(dir.path());

    assert_eq!(report.trade_source, TradeSource::TradeLog);
    assert_eq!(report.skipped_lines, 1);
    assert_eq!(report.all_time.total_trades, 12);
    assert_eq!(report.all_time.win_count, 9);
    assert!((report.balances.total_pnl - 103.0).abs() < 1e-9);
    // the position without an entry price is dropped
    assert_eq!(report.positions.len(), 1);
    assert_eq!(report.positions[0].symbol, "SOL/USDT");
    assert!((report.positions[0].metrics.unrealized_pnl - 8.0).abs() < 1e-9);
    assert_eq!(report.strategies.len(), 2);
    for p in &report.projections {
        assert!(p.monte_carlo.simulated().is_some());
    }
}

#[test]
fn artifacts_saved_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), 12);
    let report = build(dir.path());

    let out = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&report, out.path()).unwrap();
    assert!(run_dir.ends_with("report_20240121_000000"));
    for name in ["report.json", "trades.csv", "equity.csv", "projections.csv", "report.md"] {
        assert!(run_dir.join(name).exists(), "missing {name}");
    }

    let reloaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(reloaded.schema_version, report.schema_version);
    assert_eq!(reloaded.generated_at, report.generated_at);
    assert_eq!(reloaded.all_time.total_trades, report.all_time.total_trades);
    assert_eq!(reloaded.trades, report.trades);
    assert_eq!(reloaded.projections.len(), report.projections.len());

    let equity = fs::read_to_string(run_dir.join("equity.csv")).unwrap();
    assert_eq!(equity.lines().count(), 1 + 13);
    assert!(equity.starts_with("trade_index,equity\n0,1000.00\n"));

    let md = fs::read_to_string(run_dir.join("report.md")).unwrap();
    assert!(md.contains("## Performance Summary"));
    assert!(md.contains("| Metric | Value |"));
    assert!(md.contains("malformed trade line"));
}

#[test]
fn short_history_exports_compound_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), 3);
    let report = build(dir.path());

    let text = export_projections_csv(&report.projections).unwrap();
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[14], "note");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.len(), 15);
        assert_eq!(&row[1], "compound");
        assert!(row[2].is_empty());
        assert!(!row[11].is_empty());
        assert_eq!(&row[14], "need at least 10 trades, have 3");
    }
    // the note contains a comma, so the writer must have quoted it
    assert!(text.contains("\"need at least 10 trades, have 3\""));
}

#[test]
fn trades_csv_leaves_missing_fields_empty() {
    let mut t = botdash_core::TradeRecord::with_pnl("ETH/USDT", -2.5);
    t.reason = Some("dip, buy".into());
    let csv = export_trades_csv(&[t]).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "symbol,entry_time,exit_time,entry_price,exit_price,amount,pnl,pnl_pct,reason"
    );
    assert_eq!(lines.next().unwrap(), "ETH/USDT,,,,,,-2.50,,\"dip, buy\"");
}

#[test]
fn newer_schema_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), 3);
    let report = build(dir.path());

    let mut value = serde_json::to_value(&report).unwrap();
    value["schema_version"] = serde_json::json!(99);
    let err = import_json(&value.to_string()).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version 99"));
}
