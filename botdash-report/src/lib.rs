//! Botdash Report: inputs, configuration and persisted dashboard output.
//!
//! This crate builds on `botdash-core` to provide:
//! - TOML configuration with validated defaults
//! - Snapshot and JSON-lines trade log loading with lenient line handling
//! - One-pass dashboard report assembly (statistics, ratios, projections,
//!   breakdowns, position risk)
//! - JSON, CSV and Markdown artifact export

pub mod config;
pub mod export;
pub mod loader;
pub mod report;

pub use config::{ConfigError, DashboardConfig, DataConfig, MetricsConfig, ProjectionConfig};
pub use export::{
    export_equity_csv, export_json, export_projections_csv, export_trades_csv, generate_markdown,
    import_json, load_artifacts, save_artifacts,
};
pub use loader::{load_snapshot, load_trades, parse_trades_jsonl, LoadError, SkippedLine, TradeLog};
pub use report::{
    build_report, project_horizons, select_trades, DashboardReport, HorizonProjection,
    TradeSource, SCHEMA_VERSION,
};
