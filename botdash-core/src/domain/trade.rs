//! TradeRecord: one closed trade as written by the bot to `trades.jsonl`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Grouping key used when a trade carries no `reason`.
pub const UNKNOWN_REASON: &str = "unknown";

/// A closed trade, read-only once loaded.
///
/// Every field except `symbol` is optional because the producer is allowed to
/// omit or garble any of them. `pnl` and `pnl_pct` are taken as written and are
/// never cross-checked against the prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTrade")]
pub struct TradeRecord {
    pub symbol: String,
    pub entry_price: Option<f64>,
    pub exit_price: Option<f64>,
    pub amount: Option<f64>,
    pub pnl: Option<f64>,
    pub pnl_pct: Option<f64>,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub reason: Option<String>,
}

/// Wire shape: accepts both `entry`/`exit` and `entry_price`/`exit_price`.
#[derive(Deserialize)]
struct RawTrade {
    #[serde(default, deserialize_with = "lenient::string_opt")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    entry: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    entry_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    exit: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    exit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pnl: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pnl_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    entry_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    exit_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    reason: Option<String>,
}

impl From<RawTrade> for TradeRecord {
    fn from(raw: RawTrade) -> Self {
        Self {
            symbol: raw.symbol.unwrap_or_default(),
            entry_price: raw.entry_price.or(raw.entry),
            exit_price: raw.exit_price.or(raw.exit),
            amount: raw.amount,
            pnl: raw.pnl,
            pnl_pct: raw.pnl_pct,
            entry_time: raw.entry_time,
            exit_time: raw.exit_time,
            reason: raw.reason,
        }
    }
}

impl TradeRecord {
    /// Minimal constructor used by tests and synthetic fixtures.
    pub fn with_pnl(symbol: impl Into<String>, pnl: f64) -> Self {
        Self {
            symbol: symbol.into(),
            entry_price: None,
            exit_price: None,
            amount: None,
            pnl: Some(pnl),
            pnl_pct: None,
            entry_time: None,
            exit_time: None,
            reason: None,
        }
    }

    /// Realized P&L; a missing value counts as zero (and therefore as a loss).
    pub fn pnl_or_zero(&self) -> f64 {
        self.pnl.unwrap_or(0.0)
    }

    /// Breakeven is a loss: only strictly positive P&L wins.
    pub fn is_win(&self) -> bool {
        self.pnl_or_zero() > 0.0
    }

    pub fn exit_timestamp(&self) -> Option<NaiveDateTime> {
        self.exit_time.as_deref().and_then(parse_timestamp)
    }

    /// Calendar day of the exit, if the exit time parses.
    pub fn exit_day(&self) -> Option<NaiveDate> {
        self.exit_timestamp().map(|ts| ts.date())
    }

    /// Strategy label used for grouping. Opaque: never normalized.
    pub fn reason_key(&self) -> &str {
        match self.reason.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => UNKNOWN_REASON,
        }
    }

    /// Base asset of the pair (`BTC` for `BTC/USDT`).
    pub fn asset(&self) -> &str {
        asset_of(&self.symbol)
    }
}

/// Base asset of a pair symbol: text before the first `/`, else the symbol.
pub fn asset_of(symbol: &str) -> &str {
    symbol.split('/').next().unwrap_or(symbol)
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp as written by the bot.
///
/// A trailing `Z` is stripped first. Explicit offsets are converted to UTC.
/// Date-only values resolve to midnight. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'))
        .unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_price_spellings() {
        let a: TradeRecord =
            serde_json::from_str(r#"{"symbol":"BTC/USDT","entry":100,"exit":110,"pnl":1}"#)
                .unwrap();
        let b: TradeRecord = serde_json::from_str(
            r#"{"symbol":"BTC/USDT","entry_price":100,"exit_price":110,"pnl":1}"#,
        )
        .unwrap();
        assert_eq!(a.entry_price, Some(100.0));
        assert_eq!(a.exit_price, Some(110.0));
        assert_eq!(a, b);
    }

    #[test]
    fn price_suffix_wins_when_both_present() {
        let t: TradeRecord =
            serde_json::from_str(r#"{"entry":1,"entry_price":2,"exit":3,"exit_price":4}"#)
                .unwrap();
        assert_eq!(t.entry_price, Some(2.0));
        assert_eq!(t.exit_price, Some(4.0));
    }

    #[test]
    fn malformed_fields_do_not_fail_the_record() {
        let t: TradeRecord = serde_json::from_str(
            r#"{"symbol":"ETH/USDT","pnl":"oops","amount":null,"exit_time":17,"reason":["x"]}"#,
        )
        .unwrap();
        assert_eq!(t.pnl, None);
        assert_eq!(t.pnl_or_zero(), 0.0);
        assert!(!t.is_win());
        assert_eq!(t.amount, None);
        assert_eq!(t.exit_time.as_deref(), Some("17"));
        assert_eq!(t.exit_timestamp(), None);
        assert_eq!(t.reason_key(), UNKNOWN_REASON);
    }

    #[test]
    fn missing_symbol_defaults_empty() {
        let t: TradeRecord = serde_json::from_str(r#"{"pnl": 2.5}"#).unwrap();
        assert_eq!(t.symbol, "");
        assert!(t.is_win());
    }

    #[test]
    fn breakeven_is_a_loss() {
        assert!(!TradeRecord::with_pnl("X", 0.0).is_win());
        assert!(TradeRecord::with_pnl("X", 0.01).is_win());
    }

    #[test]
    fn timestamp_strips_utc_marker() {
        let ts = parse_timestamp("2024-03-01T12:30:00Z").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01 12:30:00");
        let frac = parse_timestamp("2024-03-01T12:30:00.123456Z").unwrap();
        assert_eq!(frac.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn timestamp_offsets_convert_to_utc() {
        let ts = parse_timestamp("2024-03-01T23:30:00-02:00").unwrap();
        assert_eq!(ts.to_string(), "2024-03-02 01:30:00");
    }

    #[test]
    fn timestamp_variants() {
        assert!(parse_timestamp("2024-03-01 08:00:00").is_some());
        assert!(parse_timestamp("2024-03-01T08:00").is_some());
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap().to_string(),
            "2024-03-01 00:00:00"
        );
    }

    #[test]
    fn timestamp_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("Z"), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-40T00:00:00"), None);
    }

    #[test]
    fn asset_extraction() {
        assert_eq!(asset_of("BTC/USDT"), "BTC");
        assert_eq!(asset_of("SOLUSDT"), "SOLUSDT");
        assert_eq!(asset_of(""), "");
    }

    #[test]
    fn reason_is_opaque() {
        let mut t = TradeRecord::with_pnl("X", 1.0);
        t.reason = Some("Bearish_Signal v2".into());
        assert_eq!(t.reason_key(), "Bearish_Signal v2");
        t.reason = Some(String::new());
        assert_eq!(t.reason_key(), UNKNOWN_REASON);
    }

    #[test]
    fn serialization_roundtrip() {
        let mut t = TradeRecord::with_pnl("SOL/USDT", -1.25);
        t.entry_price = Some(245.8);
        t.exit_time = Some("2024-01-02T00:00:00Z".into());
        let json = serde_json::to_string(&t).unwrap();
        let back: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
