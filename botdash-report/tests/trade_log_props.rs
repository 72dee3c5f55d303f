//! Property tests for the lenient trade log reader.
//!
//! Every non-blank line is either decoded or recorded as skipped, and a bad
//! line never disturbs the lines around it.

use botdash_report::parse_trades_jsonl;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Line {
    Trade(f64),
    Garbage(String),
    Blank,
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_line() -> impl Strategy<Value = Line> {
    prop_oneof![
        5 => (-1000i32..1000).prop_map(|c| Line::Trade(c as f64 / 10.0)),
        2 => "[a-z{}:,]{1,12}".prop_map(Line::Garbage),
        1 => Just(Line::Blank),
    ]
}

fn render(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        match line {
            Line::Trade(pnl) => out.push_str(&format!(r#"{{"symbol":"BTC/USDT","pnl":{pnl}}}"#)),
            Line::Garbage(s) => out.push_str(s),
            Line::Blank => out.push_str("   "),
        }
        out.push('\n');
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn every_line_accounted_for(lines in prop::collection::vec(arb_line(), 0..40)) {
        let log = parse_trades_jsonl(&render(&lines));
        let non_blank = lines.iter().filter(|l| !matches!(l, Line::Blank)).count();
        prop_assert_eq!(log.trades.len() + log.skipped.len(), non_blank);
    }

    #[test]
    fn trades_survive_in_order(lines in prop::collection::vec(arb_line(), 0..40)) {
        let log = parse_trades_jsonl(&render(&lines));
        let expected: Vec<f64> = lines
            .iter()
            .filter_map(|l| match l {
                Line::Trade(p) => Some(*p),
                _ => None,
            })
            .collect();
        // garbage such as "{}" is a valid, empty trade; it carries no pnl
        let got: Vec<f64> = log.trades.iter().filter_map(|t| t.pnl).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn skipped_line_numbers_point_at_garbage(lines in prop::collection::vec(arb_line(), 1..40)) {
        let log = parse_trades_jsonl(&render(&lines));
        for s in &log.skipped {
            prop_assert!(matches!(lines[s.line - 1], Line::Garbage(_)));
        }
    }
}
