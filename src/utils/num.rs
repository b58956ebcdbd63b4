// src/utils/num.rs

//! Counter parsing.
//!
//! The platform renders engagement counters either as integers or as
//! abbreviated strings with a unit suffix ("2.7万", "3千").

use serde_json::Value;

/// Parse a counter field that may be an integer or an abbreviated string.
///
/// Any parse failure yields 0.
pub fn parse_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => parse_count_str(s),
        _ => 0,
    }
}

/// Parse a counter string, expanding the "万" (ten-thousand) and "千"
/// (thousand) unit markers.
pub fn parse_count_str(s: &str) -> u64 {
    let s = s.trim();
    if s.contains('万') {
        scaled(&s.replace('万', ""), 10_000.0)
    } else if s.contains('千') {
        scaled(&s.replace('千', ""), 1_000.0)
    } else {
        s.parse::<u64>().unwrap_or(0)
    }
}

fn scaled(prefix: &str, factor: f64) -> u64 {
    match prefix.trim().parse::<f64>() {
        // Truncates toward zero; negative prefixes clamp to 0.
        Ok(value) => (value * factor) as u64,
        Err(_) => 0,
    }
}
