use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const NOT_AVAILABLE: &str = "N/A";

pub fn two_decimals(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn optional_number(value: Option<f64>) -> String {
    value.map(two_decimals).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn optional_text(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn money(value: f64, symbol: &str) -> String {
    format!("{} {}", two_decimals(value), symbol)
}

pub fn percent(value: f64) -> String {
    format!("{}%", two_decimals(value))
}

pub fn local_timestamp(ts: &DateTime<Utc>, tz: &Tz) -> String {
    ts.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn call_link(base: &str, call_id: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), call_id)
}

/// Pads or truncates to exactly `width` characters.
pub fn fit(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count > width {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{}{}", value, " ".repeat(width - count))
    }
}
