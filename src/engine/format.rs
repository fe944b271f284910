use super::*;

pub const NOT_AVAILABLE: &str = "N/A";

/// `$1,050,000.00 COP`
pub fn format_money(value: f64, currency: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{fraction} {currency}")
}

/// Ratio in [0, 1] rendered as a percentage: `0.85` → `85.00%`.
pub fn format_ratio(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn format_optional_ratio(value: Option<f64>) -> String {
    value
        .map(format_ratio)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Value already expressed in percent: `85.0` → `85.00%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_trend(trend: Option<Trend>) -> String {
    trend
        .map(|value| value.as_str().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
