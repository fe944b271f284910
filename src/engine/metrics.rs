use super::*;

pub const DEFAULT_DAYS_REMAINING: i64 = 365;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

static NUMERIC_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:cop|usd|eur)\b|[\s$€%]").expect("valid numeric noise regex")
});

// Commas are only accepted as thousands separators. A decimal comma stays
// unparseable.
static THOUSANDS_GROUPING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\d{1,3}(?:,\d{3})+(?:\.\d+)?$").expect("valid thousands grouping regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Missing,
    Unparseable,
    Parsed(NaiveDate),
}

pub fn extract_metrics(record: &ContractRecord, evaluation_date: NaiveDate) -> ContractMetrics {
    let approved_budget = numeric_field(record, CanonicalField::ApprovedBudget);
    let executed_value = numeric_field(record, CanonicalField::ExecutedValue);
    let physical_progress_pct =
        numeric_field(record, CanonicalField::PhysicalProgressPct).clamp(0.0, 100.0);

    let budget_execution_pct = percentage(executed_value, approved_budget);
    let budget_efficiency = ratio(physical_progress_pct, budget_execution_pct);
    let execution_to_progress_ratio = ratio(budget_execution_pct, physical_progress_pct);

    let date_field = record
        .canonical(CanonicalField::PlannedEndDate)
        .map(parse_date_value)
        .unwrap_or(DateField::Missing);
    let (schedule, planned_end_date, days_remaining) = match date_field {
        DateField::Parsed(date) => (
            ScheduleStatus::Parsed,
            Some(date),
            date.signed_duration_since(evaluation_date).num_days(),
        ),
        DateField::Missing => (ScheduleStatus::Missing, None, DEFAULT_DAYS_REMAINING),
        DateField::Unparseable => {
            debug!(
                field = CanonicalField::PlannedEndDate.key(),
                "planned end date unparseable, using default horizon"
            );
            (ScheduleStatus::Unparseable, None, DEFAULT_DAYS_REMAINING)
        }
    };

    ContractMetrics {
        approved_budget,
        executed_value,
        budget_execution_pct,
        physical_progress_pct,
        days_remaining,
        schedule,
        planned_end_date,
        budget_efficiency,
        execution_to_progress_ratio,
        evaluation_date,
    }
}

/// `numerator / denominator`, or 0 whenever the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let value = numerator / denominator;
        if value.is_finite() { value } else { 0.0 }
    } else {
        0.0
    }
}

/// `ratio` scaled to percent. Saturates at `f64::MAX` instead of overflowing.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    let value = ratio(numerator, denominator) * 100.0;
    if value.is_finite() { value } else { f64::MAX }
}

fn numeric_field(record: &ContractRecord, field: CanonicalField) -> f64 {
    match record.canonical(field) {
        Some(value) => parse_number_value(value).unwrap_or_else(|| {
            debug!(field = field.key(), raw = %value, "non-numeric value, using 0");
            0.0
        }),
        None => {
            debug!(field = field.key(), "field missing, using 0");
            0.0
        }
    }
}

pub fn parse_number_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_number_text(text),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

/// Accepts spreadsheet-style text such as `"$1,050,000.00 COP"` or `"85 %"`.
pub fn parse_number_text(text: &str) -> Option<f64> {
    let cleaned = NUMERIC_NOISE.replace_all(text.trim(), "");
    if cleaned.is_empty() {
        return None;
    }
    if !cleaned.contains(',') {
        return cleaned.parse::<f64>().ok();
    }
    if !THOUSANDS_GROUPING.is_match(&cleaned) {
        return None;
    }
    cleaned.replace(',', "").parse::<f64>().ok()
}

pub fn parse_date_value(value: &Value) -> DateField {
    match value {
        Value::Null => DateField::Missing,
        Value::String(text) if text.trim().is_empty() => DateField::Missing,
        Value::String(text) => parse_date_text(text)
            .map(DateField::Parsed)
            .unwrap_or(DateField::Unparseable),
        _ => DateField::Unparseable,
    }
}

pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
    {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|timestamp| timestamp.date())
}
