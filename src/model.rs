use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReportEntry {
    pub index: usize,
    pub fingerprint: String,
    pub report_path: String,
    pub severity: String,
    pub composite_risk: f64,
    pub confidence: f64,
    pub anomaly_count: usize,
    pub memoized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub evaluation_date: String,
    pub input_path: String,
    pub enrichment: String,
    pub record_count: usize,
    pub unique_record_count: usize,
    pub memo_hits: usize,
    pub severity_counts: BTreeMap<String, usize>,
    pub reports: Vec<BatchReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub db_path: String,
    pub db_schema_version: Option<String>,
    pub db_updated_at: Option<String>,
    pub reports_total: i64,
    pub sections_total: i64,
    pub latest_report_at: Option<String>,
    pub severity_counts: BTreeMap<String, i64>,
    pub health_counts: BTreeMap<String, i64>,
}
