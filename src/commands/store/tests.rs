use chrono::NaiveDate;
use serde_json::json;

use super::*;
use crate::engine::{EngineConfig, NoopEnrichment, analyze_contract};

fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 27).expect("valid date")
}

fn memory_store() -> Connection {
    let connection = Connection::open_in_memory().expect("in-memory db");
    ensure_schema(&connection).expect("schema");
    connection
}

fn record(value: serde_json::Value) -> ContractRecord {
    ContractRecord::from_value(value)
}

fn analysis_for(record: &ContractRecord) -> ContractAnalysis {
    analyze_contract(record, &EngineConfig::new(evaluation_date()), &NoopEnrichment)
}

fn count(connection: &Connection, sql: &str) -> i64 {
    connection
        .query_row(sql, [], |row| row.get(0))
        .expect("count query")
}

fn metrics_with(approved: f64, executed: f64, progress: f64) -> ContractMetrics {
    let record = record(json!({
        "approved_budget": approved,
        "executed_value": executed,
        "physical_progress_pct": progress,
    }));
    analysis_for(&record).metrics
}

#[test]
fn schema_records_version_metadata() {
    let connection = memory_store();
    let version: String = connection
        .query_row(
            "SELECT value FROM metadata WHERE key = 'db_schema_version'",
            [],
            |row| row.get(0),
        )
        .expect("schema version");
    assert_eq!(version, DB_SCHEMA_VERSION);

    ensure_schema(&connection).expect("schema setup is repeatable");
}

#[test]
fn persist_writes_report_sections_and_analytics() {
    let mut connection = memory_store();
    let record = record(json!({
        "approved_budget": 1_000_000,
        "executed_value": 1_050_000,
        "planned_end_date": "2025-10-26",
        "physical_progress_pct": 40,
        "contract_id": "CT-2025-001",
    }));
    let analysis = analysis_for(&record);

    let report_id = persist_analysis(&mut connection, &record, &analysis).expect("persist");
    assert_eq!(report_id, record.fingerprint(evaluation_date()));

    assert_eq!(count(&connection, "SELECT COUNT(*) FROM reports"), 1);
    assert_eq!(
        count(&connection, "SELECT COUNT(*) FROM report_sections"),
        analysis.report.sections.len() as i64
    );

    let (severity, raw_record): (String, String) = connection
        .query_row(
            "SELECT severity, raw_record FROM reports WHERE report_id = ?1",
            [&report_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("report row");
    assert_eq!(severity, analysis.report.highest_severity().as_str());
    assert!(raw_record.contains("CT-2025-001"));

    let first_title: String = connection
        .query_row(
            "SELECT title FROM report_sections WHERE report_id = ?1 AND position = 0",
            [&report_id],
            |row| row.get(0),
        )
        .expect("first section");
    assert_eq!(first_title, analysis.report.sections[0].title);

    let (trend, health): (String, String) = connection
        .query_row(
            "SELECT budget_trend, overall_health FROM report_analytics WHERE report_id = ?1",
            [&report_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("analytics row");
    assert_eq!(trend, "over_budget");
    assert_eq!(health, "warning");
}

#[test]
fn persisting_the_same_record_twice_upserts() {
    let mut connection = memory_store();
    let record = record(json!({
        "approved_budget": 500,
        "executed_value": 250,
        "physical_progress_pct": 50,
    }));
    let analysis = analysis_for(&record);

    let first = persist_analysis(&mut connection, &record, &analysis).expect("first persist");
    let second = persist_analysis(&mut connection, &record, &analysis).expect("second persist");

    assert_eq!(first, second);
    assert_eq!(count(&connection, "SELECT COUNT(*) FROM reports"), 1);
    assert_eq!(count(&connection, "SELECT COUNT(*) FROM report_analytics"), 1);
    assert_eq!(
        count(&connection, "SELECT COUNT(*) FROM report_sections"),
        analysis.report.sections.len() as i64
    );
}

#[test]
fn summary_groups_by_severity_and_health() {
    let mut connection = memory_store();
    let calm = record(json!({
        "approved_budget": 1000,
        "executed_value": 600,
        "physical_progress_pct": 85,
    }));
    let troubled = record(json!({
        "approved_budget": 1000,
        "executed_value": 1200,
        "physical_progress_pct": 20,
    }));

    for record in [&calm, &troubled] {
        let analysis = analysis_for(record);
        persist_analysis(&mut connection, record, &analysis).expect("persist");
    }

    let summary = summarize_store(&connection, Path::new(":memory:")).expect("summary");
    assert_eq!(summary.reports_total, 2);
    assert_eq!(summary.db_schema_version.as_deref(), Some(DB_SCHEMA_VERSION));
    assert!(summary.latest_report_at.is_some());
    assert_eq!(summary.severity_counts.values().sum::<i64>(), 2);
    assert_eq!(summary.health_counts.get("good"), Some(&1));
    assert_eq!(summary.health_counts.get("critical"), None);
    assert_eq!(summary.health_counts.get("warning"), Some(&1));
}

#[test]
fn empty_store_summary_has_no_latest_report() {
    let connection = memory_store();
    let summary = summarize_store(&connection, Path::new(":memory:")).expect("summary");
    assert_eq!(summary.reports_total, 0);
    assert_eq!(summary.sections_total, 0);
    assert!(summary.latest_report_at.is_none());
    assert!(summary.severity_counts.is_empty());
}

#[test]
fn analytics_flags_overrun_and_delay() {
    let analytics = compute_report_analytics(&metrics_with(1000.0, 1200.0, 20.0));
    assert!((analytics.budget_efficiency - 1.2).abs() < 1e-9);
    assert!((analytics.time_performance - 0.2).abs() < 1e-9);
    assert!((analytics.risk_score - 0.7).abs() < 1e-9);
    assert_eq!(analytics.budget_trend, "over_budget");
    assert_eq!(analytics.timeline_trend, "delayed");
    assert_eq!(analytics.overall_health, "warning");
}

#[test]
fn analytics_caps_risk_and_handles_zero_budget() {
    let stalled = compute_report_analytics(&metrics_with(0.0, 0.0, 0.0));
    assert_eq!(stalled.budget_efficiency, 0.0);
    assert!((stalled.risk_score - 0.7).abs() < 1e-9);
    assert_eq!(stalled.budget_trend, "under_budget");

    let low_and_late = compute_report_analytics(&metrics_with(1000.0, 100.0, 10.0));
    assert!(low_and_late.risk_score <= 1.0);
    assert!((low_and_late.risk_score - 0.7).abs() < 1e-9);

    let healthy = compute_report_analytics(&metrics_with(1000.0, 900.0, 90.0));
    assert_eq!(healthy.risk_score, 0.0);
    assert_eq!(healthy.timeline_trend, "on_time");
    assert_eq!(healthy.overall_health, "good");
}
