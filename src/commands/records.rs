use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::cli::{EngineArgs, EnrichmentMode};
use crate::engine::{
    CanonicalField, ContractRecord, EngineConfig, EnrichmentProvider, LexiconSentiment,
    NoopEnrichment, ReportMetadata,
};

/// Reads a JSON document (object or array of objects) or a JSON Lines file.
///
/// Rows that are not JSON objects are rejected here, before any record reaches
/// the engine.
pub fn load_records(path: &Path) -> Result<Vec<ContractRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;

    let records = if is_json_lines(path) {
        parse_json_lines(&raw)
    } else {
        parse_json_document(&raw)
    }
    .with_context(|| format!("failed to parse contract records: {}", path.display()))?;

    if records.is_empty() {
        bail!("no contract records found in {}", path.display());
    }

    Ok(records)
}

/// Single-record intake takes the first row, matching spreadsheet uploads.
pub fn load_first_record(path: &Path) -> Result<ContractRecord> {
    let records = load_records(path)?;
    let total = records.len();
    if total > 1 {
        warn!(
            path = %path.display(),
            rows = total,
            "input holds several records; analyzing the first"
        );
    }
    records
        .into_iter()
        .next()
        .with_context(|| format!("no contract records found in {}", path.display()))
}

pub fn parse_json_document(raw: &str) -> Result<Vec<ContractRecord>> {
    let value: Value = serde_json::from_str(raw).context("invalid json document")?;
    match value {
        Value::Object(fields) => Ok(vec![ContractRecord::new(fields)]),
        Value::Array(rows) => rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| record_from_row(index + 1, row))
            .collect(),
        other => bail!(
            "expected a json object or an array of objects, found {}",
            json_kind(&other)
        ),
    }
}

pub fn parse_json_lines(raw: &str) -> Result<Vec<ContractRecord>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let value: Value = serde_json::from_str(line)
                .with_context(|| format!("invalid json on line {}", index + 1))?;
            record_from_row(index + 1, value)
        })
        .collect()
}

/// Canonical keys with neither the key nor its spreadsheet alias present.
pub fn missing_canonical_fields(record: &ContractRecord) -> Vec<&'static str> {
    CanonicalField::all()
        .into_iter()
        .filter(|field| record.canonical(*field).is_none())
        .map(CanonicalField::key)
        .collect()
}

pub fn engine_config(args: &EngineArgs) -> EngineConfig {
    let evaluation_date = args
        .evaluation_date
        .unwrap_or_else(|| Utc::now().date_naive());

    EngineConfig {
        metadata: ReportMetadata {
            contract_type: args.contract_type.clone(),
            year: args.year,
            context: args.context.clone(),
        },
        currency: args.currency.clone(),
        ..EngineConfig::new(evaluation_date)
    }
}

pub fn enrichment_provider(mode: EnrichmentMode) -> Box<dyn EnrichmentProvider> {
    match mode {
        EnrichmentMode::Off => Box::new(NoopEnrichment),
        EnrichmentMode::Lexicon => Box::new(LexiconSentiment),
    }
}

fn is_json_lines(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extension.eq_ignore_ascii_case("jsonl") || extension.eq_ignore_ascii_case("ndjson")
        })
}

fn record_from_row(row: usize, value: Value) -> Result<ContractRecord> {
    match value {
        Value::Object(fields) => Ok(ContractRecord::new(fields)),
        other => bail!("row {row} is not a json object (found {})", json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use super::*;

    fn engine_args() -> EngineArgs {
        EngineArgs {
            evaluation_date: NaiveDate::from_ymd_opt(2025, 8, 27),
            enrichment: EnrichmentMode::Off,
            contract_type: "Licitación Pública".to_string(),
            year: 2026,
            context: "Test context".to_string(),
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn json_object_yields_single_record() {
        let records = parse_json_document(r#"{"approved_budget": 1000, "id": "C-1"}"#)
            .expect("object parses");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("id"), Some(&Value::from("C-1")));
    }

    #[test]
    fn json_array_keeps_row_order() {
        let records = parse_json_document(r#"[{"id": "a"}, {"id": "b"}, {"id": "c"}]"#)
            .expect("array parses");
        let ids = records
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_str))
            .collect::<Vec<&str>>();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn non_object_rows_are_rejected_with_position() {
        let err = parse_json_document(r#"[{"id": "a"}, 42]"#).expect_err("row 2 is a number");
        assert!(err.to_string().contains("row 2"));

        let err = parse_json_document("\"just text\"").expect_err("scalar document");
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn json_lines_skip_blank_lines_and_report_bad_line() {
        let records = parse_json_lines("{\"id\": 1}\n\n{\"id\": 2}\n").expect("valid jsonl");
        assert_eq!(records.len(), 2);

        let err = parse_json_lines("{\"id\": 1}\n{broken\n").expect_err("line 2 is invalid");
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn extension_selects_json_lines_parser() {
        assert!(is_json_lines(&PathBuf::from("contracts.jsonl")));
        assert!(is_json_lines(&PathBuf::from("contracts.NDJSON")));
        assert!(!is_json_lines(&PathBuf::from("contracts.json")));
        assert!(!is_json_lines(&PathBuf::from("contracts")));
    }

    #[test]
    fn missing_fields_honor_spreadsheet_aliases() {
        let records = parse_json_document(
            r#"{"presupuesto_aprobado": 1000, "executed_value": 500, "planned_end_date": null}"#,
        )
        .expect("object parses");
        assert_eq!(
            missing_canonical_fields(&records[0]),
            vec!["planned_end_date", "physical_progress_pct"]
        );
    }

    #[test]
    fn engine_config_carries_cli_metadata() {
        let config = engine_config(&engine_args());
        assert_eq!(config.evaluation_date, NaiveDate::from_ymd_opt(2025, 8, 27).unwrap());
        assert_eq!(config.metadata.contract_type, "Licitación Pública");
        assert_eq!(config.metadata.year, 2026);
        assert_eq!(config.currency, "USD");
    }

    #[test]
    fn enrichment_mode_selects_provider() {
        assert_eq!(enrichment_provider(EnrichmentMode::Off).name(), NoopEnrichment.name());
        assert_eq!(
            enrichment_provider(EnrichmentMode::Lexicon).name(),
            LexiconSentiment.name()
        );
    }
}
