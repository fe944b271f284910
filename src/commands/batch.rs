use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use super::records::{enrichment_provider, engine_config, load_records};
use super::store::{open_store, persist_analysis};
use crate::cli::BatchArgs;
use crate::engine::{
    ContractAnalysis, ContractRecord, EngineConfig, EnrichmentProvider, SeverityLevel,
    analyze_contract,
};
use crate::model::{BatchReportEntry, BatchSummary};
use crate::util::{ensure_directory, now_utc_string, utc_compact_string, write_json_pretty};

const BATCH_MANIFEST_VERSION: u32 = 1;
const FINGERPRINT_PREFIX_LEN: usize = 12;

#[derive(Debug)]
struct BatchItem {
    fingerprint: String,
    analysis_index: usize,
    memoized: bool,
}

/// Unique analyses plus one item per input row pointing into them.
#[derive(Debug, Default)]
struct BatchAnalyses {
    analyses: Vec<ContractAnalysis>,
    items: Vec<BatchItem>,
}

impl BatchAnalyses {
    fn memo_hits(&self) -> usize {
        self.items.iter().filter(|item| item.memoized).count()
    }
}

pub fn run(args: BatchArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let config = engine_config(&args.engine);
    let provider = enrichment_provider(args.engine.enrichment);
    let run_id = format!("batch-{}", utc_compact_string(Utc::now()));

    info!(
        run_id = %run_id,
        input = %args.input.display(),
        records = records.len(),
        evaluation_date = %config.evaluation_date,
        enrichment = args.engine.enrichment.as_str(),
        "batch analysis started"
    );

    ensure_directory(&args.output_dir)?;
    let mut connection = args.db_path.as_deref().map(open_store).transpose()?;

    let batch = analyze_batch(&records, &config, provider.as_ref());

    let mut entries = Vec::with_capacity(batch.items.len());
    for (index, (record, item)) in records.iter().zip(&batch.items).enumerate() {
        let analysis = &batch.analyses[item.analysis_index];
        let report_path = args
            .output_dir
            .join(report_file_name(index + 1, &item.fingerprint));
        write_json_pretty(&report_path, &analysis.report)?;

        if let Some(connection) = connection.as_mut().filter(|_| !item.memoized) {
            persist_analysis(connection, record, analysis)?;
        }

        entries.push(report_entry(index + 1, item, analysis, &report_path));
    }

    let summary = BatchSummary {
        manifest_version: BATCH_MANIFEST_VERSION,
        run_id,
        generated_at: now_utc_string(),
        evaluation_date: config.evaluation_date.to_string(),
        input_path: args.input.display().to_string(),
        enrichment: args.engine.enrichment.as_str().to_string(),
        record_count: records.len(),
        unique_record_count: batch.analyses.len(),
        memo_hits: batch.memo_hits(),
        severity_counts: severity_counts(&entries),
        reports: entries,
    };

    let summary_path = args.output_dir.join("batch_summary.json");
    write_json_pretty(&summary_path, &summary)?;

    info!(
        run_id = %summary.run_id,
        records = summary.record_count,
        unique = summary.unique_record_count,
        memo_hits = summary.memo_hits,
        summary = %summary_path.display(),
        "batch analysis finished"
    );

    Ok(())
}

/// Identical records within one run are analyzed once; the fingerprint already
/// folds in the evaluation date, so the memo is keyed by fingerprint alone.
fn analyze_batch(
    records: &[ContractRecord],
    config: &EngineConfig,
    provider: &dyn EnrichmentProvider,
) -> BatchAnalyses {
    let mut memo: HashMap<String, usize> = HashMap::new();
    let mut batch = BatchAnalyses::default();

    for (index, record) in records.iter().enumerate() {
        let fingerprint = record.fingerprint(config.evaluation_date);

        if let Some(&analysis_index) = memo.get(&fingerprint) {
            debug!(row = index + 1, fingerprint = %fingerprint, "reusing memoized analysis");
            batch.items.push(BatchItem {
                fingerprint,
                analysis_index,
                memoized: true,
            });
            continue;
        }

        let analysis_index = batch.analyses.len();
        batch.analyses.push(analyze_contract(record, config, provider));
        memo.insert(fingerprint.clone(), analysis_index);
        batch.items.push(BatchItem {
            fingerprint,
            analysis_index,
            memoized: false,
        });
    }

    batch
}

fn report_file_name(position: usize, fingerprint: &str) -> String {
    let prefix = fingerprint.get(..FINGERPRINT_PREFIX_LEN).unwrap_or(fingerprint);
    format!("report_{position:04}_{prefix}.json")
}

fn report_entry(
    index: usize,
    item: &BatchItem,
    analysis: &ContractAnalysis,
    report_path: &Path,
) -> BatchReportEntry {
    BatchReportEntry {
        index,
        fingerprint: item.fingerprint.clone(),
        report_path: report_path.display().to_string(),
        severity: analysis.report.highest_severity().as_str().to_string(),
        composite_risk: analysis.assessment.composite_risk,
        confidence: analysis.assessment.confidence,
        anomaly_count: analysis.anomalies.len(),
        memoized: item.memoized,
    }
}

/// Every level is present, zero included.
fn severity_counts(entries: &[BatchReportEntry]) -> BTreeMap<String, usize> {
    let mut counts = SeverityLevel::all()
        .into_iter()
        .map(|level| (level.as_str().to_string(), 0))
        .collect::<BTreeMap<String, usize>>();
    for entry in entries {
        *counts.entry(entry.severity.clone()).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::cli::{EngineArgs, EnrichmentMode};
    use crate::engine::NoopEnrichment;

    fn evaluation_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 27).expect("valid date")
    }

    fn record(value: serde_json::Value) -> ContractRecord {
        ContractRecord::from_value(value)
    }

    fn scratch_dir(label: &str) -> PathBuf {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        std::env::temp_dir().join(format!(
            "contract-risk-{label}-{}-{nanos}",
            std::process::id()
        ))
    }

    #[test]
    fn duplicate_records_are_analyzed_once() {
        let records = vec![
            record(json!({"approved_budget": 100, "executed_value": 95})),
            record(json!({"approved_budget": 100, "executed_value": 20})),
            record(json!({"executed_value": 95, "approved_budget": 100})),
        ];
        let config = EngineConfig::new(evaluation_date());

        let batch = analyze_batch(&records, &config, &NoopEnrichment);

        assert_eq!(batch.items.len(), 3);
        assert_eq!(batch.analyses.len(), 2);
        assert_eq!(batch.memo_hits(), 1);
        assert!(batch.items[2].memoized);
        assert_eq!(batch.items[2].analysis_index, batch.items[0].analysis_index);
        assert_eq!(batch.items[2].fingerprint, batch.items[0].fingerprint);
    }

    #[test]
    fn evaluation_date_separates_memo_entries() {
        let row = record(json!({"approved_budget": 100, "executed_value": 50}));
        let first = row.fingerprint(evaluation_date());
        let later = row.fingerprint(NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"));
        assert_ne!(first, later);
    }

    #[test]
    fn report_file_name_uses_position_and_fingerprint_prefix() {
        let name = report_file_name(7, "0123456789abcdef0123");
        assert_eq!(name, "report_0007_0123456789ab.json");
        assert_eq!(report_file_name(1, "abc"), "report_0001_abc.json");
    }

    #[test]
    fn severity_counts_list_every_level() {
        let entry = |severity: &str| BatchReportEntry {
            index: 1,
            fingerprint: String::new(),
            report_path: String::new(),
            severity: severity.to_string(),
            composite_risk: 0.0,
            confidence: 0.7,
            anomaly_count: 0,
            memoized: false,
        };
        let counts = severity_counts(&[entry("CRITICAL"), entry("CRITICAL"), entry("INFO")]);

        assert_eq!(counts.len(), 4);
        assert_eq!(counts["CRITICAL"], 2);
        assert_eq!(counts["INFO"], 1);
        assert_eq!(counts["WARNING"], 0);
        assert_eq!(counts["EMERGENCY"], 0);
    }

    #[test]
    fn run_writes_reports_summary_and_store() {
        let root = scratch_dir("batch");
        fs::create_dir_all(&root).expect("scratch dir");
        let input = root.join("contracts.jsonl");
        fs::write(
            &input,
            concat!(
                "{\"approved_budget\": 1000000, \"executed_value\": 1050000, \"physical_progress_pct\": 40}\n",
                "{\"approved_budget\": 1000, \"executed_value\": 600, \"physical_progress_pct\": 85}\n",
                "{\"approved_budget\": 1000000, \"executed_value\": 1050000, \"physical_progress_pct\": 40}\n",
            ),
        )
        .expect("write input");
        let output_dir = root.join("reports");
        let db_path = root.join("reports.sqlite");

        run(BatchArgs {
            input,
            output_dir: output_dir.clone(),
            db_path: Some(db_path.clone()),
            engine: EngineArgs {
                evaluation_date: Some(evaluation_date()),
                enrichment: EnrichmentMode::Lexicon,
                contract_type: "Urgencia Manifiesta".to_string(),
                year: 2025,
                context: "Batch test".to_string(),
                currency: "COP".to_string(),
            },
        })
        .expect("batch run");

        let raw = fs::read(output_dir.join("batch_summary.json")).expect("summary file");
        let summary: BatchSummary = serde_json::from_slice(&raw).expect("summary json");
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.unique_record_count, 2);
        assert_eq!(summary.memo_hits, 1);
        assert_eq!(summary.evaluation_date, "2025-08-27");
        assert_eq!(summary.severity_counts.values().sum::<usize>(), 3);
        for entry in &summary.reports {
            assert!(Path::new(&entry.report_path).exists());
        }

        let connection = rusqlite::Connection::open(&db_path).expect("open store");
        let stored: i64 = connection
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))
            .expect("count reports");
        assert_eq!(stored, 2);
        drop(connection);

        fs::remove_dir_all(&root).ok();
    }
}
