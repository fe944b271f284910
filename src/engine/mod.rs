use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

mod analysis;
mod anomalies;
mod assembler;
mod base_sections;
mod enrichment;
mod format;
mod metrics;
mod recommendations;
mod rules;
mod scoring;
mod severity;
mod types;

use self::analysis::*;
use self::anomalies::*;
use self::assembler::*;
use self::base_sections::*;
use self::format::*;
use self::metrics::*;
use self::recommendations::*;
use self::rules::*;
use self::scoring::*;
use self::severity::*;

pub use self::enrichment::{
    EnrichmentFeatures, EnrichmentProvider, LexiconSentiment, NoopEnrichment,
};
pub use self::types::*;

/// Runs the full engine over one record.
///
/// Never fails: data gaps resolve to defaults and a failed analysis contributes
/// no signal.
pub fn analyze_contract(
    record: &ContractRecord,
    config: &EngineConfig,
    enrichment: &dyn EnrichmentProvider,
) -> ContractAnalysis {
    let metrics = extract_metrics(record, config.evaluation_date);
    let outcomes = run_analyses(record, &metrics, enrichment);
    let assessment = assess_risk(&metrics, &outcomes);
    let recommendations = generate_recommendations(&metrics, &outcomes.anomalies, &assessment);

    let base = vec![
        budget_section(&metrics, &config.currency),
        timeline_section(&metrics),
    ];
    let sections = assemble_report(
        base,
        &metrics,
        &outcomes.anomalies,
        &assessment,
        &recommendations,
        &outcomes.enrichment,
        &config.currency,
    );

    info!(
        budget_execution_pct = metrics.budget_execution_pct,
        days_remaining = metrics.days_remaining,
        anomalies = outcomes.anomalies.len(),
        failed_analyses = outcomes.failed.len(),
        composite_risk = assessment.composite_risk,
        confidence = assessment.confidence,
        severity = %assessment.severity,
        sections = sections.len(),
        "contract analysis completed"
    );

    ContractAnalysis {
        metrics,
        anomalies: outcomes.anomalies,
        assessment,
        recommendations,
        enrichment: outcomes.enrichment,
        report: ContractReport {
            contract_type: config.metadata.contract_type.clone(),
            year: config.metadata.year,
            context: config.metadata.context.clone(),
            sections,
        },
    }
}
