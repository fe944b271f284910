use std::thread;

use super::*;

/// Results of the independent analyses. An analysis that failed leaves its
/// slot empty and is listed in `failed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOutcomes {
    pub risk_factors: Option<RiskFactors>,
    pub anomalies: Vec<Anomaly>,
    pub trends: Option<TemporalTrends>,
    pub forecast: Option<CompletionForecast>,
    pub enrichment: EnrichmentFeatures,
    pub failed: Vec<&'static str>,
}

/// Fans the analyses out on scoped threads and joins all of them. A panic in
/// one analysis is contained to that analysis.
pub fn run_analyses(
    record: &ContractRecord,
    metrics: &ContractMetrics,
    enrichment: &dyn EnrichmentProvider,
) -> AnalysisOutcomes {
    thread::scope(|scope| {
        let risk_factors = scope.spawn(|| compute_risk_factors(metrics));
        let anomalies = scope.spawn(|| detect_anomalies(metrics));
        let trends = scope.spawn(|| analyze_trends(metrics));
        let forecast = scope.spawn(|| forecast_completion(metrics));
        let enriched = scope.spawn(|| enrichment.enrich(record, metrics));

        let mut failed = Vec::new();
        let risk_factors = settle("risk_factors", risk_factors.join(), &mut failed);
        let anomalies = settle("anomalies", anomalies.join(), &mut failed).unwrap_or_default();
        let trends = settle("trends", trends.join(), &mut failed).flatten();
        let forecast = settle("forecast", forecast.join(), &mut failed);
        let enrichment = match settle("enrichment", enriched.join(), &mut failed) {
            Some(Ok(features)) => features,
            Some(Err(err)) => {
                warn!(provider = enrichment.name(), error = %err, "enrichment unavailable");
                failed.push("enrichment");
                EnrichmentFeatures::default()
            }
            None => EnrichmentFeatures::default(),
        };

        AnalysisOutcomes {
            risk_factors,
            anomalies,
            trends,
            forecast,
            enrichment,
            failed,
        }
    })
}

fn settle<T>(
    analysis: &'static str,
    joined: thread::Result<T>,
    failed: &mut Vec<&'static str>,
) -> Option<T> {
    match joined {
        Ok(value) => Some(value),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|text| text.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(analysis, reason = %reason, "analysis failed, contributing no signal");
            failed.push(analysis);
            None
        }
    }
}
