use super::*;

const TREND_PERIODS: usize = 12;
const TREND_SLOPE_EPSILON: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskFactors {
    pub financial_risk: f64,
    pub temporal_risk: f64,
    pub probability_overcost: f64,
    pub probability_delay: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemporalTrends {
    pub trend_execution: Trend,
    pub trend_progress: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionForecast {
    pub probability_completion: f64,
    pub estimated_completion_date: Option<NaiveDate>,
}

pub fn compute_risk_factors(metrics: &ContractMetrics) -> RiskFactors {
    let execution = metrics.budget_execution_pct;
    let days = metrics.days_remaining;
    let progress = metrics.physical_progress_pct;

    RiskFactors {
        financial_risk: FINANCIAL_RISK.evaluate(execution),
        temporal_risk: TEMPORAL_RISK.evaluate(days, progress),
        probability_overcost: OVERCOST_PROBABILITY.evaluate(execution),
        probability_delay: DELAY_PROBABILITY.evaluate(days, progress),
    }
}

/// Trends over a linear ramp reaching today's values after twelve periods.
/// No signal when nothing has been executed or built yet.
pub fn analyze_trends(metrics: &ContractMetrics) -> Option<TemporalTrends> {
    if metrics.budget_execution_pct <= 0.0 && metrics.physical_progress_pct <= 0.0 {
        return None;
    }

    Some(TemporalTrends {
        trend_execution: classify_trend(&ramp_series(metrics.budget_execution_pct)),
        trend_progress: classify_trend(&ramp_series(metrics.physical_progress_pct)),
    })
}

pub fn ramp_series(current: f64) -> Vec<f64> {
    (1..=TREND_PERIODS)
        .map(|period| current * (period as f64 / TREND_PERIODS as f64))
        .collect()
}

pub fn least_squares_slope(points: &[f64]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = points.iter().map(|value| value / n).sum::<f64>();

    let (covariance, variance) = points.iter().enumerate().fold(
        (0.0_f64, 0.0_f64),
        |(covariance, variance), (index, value)| {
            let dx = index as f64 - mean_x;
            (covariance + dx * (value - mean_y), variance + dx * dx)
        },
    );

    (variance > 0.0).then(|| covariance / variance)
}

pub fn classify_trend(points: &[f64]) -> Trend {
    match least_squares_slope(points) {
        Some(slope) if slope > TREND_SLOPE_EPSILON => Trend::Increasing,
        Some(slope) if slope < -TREND_SLOPE_EPSILON => Trend::Decreasing,
        _ => Trend::Stable,
    }
}

pub fn forecast_completion(metrics: &ContractMetrics) -> CompletionForecast {
    let progress = metrics.physical_progress_pct;

    CompletionForecast {
        probability_completion: COMPLETION_PROBABILITY.evaluate(metrics.days_remaining, progress),
        estimated_completion_date: estimate_completion_date(metrics),
    }
}

/// Projects the remaining work at the pace implied by progress so far.
fn estimate_completion_date(metrics: &ContractMetrics) -> Option<NaiveDate> {
    let progress = metrics.physical_progress_pct;
    if progress <= 0.0 {
        return None;
    }

    let days_remaining = metrics.days_remaining.max(0) as f64;
    let estimated_days = ((100.0 - progress) * days_remaining / progress).round();
    if !estimated_days.is_finite() {
        return None;
    }

    Duration::try_days(estimated_days as i64)
        .and_then(|offset| metrics.evaluation_date.checked_add_signed(offset))
}

pub fn assess_risk(metrics: &ContractMetrics, outcomes: &AnalysisOutcomes) -> RiskAssessment {
    let composite_risk = composite_risk(outcomes);
    let confidence = analysis_confidence(outcomes);
    let severity = classify_score(composite_risk);

    debug!(
        budget_execution_pct = metrics.budget_execution_pct,
        composite_risk,
        confidence,
        severity = %severity,
        "risk assessed"
    );

    RiskAssessment {
        financial_risk: outcomes
            .risk_factors
            .map(|factors| factors.financial_risk)
            .unwrap_or(0.0),
        temporal_risk: outcomes
            .risk_factors
            .map(|factors| factors.temporal_risk)
            .unwrap_or(0.0),
        composite_risk,
        confidence,
        severity,
        predictions: Predictions {
            probability_overcost: outcomes.risk_factors.map(|f| f.probability_overcost),
            probability_delay: outcomes.risk_factors.map(|f| f.probability_delay),
            probability_completion: outcomes.forecast.map(|f| f.probability_completion),
            estimated_completion_date: outcomes
                .forecast
                .and_then(|f| f.estimated_completion_date),
            trend_execution: outcomes.trends.map(|t| t.trend_execution),
            trend_progress: outcomes.trends.map(|t| t.trend_progress),
        },
    }
}

pub fn composite_risk(outcomes: &AnalysisOutcomes) -> f64 {
    let mut score = 0.0;

    if let Some(factors) = outcomes.risk_factors {
        score += factors.probability_overcost * OVERCOST_WEIGHT;
        score += factors.probability_delay * DELAY_WEIGHT;
    }

    score += outcomes
        .anomalies
        .iter()
        .map(|anomaly| match anomaly.severity {
            SeverityLevel::Critical => CRITICAL_ANOMALY_BONUS,
            SeverityLevel::Warning => WARNING_ANOMALY_BONUS,
            _ => 0.0,
        })
        .sum::<f64>();

    if outcomes
        .forecast
        .is_some_and(|forecast| forecast.probability_completion < LOW_COMPLETION_PROBABILITY)
    {
        score += LOW_COMPLETION_BONUS;
    }

    clamp_unit(score)
}

/// Base confidence plus a fixed step per analysis that produced a signal.
pub fn analysis_confidence(outcomes: &AnalysisOutcomes) -> f64 {
    let signals = [
        outcomes.risk_factors.is_some(),
        !outcomes.anomalies.is_empty(),
        outcomes.trends.is_some(),
        outcomes.forecast.is_some(),
        !outcomes.enrichment.is_empty(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();

    clamp_unit(CONFIDENCE_BASE + CONFIDENCE_PER_SIGNAL * signals as f64)
}
