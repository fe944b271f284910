use super::*;

/// One named, thresholded check. `observe` returns `None` when the metric
/// cannot be evaluated, in which case the check is skipped.
#[derive(Debug, Clone, Copy)]
pub struct AnomalyCheck {
    pub kind: AnomalyKind,
    pub severity: SeverityLevel,
    pub threshold: f64,
    pub description: &'static str,
    pub observe: fn(&ContractMetrics) -> Option<f64>,
    pub fires: fn(&ContractMetrics, f64, f64) -> bool,
}

pub const ANOMALY_CHECKS: &[AnomalyCheck] = &[
    AnomalyCheck {
        kind: AnomalyKind::BudgetOverrun,
        severity: SeverityLevel::Critical,
        threshold: 100.0,
        description: "Budget execution exceeds 100% of the approved budget",
        observe: observe_budget_execution,
        fires: above_threshold,
    },
    AnomalyCheck {
        kind: AnomalyKind::LowEfficiency,
        severity: SeverityLevel::Warning,
        threshold: 0.5,
        description: "Budget efficiency is very low: physical progress lags spending",
        observe: observe_budget_efficiency,
        fires: below_threshold,
    },
    AnomalyCheck {
        kind: AnomalyKind::ScheduleCrisis,
        severity: SeverityLevel::Critical,
        threshold: 30.0,
        description: "Little time remaining with insufficient physical progress",
        observe: observe_days_remaining,
        fires: schedule_crisis,
    },
];

const SCHEDULE_CRISIS_PROGRESS_MAX: f64 = 85.0;

fn observe_budget_execution(metrics: &ContractMetrics) -> Option<f64> {
    Some(metrics.budget_execution_pct)
}

fn observe_budget_efficiency(metrics: &ContractMetrics) -> Option<f64> {
    // Efficiency is undefined until some budget has been executed.
    (metrics.budget_execution_pct > 0.0).then_some(metrics.budget_efficiency)
}

fn observe_days_remaining(metrics: &ContractMetrics) -> Option<f64> {
    Some(metrics.days_remaining as f64)
}

fn above_threshold(_: &ContractMetrics, observed: f64, threshold: f64) -> bool {
    observed > threshold
}

fn below_threshold(_: &ContractMetrics, observed: f64, threshold: f64) -> bool {
    observed < threshold
}

fn schedule_crisis(metrics: &ContractMetrics, observed: f64, threshold: f64) -> bool {
    observed < threshold && metrics.physical_progress_pct < SCHEDULE_CRISIS_PROGRESS_MAX
}

pub fn detect_anomalies(metrics: &ContractMetrics) -> Vec<Anomaly> {
    detect_with(ANOMALY_CHECKS, metrics)
}

pub fn detect_with(checks: &[AnomalyCheck], metrics: &ContractMetrics) -> Vec<Anomaly> {
    checks
        .iter()
        .filter_map(|check| {
            let observed = (check.observe)(metrics).filter(|value| value.is_finite())?;
            (check.fires)(metrics, observed, check.threshold).then(|| Anomaly {
                kind: check.kind,
                severity: check.severity,
                description: check.description.to_string(),
                observed_value: observed,
                threshold: check.threshold,
            })
        })
        .collect()
}
