use super::*;

const OVERCOST_RISK: f64 = 0.3;
const DELAY_RISK: f64 = 0.4;
const LOW_EXECUTION_RISK: f64 = 0.3;
const DELAYED_TIME_PERFORMANCE: f64 = 0.8;
const LOW_EXECUTION_EFFICIENCY: f64 = 0.5;

/// Portfolio-level figures stored next to each report. Three additive flags
/// over raw budget efficiency and progress, independent of the engine score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportAnalytics {
    pub budget_efficiency: f64,
    pub time_performance: f64,
    pub risk_score: f64,
    pub budget_trend: &'static str,
    pub timeline_trend: &'static str,
    pub overall_health: &'static str,
}

pub fn compute_report_analytics(metrics: &ContractMetrics) -> ReportAnalytics {
    let budget_efficiency = if metrics.approved_budget > 0.0 {
        metrics.executed_value / metrics.approved_budget
    } else {
        0.0
    };
    let time_performance = metrics.physical_progress_pct / 100.0;

    let mut risk_score = 0.0;
    if budget_efficiency > 1.0 {
        risk_score += OVERCOST_RISK;
    }
    if time_performance < DELAYED_TIME_PERFORMANCE {
        risk_score += DELAY_RISK;
    }
    if budget_efficiency < LOW_EXECUTION_EFFICIENCY {
        risk_score += LOW_EXECUTION_RISK;
    }
    let risk_score = f64::min(risk_score, 1.0);

    ReportAnalytics {
        budget_efficiency,
        time_performance,
        risk_score,
        budget_trend: if budget_efficiency > 1.0 {
            "over_budget"
        } else {
            "under_budget"
        },
        timeline_trend: if time_performance < DELAYED_TIME_PERFORMANCE {
            "delayed"
        } else {
            "on_time"
        },
        overall_health: health_label(risk_score),
    }
}

fn health_label(risk_score: f64) -> &'static str {
    if risk_score > 0.7 {
        "critical"
    } else if risk_score > 0.3 {
        "warning"
    } else {
        "good"
    }
}
