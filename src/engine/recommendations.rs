use super::*;

pub const DEFAULT_RECOMMENDATION: &str = "SITUATION NORMAL: the contract is within expected parameters. Continue routine monitoring and keep records up to date.";

#[derive(Debug, Clone, Copy)]
pub struct RecommendationRule {
    pub name: &'static str,
    pub applies: fn(&ContractMetrics, &RiskAssessment) -> bool,
    pub text: &'static str,
}

/// Rules evaluated before the per-anomaly recommendations.
pub const PREDICTION_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        name: "cost_control",
        applies: high_overcost_probability,
        text: "HIGH OVERCOST PROBABILITY: enforce strict cost control and review every budget line item.",
    },
    RecommendationRule {
        name: "schedule_acceleration",
        applies: high_delay_probability,
        text: "DELAY RISK: accelerate critical work fronts and consider parallel execution.",
    },
];

/// Rules evaluated after the per-anomaly recommendations.
pub const METRIC_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        name: "budget_addition",
        applies: budget_nearly_exhausted,
        text: "BUDGET NEARLY EXHAUSTED: manage budget additions and optimize the remaining spending.",
    },
    RecommendationRule {
        name: "positive_reinforcement",
        applies: good_efficiency,
        text: "GOOD EFFICIENCY: keep current standards and document the practices that work.",
    },
];

const OVERCOST_PROBABILITY_TRIGGER: f64 = 0.7;
const DELAY_PROBABILITY_TRIGGER: f64 = 0.6;
const BUDGET_ADDITION_TRIGGER: f64 = 90.0;
const GOOD_EFFICIENCY_TRIGGER: f64 = 1.2;

fn high_overcost_probability(_: &ContractMetrics, assessment: &RiskAssessment) -> bool {
    assessment
        .predictions
        .probability_overcost
        .is_some_and(|probability| probability > OVERCOST_PROBABILITY_TRIGGER)
}

fn high_delay_probability(_: &ContractMetrics, assessment: &RiskAssessment) -> bool {
    assessment
        .predictions
        .probability_delay
        .is_some_and(|probability| probability > DELAY_PROBABILITY_TRIGGER)
}

fn budget_nearly_exhausted(metrics: &ContractMetrics, _: &RiskAssessment) -> bool {
    metrics.budget_execution_pct > BUDGET_ADDITION_TRIGGER
}

fn good_efficiency(metrics: &ContractMetrics, _: &RiskAssessment) -> bool {
    metrics.budget_efficiency > GOOD_EFFICIENCY_TRIGGER
}

pub fn anomaly_recommendation(kind: AnomalyKind) -> &'static str {
    match kind {
        AnomalyKind::BudgetOverrun => {
            "OVERRUN DETECTED: request an immediate budget addition backed by a technical justification."
        }
        AnomalyKind::LowEfficiency => {
            "LOW EFFICIENCY: review execution processes and optimize the use of resources."
        }
        AnomalyKind::ScheduleCrisis => {
            "SCHEDULE CRISIS: activate the contingency plan and run round-the-clock shifts on critical areas."
        }
    }
}

pub fn generate_recommendations(
    metrics: &ContractMetrics,
    anomalies: &[Anomaly],
    assessment: &RiskAssessment,
) -> Vec<String> {
    let fired = |rules: &'static [RecommendationRule]| {
        rules
            .iter()
            .filter(|rule| (rule.applies)(metrics, assessment))
            .inspect(|rule| debug!(rule = rule.name, "recommendation rule fired"))
            .map(|rule| rule.text.to_string())
            .collect::<Vec<String>>()
    };

    let mut recommendations = fired(PREDICTION_RULES);
    recommendations.extend(
        anomalies
            .iter()
            .map(|anomaly| anomaly_recommendation(anomaly.kind).to_string()),
    );
    recommendations.extend(fired(METRIC_RULES));

    if recommendations.is_empty() {
        recommendations.push(DEFAULT_RECOMMENDATION.to_string());
    }

    recommendations
}
