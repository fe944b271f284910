use super::*;

pub const PREDICTIVE_TITLE: &str = "Predictive Analysis";
pub const ANOMALIES_TITLE: &str = "Anomaly Detection";
pub const INSIGHTS_TITLE: &str = "Advanced Insights";
pub const RECOMMENDATIONS_TITLE: &str = "Recommendations";

const BASE_SUMMARY_RECOMMENDATIONS: usize = 3;
const HIGH_RISK_INDICATOR: f64 = 0.7;
const LOW_GLOBAL_EFFICIENCY: f64 = 0.5;

/// Final section order: base sections, predictive, anomalies (only when any
/// were detected), insights, recommendations.
pub fn assemble_report(
    base: Vec<ReportSection>,
    metrics: &ContractMetrics,
    anomalies: &[Anomaly],
    assessment: &RiskAssessment,
    recommendations: &[String],
    enrichment: &EnrichmentFeatures,
    currency: &str,
) -> Vec<ReportSection> {
    let mut sections = base
        .into_iter()
        .map(|section| enhance_base_section(section, assessment, recommendations))
        .collect::<Vec<ReportSection>>();

    sections.push(predictive_section(assessment));
    if !anomalies.is_empty() {
        sections.push(anomalies_section(anomalies));
    }
    sections.push(insights_section(metrics, assessment, enrichment, currency));
    sections.push(recommendations_section(assessment, recommendations));

    sections
}

pub fn enhance_base_section(
    section: ReportSection,
    assessment: &RiskAssessment,
    recommendations: &[String],
) -> ReportSection {
    let ReportSection {
        title,
        mut data,
        message,
    } = section;
    let predictions = &assessment.predictions;

    data.insert("Risk Score", format_ratio(assessment.composite_risk));
    data.insert("Analysis Confidence", format_ratio(assessment.confidence));
    data.insert("Engine Severity", assessment.severity.as_str());

    match title.as_str() {
        BUDGET_TITLE => {
            data.insert(
                "Overcost Probability",
                format_optional_ratio(predictions.probability_overcost),
            );
            data.insert("Financial Risk", format_ratio(assessment.financial_risk));
        }
        TIMELINE_TITLE => {
            data.insert(
                "Delay Probability",
                format_optional_ratio(predictions.probability_delay),
            );
            data.insert("Temporal Risk", format_ratio(assessment.temporal_risk));
            data.insert(
                "Estimated Completion Date",
                format_date(predictions.estimated_completion_date),
            );
        }
        _ => {}
    }

    let mut text = message.message;
    if !recommendations.is_empty() {
        text.push_str("\n\nRISK ENGINE ANALYSIS:\n");
        for (index, recommendation) in recommendations
            .iter()
            .take(BASE_SUMMARY_RECOMMENDATIONS)
            .enumerate()
        {
            text.push_str(&format!("{}. {}\n", index + 1, recommendation));
        }
    }
    text.push_str(&format!(
        "\nAnalysis confidence: {:.1}%",
        assessment.confidence * 100.0
    ));

    ReportSection {
        title,
        data,
        message: TechnicalMessage {
            block_name: message.block_name,
            message: text,
            severity: escalate([message.severity, assessment.severity]),
        },
    }
}

pub fn predictive_section(assessment: &RiskAssessment) -> ReportSection {
    let predictions = &assessment.predictions;

    let mut data = SectionData::new();
    data.insert(
        "Overcost Probability",
        format_optional_ratio(predictions.probability_overcost),
    );
    data.insert(
        "Delay Probability",
        format_optional_ratio(predictions.probability_delay),
    );
    data.insert(
        "Completion Probability",
        format_optional_ratio(predictions.probability_completion),
    );
    data.insert(
        "Estimated Completion Date",
        format_date(predictions.estimated_completion_date),
    );
    data.insert("Execution Trend", format_trend(predictions.trend_execution));
    data.insert("Progress Trend", format_trend(predictions.trend_progress));

    let mut text = String::from(
        "PREDICTIVE ANALYSIS\n\nCurrent metrics were projected forward to estimate the future behaviour of the contract.\n\n",
    );
    if predictions
        .probability_overcost
        .is_some_and(|probability| probability > 0.7)
    {
        text.push_str("High overcost probability detected.\n");
    }
    if predictions
        .probability_delay
        .is_some_and(|probability| probability > 0.6)
    {
        text.push_str("Significant delay risk identified.\n");
    }
    if predictions
        .probability_completion
        .is_some_and(|probability| probability < LOW_COMPLETION_PROBABILITY)
    {
        text.push_str("Low probability of meeting the schedule.\n");
    }

    let severity = escalate([
        classify_score(assessment.financial_risk),
        classify_score(assessment.temporal_risk),
    ]);

    section(PREDICTIVE_TITLE, data, text, severity)
}

pub fn anomalies_section(anomalies: &[Anomaly]) -> ReportSection {
    let mut data = SectionData::new();
    let mut text = format!(
        "ANOMALY DETECTION\n\n{} significant anomalies were identified:\n\n",
        anomalies.len()
    );

    for (index, anomaly) in anomalies.iter().enumerate() {
        let position = index + 1;
        data.insert(
            format!("Anomaly {position}"),
            format!("{}: {}", anomaly.kind.as_str(), anomaly.description),
        );
        data.insert(
            format!("Value {position}"),
            format_decimal(anomaly.observed_value),
        );
        data.insert(
            format!("Threshold {position}"),
            format_decimal(anomaly.threshold),
        );

        text.push_str(&format!(
            "- [{}] {}\n  Observed value: {} (threshold: {})\n\n",
            anomaly.severity,
            anomaly.description,
            format_decimal(anomaly.observed_value),
            format_decimal(anomaly.threshold)
        ));
    }

    section(ANOMALIES_TITLE, data, text, anomalies_severity(anomalies))
}

pub fn insights_section(
    metrics: &ContractMetrics,
    assessment: &RiskAssessment,
    enrichment: &EnrichmentFeatures,
    currency: &str,
) -> ReportSection {
    let progress_floor = metrics.physical_progress_pct.max(1.0);
    let execution_velocity = metrics.budget_execution_pct / progress_floor;
    let temporal_sustainability = metrics.days_remaining as f64 / progress_floor;
    let non_completion = assessment
        .predictions
        .probability_completion
        .map(|probability| 1.0 - probability);

    let mut data = SectionData::new();
    data.insert("Global Efficiency", format_ratio(metrics.budget_efficiency));
    data.insert("Execution Velocity", format_decimal(execution_velocity));
    data.insert(
        "Temporal Sustainability",
        format_decimal(temporal_sustainability),
    );
    data.insert("Financial Risk", format_ratio(assessment.financial_risk));
    data.insert("Temporal Risk", format_ratio(assessment.temporal_risk));
    data.insert(
        "Non-Completion Probability",
        format_optional_ratio(non_completion),
    );
    data.insert(
        "Estimated Final Cost",
        format_money(estimate_final_cost(metrics), currency),
    );
    data.insert(
        "Estimated Deviation",
        format_percent(estimate_deviation(metrics)),
    );
    for (name, value) in &enrichment.features {
        data.insert(format!("Enrichment {name}"), format_decimal(*value));
    }
    for (name, value) in &enrichment.labels {
        data.insert(format!("Enrichment {name}"), value.clone());
    }

    let mut text = String::from(
        "ADVANCED INSIGHTS\n\nDerived indicators combining budget, schedule and risk signals:\n\n",
    );
    if metrics.budget_efficiency < LOW_GLOBAL_EFFICIENCY {
        text.push_str("LOW GLOBAL EFFICIENCY: physical progress lags behind spending.\n");
    }
    if assessment.financial_risk > HIGH_RISK_INDICATOR {
        text.push_str("HIGH FINANCIAL RISK: requires immediate attention.\n");
    }
    if assessment.temporal_risk > HIGH_RISK_INDICATOR {
        text.push_str("HIGH TEMPORAL RISK: the schedule is in danger.\n");
    }
    if let Some(label) = enrichment.labels.get("sentiment") {
        text.push_str(&format!("Field observations read as {label}.\n"));
    }

    section(INSIGHTS_TITLE, data, text, assessment.severity)
}

pub fn recommendations_section(
    assessment: &RiskAssessment,
    recommendations: &[String],
) -> ReportSection {
    let mut data = SectionData::new();
    let mut text = format!(
        "RECOMMENDATIONS\n\n{} specific recommendations were generated:\n\n",
        recommendations.len()
    );

    for (index, recommendation) in recommendations.iter().enumerate() {
        data.insert(format!("Recommendation {}", index + 1), recommendation.clone());
        text.push_str(&format!("{}. {}\n\n", index + 1, recommendation));
    }

    text.push_str(&format!(
        "Risk score: {}\nAnalysis confidence: {}",
        format_ratio(assessment.composite_risk),
        format_ratio(assessment.confidence)
    ));

    section(RECOMMENDATIONS_TITLE, data, text, assessment.severity)
}

/// Budget projected at the current execution rate; the approved budget when
/// nothing has been executed yet.
pub fn estimate_final_cost(metrics: &ContractMetrics) -> f64 {
    if metrics.budget_execution_pct > 0.0 {
        metrics.approved_budget * (metrics.budget_execution_pct / 100.0)
    } else {
        metrics.approved_budget
    }
}

/// Gap in percentage points between spending and physical progress.
pub fn estimate_deviation(metrics: &ContractMetrics) -> f64 {
    if metrics.physical_progress_pct > 0.0 {
        (metrics.budget_execution_pct - metrics.physical_progress_pct).abs()
    } else {
        0.0
    }
}

fn section(title: &str, data: SectionData, message: String, severity: SeverityLevel) -> ReportSection {
    ReportSection {
        title: title.to_string(),
        data,
        message: TechnicalMessage {
            block_name: title.to_string(),
            message,
            severity,
        },
    }
}
