use super::*;

pub fn classify_score(score: f64) -> SeverityLevel {
    let score = clamp_unit(score);
    SEVERITY_BANDS
        .iter()
        .find(|band| score >= band.at_least)
        .map(|band| band.severity)
        .unwrap_or(SeverityLevel::Info)
}

/// Highest of the contributing levels. Escalates only.
pub fn escalate<I>(levels: I) -> SeverityLevel
where
    I: IntoIterator<Item = SeverityLevel>,
{
    levels.into_iter().max().unwrap_or(SeverityLevel::Info)
}

pub fn anomalies_severity(anomalies: &[Anomaly]) -> SeverityLevel {
    escalate(anomalies.iter().map(|anomaly| anomaly.severity))
}
