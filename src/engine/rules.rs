use super::*;

/// Row of a one-variable step table; matches when the observed value is
/// strictly above `above`.
#[derive(Debug, Clone, Copy)]
pub struct StepBand {
    pub above: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct StepTable {
    pub bands: &'static [StepBand],
    pub otherwise: f64,
}

impl StepTable {
    /// First matching row wins; rows are ordered from the highest bound down.
    pub fn evaluate(&self, observed: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| observed > band.above)
            .map(|band| band.value)
            .unwrap_or(self.otherwise)
    }
}

/// Row of a schedule table; matches when both `days < days_below` and
/// `progress < progress_below`.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleBand {
    pub days_below: i64,
    pub progress_below: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduleTable {
    pub bands: &'static [ScheduleBand],
    pub otherwise: f64,
}

impl ScheduleTable {
    pub fn evaluate(&self, days_remaining: i64, progress_pct: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| days_remaining < band.days_below && progress_pct < band.progress_below)
            .map(|band| band.value)
            .unwrap_or(self.otherwise)
    }
}

const fn schedule(days_below: i64, progress_below: f64, value: f64) -> ScheduleBand {
    ScheduleBand {
        days_below,
        progress_below,
        value,
    }
}

pub const FINANCIAL_RISK: StepTable = StepTable {
    bands: &[
        StepBand { above: 100.0, value: 1.0 },
        StepBand { above: 90.0, value: 0.8 },
        StepBand { above: 75.0, value: 0.6 },
        StepBand { above: 50.0, value: 0.3 },
    ],
    otherwise: 0.1,
};

pub const OVERCOST_PROBABILITY: StepTable = StepTable {
    bands: &[
        StepBand { above: 90.0, value: 0.8 },
        StepBand { above: 75.0, value: 0.6 },
        StepBand { above: 50.0, value: 0.3 },
    ],
    otherwise: 0.1,
};

pub const TEMPORAL_RISK: ScheduleTable = ScheduleTable {
    bands: &[
        schedule(30, 85.0, 1.0),
        schedule(60, 70.0, 0.8),
        schedule(90, 50.0, 0.6),
    ],
    otherwise: 0.2,
};

pub const DELAY_PROBABILITY: ScheduleTable = ScheduleTable {
    bands: &[
        schedule(30, 85.0, 0.9),
        schedule(60, 70.0, 0.7),
        schedule(90, 50.0, 0.5),
    ],
    otherwise: 0.2,
};

pub const COMPLETION_PROBABILITY: ScheduleTable = ScheduleTable {
    bands: &[
        schedule(30, 85.0, 0.2),
        schedule(60, 70.0, 0.4),
        schedule(90, 50.0, 0.6),
    ],
    otherwise: 0.9,
};

pub const OVERCOST_WEIGHT: f64 = 0.4;
pub const DELAY_WEIGHT: f64 = 0.3;
pub const CRITICAL_ANOMALY_BONUS: f64 = 0.3;
pub const WARNING_ANOMALY_BONUS: f64 = 0.15;
pub const LOW_COMPLETION_BONUS: f64 = 0.2;
pub const LOW_COMPLETION_PROBABILITY: f64 = 0.5;

pub const CONFIDENCE_BASE: f64 = 0.7;
pub const CONFIDENCE_PER_SIGNAL: f64 = 0.05;

#[derive(Debug, Clone, Copy)]
pub struct SeverityBand {
    pub at_least: f64,
    pub severity: SeverityLevel,
}

pub const SEVERITY_BANDS: &[SeverityBand] = &[
    SeverityBand { at_least: 0.8, severity: SeverityLevel::Emergency },
    SeverityBand { at_least: 0.6, severity: SeverityLevel::Critical },
    SeverityBand { at_least: 0.4, severity: SeverityLevel::Warning },
];

pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
