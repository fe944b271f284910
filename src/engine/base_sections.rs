use super::*;

pub const BUDGET_TITLE: &str = "Budget Analysis";
pub const TIMELINE_TITLE: &str = "Schedule Analysis";

#[derive(Debug, Clone, Copy)]
pub struct BudgetRule {
    pub above: f64,
    pub severity: SeverityLevel,
    pub advisory: &'static str,
}

pub const BUDGET_RULES: &[BudgetRule] = &[
    BudgetRule {
        above: 100.0,
        severity: SeverityLevel::Critical,
        advisory: "CRITICAL ALERT: the approved budget has been exceeded. Immediate justification and an action plan are required.",
    },
    BudgetRule {
        above: 90.0,
        severity: SeverityLevel::Critical,
        advisory: "ALERT: the contract is close to exhausting its budget. Review the remaining line items and manage possible budget additions.",
    },
    BudgetRule {
        above: 75.0,
        severity: SeverityLevel::Warning,
        advisory: "CAUTION: execution above 75%. Monitor cash flow weekly to ensure coverage until completion.",
    },
];

#[derive(Debug, Clone, Copy)]
pub struct TimelineRule {
    pub severity: SeverityLevel,
    pub applies: fn(i64, f64) -> bool,
    pub message: fn(i64, f64) -> String,
}

pub const TIMELINE_RULES: &[TimelineRule] = &[
    TimelineRule {
        severity: SeverityLevel::Critical,
        applies: is_overdue,
        message: overdue_message,
    },
    TimelineRule {
        severity: SeverityLevel::Critical,
        applies: is_schedule_crisis,
        message: crisis_message,
    },
    TimelineRule {
        severity: SeverityLevel::Warning,
        applies: is_schedule_deviation,
        message: deviation_message,
    },
];

fn is_overdue(days: i64, _: f64) -> bool {
    days < 0
}

fn is_schedule_crisis(days: i64, progress: f64) -> bool {
    days < 30 && progress < 85.0
}

fn is_schedule_deviation(days: i64, progress: f64) -> bool {
    days < 60 && progress < 60.0
}

fn overdue_message(days: i64, _: f64) -> String {
    format!(
        "CRITICAL ALERT: the contract is overdue by {} days. Activate the contingency plan immediately.",
        days.unsigned_abs()
    )
}

fn crisis_message(days: i64, progress: f64) -> String {
    format!(
        "ALERT: only {days} days remain and physical progress is {progress:.1}%. High risk of missing the deadline; additional work fronts are required."
    )
}

fn deviation_message(days: i64, progress: f64) -> String {
    format!(
        "CAUTION: {days} days remain and progress is {progress:.1}%. The schedule shows a deviation that must be corrected to avoid delays."
    )
}

pub fn budget_section(metrics: &ContractMetrics, currency: &str) -> ReportSection {
    let execution = metrics.budget_execution_pct;
    let rule = BUDGET_RULES.iter().find(|rule| execution > rule.above);

    let mut message = format!("Budget execution at {}.", format_percent(execution));
    if let Some(rule) = rule {
        message.push(' ');
        message.push_str(rule.advisory);
    }

    let mut data = SectionData::new();
    data.insert("Approved Budget", format_money(metrics.approved_budget, currency));
    data.insert("Executed Value", format_money(metrics.executed_value, currency));
    data.insert("Budget Execution", format_percent(execution));

    ReportSection {
        title: BUDGET_TITLE.to_string(),
        data,
        message: TechnicalMessage {
            block_name: BUDGET_TITLE.to_string(),
            message,
            severity: rule.map(|rule| rule.severity).unwrap_or(SeverityLevel::Info),
        },
    }
}

pub fn timeline_section(metrics: &ContractMetrics) -> ReportSection {
    let days = metrics.days_remaining;
    let progress = metrics.physical_progress_pct;

    let (message, severity) = match metrics.schedule {
        ScheduleStatus::Unparseable => (
            "The schedule could not be analyzed. Check the format of the planned end date."
                .to_string(),
            SeverityLevel::Warning,
        ),
        ScheduleStatus::Missing => (
            format!(
                "No planned end date was supplied; the default horizon of {DEFAULT_DAYS_REMAINING} days was assumed."
            ),
            SeverityLevel::Info,
        ),
        ScheduleStatus::Parsed => TIMELINE_RULES
            .iter()
            .find(|rule| (rule.applies)(days, progress))
            .map(|rule| ((rule.message)(days, progress), rule.severity))
            .unwrap_or_else(|| {
                (
                    format!("The schedule is progressing as expected. {days} days remain until completion."),
                    SeverityLevel::Info,
                )
            }),
    };

    let mut data = SectionData::new();
    data.insert("Planned End Date", format_date(metrics.planned_end_date));
    data.insert("Physical Progress", format_percent(progress));
    data.insert(
        "Days Remaining",
        match metrics.schedule {
            ScheduleStatus::Parsed => days.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        },
    );

    ReportSection {
        title: TIMELINE_TITLE.to_string(),
        data,
        message: TechnicalMessage {
            block_name: TIMELINE_TITLE.to_string(),
            message,
            severity,
        },
    }
}
