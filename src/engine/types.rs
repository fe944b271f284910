use super::*;

pub const DEFAULT_CONTRACT_TYPE: &str = "Urgencia Manifiesta";
pub const DEFAULT_REPORT_YEAR: i32 = 2025;
pub const DEFAULT_REPORT_CONTEXT: &str =
    "Secretaría de Infraestructura Física - Alcaldía de Medellín";
pub const DEFAULT_CURRENCY: &str = "COP";

/// Ordered alert level. `Ord` follows declaration order, so `max` escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl SeverityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Emergency => "EMERGENCY",
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Info, Self::Warning, Self::Critical, Self::Emergency]
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four input fields the engine reads. Every other key is passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    ApprovedBudget,
    ExecutedValue,
    PlannedEndDate,
    PhysicalProgressPct,
}

impl CanonicalField {
    pub fn all() -> [Self; 4] {
        [
            Self::ApprovedBudget,
            Self::ExecutedValue,
            Self::PlannedEndDate,
            Self::PhysicalProgressPct,
        ]
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::ApprovedBudget => "approved_budget",
            Self::ExecutedValue => "executed_value",
            Self::PlannedEndDate => "planned_end_date",
            Self::PhysicalProgressPct => "physical_progress_pct",
        }
    }

    /// Column name used by the source spreadsheets.
    pub fn alias(self) -> &'static str {
        match self {
            Self::ApprovedBudget => "presupuesto_aprobado",
            Self::ExecutedValue => "valor_ejecutado",
            Self::PlannedEndDate => "fecha_fin_planificada",
            Self::PhysicalProgressPct => "porcentaje_avance_fisico",
        }
    }
}

/// Flat field → value mapping handed over by the ingestion layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractRecord {
    fields: Map<String, Value>,
}

impl ContractRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Non-object values yield an empty record rather than an error.
    #[cfg(test)]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Canonical key first, spreadsheet alias second. JSON `null` counts as absent.
    pub fn canonical(&self, field: CanonicalField) -> Option<&Value> {
        [field.key(), field.alias()]
            .into_iter()
            .filter_map(|key| self.fields.get(key))
            .find(|value| !value.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// SHA-256 over the key-sorted JSON encoding plus the evaluation date.
    pub fn fingerprint(&self, evaluation_date: NaiveDate) -> String {
        let sorted = self.fields.iter().collect::<BTreeMap<&String, &Value>>();
        let canonical = serde_json::to_string(&sorted).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hasher.update(b"\n");
        hasher.update(evaluation_date.format("%Y-%m-%d").to_string().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Parsed,
    Missing,
    Unparseable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractMetrics {
    pub approved_budget: f64,
    pub executed_value: f64,
    pub budget_execution_pct: f64,
    pub physical_progress_pct: f64,
    pub days_remaining: i64,
    pub schedule: ScheduleStatus,
    pub planned_end_date: Option<NaiveDate>,
    pub budget_efficiency: f64,
    pub execution_to_progress_ratio: f64,
    pub evaluation_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    BudgetOverrun,
    LowEfficiency,
    ScheduleCrisis,
}

impl AnomalyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BudgetOverrun => "BUDGET_OVERRUN",
            Self::LowEfficiency => "LOW_EFFICIENCY",
            Self::ScheduleCrisis => "SCHEDULE_CRISIS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: SeverityLevel,
    pub description: String,
    pub observed_value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "INCREASING",
            Self::Decreasing => "DECREASING",
            Self::Stable => "STABLE",
        }
    }
}

/// Forward-looking figures. `None` marks an analysis that produced no signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predictions {
    pub probability_overcost: Option<f64>,
    pub probability_delay: Option<f64>,
    pub probability_completion: Option<f64>,
    pub estimated_completion_date: Option<NaiveDate>,
    pub trend_execution: Option<Trend>,
    pub trend_progress: Option<Trend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub financial_risk: f64,
    pub temporal_risk: f64,
    pub composite_risk: f64,
    pub confidence: f64,
    pub severity: SeverityLevel,
    pub predictions: Predictions,
}

/// Insertion-ordered string map; serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionData {
    entries: Vec<(String, String)>,
}

impl SectionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the value in place when the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Serialize for SectionData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalMessage {
    pub block_name: String,
    pub message: String,
    pub severity: SeverityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub data: SectionData,
    pub message: TechnicalMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractReport {
    pub contract_type: String,
    pub year: i32,
    pub context: String,
    pub sections: Vec<ReportSection>,
}

impl ContractReport {
    pub fn highest_severity(&self) -> SeverityLevel {
        self.sections
            .iter()
            .map(|section| section.message.severity)
            .max()
            .unwrap_or(SeverityLevel::Info)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    pub contract_type: String,
    pub year: i32,
    pub context: String,
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self {
            contract_type: DEFAULT_CONTRACT_TYPE.to_string(),
            year: DEFAULT_REPORT_YEAR,
            context: DEFAULT_REPORT_CONTEXT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub evaluation_date: NaiveDate,
    pub metadata: ReportMetadata,
    pub currency: String,
}

impl EngineConfig {
    pub fn new(evaluation_date: NaiveDate) -> Self {
        Self {
            evaluation_date,
            metadata: ReportMetadata::default(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Everything one engine run produced. `report` is the transport boundary; the
/// rest feeds persistence and summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractAnalysis {
    pub metrics: ContractMetrics,
    pub anomalies: Vec<Anomaly>,
    pub assessment: RiskAssessment,
    pub recommendations: Vec<String>,
    pub enrichment: EnrichmentFeatures,
    pub report: ContractReport,
}
