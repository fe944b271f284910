use super::*;

const TEXT_FIELDS: &[&str] = &[
    "observations",
    "observaciones",
    "notes",
    "comments",
    "comentarios",
];

const NEGATIVE_TERMS: &[&str] = &[
    "delay", "delayed", "late", "overrun", "shortage", "suspended", "suspension", "claim",
    "dispute", "accident", "rain", "flood", "strike", "penalty", "risk", "problem", "issue",
    "retraso", "atraso", "atrasado", "sobrecosto", "suspendido", "suspension", "reclamo",
    "disputa", "accidente", "lluvia", "lluvias", "inundacion", "huelga", "multa", "riesgo",
    "problema", "incumplimiento", "faltante",
];

const POSITIVE_TERMS: &[&str] = &[
    "ahead", "completed", "on-time", "ontime", "efficient", "approved", "resolved", "progress",
    "good", "excellent", "adelantado", "completado", "terminado", "eficiente", "aprobado",
    "resuelto", "avance", "bueno", "excelente", "cumplimiento",
];

const SENTIMENT_LABEL_BAND: f64 = 0.2;

/// Numeric and text features contributed by an optional enrichment source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentFeatures {
    pub provider: Option<String>,
    pub features: BTreeMap<String, f64>,
    pub labels: BTreeMap<String, String>,
}

impl EnrichmentFeatures {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.labels.is_empty()
    }
}

/// Best-effort source of extra features. Failures are isolated by the caller
/// and count as "no signal".
pub trait EnrichmentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn enrich(
        &self,
        record: &ContractRecord,
        metrics: &ContractMetrics,
    ) -> Result<EnrichmentFeatures>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnrichment;

impl EnrichmentProvider for NoopEnrichment {
    fn name(&self) -> &'static str {
        "none"
    }

    fn enrich(&self, _: &ContractRecord, _: &ContractMetrics) -> Result<EnrichmentFeatures> {
        Ok(EnrichmentFeatures::default())
    }
}

/// Keyword sentiment over the free-text observation fields of a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl EnrichmentProvider for LexiconSentiment {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn enrich(&self, record: &ContractRecord, _: &ContractMetrics) -> Result<EnrichmentFeatures> {
        let mut texts = Vec::new();
        for key in TEXT_FIELDS {
            match record.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::String(text)) => texts.push(text.as_str()),
                Some(other) => bail!("observation field {key} is not text: {other}"),
            }
        }

        if texts.is_empty() {
            return Ok(EnrichmentFeatures::default());
        }

        let tokens = texts
            .iter()
            .flat_map(|text| tokenize_observation(text))
            .collect::<Vec<String>>();
        let negative = tokens
            .iter()
            .filter(|token| NEGATIVE_TERMS.contains(&token.as_str()))
            .count();
        let positive = tokens
            .iter()
            .filter(|token| POSITIVE_TERMS.contains(&token.as_str()))
            .count();
        let score = sentiment_score(positive, negative);

        let mut features = BTreeMap::new();
        features.insert("sentiment_score".to_string(), score);
        features.insert("negative_terms".to_string(), negative as f64);
        features.insert("positive_terms".to_string(), positive as f64);
        features.insert("text_fields".to_string(), texts.len() as f64);

        let mut labels = BTreeMap::new();
        labels.insert("sentiment".to_string(), sentiment_label(score).to_string());

        Ok(EnrichmentFeatures {
            provider: Some(self.name().to_string()),
            features,
            labels,
        })
    }
}

pub fn tokenize_observation(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|character: char| !(character.is_alphanumeric() || character == '-'))
        .filter(|token| token.chars().count() >= 3)
        .map(fold_accents)
        .collect()
}

fn fold_accents(token: &str) -> String {
    token
        .chars()
        .map(|character| match character {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

/// Balance of positive against negative hits, in [-1, 1].
pub fn sentiment_score(positive: usize, negative: usize) -> f64 {
    let total = positive + negative;
    if total == 0 {
        return 0.0;
    }
    (positive as f64 - negative as f64) / total as f64
}

pub fn sentiment_label(score: f64) -> &'static str {
    if score > SENTIMENT_LABEL_BAND {
        "POSITIVE"
    } else if score < -SENTIMENT_LABEL_BAND {
        "NEGATIVE"
    } else {
        "NEUTRAL"
    }
}
