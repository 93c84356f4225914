use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest and highest score a single category may take.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// One of the four psychosocial dimensions measured by a weekly evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Estres,
    Agotamiento,
    Sobrecarga,
    Burnout,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Estres,
        Category::Agotamiento,
        Category::Sobrecarga,
        Category::Burnout,
    ];

    /// Field name used in evaluation records.
    pub fn key(self) -> &'static str {
        match self {
            Self::Estres => "estres",
            Self::Agotamiento => "agotamiento",
            Self::Sobrecarga => "sobrecarga",
            Self::Burnout => "burnout",
        }
    }

    /// Display label shown on the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Self::Estres => "Estrés",
            Self::Agotamiento => "Agotamiento",
            Self::Sobrecarga => "Sobrecarga",
            Self::Burnout => "Burnout",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

/// Three-level risk classification, ordered by ascending severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Bajo,
    Medio,
    Alto,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Bajo, RiskTier::Medio, RiskTier::Alto];

    /// Literal identifier persisted and compared by callers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bajo => "BAJO",
            Self::Medio => "MEDIO",
            Self::Alto => "ALTO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bajo => "Bajo",
            Self::Medio => "Medio",
            Self::Alto => "Alto",
        }
    }

    /// Badge color (hex) used by the dashboard.
    pub fn color(self) -> &'static str {
        match self {
            Self::Bajo => "#22c55e",
            Self::Medio => "#f59e0b",
            Self::Alto => "#ef4444",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Bajo => "Indicadores dentro de rangos saludables; mantener hábitos actuales.",
            Self::Medio => "Señales de alerta moderadas; se recomienda seguimiento preventivo.",
            Self::Alto => "Riesgo elevado; se recomienda contacto con bienestar estudiantil.",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = UnknownTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BAJO" => Ok(Self::Bajo),
            "MEDIO" => Ok(Self::Medio),
            "ALTO" => Ok(Self::Alto),
            _ => Err(UnknownTierError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown risk tier `{0}` (expected BAJO, MEDIO or ALTO)")]
pub struct UnknownTierError(pub String);

/// Immutable set of the four category scores produced by one evaluation.
///
/// Construction goes through [`ScoreSet::new`] (or serde, which delegates to
/// it), so every value held here is finite and within `0.0..=10.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScores")]
pub struct ScoreSet {
    estres: f64,
    agotamiento: f64,
    sobrecarga: f64,
    burnout: f64,
}

impl ScoreSet {
    pub fn new(
        estres: f64,
        agotamiento: f64,
        sobrecarga: f64,
        burnout: f64,
    ) -> Result<Self, ScoreValidationError> {
        let scores = Self {
            estres,
            agotamiento,
            sobrecarga,
            burnout,
        };
        for category in Category::ALL {
            validate_score(category, scores.get(category))?;
        }
        Ok(scores)
    }

    pub fn estres(&self) -> f64 {
        self.estres
    }

    pub fn agotamiento(&self) -> f64 {
        self.agotamiento
    }

    pub fn sobrecarga(&self) -> f64 {
        self.sobrecarga
    }

    pub fn burnout(&self) -> f64 {
        self.burnout
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Estres => self.estres,
            Category::Agotamiento => self.agotamiento,
            Category::Sobrecarga => self.sobrecarga,
            Category::Burnout => self.burnout,
        }
    }

    /// Unit-weighted mean of the four categories.
    pub fn average(&self) -> f64 {
        (self.estres + self.agotamiento + self.sobrecarga + self.burnout) / 4.0
    }

    /// Highest-scoring category; ties resolve to the earlier category.
    pub fn dominant_category(&self) -> Category {
        let mut best = Category::Estres;
        for category in Category::ALL {
            if self.get(category) > self.get(best) {
                best = category;
            }
        }
        best
    }
}

fn validate_score(category: Category, value: f64) -> Result<(), ScoreValidationError> {
    if !value.is_finite() {
        return Err(ScoreValidationError::NotFinite { category });
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(ScoreValidationError::OutOfRange { category, value });
    }
    Ok(())
}

#[derive(Deserialize)]
struct RawScores {
    estres: f64,
    agotamiento: f64,
    sobrecarga: f64,
    burnout: f64,
}

impl TryFrom<RawScores> for ScoreSet {
    type Error = ScoreValidationError;

    fn try_from(raw: RawScores) -> Result<Self, Self::Error> {
        Self::new(raw.estres, raw.agotamiento, raw.sobrecarga, raw.burnout)
    }
}

/// Errors emitted while validating submitted category scores.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreValidationError {
    #[error("score for `{category}` must be a finite number")]
    NotFinite { category: Category },
    #[error("score for `{category}` must be within 0.0..=10.0 (got {value})")]
    OutOfRange { category: Category, value: f64 },
}

/// Lower bounds (inclusive) of the `MEDIO` and `ALTO` tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 5.0,
            high: 7.0,
        }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<(), ThresholdValidationError> {
        for (name, value) in [("medium", self.medium), ("high", self.high)] {
            if !value.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(ThresholdValidationError::OutOfRange { name, value });
            }
        }
        if self.medium >= self.high {
            return Err(ThresholdValidationError::Inverted {
                medium: self.medium,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Whether these are the standard `5.0` / `7.0` bounds.
    pub fn is_standard(&self) -> bool {
        *self == Self::default()
    }

    /// Map an average score into a tier; both bounds are inclusive.
    pub fn tier_for(&self, average: f64) -> RiskTier {
        if average >= self.high {
            RiskTier::Alto
        } else if average >= self.medium {
            RiskTier::Medio
        } else {
            RiskTier::Bajo
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThresholdValidationError {
    #[error("threshold `{name}` must be within 0.0..=10.0 (got {value})")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("medium threshold ({medium}) must be lower than high threshold ({high})")]
    Inverted { medium: f64, high: f64 },
}

/// Classify a score set with the standard thresholds (`>= 7` ALTO, `>= 5` MEDIO).
pub fn classify(scores: &ScoreSet) -> RiskTier {
    RiskThresholds::default().tier_for(scores.average())
}

/// Classification result enriched with the values the dashboard displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub scores: ScoreSet,
    pub average: f64,
    pub tier: RiskTier,
    pub dominant_category: Category,
    /// Bounds `tier` was computed with.
    pub thresholds: RiskThresholds,
}

/// Classifier bound to a validated set of thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier {
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: RiskThresholds) -> Result<Self, ThresholdValidationError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn classify(&self, scores: &ScoreSet) -> RiskTier {
        self.thresholds.tier_for(scores.average())
    }

    pub fn assess(&self, scores: &ScoreSet) -> Assessment {
        let average = scores.average();
        Assessment {
            scores: *scores,
            average,
            tier: self.thresholds.tier_for(average),
            dominant_category: scores.dominant_category(),
            thresholds: self.thresholds,
        }
    }
}
