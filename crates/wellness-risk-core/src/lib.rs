pub mod classifier;
pub mod cohort;
pub mod evaluation;
pub mod report;
pub mod settings;

pub use classifier::{
    classify, Assessment, Category, RiskClassifier, RiskThresholds, RiskTier, ScoreSet,
    ScoreValidationError, ThresholdValidationError,
};
pub use cohort::{Alert, CohortAnalyzer, CohortSummary, RiskConfig, StudentHistory, Trend};
pub use evaluation::{
    file_repository::FileEvaluationRepository, Evaluation, EvaluationRepository,
    EvaluationValidationError, InMemoryEvaluationRepository,
};
pub use settings::RiskSettings;
