use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::classifier::{
    Assessment, Category, RiskClassifier, RiskThresholds, RiskTier, ThresholdValidationError,
};
use crate::evaluation::{Evaluation, EvaluationRepository};

/// Difference in weekly averages below which a student is considered stable.
const TREND_TOLERANCE: f64 = 0.5;

/// Tunable configuration for cohort analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub thresholds: RiskThresholds,
    /// Minimum tier of a student's latest evaluation that raises an alert.
    pub alert_tier: RiskTier,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            alert_tier: RiskTier::Alto,
        }
    }
}

/// Number of evaluations in each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierCounts {
    pub bajo: usize,
    pub medio: usize,
    pub alto: usize,
}

impl TierCounts {
    pub fn get(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Bajo => self.bajo,
            RiskTier::Medio => self.medio,
            RiskTier::Alto => self.alto,
        }
    }

    fn increment(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Bajo => self.bajo += 1,
            RiskTier::Medio => self.medio += 1,
            RiskTier::Alto => self.alto += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.bajo + self.medio + self.alto
    }

    /// Share of evaluations in `tier`, as a percentage (0.0 for an empty cohort).
    pub fn percentage(&self, tier: RiskTier) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(tier) as f64 * 100.0 / total as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverage {
    pub category: Category,
    pub average: f64,
}

/// A student whose latest evaluation reached the alert tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub student_id: String,
    pub week: u32,
    pub tier: RiskTier,
    pub average: f64,
    pub dominant_category: Category,
}

/// Aggregate statistics shown on the administrator dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub total: usize,
    pub students: usize,
    pub tier_counts: TierCounts,
    pub category_averages: Vec<CategoryAverage>,
    pub overall_average: f64,
    pub alerts: Vec<Alert>,
    /// Bounds every tier in this summary was computed with.
    pub thresholds: RiskThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAssessment {
    pub week: u32,
    #[serde(flatten)]
    pub assessment: Assessment,
}

/// Week-by-week view of a single student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentHistory {
    pub student_id: String,
    pub weeks: Vec<WeeklyAssessment>,
    pub latest_tier: RiskTier,
    pub trend: Trend,
}

/// Aggregates evaluations from a repository into tier statistics and alerts.
pub struct CohortAnalyzer<R: EvaluationRepository> {
    repo: Arc<R>,
    classifier: RiskClassifier,
    config: RiskConfig,
}

impl<R: EvaluationRepository> CohortAnalyzer<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            classifier: RiskClassifier::new(),
            config: RiskConfig::default(),
        }
    }

    pub fn with_config(repo: Arc<R>, config: RiskConfig) -> Result<Self, ThresholdValidationError> {
        Ok(Self {
            repo,
            classifier: RiskClassifier::with_thresholds(config.thresholds)?,
            config,
        })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    #[instrument(name = "summarize_cohort", skip(self))]
    pub async fn summarize(&self) -> Result<CohortSummary> {
        let evaluations = self.repo.load_evaluations().await?;
        let summary = self.summarize_evaluations(&evaluations);
        debug!(
            total = summary.total,
            alerts = summary.alerts.len(),
            overall_average = summary.overall_average,
            "cohort summarized"
        );
        Ok(summary)
    }

    #[instrument(name = "student_history", skip(self))]
    pub async fn student_history(&self, student_id: &str) -> Result<Option<StudentHistory>> {
        let evaluations = self.repo.evaluations_for(student_id).await?;
        let weeks: Vec<_> = evaluations
            .iter()
            .map(|evaluation| WeeklyAssessment {
                week: evaluation.week,
                assessment: self.classifier.assess(&evaluation.scores),
            })
            .collect();
        let Some(latest) = weeks.last() else {
            debug!("no evaluations found");
            return Ok(None);
        };
        let trend = match weeks.len() {
            0 | 1 => Trend::Stable,
            n => trend_between(
                weeks[n - 2].assessment.average,
                latest.assessment.average,
            ),
        };
        Ok(Some(StudentHistory {
            student_id: student_id.to_string(),
            latest_tier: latest.assessment.tier,
            trend,
            weeks,
        }))
    }

    fn summarize_evaluations(&self, evaluations: &[Evaluation]) -> CohortSummary {
        let mut tier_counts = TierCounts::default();
        let mut category_totals = [0.0f64; 4];
        let mut overall_total = 0.0;
        let mut latest: BTreeMap<&str, &Evaluation> = BTreeMap::new();

        for evaluation in evaluations {
            let tier = self.classifier.classify(&evaluation.scores);
            trace!(student_id = %evaluation.student_id, week = evaluation.week, %tier, "classified");
            tier_counts.increment(tier);
            for (total, category) in category_totals.iter_mut().zip(Category::ALL) {
                *total += evaluation.scores.get(category);
            }
            overall_total += evaluation.scores.average();
            latest
                .entry(evaluation.student_id.as_str())
                .and_modify(|current| {
                    if evaluation.week > current.week {
                        *current = evaluation;
                    }
                })
                .or_insert(evaluation);
        }

        let total = evaluations.len();
        let mean = |sum: f64| if total == 0 { 0.0 } else { sum / total as f64 };

        let mut category_averages: Vec<_> = Category::ALL
            .into_iter()
            .zip(category_totals)
            .map(|(category, sum)| CategoryAverage {
                category,
                average: mean(sum),
            })
            .collect();
        category_averages.sort_by(|a, b| {
            b.average
                .partial_cmp(&a.average)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });

        let mut alerts: Vec<_> = latest
            .values()
            .filter_map(|evaluation| {
                let assessment = self.classifier.assess(&evaluation.scores);
                (assessment.tier >= self.config.alert_tier).then(|| Alert {
                    student_id: evaluation.student_id.clone(),
                    week: evaluation.week,
                    tier: assessment.tier,
                    average: assessment.average,
                    dominant_category: assessment.dominant_category,
                })
            })
            .collect();
        alerts.sort_by(|a, b| {
            b.average
                .partial_cmp(&a.average)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.student_id.cmp(&b.student_id))
        });

        let students = evaluations
            .iter()
            .map(|evaluation| evaluation.student_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        CohortSummary {
            total,
            students,
            tier_counts,
            category_averages,
            overall_average: mean(overall_total),
            alerts,
            thresholds: *self.classifier.thresholds(),
        }
    }
}

fn trend_between(previous: f64, current: f64) -> Trend {
    let delta = current - previous;
    if delta.abs() < TREND_TOLERANCE {
        Trend::Stable
    } else if delta > 0.0 {
        Trend::Worsening
    } else {
        Trend::Improving
    }
}
