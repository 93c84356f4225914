use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::ScoreSet;

pub mod file_repository;

/// One completed weekly self-assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvaluation")]
pub struct Evaluation {
    pub student_id: String,
    /// Academic week number, starting at 1.
    pub week: u32,
    pub scores: ScoreSet,
}

impl Evaluation {
    /// Construct an evaluation, validating invariants before returning.
    pub fn new(
        student_id: impl Into<String>,
        week: u32,
        scores: ScoreSet,
    ) -> Result<Self, EvaluationValidationError> {
        let evaluation = Self {
            student_id: student_id.into(),
            week,
            scores,
        };
        evaluation.validate()?;
        Ok(evaluation)
    }

    pub fn validate(&self) -> Result<(), EvaluationValidationError> {
        if self.student_id.trim().is_empty() {
            return Err(EvaluationValidationError::EmptyStudentId);
        }
        if self.week == 0 {
            return Err(EvaluationValidationError::InvalidWeek {
                student_id: self.student_id.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawEvaluation {
    student_id: String,
    week: u32,
    scores: ScoreSet,
}

impl TryFrom<RawEvaluation> for Evaluation {
    type Error = EvaluationValidationError;

    fn try_from(raw: RawEvaluation) -> Result<Self, Self::Error> {
        Self::new(raw.student_id, raw.week, raw.scores)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationValidationError {
    #[error("student id must not be blank")]
    EmptyStudentId,
    #[error("evaluation for `{student_id}` must have week >= 1")]
    InvalidWeek { student_id: String },
}

/// Source of completed evaluations, so file packs and in-memory fixtures can be swapped.
#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    /// Retrieve every evaluation currently available.
    async fn load_evaluations(&self) -> AnyResult<Vec<Evaluation>>;

    /// Evaluations submitted by one student, ordered by week.
    async fn evaluations_for(&self, student_id: &str) -> AnyResult<Vec<Evaluation>> {
        let mut evaluations: Vec<_> = self
            .load_evaluations()
            .await?
            .into_iter()
            .filter(|evaluation| evaluation.student_id == student_id)
            .collect();
        evaluations.sort_by_key(|evaluation| evaluation.week);
        Ok(evaluations)
    }
}

/// Fixed in-memory evaluation set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEvaluationRepository {
    evaluations: Vec<Evaluation>,
}

impl InMemoryEvaluationRepository {
    pub fn new(evaluations: Vec<Evaluation>) -> Self {
        Self { evaluations }
    }
}

#[async_trait]
impl EvaluationRepository for InMemoryEvaluationRepository {
    async fn load_evaluations(&self) -> AnyResult<Vec<Evaluation>> {
        Ok(self.evaluations.clone())
    }
}
