use std::{collections::HashSet, fs, path::PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing::debug;

use super::{Evaluation, EvaluationRepository};
use crate::classifier::ScoreSet;

/// Loads evaluations from `evaluations.txt` and `evaluations.json` located under a base directory.
pub struct FileEvaluationRepository {
    base_path: PathBuf,
    cache: OnceCell<Vec<Evaluation>>,
}

type SeenKeys = HashSet<(String, u32)>;

impl FileEvaluationRepository {
    /// Create a repository rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: OnceCell::new(),
        }
    }

    fn lines_path(&self) -> PathBuf {
        self.base_path.join("evaluations.txt")
    }

    fn json_path(&self) -> PathBuf {
        self.base_path.join("evaluations.json")
    }

    fn load_lines(&self, seen: &mut SeenKeys) -> Result<Vec<Evaluation>> {
        let mut evaluations = Vec::new();
        let path = self.lines_path();
        if !path.exists() {
            return Ok(evaluations);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read evaluation file at {}", path.display()))?;
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let location = format!("{}:{}", path.display(), idx + 1);
            let parts: Vec<_> = trimmed.split('|').map(str::trim).collect();
            if parts.len() != 6 {
                return Err(anyhow::anyhow!(
                    "invalid evaluation format at {location} \
                     (expected student_id|week|estres|agotamiento|sobrecarga|burnout)"
                ));
            }
            let week: u32 = parts[1]
                .parse()
                .with_context(|| format!("invalid week `{}` at {location}", parts[1]))?;
            let mut values = [0.0f64; 4];
            for (slot, raw) in values.iter_mut().zip(&parts[2..]) {
                *slot = raw
                    .parse()
                    .with_context(|| format!("invalid score `{raw}` at {location}"))?;
            }
            let scores = ScoreSet::new(values[0], values[1], values[2], values[3])
                .with_context(|| format!("invalid scores at {location}"))?;
            let evaluation = Evaluation::new(parts[0], week, scores)
                .with_context(|| format!("invalid evaluation at {location}"))?;
            register(seen, &evaluation)?;
            evaluations.push(evaluation);
        }
        Ok(evaluations)
    }

    fn load_json(&self, seen: &mut SeenKeys) -> Result<Vec<Evaluation>> {
        let mut evaluations = Vec::new();
        let path = self.json_path();
        if !path.exists() {
            return Ok(evaluations);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read evaluation file at {}", path.display()))?;
        let items: Vec<JsonEvaluation> = json5::from_str(&raw).with_context(|| {
            format!(
                "invalid JSON structure in evaluation file at {}",
                path.display()
            )
        })?;
        for item in items {
            let scores = ScoreSet::new(item.estres, item.agotamiento, item.sobrecarga, item.burnout)
                .with_context(|| {
                    format!(
                        "invalid scores for `{}` week {} in {}",
                        item.student_id,
                        item.week,
                        path.display()
                    )
                })?;
            let evaluation = Evaluation::new(item.student_id, item.week, scores)
                .with_context(|| format!("invalid evaluation in {}", path.display()))?;
            register(seen, &evaluation)?;
            evaluations.push(evaluation);
        }
        Ok(evaluations)
    }
}

fn register(seen: &mut SeenKeys, evaluation: &Evaluation) -> Result<()> {
    if !seen.insert((evaluation.student_id.clone(), evaluation.week)) {
        return Err(anyhow::anyhow!(
            "duplicate evaluation for `{}` week {}",
            evaluation.student_id,
            evaluation.week
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl EvaluationRepository for FileEvaluationRepository {
    async fn load_evaluations(&self) -> Result<Vec<Evaluation>> {
        let evaluations = self.cache.get_or_try_init(|| {
            let mut seen = HashSet::new();
            let mut evaluations = self.load_lines(&mut seen)?;
            evaluations.extend(self.load_json(&mut seen)?);
            debug!(
                count = evaluations.len(),
                base = %self.base_path.display(),
                "loaded evaluations"
            );
            Ok::<_, anyhow::Error>(evaluations)
        })?;
        Ok(evaluations.clone())
    }
}

#[derive(serde::Deserialize)]
struct JsonEvaluation {
    student_id: String,
    week: u32,
    estres: f64,
    agotamiento: f64,
    sobrecarga: f64,
    burnout: f64,
}
