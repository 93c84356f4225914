use std::fmt::Write;

use serde::Serialize;

use crate::classifier::{Assessment, Category, RiskThresholds, RiskTier};
use crate::cohort::{CohortSummary, StudentHistory};

/// Format styles supported by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Human
        }
    }
}

pub fn render_assessment(assessment: &Assessment, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => {
            let mut out = String::new();
            writeln!(
                out,
                "Risk Tier: {} ({}) • average {:.2}",
                assessment.tier,
                assessment.tier.label(),
                assessment.average
            )?;
            for category in Category::ALL {
                let marker = if category == assessment.dominant_category {
                    " *"
                } else {
                    ""
                };
                writeln!(
                    out,
                    "  - {label:<12} {score:>5.2}{marker}",
                    label = category.label(),
                    score = assessment.scores.get(category),
                )?;
            }
            writeln!(out, "\n{}", assessment.tier.description())?;
            write_threshold_note(&mut out, &assessment.thresholds)?;
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(assessment)?),
    }
}

pub fn render_summary(summary: &CohortSummary, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_summary_human(summary),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonSummary::from(summary))?),
    }
}

fn render_summary_human(summary: &CohortSummary) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "Evaluations: {} from {} student(s) • overall average {:.2}",
        summary.total, summary.students, summary.overall_average
    )?;
    writeln!(out)?;

    writeln!(out, "Risk Distribution:")?;
    for tier in RiskTier::ALL {
        writeln!(
            out,
            "  - {tier:<5} {count:>4} ({pct:.1}%)",
            tier = tier.as_str(),
            count = summary.tier_counts.get(tier),
            pct = summary.tier_counts.percentage(tier),
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Category Averages:")?;
    for entry in &summary.category_averages {
        writeln!(
            out,
            "  - {label:>12}: {avg:.2}",
            label = entry.category.label(),
            avg = entry.average
        )?;
    }

    writeln!(out)?;
    render_alerts_into(&mut out, summary)?;
    write_threshold_note(&mut out, &summary.thresholds)?;
    Ok(out)
}

/// Flag output whose tiers were not computed with the standard bounds.
fn write_threshold_note(out: &mut String, thresholds: &RiskThresholds) -> anyhow::Result<()> {
    if !thresholds.is_standard() {
        writeln!(
            out,
            "\nWhat-if thresholds: MEDIO >= {:.2}, ALTO >= {:.2} (standard: 5.00 / 7.00)",
            thresholds.medium, thresholds.high
        )?;
    }
    Ok(())
}

/// Render only the alert list of a summary.
pub fn render_alerts(summary: &CohortSummary, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => {
            let mut out = String::new();
            render_alerts_into(&mut out, summary)?;
            write_threshold_note(&mut out, &summary.thresholds)?;
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&summary.alerts)?),
    }
}

fn render_alerts_into(out: &mut String, summary: &CohortSummary) -> anyhow::Result<()> {
    if summary.alerts.is_empty() {
        writeln!(out, "No alerts.")?;
        return Ok(());
    }
    writeln!(out, "Alerts:")?;
    for alert in &summary.alerts {
        writeln!(
            out,
            "  - {id} week {week} [{tier}] average {avg:.2}, highest: {category}",
            id = alert.student_id,
            week = alert.week,
            tier = alert.tier,
            avg = alert.average,
            category = alert.dominant_category.label(),
        )?;
    }
    Ok(())
}

pub fn render_history(history: &StudentHistory, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => {
            let mut out = String::new();
            writeln!(
                out,
                "Student {}: latest {} ({:?})",
                history.student_id, history.latest_tier, history.trend
            )?;
            for week in &history.weeks {
                writeln!(
                    out,
                    "  - week {:>2}: {:<5} average {:.2}",
                    week.week, week.assessment.tier, week.assessment.average
                )?;
            }
            if let Some(week) = history.weeks.last() {
                write_threshold_note(&mut out, &week.assessment.thresholds)?;
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(history)?),
    }
}

/// Render the tier lookup table (identifier, label, color, guidance).
pub fn render_tiers(format: OutputFormat) -> anyhow::Result<String> {
    let rows: Vec<_> = RiskTier::ALL.iter().map(|tier| TierRow::from(*tier)).collect();
    match format {
        OutputFormat::Human => {
            let mut out = String::new();
            for row in &rows {
                writeln!(
                    out,
                    "{id:<5} {label:<6} {color}  {description}",
                    id = row.id,
                    label = row.label,
                    color = row.color,
                    description = row.description
                )?;
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
    }
}

#[derive(Debug, Serialize)]
struct TierRow {
    id: RiskTier,
    label: &'static str,
    color: &'static str,
    description: &'static str,
}

impl From<RiskTier> for TierRow {
    fn from(tier: RiskTier) -> Self {
        Self {
            id: tier,
            label: tier.label(),
            color: tier.color(),
            description: tier.description(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    total: usize,
    students: usize,
    overall_average: f64,
    tier_counts: &'a crate::cohort::TierCounts,
    tier_percentages: Vec<(RiskTier, f64)>,
    category_averages: &'a [crate::cohort::CategoryAverage],
    alerts: &'a [crate::cohort::Alert],
    thresholds: &'a RiskThresholds,
    standard_thresholds: bool,
}

impl<'a> From<&'a CohortSummary> for JsonSummary<'a> {
    fn from(summary: &'a CohortSummary) -> Self {
        Self {
            total: summary.total,
            students: summary.students,
            overall_average: summary.overall_average,
            tier_counts: &summary.tier_counts,
            tier_percentages: RiskTier::ALL
                .iter()
                .map(|tier| (*tier, summary.tier_counts.percentage(*tier)))
                .collect(),
            category_averages: &summary.category_averages,
            alerts: &summary.alerts,
            thresholds: &summary.thresholds,
            standard_thresholds: summary.thresholds.is_standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{RiskClassifier, ScoreSet};
    use crate::cohort::{Alert, CategoryAverage, TierCounts};

    fn sample_summary() -> CohortSummary {
        CohortSummary {
            total: 3,
            students: 2,
            tier_counts: TierCounts {
                bajo: 1,
                medio: 1,
                alto: 1,
            },
            category_averages: vec![CategoryAverage {
                category: Category::Burnout,
                average: 6.0,
            }],
            overall_average: 5.5,
            alerts: vec![Alert {
                student_id: "TEST_STUDENT".into(),
                week: 4,
                tier: RiskTier::Alto,
                average: 8.25,
                dominant_category: Category::Burnout,
            }],
            thresholds: RiskThresholds::default(),
        }
    }

    #[test]
    fn human_summary_contains_sections() {
        let output = render_summary(&sample_summary(), OutputFormat::Human).unwrap();
        assert!(output.contains("Risk Distribution"));
        assert!(output.contains("Category Averages"));
        assert!(output.contains("TEST_STUDENT week 4 [ALTO]"));
    }

    #[test]
    fn json_summary_serializes() {
        let summary = sample_summary();
        let output = render_summary(&summary, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["tier_counts"]["alto"], serde_json::json!(1));
        assert_eq!(value["alerts"][0]["tier"], "ALTO");
        assert_eq!(value["tier_percentages"][0][0], "BAJO");
    }

    #[test]
    fn custom_thresholds_are_flagged() {
        let output = render_summary(&sample_summary(), OutputFormat::Human).unwrap();
        assert!(!output.contains("What-if thresholds"));

        let mut summary = sample_summary();
        summary.thresholds = RiskThresholds {
            medium: 5.0,
            high: 9.0,
        };
        let output = render_summary(&summary, OutputFormat::Human).unwrap();
        assert!(output.contains("What-if thresholds: MEDIO >= 5.00, ALTO >= 9.00"));
        let value: serde_json::Value =
            serde_json::from_str(&render_summary(&summary, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(value["standard_thresholds"], false);
        assert_eq!(value["thresholds"]["high"], serde_json::json!(9.0));
    }

    #[test]
    fn empty_alerts_render_placeholder() {
        let mut summary = sample_summary();
        summary.alerts.clear();
        let output = render_alerts(&summary, OutputFormat::Human).unwrap();
        assert_eq!(output.trim(), "No alerts.");
    }

    #[test]
    fn assessment_json_uses_literal_tier() {
        let scores = ScoreSet::new(7.0, 7.0, 7.0, 7.0).unwrap();
        let assessment = RiskClassifier::new().assess(&scores);
        let output = render_assessment(&assessment, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["tier"], "ALTO");
        assert_eq!(value["scores"]["estres"], serde_json::json!(7.0));

        let human = render_assessment(&assessment, OutputFormat::Human).unwrap();
        assert!(human.starts_with("Risk Tier: ALTO (Alto)"));
    }

    #[test]
    fn tier_table_lists_colors() {
        let output = render_tiers(OutputFormat::Human).unwrap();
        assert!(output.contains("#ef4444"));
        let value: serde_json::Value =
            serde_json::from_str(&render_tiers(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));
        assert_eq!(value[1]["id"], "MEDIO");
    }
}
