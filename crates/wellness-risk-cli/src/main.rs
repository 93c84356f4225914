use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wellness_risk_core::{
    report::{self, OutputFormat},
    CohortAnalyzer, FileEvaluationRepository, RiskClassifier, RiskSettings, RiskThresholds,
    ScoreSet,
};

const DEFAULT_DATA_DIR: &str = "./fixtures";

#[derive(Parser, Debug)]
#[command(
    name = "wellness-risk",
    author,
    version,
    about = "Student wellness risk classification and cohort statistics"
)]
struct Cli {
    /// Directory containing evaluation packs (evaluations.txt, evaluations.json)
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Optional configuration file (TOML, YAML or JSON)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Classify with the configured thresholds instead of the standard 5 / 7 bounds
    #[arg(long = "what-if", global = true)]
    what_if: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a single set of category scores (0–10 each)
    Classify {
        #[arg(long)]
        estres: f64,
        #[arg(long)]
        agotamiento: f64,
        #[arg(long)]
        sobrecarga: f64,
        #[arg(long)]
        burnout: f64,
        /// Emit JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Aggregate tier statistics for every loaded evaluation
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// List students whose latest evaluation reached the alert tier
    Alerts {
        #[arg(long)]
        json: bool,
    },
    /// Show the week-by-week history of one student
    History {
        student_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the tier lookup table (labels and colors)
    Tiers {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut settings = RiskSettings::load(cli.config.as_deref())?;
    if !cli.what_if && !settings.thresholds.is_standard() {
        warn!(
            medium = settings.thresholds.medium,
            high = settings.thresholds.high,
            "ignoring configured thresholds; pass --what-if to apply them"
        );
        settings.thresholds = RiskThresholds::default();
    }
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| settings.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    debug!(data_dir = %data_dir.display(), ?settings, "resolved configuration");

    let output = match cli.command {
        Commands::Classify {
            estres,
            agotamiento,
            sobrecarga,
            burnout,
            json,
        } => {
            let scores = ScoreSet::new(estres, agotamiento, sobrecarga, burnout)?;
            let classifier = RiskClassifier::with_thresholds(settings.thresholds)?;
            report::render_assessment(
                &classifier.assess(&scores),
                OutputFormat::from_json_flag(json),
            )?
        }
        Commands::Summary { json } => {
            let analyzer = analyzer(&data_dir, &settings)?;
            let summary = analyzer.summarize().await.with_context(|| {
                format!("failed to summarize evaluations from {}", data_dir.display())
            })?;
            report::render_summary(&summary, OutputFormat::from_json_flag(json))?
        }
        Commands::Alerts { json } => {
            let analyzer = analyzer(&data_dir, &settings)?;
            let summary = analyzer.summarize().await.with_context(|| {
                format!("failed to load evaluations from {}", data_dir.display())
            })?;
            report::render_alerts(&summary, OutputFormat::from_json_flag(json))?
        }
        Commands::History { student_id, json } => {
            let analyzer = analyzer(&data_dir, &settings)?;
            let history = analyzer
                .student_history(&student_id)
                .await?
                .with_context(|| format!("no evaluations found for student `{student_id}`"))?;
            report::render_history(&history, OutputFormat::from_json_flag(json))?
        }
        Commands::Tiers { json } => report::render_tiers(OutputFormat::from_json_flag(json))?,
    };
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn analyzer(
    data_dir: &Path,
    settings: &RiskSettings,
) -> Result<CohortAnalyzer<FileEvaluationRepository>> {
    let repo = Arc::new(FileEvaluationRepository::new(data_dir));
    Ok(CohortAnalyzer::with_config(repo, settings.risk_config())?)
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
