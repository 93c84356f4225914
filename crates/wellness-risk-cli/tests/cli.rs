use std::fs::write;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use proptest::prelude::*;

const ENV_VARS: [&str; 4] = [
    "WELLNESS_RISK_ALERT_TIER",
    "WELLNESS_RISK_DATA_DIR",
    "WELLNESS_RISK_THRESHOLDS__MEDIUM",
    "WELLNESS_RISK_THRESHOLDS__HIGH",
];

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn wellness() -> Command {
    wellness_with(fixtures_dir())
}

fn wellness_with(data_dir: impl Into<PathBuf>) -> Command {
    let mut cmd = Command::cargo_bin("wellness-risk").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--data-dir").arg(data_dir.into());
    cmd
}

#[test]
fn classify_boundary_is_alto() {
    wellness()
        .args([
            "classify",
            "--estres",
            "7",
            "--agotamiento",
            "7",
            "--sobrecarga",
            "7",
            "--burnout",
            "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Risk Tier: ALTO"));
}

#[test]
fn classify_json_emits_literal_tier() {
    let output = wellness()
        .args([
            "classify",
            "--estres",
            "5",
            "--agotamiento",
            "5",
            "--sobrecarga",
            "5",
            "--burnout",
            "5",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tier"], "MEDIO");
    assert_eq!(value["average"], serde_json::json!(5.0));
}

#[test]
fn classify_rejects_out_of_range_scores() {
    wellness()
        .args([
            "classify",
            "--estres",
            "5",
            "--agotamiento",
            "12",
            "--sobrecarga",
            "5",
            "--burnout",
            "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("agotamiento"));
}

#[test]
fn classify_rejects_nan() {
    wellness()
        .args([
            "classify",
            "--estres",
            "NaN",
            "--agotamiento",
            "1",
            "--sobrecarga",
            "1",
            "--burnout",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("finite"));
}

#[test]
fn summary_reports_fixture_distribution() {
    wellness()
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluations: 9 from 5 student(s)"))
        .stdout(predicate::str::contains("Risk Distribution"))
        .stdout(predicate::str::contains("A001 week 3 [ALTO]"));
}

#[test]
fn alerts_json_lists_latest_alto_students() {
    let output = wellness().args(["alerts", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|alert| alert["student_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["A001", "D004"]);
}

#[test]
fn alert_tier_from_config_file() {
    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write(file.path(), "alert_tier = \"BAJO\"\n").unwrap();

    let output = wellness()
        .arg("--config")
        .arg(file.path())
        .args(["alerts", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|alert| alert["student_id"].as_str().unwrap().to_string())
        .collect();
    // Only reachable below the default ALTO alert tier.
    assert!(ids.contains(&"E005".to_string()));
    assert_eq!(ids.len(), 5);
}

#[test]
fn configured_thresholds_ignored_without_what_if() {
    let output = wellness()
        .env("WELLNESS_RISK_THRESHOLDS__HIGH", "9")
        .args([
            "classify",
            "--estres",
            "7",
            "--agotamiento",
            "7",
            "--sobrecarga",
            "7",
            "--burnout",
            "7",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tier"], "ALTO");
    assert_eq!(value["thresholds"]["high"], serde_json::json!(7.0));
}

#[test]
fn what_if_applies_and_reports_thresholds() {
    let output = wellness()
        .env("WELLNESS_RISK_THRESHOLDS__HIGH", "9")
        .args([
            "--what-if",
            "classify",
            "--estres",
            "7",
            "--agotamiento",
            "7",
            "--sobrecarga",
            "7",
            "--burnout",
            "7",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tier"], "MEDIO");
    assert_eq!(value["thresholds"]["high"], serde_json::json!(9.0));

    wellness()
        .env("WELLNESS_RISK_THRESHOLDS__HIGH", "9")
        .args(["--what-if", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("What-if thresholds: MEDIO >= 5.00, ALTO >= 9.00"));
}

#[test]
fn alert_tier_from_environment() {
    wellness()
        .env("WELLNESS_RISK_ALERT_TIER", "BAJO")
        .arg("alerts")
        .assert()
        .success()
        .stdout(predicate::str::contains("E005"))
        .stdout(predicate::str::contains("B002"));
}

#[test]
fn history_shows_trend() {
    wellness()
        .args(["history", "A001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("latest ALTO (Worsening)"))
        .stdout(predicate::str::contains("week  1: BAJO"));
}

#[test]
fn history_for_unknown_student_fails() {
    wellness()
        .args(["history", "Z999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no evaluations found for student `Z999`"));
}

#[test]
fn tiers_table_lists_all_levels() {
    wellness()
        .arg("tiers")
        .assert()
        .success()
        .stdout(predicate::str::contains("BAJO"))
        .stdout(predicate::str::contains("MEDIO"))
        .stdout(predicate::str::contains("ALTO"))
        .stdout(predicate::str::contains("#22c55e"));
}

#[test]
fn missing_data_dir_yields_empty_summary() {
    let temp = tempfile::tempdir().unwrap();
    wellness_with(temp.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluations: 0 from 0 student(s)"))
        .stdout(predicate::str::contains("No alerts."));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]
    #[test]
    fn any_valid_scores_classify(scores in proptest::array::uniform4(0u8..=10)) {
        let values: Vec<String> = scores.iter().map(u8::to_string).collect();
        let output = wellness()
            .args([
                "classify",
                "--estres", values[0].as_str(),
                "--agotamiento", values[1].as_str(),
                "--sobrecarga", values[2].as_str(),
                "--burnout", values[3].as_str(),
                "--json",
            ])
            .output()
            .unwrap();
        prop_assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let tier = value["tier"].as_str().unwrap();
        prop_assert!(["BAJO", "MEDIO", "ALTO"].contains(&tier));
    }
}
