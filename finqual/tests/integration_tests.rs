//! Integration tests for the check pipeline with real files.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::PathBuf;

use finqual::cli::CheckArgs;
use finqual::run_check;
use finqual_core::initialize_summary_validator;
use serde_json::Value;

const SAMPLE_CSV: &str = "\
timevalue,providerkey,companynameofficial,fiscalperiodend,operationstatustype,ipostatustype,geonameen,industrycode,REVENUE,unit_REVENUE,source
2021,P-100,Nordic Shipping As,31-Dec,ACTIVE,PRIVATE,Norway,5010 - Sea transport,81000000,NOK,erp
2021,P-200,Alpine Foods Gmbh,31-Dec,ACTIVE,PUBLIC,Austria,1089 - Food products,NaN,EUR,erp
2021,P-300,Lisbon Tiles Sa,30-Jun,UNKNOWN,PRIVATE,Portugal,2331 - Ceramic tiles,5200000,EUR,manual
2021,P-100,Nordic Shipping As,31-Dec,ACTIVE,PRIVATE,Norway,5010 - Sea transport,81000000,NOK,erp
";

fn check_args(input: PathBuf) -> CheckArgs {
    CheckArgs {
        input,
        output: None,
        summary: None,
        report: None,
        config: None,
        quality_threshold: Vec::new(),
        compress: false,
    }
}

#[tokio::test]
async fn test_integration_csv_check_writes_outputs() {
    initialize_summary_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.csv");
    std::fs::write(&input, SAMPLE_CSV).unwrap();

    let mut args = check_args(input);
    args.report = Some(dir.path().join("report.html"));

    let (report, outputs) = run_check(&args).await.unwrap();

    let measures = &report.summary.quality_measures;
    assert_eq!(measures.completeness.total_issues, 1);
    assert_eq!(measures.consistency.total_issues, 1);
    assert_eq!(measures.validity.total_issues, 0);
    assert_eq!(measures.uniqueness.total_issues, 2);
    assert_eq!(report.summary.records_with_issues, 4);

    assert_eq!(outputs.annotated, dir.path().join("sample_checked.csv"));
    let annotated = std::fs::read_to_string(&outputs.annotated).unwrap();
    let mut lines = annotated.lines();
    let header = lines.next().unwrap();
    assert!(header.contains(",unit_REVENUE,source,flag_completeness,"));
    assert!(header.ends_with("flag_overall,issue_details"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[2].contains(",EUR,manual,"));

    let summary: Value =
        serde_json::from_str(&std::fs::read_to_string(&outputs.summary).unwrap()).unwrap();
    assert_eq!(summary["total_records"], 4);
    assert_eq!(summary["format_version"], "1.0");
    assert_eq!(summary["quality_measures"]["uniqueness"]["total_issues"], 2);
    let columns = summary["columns"].as_array().unwrap();
    let source = columns.iter().find(|c| c["name"] == "source").unwrap();
    assert_eq!(source["declared_type"], "untyped");
    assert_eq!(source["monitored"], false);

    let html = std::fs::read_to_string(dir.path().join("report.html")).unwrap();
    assert!(html.contains("Issues by Category"));
}

#[tokio::test]
async fn test_integration_json_input_with_config_file() {
    initialize_summary_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.json");
    std::fs::write(
        &input,
        r#"[
            {"timevalue": 2020, "providerkey": "A", "REVENUE": 10.0},
            {"timevalue": 2020, "providerkey": "B", "REVENUE": -3.0}
        ]"#,
    )
    .unwrap();
    let config = dir.path().join("rules.json");
    std::fs::write(
        &config,
        r#"{
            "validity_min": 0.4,
            "catalog": {"completeness": ["providerkey", "REVENUE"]}
        }"#,
    )
    .unwrap();

    let mut args = check_args(input);
    args.config = Some(config);
    args.output = Some(dir.path().join("out.json"));
    args.quality_threshold = vec!["completeness:0.5".to_string()];

    let (report, outputs) = run_check(&args).await.unwrap();

    assert_eq!(report.summary.quality_measures.completeness.total_issues, 0);
    assert_eq!(report.summary.quality_measures.validity.total_issues, 1);
    assert!(report.summary.threshold_violations.is_empty());

    let rows: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(&outputs.annotated).unwrap()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["flag_validity"], 1);
    assert_eq!(rows[1]["providerkey"], "B");
}

#[tokio::test]
async fn test_integration_missing_input_file() {
    initialize_summary_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let args = check_args(dir.path().join("absent.csv"));

    let result = run_check(&args).await;

    assert!(matches!(
        result,
        Err(finqual_core::FinqualError::Io { .. })
    ));
}

#[tokio::test]
async fn test_integration_empty_csv_is_rejected() {
    initialize_summary_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    std::fs::write(&input, "timevalue,providerkey\n").unwrap();

    let result = run_check(&check_args(input)).await;

    assert!(matches!(
        result,
        Err(finqual_core::FinqualError::EmptyDataset)
    ));
}

#[tokio::test]
async fn test_integration_csv_without_key_columns() {
    initialize_summary_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("names.csv");
    std::fs::write(
        &input,
        "companynameofficial,REVENUE\n\
         Acme Ltd,100\n\
         Beta Ltd,200\n\
         Gamma Ltd,300\n",
    )
    .unwrap();

    let (report, _) = run_check(&check_args(input)).await.unwrap();
    let uniqueness = &report.summary.quality_measures.uniqueness;

    assert_eq!(uniqueness.total_issues, 0);
    assert!(report.summary.duplicate_groups.is_empty());
    assert_eq!(
        uniqueness.description,
        "Duplicate records based on columns: [companynameofficial, REVENUE]"
    );
    assert_eq!(report.summary.quality_measures.completeness.total_issues, 3);
}
