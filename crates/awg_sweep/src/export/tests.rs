use super::*;
use crate::parameters::{AwgParams, ParamField, ParameterSet};
use crate::probe::ProbeMeasurement;
use crate::report::ProbeResult;
use crate::template::TunnelTemplate;
use tempfile::{tempdir, NamedTempFile};

fn record(index: usize, jc: u32, result: ProbeResult) -> SweepRecord {
    SweepRecord {
        template: "client".to_string(),
        set: ParameterSet::new(
            AwgParams {
                jc,
                ..AwgParams::default()
            },
            index,
        ),
        result,
        timestamp: Local::now(),
    }
}

fn working(latency_ms: f64) -> ProbeResult {
    ProbeResult::from_measurement(&ProbeMeasurement::constant(5, latency_ms), Some(true), 0.0)
}

fn sample_report() -> SweepReport {
    let mut report = SweepReport::new();
    report.push(record(0, 0, working(42.0)));
    report.push(record(1, 3, ProbeResult::activation_failed("exit status 1: Line unrecognized")));
    report.push(record(2, 5, working(17.5)));
    report.push(record(3, 10, ProbeResult::no_handshake()));
    report.finish();
    report
}

#[test]
fn test_export_to_json() {
    let file = NamedTempFile::new().unwrap();
    export_to_json(&sample_report(), file.path()).unwrap();

    let contents = std::fs::read_to_string(file.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["records"].as_array().unwrap().len(), 4);
    assert_eq!(value["interrupted"], false);
    assert_eq!(value["records"][1]["result"]["failure"], "activation_failed");
    assert_eq!(value["records"][2]["set"]["params"]["jc"], 5);
}

#[test]
fn test_export_to_csv() {
    let file = NamedTempFile::new().unwrap();
    export_to_csv(&sample_report().records, file.path()).unwrap();

    let mut reader = ::csv::Reader::from_path(file.path()).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "template");
    assert_eq!(&headers[2], "jc");

    let rows: Vec<::csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(&rows[0][1], "combo_0");
    assert_eq!(&rows[0][11], "true");
    assert_eq!(&rows[0][13], "42.000");
    assert_eq!(&rows[1][13], "");
    assert_eq!(&rows[1][19], "activation_failed");
    assert_eq!(&rows[3][12], "false");
}

#[test]
fn test_export_to_csv_rejects_empty() {
    let file = NamedTempFile::new().unwrap();
    assert!(export_to_csv(&[], file.path()).is_err());
}

#[test]
fn test_export_results_writes_timestamped_files() {
    let dir = tempdir().unwrap();
    let timestamp = Local::now();
    let files = export_results(&sample_report(), dir.path(), timestamp).unwrap();

    let stem = format!("results_{}", timestamp.format("%Y%m%d_%H%M%S"));
    assert_eq!(files.json, dir.path().join("results").join(format!("{stem}.json")));
    assert!(files.json.exists());
    assert!(files.csv.as_ref().unwrap().exists());
}

#[test]
fn test_export_results_skips_csv_for_empty_report() {
    let dir = tempdir().unwrap();
    let files = export_results(&SweepReport::new(), dir.path(), Local::now()).unwrap();
    assert!(files.json.exists());
    assert!(files.csv.is_none());
}

#[test]
fn test_find_best_record() {
    let report = sample_report();
    let best = find_best_record(&report.records).unwrap();
    assert_eq!(best.set.combination_id, "combo_2");

    let ranked: Vec<u32> = ranked_records(&report.records)
        .iter()
        .map(|record| record.set.params.jc)
        .collect();
    assert_eq!(ranked, vec![5, 0]);
}

#[test]
fn test_summary_lists_ranked_combinations() {
    let summary = format_summary(&sample_report(), 20);
    assert!(summary.contains("Tested:      4"));
    assert!(summary.contains("Successful:  2"));
    assert!(summary.contains("activation_failed: 1"));
    assert!(summary.contains("Best: client Jc5_Jmin40_Jmax70_S10_S20 (17.5 ms)"));
    assert!(summary.contains("  Jc = 5"));
    assert!(!summary.contains("no successful combination"));
}

#[test]
fn test_summary_respects_top_limit() {
    let summary = format_summary(&sample_report(), 1);
    assert!(summary.contains("TOP 1"));
    let table_rows = summary
        .lines()
        .filter(|line| line.starts_with("1 ") || line.starts_with("2 "))
        .count();
    assert_eq!(table_rows, 1);
}

#[test]
fn test_summary_without_successes() {
    let mut report = SweepReport::new();
    let lost = ProbeResult::from_measurement(&ProbeMeasurement::lost(5), Some(true), 0.0);
    report.push(record(0, 0, lost));
    report.mark_interrupted();

    let summary = format_summary(&report, 20);
    assert!(summary.contains("no successful combination"));
    assert!(summary.contains("unreachable: 1"));
    assert!(summary.contains("Interrupted: yes"));
}

#[test]
fn test_write_recommended_configs() {
    let dir = tempdir().unwrap();
    let mut plan = SweepPlan::new();
    for name in ["home", "office"] {
        let template =
            TunnelTemplate::parse(name, "[Interface]\nAddress = 10.0.0.2/32\n").unwrap();
        plan.push(template, Vec::new());
    }
    let report = sample_report();
    let best = report.best().unwrap();

    let written = write_recommended_configs(&plan, best, dir.path()).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0], dir.path().join("home_RECOMMENDED.conf"));
    let contents = std::fs::read_to_string(&written[1]).unwrap();
    assert!(contents.contains("Jc = 5"));
}

#[test]
fn test_recommended_configs_keep_each_template_headers() {
    let dir = tempdir().unwrap();
    let home = TunnelTemplate::parse("home", "[Interface]\nH1 = 111\nH2 = 112\n").unwrap();
    let office = TunnelTemplate::parse("office", "[Interface]\nH1 = 999\nH2 = 998\n").unwrap();
    let home_sets = vec![ParameterSet::new(*home.base_params(), 0)];
    let office_sets = vec![ParameterSet::new(*office.base_params(), 1)];

    let mut plan = SweepPlan::new();
    plan.push(home.clone(), home_sets.clone());
    plan.push(office, office_sets);

    let best = SweepRecord {
        template: "home".to_string(),
        set: ParameterSet::new(home_sets[0].params.with(ParamField::Jc, 8), 0),
        result: working(12.0),
        timestamp: Local::now(),
    };

    write_recommended_configs(&plan, &best, dir.path()).unwrap();

    let home_out = std::fs::read_to_string(dir.path().join("home_RECOMMENDED.conf")).unwrap();
    let office_out = std::fs::read_to_string(dir.path().join("office_RECOMMENDED.conf")).unwrap();
    assert!(home_out.contains("H1 = 111"));
    assert!(home_out.contains("Jc = 8"));
    assert!(office_out.contains("H1 = 999"));
    assert!(office_out.contains("H2 = 998"));
    assert!(office_out.contains("Jc = 8"));
    assert!(!office_out.contains("H1 = 111"));
}
