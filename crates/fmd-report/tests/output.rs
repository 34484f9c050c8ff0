use std::fs;

use chrono::Utc;
use fmd_core::{RecordSink, run_batches};
use fmd_model::{COMMENT_COLUMN, Field, QaOptions, SourceTable};
use fmd_report::{
    CsvSink, RunContext, RunReport, compute_file_sha256, staging_path, write_run_report,
};
use tempfile::TempDir;

fn headers() -> Vec<String> {
    Field::ALL
        .iter()
        .map(|f| f.name().to_string())
        .chain([COMMENT_COLUMN.to_string()])
        .collect()
}

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn sample_table() -> SourceTable {
    let rows = vec![
        cells(&[
            "C1", "P1", "Latest", "Steel", "10", "5", "50", "500000", "50", "500000", "10", "10",
            "2", "",
        ]),
        cells(&[
            "C2", "P7", "Not Latest", "Glass", "4", "4", "100", "1000000", "100", "1000000", "4",
            "4", "1", "",
        ]),
        cells(&[
            "C1", "P1", "Latest", "Steel", "10", "5", "50", "500000", "50", "500000", "10", "10",
            "2", "Checked, see ticket",
        ]),
    ];
    SourceTable::new(&headers(), rows).unwrap()
}

#[test]
fn annotated_csv_matches_snapshot() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("fmd_checked.csv");
    let mut sink = CsvSink::new(&output);
    let summary = run_batches(sample_table(), &QaOptions::new().with_batch_size(1), &mut sink)
        .unwrap();
    assert_eq!(summary.batches, 2);
    assert_eq!(sink.rows_written(), 3);
    assert!(!staging_path(&output).exists());

    let content = fs::read_to_string(&output).unwrap();
    insta::assert_snapshot!(content.trim_end(), @r#"
    ChemicalID,PartNumber,FMDRevFlag,HomogeneousMaterialName,HomogeneousMaterialMass,Mass,SubstanceHomogeneousMaterialPercentage,SubstanceHomogeneousMaterialPercentagePPM,SubstanceComponentLevelPercentage,SubstanceComponentLevelPPM,TotalComponentMassProfile,TotalComponentMassSummation,RowsCount,RowsCountGap,Homogeneous Mass Gap,homogeneousPercentageSum,homogeneousPPMSum,ComponentPercentageSum,ComponentPPMSum,Automated QA Comment
    C1,P1,Latest,Steel,10,5,50,500000,50,500000,10,10,2,0,0,100,1000000,100,1000000,
    C1,P1,Latest,Steel,10,5,50,500000,50,500000,10,10,2,0,0,100,1000000,100,1000000,"Checked, see ticket"
    C2,P7,Not Latest,Glass,4,4,100,1000000,100,1000000,4,4,1,0,0,100,1000000,100,1000000,FMDRevFlag is Not Latest
    "#);
}

#[test]
fn dropped_sink_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("fmd_checked.csv");
    {
        let table = sample_table();
        let mut sink = CsvSink::new(&output);
        sink.begin(&table.columns).unwrap();
        assert!(staging_path(&output).exists());
    }
    assert!(!staging_path(&output).exists());
    assert!(!output.exists());
}

#[test]
fn batch_before_begin_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut sink = CsvSink::new(dir.path().join("out.csv"));
    assert!(sink.write_batch(&[]).is_err());
}

#[test]
fn run_report_lists_every_rule() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("fmd.csv");
    fs::write(&input, "ChemicalID,PartNumber\n").unwrap();
    let output = dir.path().join("fmd_checked.csv");
    let options = QaOptions::new();

    let mut sink = CsvSink::new(&output);
    let started_at = Utc::now();
    let summary = run_batches(sample_table(), &options, &mut sink).unwrap();
    let context = RunContext {
        input: input.clone(),
        input_sha256: compute_file_sha256(&input).unwrap(),
        output: output.clone(),
        started_at,
        finished_at: Utc::now(),
    };
    let report = RunReport::new(context, &options, &summary);
    let report_path = dir.path().join("report.json");
    write_run_report(&report_path, &report).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["rows"], 3);
    assert_eq!(json["declarations"], 2);
    assert_eq!(json["batches"], 1);
    assert_eq!(json["seeded_comments"], true);
    assert_eq!(json["records_flagged"], 1);
    assert_eq!(json["comment_policy"], "Append");
    assert_eq!(json["input_sha256"].as_str().map(str::len), Some(64));

    let rules = json["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 10);
    assert_eq!(rules[0]["rule"], "revision-flag");
    assert_eq!(rules[0]["records"], 1);
    assert_eq!(rules[9]["phrase"], "Software issue");
    assert_eq!(rules[9]["records"], 0);
}
