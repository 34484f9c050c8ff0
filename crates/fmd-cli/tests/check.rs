//! End-to-end runs of the `check` command body.

use std::fs;
use std::path::Path;

use fmd_cli::check::{CheckRequest, default_output_path, run_check};
use fmd_model::{CommentPolicy, QaOptions};
use tempfile::TempDir;

const HEADER: &str = "ChemicalID,PartNumber,FMDRevFlag,HomogeneousMaterialName,\
HomogeneousMaterialMass ,Mass ,SubstanceHomogeneousMaterialPercentage ,\
SubstanceHomogeneousMaterialPercentagePPM ,SubstanceComponentLevelPercentage ,\
SubstanceComponentLevelPPM ,TotalComponentMassProfile ,TotalComponentMassSummation ,RowsCount ";

fn write_export(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("fmd_export.csv");
    fs::write(&path, format!("{HEADER}\n{body}")).unwrap();
    path
}

fn request(input: &Path, policy: CommentPolicy) -> CheckRequest {
    CheckRequest {
        input: input.to_path_buf(),
        output: None,
        report: None,
        options: QaOptions::new().with_comment_policy(policy),
    }
}

fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

const BODY: &str = "C1,P1,Latest,Steel,10,4,40,400000,40,400000,10,10,3\n\
C1,P1,Latest,Steel,10,4,40,400000,40,400000,10,10,3\n\
C1,P1,Latest,Steel,10,2,19,190000,19,190000,10,10,4\n\
C2,P5,Not Latest,Glass,5,5,100,1000000,100,1000000,5,5,1\n";

#[test]
fn check_writes_annotated_copy_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = write_export(dir.path(), BODY);

    let outcome = run_check(&request(&input, CommentPolicy::Append)).unwrap();

    assert_eq!(outcome.output, dir.path().join("fmd_export_checked.csv"));
    assert_eq!(outcome.output, default_output_path(&input));
    assert_eq!(outcome.summary.rows, 4);
    assert_eq!(outcome.summary.declarations, 2);

    let text = fs::read_to_string(&outcome.output).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with("ChemicalID,PartNumber,"));
    assert!(header.contains(",RowsCount ,RowsCountGap,Homogeneous Mass Gap,"));
    assert!(header.ends_with(",ComponentPPMSum,Automated QA Comment"));

    let lines = data_lines(&outcome.output);
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "C1,P1,Latest,Steel,10,4,40,400000,40,400000,10,10,3,0,0,99,990000,99,990000,\
         Fail: homogeneousPercentage sum != 100 | Fail: homogeneousPPM sum != 1000000"
    );
    assert_eq!(
        lines[2],
        "C1,P1,Latest,Steel,10,2,19,190000,19,190000,10,10,4,1,0,99,990000,99,990000,\
         Rows count mismatch | Fail: homogeneousPercentage sum != 100 | \
         Fail: homogeneousPPM sum != 1000000"
    );
    assert_eq!(
        lines[3],
        "C2,P5,Not Latest,Glass,5,5,100,1000000,100,1000000,5,5,1,0,0,100,1000000,100,1000000,\
         FMDRevFlag is Not Latest"
    );
}

#[test]
fn rerun_with_skip_existing_is_stable() {
    let dir = TempDir::new().unwrap();
    let input = write_export(dir.path(), BODY);
    let first = run_check(&request(&input, CommentPolicy::SkipExisting)).unwrap();

    let mut again = request(&first.output, CommentPolicy::SkipExisting);
    again.output = Some(dir.path().join("second.csv"));
    let second = run_check(&again).unwrap();

    let comment = |line: &str| line.rsplit(',').next().unwrap().to_string();
    let first_comments: Vec<String> = data_lines(&first.output).iter().map(|l| comment(l)).collect();
    let second_comments: Vec<String> =
        data_lines(&second.output).iter().map(|l| comment(l)).collect();
    assert_eq!(first_comments, second_comments);
    assert!(second.summary.seeded_comments);
}

#[test]
fn report_is_written_when_requested() {
    let dir = TempDir::new().unwrap();
    let input = write_export(dir.path(), BODY);
    let mut req = request(&input, CommentPolicy::Append);
    req.report = Some(dir.path().join("run.json"));

    let outcome = run_check(&req).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("run.json")).unwrap()).unwrap();
    assert_eq!(json["rows"], 4);
    assert_eq!(json["records_flagged"], 4);
    assert_eq!(json["rules"][2]["rule"], "rows-count-match");
    assert_eq!(json["rules"][2]["records"], 1);
    assert_eq!(outcome.summary.tally.records_flagged, 4);
}

#[test]
fn failed_report_discards_output() {
    let dir = TempDir::new().unwrap();
    let input = write_export(dir.path(), BODY);
    let mut req = request(&input, CommentPolicy::Append);
    req.report = Some(dir.path().join("missing").join("run.json"));

    let err = run_check(&req).unwrap_err();

    assert!(format!("{err:#}").contains("run.json"));
    let output = default_output_path(&input);
    assert!(!output.exists());
    assert!(!fmd_report::staging_path(&output).exists());
}

#[test]
fn non_numeric_mass_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let input = write_export(
        dir.path(),
        "C1,P1,Latest,Steel,10,four,100,1000000,100,1000000,10,10,1\n",
    );

    let err = run_check(&request(&input, CommentPolicy::Append)).unwrap_err();

    let chain = format!("{err:#}");
    assert!(chain.contains("non-numeric value 'four'"), "{chain}");
    let output = default_output_path(&input);
    assert!(!output.exists());
    assert!(!fmd_report::staging_path(&output).exists());
}

#[test]
fn missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = run_check(&request(&dir.path().join("absent.csv"), CommentPolicy::Append))
        .unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}
