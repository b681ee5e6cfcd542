use sevreport::catalog::MatchMode;
use sevreport::error::FailureKind;
use sevreport::models::Tier;
use sevreport::pipeline::{build_model, run, RunConfig, RunOutcome, RunSuccess};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_input(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let p = dir.path().join(name);
    fs::write(&p, body).unwrap();
    p
}

fn config_for(input: &Path, output: PathBuf) -> RunConfig {
    RunConfig {
        input_path: Some(input.to_string_lossy().to_string()),
        output_file: output,
        ..RunConfig::default()
    }
}

fn expect_success(outcome: RunOutcome) -> RunSuccess {
    match outcome {
        RunOutcome::Success(ok) => ok,
        RunOutcome::Failure { kind, message } => panic!("unexpected failure {kind:?}: {message}"),
    }
}

fn expect_failure(outcome: RunOutcome) -> FailureKind {
    match outcome {
        RunOutcome::Failure { kind, .. } => kind,
        RunOutcome::Success(_) => panic!("expected failure"),
    }
}

const CATALOG_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ResultsSession toolName="C++test" toolVer="2023.2" project="firmware">
  <Modules>
    <Module><File path="file.c"><Viols>
      <V id="R1" line="10" msg="bad cast"/>
    </Viols></File></Module>
  </Modules>
  <CodingStandards>
    <Rules><RulesList>
      <Rule id="R1" desc="desc" sev="2"/>
    </RulesList></Rules>
  </CodingStandards>
</ResultsSession>"#;

#[test]
fn catalog_match_groups_under_rule_severity() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "report.xml", CATALOG_REPORT);
    let out = dir.path().join("out.html");
    let ok = expect_success(run(&config_for(&input, out.clone())));

    assert_eq!(ok.model.tier, Tier::Catalog);
    let groups: Vec<_> = ok.model.iter_groups().collect();
    assert_eq!(groups.len(), 1);
    let (sev, reports) = groups[0];
    assert_eq!(sev, 2);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, "R1");
    assert_eq!(reports[0].violations[0].location, "file.c");
    assert_eq!(reports[0].violations[0].line, 10);

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("Total Violations: 1"));
    assert!(html.contains("R1"));
    assert!(html.contains("file.c"));
    assert!(html.contains("firmware"));
}

#[test]
fn unmatched_rule_falls_back_to_violation_severity() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        &dir,
        "report.xml",
        r#"<ResultsSession>
  <CodingStandards>
    <Rules><RulesList><Rule id="R1" desc="desc" sev="2"/></RulesList></Rules>
    <StdViols><StdViol rule="R2" ln="7" sev="3" msg="m" locFile="x.c"/></StdViols>
  </CodingStandards>
</ResultsSession>"#,
    );
    let model = build_model(&input, &RunConfig::default()).unwrap();
    assert_eq!(model.tier, Tier::Heuristic);
    let groups: Vec<_> = model.iter_groups().collect();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, 3);
    assert_eq!(groups[0].1[0].id, "R2");
}

#[test]
fn empty_violations_with_catalog_is_success() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        &dir,
        "report.xml",
        r#"<ResultsSession>
  <CodingStandards>
    <Rules><RulesList><Rule id="R1" desc="desc" sev="2"/></RulesList></Rules>
    <StdViols/>
  </CodingStandards>
</ResultsSession>"#,
    );
    let out = dir.path().join("out.html");
    let outcome = run(&config_for(&input, out.clone()));
    assert_eq!(outcome.exit_code(), 0);
    let ok = expect_success(outcome);
    assert!(ok.model.is_empty());
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("Total Violations: 0"));
}

#[test]
fn legacy_lines_with_bad_line_tokens_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        &dir,
        "report.html",
        "<html><body><table>\n\
<tr><td class=\"file\">a.c</td><td class=\"line\">12</td><td class=\"msg\">first</td><td class=\"rule\">LEG-1</td></tr>\n\
<tr><td class=\"file\">a.c</td><td class=\"line\">abc</td><td class=\"msg\">broken</td><td class=\"rule\">LEG-1</td></tr>\n\
<tr><td class=\"file\">b.c</td><td class=\"line\">3</td><td class=\"msg\">second</td><td class=\"rule\">LEG-2</td></tr>\n\
</table></body></html>\n",
    );
    let out = dir.path().join("out.html");
    let ok = expect_success(run(&config_for(&input, out)));
    let summary = ok.model.summary();
    assert_eq!(summary.violations, 2);
    assert_eq!(summary.dropped_records, 1);
    assert_eq!(ok.model.tier, Tier::Heuristic);
}

#[test]
fn xhtml_export_takes_the_legacy_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        &dir,
        "report.xhtml",
        "<?xml version=\"1.0\"?>\n\
<html xmlns=\"http://www.w3.org/1999/xhtml\"><body>\n\
<p>Line: 3 - Null deref [BD-PB-NP]</p>\n\
</body></html>\n",
    );
    let model = build_model(&input, &RunConfig::default()).unwrap();
    let s = model.summary();
    assert_eq!(s.violations, 1);
    assert_eq!(model.iter_groups().next().unwrap().1[0].id, "BD-PB-NP");
}

#[test]
fn html_fragments_take_the_legacy_path() {
    let dir = tempfile::tempdir().unwrap();
    let table = write_input(
        &dir,
        "table.html",
        "<table>\n\
<tr><td class=\"file\">a.c</td><td class=\"line\">4</td><td class=\"msg\">m</td><td class=\"rule\">T-2</td></tr>\n\
</table>\n",
    );
    let model = build_model(&table, &RunConfig::default()).unwrap();
    assert_eq!(model.summary().violations, 1);
    assert_eq!(model.iter_groups().next().map(|(s, _)| s), Some(2));

    let loose = write_input(&dir, "loose.html", "<body>\nLine: 3 - x [R1]<br>\n</body>\n");
    let out = dir.path().join("out.html");
    let ok = expect_success(run(&config_for(&loose, out)));
    assert_eq!(ok.model.summary().violations, 1);
}

#[test]
fn undeclared_broken_markup_is_scanned_not_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "report.txt", "<Report>\nLine: 9 - dangling [R7]\n");
    let model = build_model(&input, &RunConfig::default()).unwrap();
    assert_eq!(model.summary().violations, 1);
}

#[test]
fn repeated_runs_produce_identical_models() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "report.xml", CATALOG_REPORT);
    let first = build_model(&input, &RunConfig::default()).unwrap();
    let second = build_model(&input, &RunConfig::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn case_insensitive_mode_matches_mixed_case_ids() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        &dir,
        "report.xml",
        r#"<ResultsSession>
  <Modules><Module><File path="m.c"><Viols><V id="misra-1" line="1"/></Viols></File></Module></Modules>
  <CodingStandards><Rules><RulesList><Rule id="MISRA-1" desc="d" sev="4"/></RulesList></Rules></CodingStandards>
</ResultsSession>"#,
    );
    let strict = build_model(&input, &RunConfig::default()).unwrap();
    assert_eq!(strict.tier, Tier::Heuristic);

    let cfg = RunConfig {
        match_mode: MatchMode::CaseInsensitive,
        ..RunConfig::default()
    };
    let folded = build_model(&input, &cfg).unwrap();
    assert_eq!(folded.tier, Tier::Catalog);
    assert_eq!(folded.iter_groups().next().map(|(s, _)| s), Some(4));
}

#[test]
fn unusable_identifiers_land_in_generic_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        &dir,
        "report.xml",
        r#"<ResultsSession>
  <CodingStandards><StdViols>
    <StdViol rule="--" ln="1" msg="a"/>
    <StdViol rule="??" ln="2" msg="b"/>
  </StdViols></CodingStandards>
</ResultsSession>"#,
    );
    let model = build_model(&input, &RunConfig::default()).unwrap();
    assert_eq!(model.tier, Tier::Generic);
    let s = model.summary();
    assert_eq!(s.rules, 1);
    assert_eq!(s.violations, 2);
}

#[test]
fn missing_coding_standards_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "report.xml", r#"<?xml version="1.0"?><Other/>"#);
    let out = dir.path().join("out.html");
    let kind = expect_failure(run(&config_for(&input, out.clone())));
    assert_eq!(kind, FailureKind::StructurallyUnsupported);
    assert_eq!(kind.exit_code(), 3);
    assert!(!out.exists());
}

#[test]
fn malformed_xml_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "report.xml", "<?xml version=\"1.0\"?><ResultsSession><CodingStandards>");
    let kind = expect_failure(run(&config_for(&input, dir.path().join("out.html"))));
    assert_eq!(kind, FailureKind::InputUnreadable);
}

#[test]
fn missing_input_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir.path().join("nope.xml"), dir.path().join("out.html"));
    let outcome = run(&cfg);
    assert_eq!(outcome.exit_code(), 2);
}

#[test]
fn unwritable_output_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "report.xml", CATALOG_REPORT);
    let out = dir.path().join("missing-dir").join("out.html");
    let kind = expect_failure(run(&config_for(&input, out.clone())));
    assert_eq!(kind, FailureKind::OutputUnwritable);
    assert!(!out.exists());
}
