//! End-to-end runs of the CLI commands against the seed dataset.

use std::fs;
use std::path::{Path, PathBuf};

use tea_cli::commands::{
    QueryOutcome, load_envelope, parse_sort_keys, run_diff, run_fingerprint, run_query,
    run_validate,
};
use tea_model::ResponseEnvelope;
use tea_output::{Format, write_response};

const PERSON: &str = "nEenWmSyUEp";
const WEIGHT: &str = "IpHINAT79UW.A03MvHHogjR.UXz7xuGCEhU";

fn dataset_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../mockdata/child_programme.json")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tea-cli-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn answer(pairs: &[(&str, &str)]) -> ResponseEnvelope {
    match run_query(&dataset_path(), PERSON, &params(pairs), None).expect("run query") {
        QueryOutcome::Response(envelope) => *envelope,
        QueryOutcome::Rejected(error) => panic!("query rejected: {}", error.message),
    }
}

#[test]
fn written_response_validates_and_fingerprints_stably() {
    let dir = scratch_dir("validate");
    let envelope = answer(&[
        ("dimension", WEIGHT),
        ("desc", WEIGHT),
        ("rowContext", "true"),
        ("totalPages", "true"),
        ("pageSize", "5"),
    ]);
    let path = dir.join("weights.json");
    write_response(&path, &envelope, Format::Json).expect("write response");

    assert_eq!(load_envelope(&path).expect("load"), envelope);

    let keys = parse_sort_keys(&[format!("desc:{WEIGHT}")]).expect("sort keys");
    let report = run_validate(&path, &keys).expect("validate");
    assert!(report.is_empty(), "{:?}", report.issues);

    let first = run_fingerprint(&path, &keys).expect("fingerprint");
    let second = run_fingerprint(&path, &keys).expect("fingerprint");
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
}

#[test]
fn diff_reports_filtered_response() {
    let dir = scratch_dir("diff");
    let everyone = answer(&[]);
    let females = answer(&[("dimension", "cejWyOfXge6:EQ:FEMALE")]);

    let expected = dir.join("everyone.json");
    let actual = dir.join("females.json");
    write_response(&expected, &everyone, Format::Json).expect("write expected");
    write_response(&actual, &females, Format::Json).expect("write actual");

    assert!(run_diff(&expected, &expected, &[]).expect("diff").is_empty());
    let differences = run_diff(&expected, &actual, &[]).expect("diff");
    assert!(!differences.is_empty());
    assert!(
        differences
            .iter()
            .any(|d| d.to_string().starts_with("row count")),
        "{differences:?}"
    );
}

#[test]
fn validate_flags_tampered_file() {
    let dir = scratch_dir("tampered");
    let mut envelope = answer(&[("pageSize", "3")]);
    envelope.height = 7;
    let path = dir.join("tampered.json");
    write_response(&path, &envelope, Format::Json).expect("write response");

    let report = run_validate(&path, &[]).expect("validate");
    assert!(report.has_errors());
    assert!(report.issues.iter().any(|issue| issue.code() == "ST01"));
}

#[test]
fn client_errors_become_error_bodies() {
    let outcome = run_query(
        &dataset_path(),
        PERSON,
        &params(&[("dimension", "AAAAAAAAAAA")]),
        None,
    )
    .expect("run query");
    let QueryOutcome::Rejected(body) = outcome else {
        panic!("unknown dimension was answered");
    };
    assert_eq!(body.http_status_code, 409);
    assert_eq!(body.status, "ERROR");
    assert_eq!(body.error_code.as_deref(), Some("E7130"));
}

#[test]
fn config_file_caps_page_size() {
    let dir = scratch_dir("config");
    let config = dir.join("tea.toml");
    fs::write(&config, "default_page_size = 4\nmax_page_size = 4\n").expect("write config");

    let outcome = run_query(
        &dataset_path(),
        PERSON,
        &params(&[("pageSize", "50")]),
        Some(&config),
    )
    .expect("run query");
    let QueryOutcome::Response(envelope) = outcome else {
        panic!("query rejected");
    };
    assert_eq!(envelope.meta_data.pager.page_size, 4);
    assert_eq!(envelope.height, 4);
}

#[test]
fn unreadable_inputs_are_errors() {
    let missing = scratch_dir("missing").join("absent.json");
    let error = run_validate(&missing, &[]).expect_err("missing file");
    assert!(format!("{error:#}").contains("absent.json"));

    assert!(run_query(&missing, PERSON, &[], None).is_err());
}
