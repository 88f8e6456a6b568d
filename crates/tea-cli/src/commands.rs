use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tea_model::{ErrorResponse, ResponseEnvelope, SortKey, Uid};
use tea_query::{Dataset, InMemoryStore, QueryConfig, QueryEngine, QueryRequest};
use tea_validate::{Difference, ValidationReport, compare, fingerprint, validate_sorted};
use tracing::{info, info_span, warn};

/// Result of running a query: an envelope or the error body a client sees.
#[derive(Debug)]
pub enum QueryOutcome {
    Response(Box<ResponseEnvelope>),
    Rejected(ErrorResponse),
}

/// Parse a `name=value` request parameter.
pub fn parse_param(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got `{value}`")),
    }
}

/// Parse `asc:key` / `desc:key` sort arguments in order.
pub fn parse_sort_keys(values: &[String]) -> Result<Vec<SortKey>> {
    values
        .iter()
        .map(|value| {
            SortKey::parse(value)
                .ok_or_else(|| anyhow!("invalid sort key `{value}`, expected asc:NAME or desc:NAME"))
        })
        .collect()
}

pub fn load_envelope(path: &Path) -> Result<ResponseEnvelope> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse response {}", path.display()))
}

pub fn run_query(
    dataset: &Path,
    tracked_entity_type: &str,
    params: &[(String, String)],
    config: Option<&Path>,
) -> Result<QueryOutcome> {
    let span = info_span!("query", dataset = %dataset.display(), tracked_entity_type);
    let _guard = span.enter();

    let config = match config {
        Some(path) => QueryConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => QueryConfig::default(),
    };
    let dataset = Dataset::load(dataset).context("load dataset")?;
    let store = InMemoryStore::new(dataset);
    let tracked_entity_type = Uid::new(tracked_entity_type).context("tracked entity type")?;

    let result = QueryRequest::from_params(tracked_entity_type, params.iter().cloned())
        .and_then(|request| QueryEngine::new(&store, &config).execute(&request));
    match result {
        Ok(envelope) => {
            info!(rows = envelope.height, "query answered");
            Ok(QueryOutcome::Response(Box::new(envelope)))
        }
        Err(error) if error.is_client_error() => {
            warn!(code = error.code().as_str(), "query rejected: {error}");
            Ok(QueryOutcome::Rejected(error.to_error_response()))
        }
        Err(error) => Err(error).context("run query"),
    }
}

pub fn run_validate(path: &Path, keys: &[SortKey]) -> Result<ValidationReport> {
    let envelope = load_envelope(path)?;
    let report = validate_sorted(&envelope, keys);
    info!(
        issues = report.len(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validated {}",
        path.display()
    );
    Ok(report)
}

pub fn run_diff(expected: &Path, actual: &Path, keys: &[SortKey]) -> Result<Vec<Difference>> {
    let expected = load_envelope(expected)?;
    let actual = load_envelope(actual)?;
    let differences = compare(&expected, &actual, keys);
    info!(differences = differences.len(), "responses compared");
    Ok(differences)
}

pub fn run_fingerprint(path: &Path, keys: &[SortKey]) -> Result<String> {
    let envelope = load_envelope(path)?;
    fingerprint(&envelope, keys).context("serialize canonical response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_split_on_first_equals() {
        assert_eq!(
            parse_param("filter=w75KJ2mc4zz:EQ:a=b"),
            Ok(("filter".to_string(), "w75KJ2mc4zz:EQ:a=b".to_string()))
        );
        assert_eq!(
            parse_param("rowContext="),
            Ok(("rowContext".to_string(), String::new()))
        );
        assert!(parse_param("pageSize").is_err());
        assert!(parse_param("=10").is_err());
    }

    #[test]
    fn sort_keys_keep_order() {
        let keys =
            parse_sort_keys(&["desc:created".to_string(), "asc:w75KJ2mc4zz".to_string()]).unwrap();
        assert_eq!(
            keys,
            vec![SortKey::desc("created"), SortKey::asc("w75KJ2mc4zz")]
        );
        assert!(parse_sort_keys(&["up:created".to_string()]).is_err());
    }
}
