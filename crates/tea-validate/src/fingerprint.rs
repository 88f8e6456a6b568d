//! SHA-256 fingerprint of a response.
//!
//! The fingerprint hashes a canonical JSON form: rows inside each tie group
//! are put in canonical order together with their qualifiers, and dimension
//! items are hashed as sets. Two responses that [`crate::compare`] finds
//! equal under the same sort keys share a fingerprint.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tea_model::{GridHeader, MetadataItem, Pager, ResponseEnvelope, SortKey};

use crate::ties::{AnnotatedRow, canonical_rows, resolve_sort};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalResponse<'a> {
    headers: &'a [GridHeader],
    rows: Vec<AnnotatedRow<'a>>,
    row_context: bool,
    pager: &'a Pager,
    items: &'a BTreeMap<String, MetadataItem>,
    dimensions: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

/// Hex-encoded SHA-256 over the canonical form of `envelope`.
pub fn fingerprint(
    envelope: &ResponseEnvelope,
    keys: &[SortKey],
) -> Result<String, serde_json::Error> {
    let specs = resolve_sort(envelope, keys).specs;
    let canonical = CanonicalResponse {
        headers: &envelope.headers,
        rows: canonical_rows(envelope, &specs),
        row_context: envelope.row_context.is_some(),
        pager: &envelope.meta_data.pager,
        items: &envelope.meta_data.items,
        dimensions: envelope
            .meta_data
            .dimensions
            .iter()
            .map(|(key, items)| (key.as_str(), items.iter().map(String::as_str).collect()))
            .collect(),
    };
    let content = serde_json::to_vec(&canonical)?;
    Ok(sha256_hex(&content))
}

fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use tea_model::{Metadata, ValueType};

    use super::*;

    fn envelope(rows: &[[&str; 2]], dimension: &[&str]) -> ResponseEnvelope {
        let mut meta_data = Metadata::new(Pager::new(1, 10, true));
        meta_data.dimensions.insert(
            "cejWyOfXge6".to_string(),
            dimension.iter().map(|s| (*s).to_string()).collect(),
        );
        ResponseEnvelope::new(
            vec![
                GridHeader::new("w", "Weight", ValueType::Number),
                GridHeader::new("n", "Name", ValueType::Text),
            ],
            rows.iter()
                .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                .collect(),
            meta_data,
            None,
        )
    }

    #[test]
    fn tie_order_and_dimension_order_do_not_matter() {
        let keys = [SortKey::desc("w")];
        let a = envelope(&[["4.0", "a"], ["4.0", "b"]], &["x", "y"]);
        let b = envelope(&[["4.0", "b"], ["4.0", "a"]], &["y", "x"]);
        let fingerprint_a = fingerprint(&a, &keys).unwrap();
        assert_eq!(fingerprint_a.len(), 64);
        assert_eq!(fingerprint_a, fingerprint(&b, &keys).unwrap());
    }

    #[test]
    fn sorted_order_matters() {
        let keys = [SortKey::desc("w")];
        let a = envelope(&[["4.0", "a"], ["3.0", "b"]], &[]);
        let b = envelope(&[["3.0", "b"], ["4.0", "a"]], &[]);
        assert_ne!(fingerprint(&a, &keys).unwrap(), fingerprint(&b, &keys).unwrap());
    }
}
