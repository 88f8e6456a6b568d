//! Header names, runtime classes and repeat indexes.

use std::collections::BTreeSet;

use tea_model::{DimensionKey, GridHeader, OffsetUid, ResponseEnvelope};

use crate::issue::Issue;

pub fn check(envelope: &ResponseEnvelope) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();

    for header in &envelope.headers {
        if !seen.insert(header.name.as_str()) && duplicates.insert(header.name.as_str()) {
            issues.push(Issue::DuplicateHeader {
                name: header.name.clone(),
            });
        }
        if !header.is_consistent() {
            issues.push(Issue::ValueClassMismatch {
                name: header.name.clone(),
                value_type: header.value_type,
                value_class: header.value_class,
            });
        }
        match DimensionKey::parse(&header.name) {
            Ok(key) => check_offsets(header, &key, &mut issues),
            Err(_) => issues.push(Issue::MalformedHeaderName {
                name: header.name.clone(),
            }),
        }
    }

    issues
}

fn check_offsets(header: &GridHeader, key: &DimensionKey, issues: &mut Vec<Issue>) {
    let (program, stage) = match key {
        // `<stage>.<item>` reads like a program key; the header's stage tells.
        DimensionKey::Program { program, .. }
            if header.program_stage.as_deref() == Some(program.uid.as_str()) =>
        {
            (None, Some(program))
        }
        DimensionKey::Program { program, .. } => (Some(program), None),
        DimensionKey::StageOnly { stage, .. } => (None, Some(stage)),
        DimensionKey::Stage { program, stage, .. } => (Some(program), Some(stage)),
        DimensionKey::OrgUnit { program } => (program.as_ref(), None),
        DimensionKey::System(_) | DimensionKey::Attribute(_) => (None, None),
    };

    let expected = stage.and_then(|stage| stage.offset);
    if header.stage_offset != expected {
        issues.push(Issue::StageOffsetMismatch {
            name: header.name.clone(),
            expected,
            actual: header.stage_offset,
        });
    }

    for reference in [program, stage].into_iter().flatten() {
        if let Some(offset) = labelled_offset(reference)
            && !header.display_name.contains(&format!(" ({offset})"))
        {
            issues.push(Issue::OffsetLabelMissing {
                name: header.name.clone(),
                label: header.display_name.clone(),
                offset,
            });
        }
    }
}

/// Offsets that must show in the label; zero means the latest occurrence.
fn labelled_offset(reference: &OffsetUid) -> Option<i32> {
    reference.offset.filter(|offset| *offset != 0)
}
