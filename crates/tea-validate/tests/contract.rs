//! Contract checks over responses built from the seed dataset.

mod common;

use common::{APGAR, PREVIOUS_BCG, WEIGHT, run, store};
use tea_model::{ResponseEnvelope, SortKey, ValueStatus};
use tea_validate::{
    Category, Difference, Issue, check_pagination, compare, fingerprint, validate,
    validate_sorted,
};

#[test]
fn engine_responses_satisfy_the_contract() {
    let store = store();
    for query in [
        format!("dimension={WEIGHT},{APGAR}&desc={WEIGHT},{APGAR},lastupdated&pageSize=10"),
        format!("dimension={WEIGHT},{PREVIOUS_BCG}&rowContext=true&asc=created&pageSize=100"),
        format!("headers={WEIGHT},{APGAR}&desc={WEIGHT}"),
        "dimension=cejWyOfXge6:EQ:FEMALE&includeMetadataDetails=true&totalPages=true".to_string(),
        "dimension=IpHINAT79UW.enrollmentdate,IpHINAT79UW.programstatus&page=2&pageSize=5"
            .to_string(),
        "lastUpdated=THIS_YEAR&relativePeriodDate=2022-03-01".to_string(),
        "pageSize=0&totalPages=true".to_string(),
    ] {
        let (envelope, keys) = run(&store, &query);
        let report = validate_sorted(&envelope, &keys);
        assert!(report.is_empty(), "{query}: {:?}", report.issues);
    }
}

#[test]
fn json_round_trip_keeps_the_contract() {
    let store = store();
    let (envelope, keys) = run(
        &store,
        &format!("dimension={WEIGHT},{PREVIOUS_BCG}&rowContext=true&desc={WEIGHT}"),
    );
    let json = serde_json::to_string(&envelope).expect("serialize");
    let parsed: ResponseEnvelope = serde_json::from_str(&json).expect("deserialize");
    assert!(validate_sorted(&parsed, &keys).is_empty());
    assert!(compare(&envelope, &parsed, &keys).is_empty());
}

#[test]
fn tampered_response_is_caught() {
    let store = store();
    let (mut envelope, keys) = run(
        &store,
        &format!("dimension={WEIGHT},{PREVIOUS_BCG}&rowContext=true&desc={WEIGHT}&pageSize=5"),
    );
    let weight = envelope.column_index(WEIGHT).expect("column");
    let context = envelope.row_context.as_mut().expect("row context");
    context.insert(0, 0, ValueStatus::NotDetermined);
    envelope.rows.swap(0, 4);
    envelope.rows[2][weight] = "heavy".to_string();
    envelope.height = 4;

    let report = validate_sorted(&envelope, &keys);
    let codes: Vec<_> = report.issues.iter().map(Issue::code).collect();
    assert!(codes.contains(&"ST01"), "{codes:?}");
    assert!(codes.contains(&"RC02"), "{codes:?}");
    assert!(codes.contains(&"CL01"), "{codes:?}");
    assert!(codes.contains(&"SO02"), "{codes:?}");
    assert!(report.has_errors());
    assert_eq!(report.in_category(Category::RowContext).count(), 1);
}

#[test]
fn seed_pages_obey_the_pagination_law() {
    let store = store();
    let sort = format!("desc={WEIGHT}&asc={APGAR}");
    let (full, keys) = run(&store, &format!("dimension={WEIGHT},{APGAR}&{sort}&pageSize=100"));
    for page_size in [1, 3, 5, 14] {
        let mut pages = Vec::new();
        loop {
            let (page, _) = run(
                &store,
                &format!(
                    "dimension={WEIGHT},{APGAR}&{sort}&pageSize={page_size}&page={}",
                    pages.len() + 1
                ),
            );
            let last = page.meta_data.pager.is_last_page;
            pages.push(page);
            if last {
                break;
            }
        }
        let issues = check_pagination(&pages, &full, &keys);
        assert!(issues.is_empty(), "page size {page_size}: {issues:?}");
    }
}

#[test]
fn repeated_queries_compare_equal_and_share_fingerprints() {
    let store = store();
    let query = format!("dimension={WEIGHT},{APGAR}&desc={APGAR}&rowContext=true&pageSize=100");
    let (first, keys) = run(&store, &query);
    let (second, _) = run(&store, &query);
    assert!(compare(&first, &second, &keys).is_empty());
    assert_eq!(
        fingerprint(&first, &keys).expect("fingerprint"),
        fingerprint(&second, &keys).expect("fingerprint")
    );
}

#[test]
fn tied_rows_swapped_still_match() {
    let store = store();
    let (expected, keys) = run(&store, &format!("dimension={APGAR}&desc={APGAR}&pageSize=100"));
    let mut actual = expected.clone();
    let apgar = expected.column_index(APGAR).expect("column");
    let (first, second) = (0..expected.rows.len() - 1)
        .map(|i| (i, i + 1))
        .find(|(i, j)| expected.rows[*i][apgar] == expected.rows[*j][apgar])
        .expect("seed holds tied Apgar scores");
    actual.rows.swap(first, second);

    assert!(compare(&expected, &actual, &keys).is_empty());
    assert_eq!(
        fingerprint(&expected, &keys).expect("fingerprint"),
        fingerprint(&actual, &keys).expect("fingerprint")
    );

    // Without the sort key the swap is still tolerated: all rows form one group.
    assert!(compare(&expected, &actual, &[]).is_empty());
    // Under a unique key it is not.
    let differences = compare(&expected, &actual, &[SortKey::asc("trackedentity")]);
    assert_eq!(differences.len(), 2);
    assert!(matches!(differences[0], Difference::Row { .. }));
}

#[test]
fn filtered_metadata_differs_as_sets() {
    let store = store();
    let (females, keys) = run(&store, "dimension=cejWyOfXge6:EQ:FEMALE&pageSize=100");
    let (everyone, _) = run(&store, "dimension=cejWyOfXge6:IN:MALE;FEMALE&pageSize=100");
    let differences = compare(&females, &everyone, &keys);
    assert!(differences.contains(&Difference::RowCount {
        expected: 7,
        actual: 14
    }));
    assert!(differences.contains(&Difference::DimensionItems {
        key: "cejWyOfXge6".to_string(),
        missing: vec![],
        unexpected: vec!["rBvjJYbMCVx".to_string()],
    }));
    assert!(validate(&everyone).is_empty());
}
