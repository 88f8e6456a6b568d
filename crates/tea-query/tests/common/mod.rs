//! Shared seed dataset for tea-query integration tests.
//!
//! `mockdata/child_programme.json` holds fourteen live persons, two
//! deleted ones and a malaria case of another type. Births sorted by weight
//! descending start with `vOxUH373fy5` (36282 g, Apgar 3).

#![allow(dead_code)]

use std::path::Path;

use tea_model::{ResponseEnvelope, Uid};
use tea_query::{Dataset, InMemoryStore, QueryConfig, QueryEngine, QueryError, QueryRequest};

pub const PERSON: &str = "nEenWmSyUEp";
pub const WEIGHT: &str = "IpHINAT79UW.A03MvHHogjR.UXz7xuGCEhU";
pub const APGAR: &str = "IpHINAT79UW.A03MvHHogjR.a3kGcGDCuk6";
pub const BCG: &str = "IpHINAT79UW.A03MvHHogjR.bx6fsa0t90x";
pub const PREVIOUS_BCG: &str = "IpHINAT79UW.A03MvHHogjR[-1].bx6fsa0t90x";
pub const LIVE_PERSONS: usize = 14;

pub fn dataset() -> Dataset {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../mockdata/child_programme.json");
    Dataset::load(&path).expect("load seed dataset")
}

pub fn store() -> InMemoryStore {
    InMemoryStore::new(dataset())
}

pub fn request(query: &str) -> QueryRequest {
    QueryRequest::from_query_string(Uid::new(PERSON).expect("uid"), query).expect("parse query")
}

pub fn try_query(query: &str) -> Result<ResponseEnvelope, QueryError> {
    try_query_with(&QueryConfig::default(), query)
}

pub fn try_query_with(config: &QueryConfig, query: &str) -> Result<ResponseEnvelope, QueryError> {
    let store = store();
    let request = QueryRequest::from_query_string(Uid::new(PERSON).expect("uid"), query)?;
    QueryEngine::new(&store, config).execute(&request)
}

pub fn query(query: &str) -> ResponseEnvelope {
    try_query(query).expect("query succeeds")
}

/// Cells of one column by header name.
pub fn column(envelope: &ResponseEnvelope, name: &str) -> Vec<String> {
    envelope
        .column(name)
        .expect("column present")
        .into_iter()
        .map(str::to_string)
        .collect()
}
