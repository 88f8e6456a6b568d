//! Responses produced from the shared seed dataset.

#![allow(dead_code)]

use std::path::Path;

use tea_model::{ResponseEnvelope, SortKey, Uid};
use tea_query::{Dataset, InMemoryStore, QueryConfig, QueryEngine, QueryRequest};

pub const WEIGHT: &str = "IpHINAT79UW.A03MvHHogjR.UXz7xuGCEhU";
pub const APGAR: &str = "IpHINAT79UW.A03MvHHogjR.a3kGcGDCuk6";
pub const PREVIOUS_BCG: &str = "IpHINAT79UW.A03MvHHogjR[-1].bx6fsa0t90x";

pub fn store() -> InMemoryStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../mockdata/child_programme.json");
    InMemoryStore::new(Dataset::load(&path).expect("load seed dataset"))
}

pub fn request(query: &str) -> QueryRequest {
    QueryRequest::from_query_string(Uid::new("nEenWmSyUEp").expect("uid"), query)
        .expect("parse query")
}

pub fn run(store: &InMemoryStore, query: &str) -> (ResponseEnvelope, Vec<SortKey>) {
    let request = request(query);
    let config = QueryConfig::default();
    let envelope = QueryEngine::new(store, &config)
        .execute(&request)
        .expect("query succeeds");
    (envelope, request.sort)
}
