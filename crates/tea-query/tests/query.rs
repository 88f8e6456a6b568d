//! End-to-end queries against the seed dataset.

mod common;

use common::{APGAR, BCG, LIVE_PERSONS, PREVIOUS_BCG, WEIGHT, column, query, try_query_with};
use tea_model::{DimensionType, ValueStatus, ValueType};
use tea_query::QueryConfig;

fn weight_and_apgar_desc(extra: &str) -> String {
    format!(
        "dimension={WEIGHT},{APGAR}&desc={WEIGHT},{APGAR},lastupdated&pageSize=10{extra}"
    )
}

#[test]
fn two_stage_elements_sorted_descending() {
    let envelope = query(&weight_and_apgar_desc(""));

    assert_eq!(envelope.headers.len(), 18);
    assert_eq!(envelope.header_width, 18);
    assert_eq!(envelope.width, 18);
    assert_eq!(envelope.height, 10);
    assert_eq!(envelope.rows.len(), 10);
    assert!(envelope.rows.iter().all(|row| row.len() == 18));
    assert_eq!(envelope.cell(0, 17), Some("3.0"));
    assert_eq!(envelope.cell(0, 16), Some("36282.0"));
    assert_eq!(envelope.cell(0, 0), Some("vOxUH373fy5"));
    assert!(!envelope.meta_data.pager.is_last_page);
    assert_eq!(envelope.meta_data.pager.page_size, 10);
    assert!(envelope.row_context.is_none());

    // equal weights fall back to the Apgar score
    assert_eq!(
        &column(&envelope, "trackedentity")[3..5],
        ["Tr6Y2yX4Ewf", "ZsGNzzhzcPJ"]
    );
}

#[test]
fn default_columns_follow_system_then_attributes() {
    let envelope = query(&weight_and_apgar_desc(""));
    let names: Vec<&str> = envelope.headers.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "trackedentity",
            "lastupdated",
            "lastupdatedbydisplayname",
            "created",
            "createdbydisplayname",
            "storedby",
            "geometry",
            "longitude",
            "latitude",
            "ouname",
            "oucode",
            "ounamehierarchy",
            "cejWyOfXge6",
            "lZGmxYbs97q",
            "w75KJ2mc4zz",
            "zDhUuAYrxNC",
            WEIGHT,
            APGAR,
        ]
    );
    let weight = envelope.header(WEIGHT).unwrap();
    assert_eq!(weight.display_name, "MCH Weight (g), Child Programme, Birth");
    assert_eq!(weight.value_type, ValueType::Number);
    assert_eq!(weight.program_stage.as_deref(), Some("A03MvHHogjR"));
    assert_eq!(weight.stage_offset, None);
    assert_eq!(
        envelope.header("cejWyOfXge6").unwrap().option_set.as_deref(),
        Some("pC3N9N77UmT")
    );
}

#[test]
fn system_cells_are_rendered() {
    let envelope = query(&weight_and_apgar_desc(""));
    let row = &envelope.rows[0];
    assert_eq!(row[1], "2021-02-03 10:01:00.0");
    assert_eq!(row[2], "Wakiki, Tom (tom)");
    assert_eq!(row[3], "2021-01-01 08:00:00.0");
    assert_eq!(row[4], "Traore, John (admin)");
    assert_eq!(row[5], "admin");
    assert!(row[6].starts_with(r#"{"type":"Point","coordinates":["#));
    assert_eq!(row[8], "8.1");
    assert_eq!(row[9], "Ngelehun CHC");
    assert_eq!(row[10], "OU_559");
    assert_eq!(row[11], "Sierra Leone / Bo / Ngelehun CHC");
    assert_eq!(row[12], "Male");
    assert_eq!(row[14], "Filona");
}

#[test]
fn headers_select_exact_columns() {
    let envelope = query(&format!(
        "dimension={WEIGHT},{APGAR}&headers={WEIGHT},{APGAR}&desc={WEIGHT}&pageSize=10"
    ));
    assert_eq!(envelope.headers.len(), 2);
    assert_eq!(envelope.width, 2);
    assert_eq!(envelope.rows[0], ["36282.0", "3.0"]);
    assert!(envelope.rows.iter().all(|row| row.len() == 2));
}

#[test]
fn headers_keep_request_order_without_duplicates() {
    let envelope = query("headers=ouname,trackedentity,ouname&asc=trackedentity");
    let names: Vec<&str> = envelope.headers.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["ouname", "trackedentity"]);
    assert_eq!(envelope.height, LIVE_PERSONS);
}

#[test]
fn deleted_entities_produce_no_rows() {
    let envelope = query(&format!("dimension={WEIGHT}&desc={WEIGHT}&pageSize=100"));
    let ids = column(&envelope, "trackedentity");
    assert_eq!(ids.len(), LIVE_PERSONS);
    assert!(!ids.iter().any(|id| id.starts_with("Dd")));
    assert!(!column(&envelope, WEIGHT).contains(&"99999.0".to_string()));
    assert!(envelope.meta_data.pager.is_last_page);
}

#[test]
fn previous_occurrence_without_value_is_not_determined() {
    let envelope = query(&format!(
        "dimension={WEIGHT},{PREVIOUS_BCG}&headers=trackedentity,{WEIGHT},{PREVIOUS_BCG}\
         &desc={WEIGHT}&rowContext=true&pageSize=5"
    ));
    let context = envelope.row_context.as_ref().expect("row context requested");
    assert_eq!(envelope.rows[0][0], "vOxUH373fy5");
    assert_eq!(envelope.rows[0][2], "");
    assert_eq!(context.get(0, 2), Some(ValueStatus::NotDetermined));
    // everyone else has a single birth
    for row in 1..envelope.height {
        assert_eq!(context.get(row, 2), Some(ValueStatus::NotSupported));
    }

    let header = envelope.header(PREVIOUS_BCG).unwrap();
    assert_eq!(header.display_name, "MCH BCG dose, Child Programme, Birth (-1)");
    assert_eq!(header.stage_offset, Some(-1));
    assert_eq!(
        header.repeatable_stage_params.as_deref(),
        Some("startIndex:-1 count:1 startDate:null endDate: null dimension: bx6fsa0t90x")
    );
}

#[test]
fn missing_enrollment_or_event_is_not_supported() {
    let envelope = query(&format!(
        "{}&page=2&rowContext=true",
        weight_and_apgar_desc("")
    ));
    assert_eq!(envelope.height, 4);
    assert!(envelope.meta_data.pager.is_last_page);
    let ids = column(&envelope, "trackedentity");
    assert_eq!(ids, ["mTaj8HWJkJs", "Hc6Wd1yJtP0", "Lm8qV9pTz3w", "a5jRvdZTi7b"]);

    let context = envelope.row_context.as_ref().unwrap();
    // birth recorded without an Apgar score
    assert_eq!(context.get(0, 17), Some(ValueStatus::NotDetermined));
    assert_eq!(context.get(0, 16), None);
    // not enrolled, then enrolled without a birth event
    for row in [2, 3] {
        assert_eq!(context.get(row, 16), Some(ValueStatus::NotSupported));
        assert_eq!(context.get(row, 17), Some(ValueStatus::NotSupported));
    }
    for (row, column, _) in context.iter() {
        assert_eq!(envelope.rows[row][column], "");
    }
}

#[test]
fn boolean_cells_render_as_digits() {
    let envelope = query(&format!(
        "dimension={BCG}&headers=trackedentity,{BCG}&asc=trackedentity&rowContext=true"
    ));
    let values = column(&envelope, BCG);
    assert!(values.iter().all(|v| ["", "0", "1"].contains(&v.as_str())));
    let index = column(&envelope, "trackedentity")
        .iter()
        .position(|id| id == "QBm7pJHlQgz")
        .unwrap();
    assert_eq!(values[index], "");
    assert_eq!(
        envelope.row_context.as_ref().unwrap().get(index, 1),
        Some(ValueStatus::NotDetermined)
    );
}

#[test]
fn pages_concatenate_to_the_full_sequence() {
    let full = query(&format!("dimension={WEIGHT}&desc={WEIGHT},created&pageSize=100"));
    let mut paged = Vec::new();
    for page in 1..=4 {
        let envelope = query(&format!(
            "dimension={WEIGHT}&desc={WEIGHT},created&pageSize=4&page={page}"
        ));
        assert_eq!(envelope.meta_data.pager.is_last_page, page == 4);
        paged.extend(envelope.rows);
    }
    assert_eq!(paged, full.rows);
}

#[test]
fn total_pages_adds_totals() {
    let envelope = query(&weight_and_apgar_desc("&totalPages=true"));
    assert_eq!(envelope.meta_data.pager.total, Some(LIVE_PERSONS as u64));
    assert_eq!(envelope.meta_data.pager.page_count, Some(2));
}

#[test]
fn page_size_is_clamped_and_zero_returns_nothing() {
    let config = QueryConfig {
        max_page_size: 3,
        default_page_size: 3,
        ..QueryConfig::default()
    };
    let envelope = try_query_with(&config, "pageSize=50").unwrap();
    assert_eq!(envelope.height, 3);
    assert_eq!(envelope.meta_data.pager.page_size, 3);

    let envelope = query("pageSize=0");
    assert_eq!(envelope.height, 0);
    assert_eq!(envelope.width, 0);
    assert_eq!(envelope.header_width, 16);
    assert!(!envelope.meta_data.pager.is_last_page);
}

#[test]
fn paging_off_returns_every_row() {
    let envelope = query("paging=false&pageSize=2");
    assert_eq!(envelope.height, LIVE_PERSONS);
    assert!(envelope.meta_data.pager.is_last_page);
}

#[test]
fn spatial_columns_can_be_disabled() {
    let config = QueryConfig {
        spatial_support: false,
        ..QueryConfig::default()
    };
    let envelope = try_query_with(&config, "pageSize=1").unwrap();
    assert_eq!(envelope.header_width, 13);
    assert!(envelope.header("geometry").is_none());
    assert!(envelope.header("latitude").is_none());
}

#[test]
fn short_names_when_requested() {
    let envelope = query(&format!("dimension={WEIGHT}&displayProperty=SHORTNAME&pageSize=1"));
    assert_eq!(
        envelope.header(WEIGHT).unwrap().display_name,
        "Weight (g), Child Prog, Birth"
    );
}

#[test]
fn program_columns_use_custom_labels() {
    let envelope = query(
        "dimension=IpHINAT79UW.incidentdate,IpHINAT79UW.enrollmentdate,\
         IpHINAT79UW.programstatus,ur1Edk5Oe2n.EPEcjy3FWmI.eventdate&pageSize=1&asc=created",
    );
    assert_eq!(
        envelope.header("IpHINAT79UW.incidentdate").unwrap().display_name,
        "Date of birth, Child Programme"
    );
    assert_eq!(
        envelope.header("IpHINAT79UW.enrollmentdate").unwrap().display_name,
        "Date of enrollment, Child Programme"
    );
    assert_eq!(
        envelope
            .header("ur1Edk5Oe2n.EPEcjy3FWmI.eventdate")
            .unwrap()
            .display_name,
        "Test date, TB program, Sputum smear microscopy test"
    );
    assert_eq!(column(&envelope, "IpHINAT79UW.programstatus"), ["ACTIVE"]);
    assert_eq!(
        column(&envelope, "IpHINAT79UW.enrollmentdate"),
        ["2021-01-01 09:00:00.0"]
    );
}

#[test]
fn metadata_describes_items_and_dimensions() {
    let envelope = query(&weight_and_apgar_desc(""));
    let metadata = &envelope.meta_data;
    assert_eq!(metadata.items["IpHINAT79UW"].name, "Child Programme");
    assert_eq!(metadata.items["A03MvHHogjR"].name, "Birth");
    assert_eq!(metadata.items["UXz7xuGCEhU"].name, "MCH Weight (g)");
    assert_eq!(metadata.items[WEIGHT].name, "MCH Weight (g)");
    assert_eq!(metadata.items["rBvjJYbMCVx"].name, "Male");
    assert_eq!(metadata.items["rBvjJYbMCVx"].code.as_deref(), Some("MALE"));
    let option_set = &metadata.items["pC3N9N77UmT"];
    assert_eq!(option_set.options.as_ref().map(Vec::len), Some(2));
    assert!(metadata.items["UXz7xuGCEhU"].value_type.is_none());

    assert_eq!(metadata.dimensions["pe"], Vec::<String>::new());
    assert_eq!(metadata.dimensions["cejWyOfXge6"], ["rBvjJYbMCVx", "Mnp3oXrpAbK"]);
    assert_eq!(metadata.dimensions[WEIGHT], Vec::<String>::new());
    assert!(!metadata.dimensions.contains_key("ou"));
}

#[test]
fn metadata_details_on_request() {
    let envelope = query(&weight_and_apgar_desc("&includeMetadataDetails=true"));
    let weight = &envelope.meta_data.items["UXz7xuGCEhU"];
    assert_eq!(weight.uid.as_deref(), Some("UXz7xuGCEhU"));
    assert_eq!(weight.code.as_deref(), Some("DE_2006099"));
    assert_eq!(weight.value_type, Some(ValueType::Number));
    assert_eq!(
        serde_json::to_value(weight).unwrap()["aggregationType"],
        "AVERAGE"
    );
    assert_eq!(
        serde_json::to_value(weight).unwrap()["totalAggregationType"],
        "SUM"
    );
    assert_eq!(
        serde_json::to_value(weight).unwrap()["dimensionItemType"],
        "DATA_ELEMENT"
    );
    let first_name = &envelope.meta_data.items["w75KJ2mc4zz"];
    assert_eq!(first_name.description.as_deref(), Some("First name of the person"));
    assert_eq!(
        serde_json::to_value(first_name).unwrap()["totalAggregationType"],
        "NONE"
    );
}

#[test]
fn org_unit_dimension_restricts_rows() {
    let envelope = query("dimension=ou:vELbGdEphPd&pageSize=100");
    assert_eq!(envelope.height, 6);
    assert!(column(&envelope, "ouname").iter().all(|n| n == "Kamaranka CHC"));
    assert_eq!(envelope.header_width, 16);
    let metadata = &envelope.meta_data;
    assert_eq!(metadata.dimensions["ou"], ["vELbGdEphPd"]);
    assert_eq!(metadata.items["ou"].name, "Organisation unit");
    assert_eq!(
        metadata.items["ou"].dimension_type,
        Some(DimensionType::OrganisationUnit)
    );
    assert_eq!(metadata.items["vELbGdEphPd"].name, "Kamaranka CHC");

    let whole_country = query("dimension=ou:ImspTQPwCqd&pageSize=100");
    assert_eq!(whole_country.height, LIVE_PERSONS);
    let group = query("dimension=ou:OU_GROUP-CXw2yu5fodb&pageSize=100");
    assert_eq!(group.height, LIVE_PERSONS);
}

#[test]
fn user_org_unit_comes_from_config() {
    let config = QueryConfig {
        user_org_units: vec!["O6uvpzGd5pu".to_string()],
        ..QueryConfig::default()
    };
    let envelope = try_query_with(&config, "dimension=ou:USER_ORGUNIT&pageSize=100").unwrap();
    assert_eq!(envelope.height, 8);
}

#[test]
fn stage_prefixed_headers_resolve_through_the_owning_program() {
    let short = query(
        "headers=trackedentity,A03MvHHogjR.eventdate,A03MvHHogjR.eventstatus,\
         A03MvHHogjR.ouname&asc=trackedentity&pageSize=100",
    );
    let full = query(
        "headers=trackedentity,IpHINAT79UW.A03MvHHogjR.eventdate,\
         IpHINAT79UW.A03MvHHogjR.eventstatus,IpHINAT79UW.A03MvHHogjR.ouname\
         &asc=trackedentity&pageSize=100",
    );
    assert_eq!(short.rows, full.rows);
    assert_eq!(short.height, LIVE_PERSONS);

    let names: Vec<&str> = short.headers.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "trackedentity",
            "A03MvHHogjR.eventdate",
            "A03MvHHogjR.eventstatus",
            "A03MvHHogjR.ouname"
        ]
    );
    let event_date = short.header("A03MvHHogjR.eventdate").unwrap();
    assert_eq!(event_date.display_name, "Report date, Child Programme, Birth");
    assert_eq!(event_date.value_type, ValueType::DateTime);
    assert_eq!(event_date.program_stage.as_deref(), Some("A03MvHHogjR"));
    assert_eq!(
        short.header("A03MvHHogjR.ouname").unwrap().display_name,
        "Organisation Unit Name, Child Programme, Birth"
    );

    let row = column(&short, "trackedentity")
        .iter()
        .position(|id| id == "vOxUH373fy5")
        .unwrap();
    assert_eq!(short.rows[row][1], "2021-01-03 09:00:00.0");
    assert_eq!(short.rows[row][2], "COMPLETED");
    assert_eq!(short.rows[row][3], "Ngelehun CHC");
}

#[test]
fn stage_prefixed_data_element_filters_and_metadata() {
    let envelope = query(
        "dimension=A03MvHHogjR.a3kGcGDCuk6:GT:7&headers=trackedentity,A03MvHHogjR.a3kGcGDCuk6\
         &asc=trackedentity&pageSize=100",
    );
    assert_eq!(
        column(&envelope, "trackedentity"),
        ["Gr4GD3M1g4d", "Tr6Y2yX4Ewf", "Yz1cUeEBy2d", "ZsGNzzhzcPJ", "ppkzZDT4iZn"]
    );
    assert_eq!(
        column(&envelope, "A03MvHHogjR.a3kGcGDCuk6"),
        ["9.0", "9.0", "10.0", "8.0", "8.0"]
    );

    let header = envelope.header("A03MvHHogjR.a3kGcGDCuk6").unwrap();
    assert_eq!(header.display_name, "MCH Apgar Score, Child Programme, Birth");
    assert_eq!(header.program_stage.as_deref(), Some("A03MvHHogjR"));

    let items = &envelope.meta_data.items;
    assert_eq!(items["A03MvHHogjR.a3kGcGDCuk6"].name, "MCH Apgar Score");
    assert_eq!(items[APGAR].name, "MCH Apgar Score");
    assert_eq!(items["IpHINAT79UW"].name, "Child Programme");
    assert_eq!(items["A03MvHHogjR"].name, "Birth");
}

#[test]
fn stage_prefixed_sort_key() {
    let envelope = query(&format!(
        "dimension={APGAR}&headers=trackedentity&desc=A03MvHHogjR.a3kGcGDCuk6,trackedentity\
         &pageSize=2"
    ));
    assert_eq!(column(&envelope, "trackedentity"), ["Yz1cUeEBy2d", "Tr6Y2yX4Ewf"]);
}

#[test]
fn stage_org_unit_restricts_on_the_event() {
    let envelope = query(
        "dimension=A03MvHHogjR.ou:vELbGdEphPd&headers=trackedentity,A03MvHHogjR.ouname\
         &asc=trackedentity&pageSize=100",
    );
    assert_eq!(envelope.height, 5);
    assert!(
        column(&envelope, "A03MvHHogjR.ouname")
            .iter()
            .all(|name| name == "Kamaranka CHC")
    );
    assert_eq!(envelope.meta_data.dimensions["ou"], ["vELbGdEphPd"]);

    // persons without a birth event drop out
    let country = query("dimension=A03MvHHogjR.ou:ImspTQPwCqd&pageSize=100");
    assert_eq!(country.height, 12);
}
