//! Row restrictions: dimension filters, program status and periods.

mod common;

use common::{APGAR, LIVE_PERSONS, WEIGHT, column, query};
use tea_model::ValueStatus;

#[test]
fn option_filters_compare_codes_and_show_names() {
    let envelope = query("dimension=cejWyOfXge6:EQ:FEMALE&pageSize=100");
    assert_eq!(envelope.height, 7);
    assert!(column(&envelope, "cejWyOfXge6").iter().all(|g| g == "Female"));
    assert_eq!(
        envelope.meta_data.dimensions["cejWyOfXge6"],
        ["Mnp3oXrpAbK"]
    );

    let envelope = query("dimension=cejWyOfXge6:IN:MALE;FEMALE&pageSize=100");
    assert_eq!(envelope.height, LIVE_PERSONS);
}

#[test]
fn numeric_filters_are_typed() {
    let envelope = query(&format!("dimension={WEIGHT}:GE:3300&desc={WEIGHT}&pageSize=100"));
    assert_eq!(
        column(&envelope, WEIGHT),
        ["36282.0", "4100.0", "3500.0", "3300.0", "3300.0"]
    );

    let envelope = query(&format!(
        "dimension={WEIGHT}:GT:2000:LT:3000&asc={WEIGHT}&pageSize=100"
    ));
    assert_eq!(column(&envelope, WEIGHT), ["2500.0", "2800.0", "2900.0"]);
}

#[test]
fn null_value_matches_empty_cells() {
    let envelope = query(&format!(
        "dimension={APGAR}:EQ:NV&rowContext=true&asc=trackedentity&pageSize=100"
    ));
    assert_eq!(
        column(&envelope, "trackedentity"),
        ["Lm8qV9pTz3w", "a5jRvdZTi7b", "mTaj8HWJkJs"]
    );
    let index = envelope.column_index(APGAR).unwrap();
    let context = envelope.row_context.as_ref().unwrap();
    assert_eq!(context.get(0, index), Some(ValueStatus::NotSupported));
    assert_eq!(context.get(1, index), Some(ValueStatus::NotSupported));
    assert_eq!(context.get(2, index), Some(ValueStatus::NotDetermined));

    let envelope = query(&format!("dimension={APGAR}:NE:NV&pageSize=100"));
    assert_eq!(envelope.height, LIVE_PERSONS - 3);
}

#[test]
fn filter_parameter_adds_no_column() {
    let envelope = query("filter=w75KJ2mc4zz:ILIKE:am&asc=w75KJ2mc4zz");
    assert_eq!(envelope.header_width, 16);
    assert_eq!(
        column(&envelope, "w75KJ2mc4zz"),
        ["Alimamy", "Aminata", "Mohamed"]
    );
}

#[test]
fn text_operators() {
    let starts = query("dimension=zDhUuAYrxNC:SW:ka&asc=zDhUuAYrxNC&pageSize=100");
    assert_eq!(
        column(&starts, "zDhUuAYrxNC"),
        ["Kamara", "Kanu", "Kargbo"]
    );
    let ends = query("dimension=zDhUuAYrxNC:EW:AY&asc=zDhUuAYrxNC");
    assert_eq!(
        column(&ends, "zDhUuAYrxNC"),
        ["Mansaray", "Sesay", "Turay"]
    );
}

#[test]
fn program_status_restricts_enrollments() {
    let completed = query("programStatus=IpHINAT79UW.COMPLETED&asc=trackedentity");
    assert_eq!(
        column(&completed, "trackedentity"),
        ["Yz1cUeEBy2d", "kJ3XrN4Mdm5"]
    );
    let either = query(
        "programStatus=IpHINAT79UW.COMPLETED,IpHINAT79UW.CANCELLED&asc=trackedentity",
    );
    assert_eq!(either.height, 3);
    // the deleted TB enrollment of ppkzZDT4iZn does not count
    let tb = query("enrollmentStatus=ur1Edk5Oe2n.ACTIVE");
    assert_eq!(column(&tb, "trackedentity"), ["vOxUH373fy5"]);
}

#[test]
fn program_parameter_does_not_exclude() {
    let envelope = query("program=ur1Edk5Oe2n&pageSize=100");
    assert_eq!(envelope.height, LIVE_PERSONS);
}

#[test]
fn created_and_updated_periods() {
    let envelope = query("created=2021-01-01_2021-01-05&pageSize=100");
    assert_eq!(envelope.height, 5);

    let envelope = query("created=20210103;20210104&pageSize=100");
    assert_eq!(envelope.height, 2);

    let envelope = query("lastUpdated=LAST_YEAR&relativePeriodDate=2022-03-01&pageSize=100");
    assert_eq!(envelope.height, LIVE_PERSONS);

    let envelope = query("lastUpdated=THIS_YEAR&relativePeriodDate=2022-03-01&pageSize=100");
    assert_eq!(envelope.height, 0);
    assert_eq!(envelope.width, 0);
    assert_eq!(envelope.header_width, 16);
}

#[test]
fn enrollment_date_scoped_to_program() {
    let envelope = query("enrollmentDate=IpHINAT79UW.202101&pageSize=100");
    assert_eq!(envelope.height, LIVE_PERSONS - 1);

    let envelope = query("enrollmentDate=ur1Edk5Oe2n.2021&pageSize=100");
    assert_eq!(column(&envelope, "trackedentity"), ["vOxUH373fy5"]);

    let envelope = query("enrollmentDate=2021-04-01_2021-04-30&pageSize=100");
    assert_eq!(column(&envelope, "trackedentity"), ["vOxUH373fy5"]);
}

#[test]
fn program_scoped_org_unit() {
    let envelope = query("dimension=ur1Edk5Oe2n.ou:O6uvpzGd5pu&pageSize=100");
    assert_eq!(column(&envelope, "trackedentity"), ["vOxUH373fy5"]);
}
