//! Wire compatibility of the response model with server-shaped JSON.

use tea_model::{
    DimensionKey, ResponseEnvelope, StageItem, ValueClass, ValueStatus, ValueType,
};

const RESPONSE: &str = r#"{
  "headers": [
    {
      "name": "IpHINAT79UW.A03MvHHogjR.UXz7xuGCEhU",
      "column": "MCH Weight (g), Child Programme, Birth",
      "valueType": "NUMBER",
      "type": "java.lang.Double",
      "hidden": false,
      "meta": true,
      "programStage": "A03MvHHogjR",
      "repeatableStageParams": "startIndex:0 count:1 startDate:null endDate: null dimension: UXz7xuGCEhU"
    },
    {
      "name": "IpHINAT79UW.A03MvHHogjR[1].bx6fsa0t90x",
      "column": "MCH BCG dose, Child Programme, Birth (1)",
      "valueType": "BOOLEAN",
      "type": "java.lang.Boolean",
      "hidden": false,
      "meta": true,
      "programStage": "A03MvHHogjR",
      "stageOffset": 1
    }
  ],
  "metaData": {
    "pager": {"page": 1, "pageSize": 2, "isLastPage": false},
    "items": {
      "IpHINAT79UW": {"name": "Child Programme"},
      "UXz7xuGCEhU": {"name": "MCH Weight (g)"}
    },
    "dimensions": {"pe": [], "UXz7xuGCEhU": []}
  },
  "rowContext": {"1": {"1": {"valueStatus": "ND"}}},
  "width": 2,
  "rows": [["36282.0", "1"], ["2994.0", ""]],
  "headerWidth": 2,
  "height": 2
}"#;

#[test]
fn parses_server_shaped_response() {
    let envelope: ResponseEnvelope = serde_json::from_str(RESPONSE).expect("parse response");

    assert_eq!(envelope.header_width, 2);
    assert_eq!(envelope.rows.len(), envelope.height);
    let weight = &envelope.headers[0];
    assert_eq!(weight.value_type, ValueType::Number);
    assert_eq!(weight.value_class, ValueClass::Double);
    assert_eq!(weight.stage_offset, None);
    assert_eq!(envelope.headers[1].stage_offset, Some(1));

    let context = envelope.row_context.as_ref().expect("row context");
    assert_eq!(context.get(1, 1), Some(ValueStatus::NotDetermined));
    assert_eq!(envelope.cell(1, 1), Some(""));
    assert!(!envelope.meta_data.pager.is_last_page);
    assert_eq!(envelope.meta_data.dimensions["pe"], Vec::<String>::new());
}

#[test]
fn header_names_parse_as_dimension_keys() {
    let envelope: ResponseEnvelope = serde_json::from_str(RESPONSE).expect("parse response");
    for header in &envelope.headers {
        let key = DimensionKey::parse(&header.name).expect("header name is a key");
        assert_eq!(key.to_string(), header.name);
        assert!(matches!(
            key,
            DimensionKey::Stage {
                item: StageItem::DataElement(_),
                ..
            }
        ));
    }
}

#[test]
fn serialization_preserves_missing_row_context() {
    let mut envelope: ResponseEnvelope = serde_json::from_str(RESPONSE).expect("parse response");
    envelope.row_context = None;
    let json = serde_json::to_value(&envelope).expect("serialize");
    assert!(json.get("rowContext").is_none());
    assert!(json["headers"][0].get("stageOffset").is_none());
    assert_eq!(json["headers"][1]["stageOffset"], 1);
}
