use asset_code_cleaner::config::DEFAULT_ASSET_FIELD;
use asset_code_cleaner::ingestion::json::{read_json_from_str, read_json_sheet};
use asset_code_cleaner::types::Value;

#[test]
fn reads_fixture_with_key_union() {
    let sheet = read_json_sheet("tests/fixtures/assets.json").unwrap();
    assert_eq!(sheet.name, "assets");

    let ds = &sheet.data;
    assert_eq!(ds.row_count(), 3);
    // only the last object has a name column
    let name_idx = ds.schema.index_of("ชื่อทรัพย์สิน").unwrap();
    assert_eq!(ds.rows[0][name_idx], Value::Null);
    assert_eq!(ds.rows[2][name_idx], Value::text("Chair"));
}

#[test]
fn columns_keep_source_key_order() {
    let sheet = read_json_sheet("tests/fixtures/assets.json").unwrap();
    assert_eq!(
        sheet.data.schema.field_names().collect::<Vec<_>>(),
        vec![
            "รหัสทรัพย์สิน",
            "หน่วยงานกลางดูแลทรัพย์สิน",
            "อีเมลผู้สร้างเอกสาร",
            "ชื่อทรัพย์สิน",
        ]
    );

    let ds = read_json_from_str(r#"[{"zone": "B", "code": "1", "asset": "x"}]"#).unwrap();
    assert_eq!(ds.schema.field_names().collect::<Vec<_>>(), vec!["zone", "code", "asset"]);
}

#[test]
fn numeric_codes_stay_numeric() {
    let sheet = read_json_sheet("tests/fixtures/assets.json").unwrap();
    assert_eq!(sheet.data.value(2, DEFAULT_ASSET_FIELD), Some(&Value::Int64(333)));
    assert_eq!(sheet.data.value(0, DEFAULT_ASSET_FIELD), Some(&Value::text("00012345")));
}

#[test]
fn nested_values_are_kept_as_json_text() {
    let ds = read_json_from_str(r#"{"code": "1", "tags": ["a", "b"]}"#).unwrap();
    assert_eq!(ds.value(0, "tags"), Some(&Value::text(r#"["a","b"]"#)));
}

#[test]
fn blank_input_is_an_error() {
    assert!(read_json_from_str("   \n").is_err());
}
