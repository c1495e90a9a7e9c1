use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use asset_code_cleaner::ingestion::excel::{excel_sheet_names, read_excel_sheets};
use asset_code_cleaner::ingestion::recovery::read_xlsx_package;
use asset_code_cleaner::ingestion::SheetSelection;
use asset_code_cleaner::types::{NamedSheet, Value};
use asset_code_cleaner::CleanerError;

fn tmp_file(name: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("asset-code-cleaner-{name}-{nanos}.{ext}"))
}

/// Two sheets: "Assets" with a title row above the header, "More" with an extra column.
fn write_inventory_xlsx(path: &Path) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();

    let ws = wb.add_worksheet();
    ws.set_name("Assets").unwrap();
    ws.write_string(1, 0, "รหัสทรัพย์สิน").unwrap();
    ws.write_string(1, 1, "หน่วยงานกลางดูแลทรัพย์สิน").unwrap();
    ws.write_string(2, 0, "00012345").unwrap();
    ws.write_string(2, 1, "HQ").unwrap();
    ws.write_number(3, 0, 67890).unwrap();
    ws.write_string(3, 1, "Branch").unwrap();
    ws.write_string(4, 0, "111, 222").unwrap();

    let ws = wb.add_worksheet();
    ws.set_name("More").unwrap();
    ws.write_string(0, 0, "รหัสทรัพย์สิน").unwrap();
    ws.write_string(0, 1, "อีเมลผู้สร้างเอกสาร").unwrap();
    ws.write_string(1, 0, "333").unwrap();
    ws.write_string(1, 1, "a@cpall.co.th").unwrap();

    wb.save(path).unwrap();
}

fn rendered(sheet: &NamedSheet, column: &str) -> Vec<String> {
    sheet.data.column(column).unwrap().map(Value::render).collect()
}

#[test]
fn reads_first_sheet_with_header_below_title_row() {
    let path = tmp_file("first", "xlsx");
    write_inventory_xlsx(&path);

    let sheets = read_excel_sheets(&path, &SheetSelection::First).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "Assets");
    assert_eq!(
        sheets[0].data.schema.field_names().collect::<Vec<_>>(),
        vec!["รหัสทรัพย์สิน", "หน่วยงานกลางดูแลทรัพย์สิน"]
    );
    assert_eq!(rendered(&sheets[0], "รหัสทรัพย์สิน"), vec!["00012345", "67890", "111, 222"]);
    assert_eq!(sheets[0].data.rows[2][1], Value::Null);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn numeric_cells_keep_their_type() {
    let path = tmp_file("numeric", "xlsx");
    write_inventory_xlsx(&path);

    let sheets = read_excel_sheets(&path, &SheetSelection::First).unwrap();
    let cell = &sheets[0].data.rows[1][0];
    assert!(matches!(cell, Value::Float64(_) | Value::Int64(_)), "got {cell:?}");
    assert_eq!(cell.render(), "67890");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn reads_selected_and_all_sheets() {
    let path = tmp_file("multi", "xlsx");
    write_inventory_xlsx(&path);

    assert_eq!(excel_sheet_names(&path).unwrap(), vec!["Assets", "More"]);

    let more = read_excel_sheets(&path, &SheetSelection::Sheet("More".to_string())).unwrap();
    assert_eq!(more.len(), 1);
    assert_eq!(rendered(&more[0], "รหัสทรัพย์สิน"), vec!["333"]);

    let all = read_excel_sheets(&path, &SheetSelection::AllSheets).unwrap();
    let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Assets", "More"]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_sheet_is_reported_with_available_names() {
    let path = tmp_file("missing", "xlsx");
    write_inventory_xlsx(&path);

    let err = read_excel_sheets(&path, &SheetSelection::Sheet("Nope".to_string())).unwrap_err();
    match err {
        CleanerError::SheetNotFound { sheet, available } => {
            assert_eq!(sheet, "Nope");
            assert_eq!(available, vec!["Assets".to_string(), "More".to_string()]);
        }
        other => panic!("expected SheetNotFound, got {other:?}"),
    }

    let _ = std::fs::remove_file(&path);
}

#[test]
fn recovery_reader_agrees_with_calamine() {
    let path = tmp_file("recovery", "xlsx");
    write_inventory_xlsx(&path);

    let calamine = read_excel_sheets(&path, &SheetSelection::AllSheets).unwrap();
    let recovered = read_xlsx_package(&path, &SheetSelection::AllSheets).unwrap();

    assert_eq!(recovered.len(), calamine.len());
    for (a, b) in calamine.iter().zip(&recovered) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.data.schema, b.data.schema);
        let render = |s: &NamedSheet| -> Vec<Vec<String>> {
            s.data.rows.iter().map(|r| r.iter().map(Value::render).collect()).collect()
        };
        assert_eq!(render(a), render(b));
    }

    let _ = std::fs::remove_file(&path);
}
