use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use calamine::{open_workbook_auto, Reader};

fn tmp_file(name: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("asset-code-cleaner-{name}-{nanos}.{ext}"))
}

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_asset-code-cleaner"))
}

#[test]
fn clean_writes_the_selected_variant() {
    let output = tmp_file("cli-clean", "xlsx");
    let status = bin()
        .args(["--log-level", "warn", "clean", "--input", "tests/fixtures/assets.csv"])
        .arg("--output")
        .arg(&output)
        .args(["--variant", "split-audit"])
        .status()
        .unwrap();
    assert!(status.success());

    let wb = open_workbook_auto(&output).unwrap();
    assert_eq!(
        wb.sheet_names(),
        vec!["Correct Data", "Incorrect Data", "Result of Split", "Merged Data", "Tara-Silom"]
    );

    let _ = std::fs::remove_file(&output);
}

#[test]
fn clean_accepts_a_toml_config() {
    let config = tmp_file("cli-config", "toml");
    let output = tmp_file("cli-config-out", "xlsx");
    std::fs::write(
        &config,
        r#"
exclude_duplicates_from_correct = true

[[views]]
kind = "correct"
sheet = "Clean"

[[views]]
kind = "domain_summary"
sheet = "Domains"

[highlight]
sheet = "Clean"
field = "รหัสทรัพย์สิน"
"#,
    )
    .unwrap();

    let out = bin()
        .args(["clean", "--input", "tests/fixtures/assets.json"])
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("input=3"), "stdout: {stdout}");

    let wb = open_workbook_auto(&output).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Clean", "Domains"]);

    let _ = std::fs::remove_file(&config);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn missing_input_fails_with_one_message() {
    let out = bin()
        .args(["clean", "--input", "tests/fixtures/does_not_exist.xlsx"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: reading tests/fixtures/does_not_exist.xlsx"), "stderr: {stderr}");
}

#[test]
fn compare_writes_a_comparison_sheet() {
    let cleaned = tmp_file("cli-cmp-cleaned", "xlsx");
    let report = tmp_file("cli-cmp-report", "xlsx");

    let status = bin()
        .args(["clean", "--input", "tests/fixtures/assets.csv"])
        .arg("--output")
        .arg(&cleaned)
        .status()
        .unwrap();
    assert!(status.success());

    let status = bin()
        .args(["compare", "--original", "tests/fixtures/assets.csv"])
        .arg("--cleaned")
        .arg(&cleaned)
        .arg("--output")
        .arg(&report)
        .args(["--sheet", "Correct Data"])
        .status()
        .unwrap();
    assert!(status.success());

    let wb = open_workbook_auto(&report).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Comparison"]);

    let _ = std::fs::remove_file(&cleaned);
    let _ = std::fs::remove_file(&report);
}
