use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use filetime::{FileTime, set_file_mtime};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use sheetmerge_core::{
    EnumCellValue as Cell, EnumFileStatus, EnumMergeInput, MergeError, SpecMergeRun, XlsxReader,
    discover_spreadsheet_files, run_merge,
};
use tempfile::tempdir;

enum Value<'a> {
    Num(f64),
    Str(&'a str),
}

fn write_workbook(path_file: &Path, sheets: &[(&str, &[&[Value]])], n_mtime: i64) {
    let mut workbook = Workbook::new();
    for (sheet_name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*sheet_name).unwrap();
        for (n_row, row) in rows.iter().enumerate() {
            for (n_col, value) in row.iter().enumerate() {
                match value {
                    Value::Num(v) => worksheet.write_number(n_row as u32, n_col as u16, *v),
                    Value::Str(v) => worksheet.write_string(n_row as u32, n_col as u16, *v),
                }
                .unwrap();
            }
        }
    }
    workbook.save(path_file).unwrap();
    set_file_mtime(path_file, FileTime::from_unix_time(n_mtime, 0)).unwrap();
}

fn build_run(dir_input: &Path) -> SpecMergeRun {
    let mut spec_run = SpecMergeRun::new(EnumMergeInput::Directory(dir_input.to_path_buf()), "Data");
    spec_run.spec_write.datetime_stamp = NaiveDate::from_ymd_opt(2024, 5, 6)
        .and_then(|d| d.and_hms_opt(7, 8, 9));
    spec_run
}

fn build_scenario(dir_input: &Path) {
    use Value::{Num, Str};
    write_workbook(
        &dir_input.join("b.xlsx"),
        &[("Data", &[&[Str("ID"), Str("Name")], &[Num(1.0), Str("Z")]])],
        1_700_000_200,
    );
    write_workbook(
        &dir_input.join("a.xlsx"),
        &[
            ("Summary", &[&[Str("ignored")]]),
            (
                "Data",
                &[
                    &[Str("ID"), Str("Name")],
                    &[Num(1.0), Str("X")],
                    &[],
                    &[Num(2.0), Str("Y")],
                ],
            ),
        ],
        1_700_000_100,
    );
}

#[test]
fn directory_merge_writes_renumbered_rows_in_mtime_order() {
    let tmp = tempdir().unwrap();
    build_scenario(tmp.path());

    let mut l_lines: Vec<String> = Vec::new();
    let mut callback = |msg: &str| l_lines.push(msg.to_string());
    let outcome = run_merge(&XlsxReader::new(), &build_run(tmp.path()), Some(&mut callback)).unwrap();

    assert_eq!(outcome.file_order, vec!["a.xlsx", "b.xlsx"]);
    assert_eq!(outcome.n_rows_header, 1);
    assert_eq!(outcome.n_rows_data, 3);
    assert_eq!(outcome.sheet_names, vec!["Summary", "Data"]);
    assert_eq!(
        outcome.path_file_out,
        tmp.path().join("合并结果_Data_20240506_070809.xlsx")
    );
    assert!(l_lines.iter().any(|l| l.starts_with("[a.xlsx] extracted 2 data row")));

    let reader = XlsxReader::new();
    let grid = reader.read_sheet_grid(&outcome.path_file_out, "Data").unwrap();
    assert_eq!(
        grid,
        vec![
            vec![Cell::from("ID"), Cell::from("Name")],
            vec![Cell::Number(1.0), Cell::from("X")],
            vec![Cell::Number(2.0), Cell::from("Y")],
            vec![Cell::Number(3.0), Cell::from("Z")],
        ]
    );
    assert!(reader
        .read_sheet_grid(&outcome.path_file_out, "Summary")
        .unwrap()
        .is_empty());
}

#[test]
fn rediscovery_excludes_generated_output() {
    let tmp = tempdir().unwrap();
    build_scenario(tmp.path());

    let outcome = run_merge(&XlsxReader::new(), &build_run(tmp.path()), None).unwrap();
    let l_found: Vec<PathBuf> =
        discover_spreadsheet_files(tmp.path(), &Default::default()).unwrap();
    assert_eq!(
        l_found,
        vec![tmp.path().join("a.xlsx"), tmp.path().join("b.xlsx")]
    );
    assert!(!l_found.contains(&outcome.path_file_out));

    let outcome_again = run_merge(&XlsxReader::new(), &build_run(tmp.path()), None).unwrap();
    assert_eq!(outcome_again.file_order, vec!["a.xlsx", "b.xlsx"]);
    assert_ne!(outcome_again.path_file_out, outcome.path_file_out);
}

#[test]
fn corrupt_middle_file_is_skipped() {
    use Value::{Num, Str};
    let tmp = tempdir().unwrap();
    write_workbook(
        &tmp.path().join("f1.xlsx"),
        &[("Data", &[&[Str("ID")], &[Str("A1")]])],
        1_700_000_100,
    );
    let path_corrupt = tmp.path().join("f2.xlsx");
    fs::write(&path_corrupt, b"this is not a workbook").unwrap();
    set_file_mtime(&path_corrupt, FileTime::from_unix_time(1_700_000_200, 0)).unwrap();
    write_workbook(
        &tmp.path().join("f3.xlsx"),
        &[("Data", &[&[Str("ID")], &[Num(7.0)]])],
        1_700_000_300,
    );

    let outcome = run_merge(&XlsxReader::new(), &build_run(tmp.path()), None).unwrap();
    assert_eq!(outcome.file_order, vec!["f1.xlsx", "f3.xlsx"]);
    assert_eq!(outcome.report.cnt_skipped, 1);
    assert_eq!(outcome.report.outcomes[1].status, EnumFileStatus::Skipped);

    let grid = XlsxReader::new()
        .read_sheet_grid(&outcome.path_file_out, "Data")
        .unwrap();
    assert_eq!(
        grid,
        vec![
            vec![Cell::from("ID")],
            vec![Cell::from("A1")],
            vec![Cell::Number(7.0)],
        ]
    );
}

#[test]
fn missing_target_everywhere_writes_nothing() {
    use Value::Str;
    let tmp = tempdir().unwrap();
    write_workbook(
        &tmp.path().join("f1.xlsx"),
        &[("Other", &[&[Str("ID")], &[Str("1")]])],
        1_700_000_100,
    );

    let err = run_merge(&XlsxReader::new(), &build_run(tmp.path()), None).expect_err("must fail");
    assert!(matches!(err, MergeError::NoValidData { cnt_files: 1, .. }));
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
}

#[test]
fn empty_directory_has_no_input_files() {
    let tmp = tempdir().unwrap();
    let err = run_merge(&XlsxReader::new(), &build_run(tmp.path()), None).expect_err("must fail");
    assert!(matches!(err, MergeError::NoInputFiles));
}
