//! Stateless helper utilities used by the reader and writer.

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rust_xlsxwriter::{ColNum, RowNum};

use crate::conf::{C_FMT_TIMESTAMP_FILE, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{EnumCellValue, SpecAutofitPolicy, XlsxWriteError};

////////////////////////////////////////////////////////////////////////////////
// #region DateConversion

/// Convert an Excel 1900-system serial number into a date/time.
///
/// Serial 60 is Excel's phantom 1900-02-29 and maps to 1900-03-01.
/// Returns `None` for negative or out-of-range serials.
pub fn convert_excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let mut n_days = serial.floor() as u64;
    let mut n_secs = ((serial - serial.floor()) * 86_400.0).round() as u32;
    if n_secs >= 86_400 {
        n_days += 1;
        n_secs -= 86_400;
    }

    let date_base = if n_days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else if n_days == 60 {
        let time = NaiveTime::from_num_seconds_from_midnight_opt(n_secs, 0)?;
        return Some(NaiveDateTime::new(NaiveDate::from_ymd_opt(1900, 3, 1)?, time));
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let date = date_base.checked_add_days(Days::new(n_days))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(n_secs, 0)?;
    Some(NaiveDateTime::new(date, time))
}

/// Parse an ISO 8601 date or date-time as written by some producers.
pub(crate) fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OutputNaming

/// Build `<marker>_<sheet>_<YYYYMMDD_HHMMSS>.<ext>`.
pub fn derive_output_file_name(
    token_output_marker: &str,
    sheet_name: &str,
    datetime_stamp: &NaiveDateTime,
    ext_output: &str,
) -> String {
    format!(
        "{token_output_marker}_{sheet_name}_{}.{}",
        datetime_stamp.format(C_FMT_TIMESTAMP_FILE),
        ext_output.trim_start_matches('.')
    )
}

/// Return `dir_output/name_file`, or the first free `stem_N.ext` (N >= 2).
pub fn derive_unique_output_path(dir_output: &Path, name_file: &str) -> PathBuf {
    let path_candidate = dir_output.join(name_file);
    if !path_candidate.exists() {
        return path_candidate;
    }

    let (stem, ext) = match name_file.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name_file, None),
    };
    let mut n_idx = 2usize;
    loop {
        let name_candidate = match ext {
            Some(ext) => format!("{stem}_{n_idx}.{ext}"),
            None => format!("{stem}_{n_idx}"),
        };
        let path_candidate = dir_output.join(name_candidate);
        if !path_candidate.exists() {
            return path_candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Autofit

/// Width per column: `min(max, padding + longest text)` over all `rows`.
///
/// Columns beyond a short row simply see no value from that row.
pub fn calculate_column_widths<'a, I>(rows: I, policy_autofit: &SpecAutofitPolicy) -> Vec<usize>
where
    I: IntoIterator<Item = &'a [EnumCellValue]>,
{
    let mut l_width_by_col: Vec<usize> = Vec::new();
    for row in rows {
        if row.len() > l_width_by_col.len() {
            l_width_by_col.resize(row.len(), 0);
        }
        for (n_idx_col, value) in row.iter().enumerate() {
            let n_len = value.to_text().chars().count();
            l_width_by_col[n_idx_col] = usize::max(l_width_by_col[n_idx_col], n_len);
        }
    }

    l_width_by_col
        .into_iter()
        .map(|n_len| {
            usize::min(
                policy_autofit.width_cell_max,
                n_len + policy_autofit.width_cell_padding,
            )
        })
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasting

pub(crate) fn cast_row_num(value: usize) -> Result<RowNum, XlsxWriteError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(XlsxWriteError::IndexOverflow(format!(
            "row index overflow: {value} (max {})",
            N_NROWS_EXCEL_MAX - 1
        )));
    }
    RowNum::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("row index overflow: {value}")))
}

pub(crate) fn cast_col_num(value: usize) -> Result<ColNum, XlsxWriteError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(XlsxWriteError::IndexOverflow(format!(
            "column index overflow: {value} (max {})",
            N_NCOLS_EXCEL_MAX - 1
        )));
    }
    ColNum::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn excel_serial_conversion_handles_1900_quirk() {
        assert_eq!(
            convert_excel_serial_to_datetime(1.0),
            Some(ymd_hms(1900, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            convert_excel_serial_to_datetime(59.0),
            Some(ymd_hms(1900, 2, 28, 0, 0, 0))
        );
        assert_eq!(
            convert_excel_serial_to_datetime(61.0),
            Some(ymd_hms(1900, 3, 1, 0, 0, 0))
        );
        assert_eq!(
            convert_excel_serial_to_datetime(45_292.5),
            Some(ymd_hms(2024, 1, 1, 12, 0, 0))
        );
        assert_eq!(convert_excel_serial_to_datetime(-1.0), None);
    }

    #[test]
    fn iso_datetime_parsing() {
        assert_eq!(
            parse_iso_datetime("2024-01-02T03:04:05"),
            Some(ymd_hms(2024, 1, 2, 3, 4, 5))
        );
        assert_eq!(
            parse_iso_datetime("2024-01-02"),
            Some(ymd_hms(2024, 1, 2, 0, 0, 0))
        );
        assert_eq!(parse_iso_datetime("PT1H"), None);
    }

    #[test]
    fn output_file_name_layout() {
        let name = derive_output_file_name(
            "合并结果",
            "Data",
            &ymd_hms(2024, 5, 6, 7, 8, 9),
            "xlsx",
        );
        assert_eq!(name, "合并结果_Data_20240506_070809.xlsx");
    }

    #[test]
    fn unique_output_path_appends_counter() {
        let tmp = TempDir::new().expect("tempdir");
        let name = "out_20240101_000000.xlsx";
        assert_eq!(derive_unique_output_path(tmp.path(), name), tmp.path().join(name));

        std::fs::write(tmp.path().join(name), b"x").expect("write");
        assert_eq!(
            derive_unique_output_path(tmp.path(), name),
            tmp.path().join("out_20240101_000000_2.xlsx")
        );

        std::fs::write(tmp.path().join("out_20240101_000000_2.xlsx"), b"x").expect("write");
        assert_eq!(
            derive_unique_output_path(tmp.path(), name),
            tmp.path().join("out_20240101_000000_3.xlsx")
        );
    }

    #[test]
    fn column_widths_are_padded_and_capped() {
        let l_rows: Vec<Vec<EnumCellValue>> = vec![
            vec!["ID".into(), "Name".into()],
            vec![1.0.into(), "x".repeat(80).into(), "tail".into()],
            vec![EnumCellValue::Empty],
        ];
        let l_widths = calculate_column_widths(
            l_rows.iter().map(Vec::as_slice),
            &SpecAutofitPolicy::default(),
        );
        assert_eq!(l_widths, vec![4, 50, 6]);
    }

    #[test]
    fn column_widths_count_characters_not_bytes() {
        let l_rows: Vec<Vec<EnumCellValue>> = vec![vec!["名称".into()]];
        let l_widths = calculate_column_widths(
            l_rows.iter().map(Vec::as_slice),
            &SpecAutofitPolicy::default(),
        );
        assert_eq!(l_widths, vec![4]);
    }
}
