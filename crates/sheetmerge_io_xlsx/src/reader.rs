//! Worksheet reader backed by calamine (`.xlsx`, `.xls` and friends).

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::spec::{EnumCellValue, TypeGrid, TypeRow, XlsxReadError};
use crate::util::{convert_excel_serial_to_datetime, parse_iso_datetime};

/// Stateless reader; every call opens the file afresh and releases it on return.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }

    /// Sheet names in workbook order.
    pub fn list_sheet_names(&self, path_file: &Path) -> Result<Vec<String>, XlsxReadError> {
        let workbook =
            open_workbook_auto(path_file).map_err(|err| derive_unreadable(path_file, err))?;
        Ok(workbook.sheet_names())
    }

    /// Read all cell values of `sheet_name`, anchored at A1.
    ///
    /// calamine trims leading blank rows/columns from the used range; they are
    /// restored here as [`EnumCellValue::Empty`] so row positions match the
    /// sheet as displayed. A sheet without cells yields an empty grid.
    pub fn read_sheet_grid(
        &self,
        path_file: &Path,
        sheet_name: &str,
    ) -> Result<TypeGrid, XlsxReadError> {
        let mut workbook =
            open_workbook_auto(path_file).map_err(|err| derive_unreadable(path_file, err))?;

        if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
            return Err(XlsxReadError::SheetNotFound {
                path: path_file.to_path_buf(),
                sheet_name: sheet_name.to_string(),
            });
        }

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|err| derive_unreadable(path_file, err))?;
        let Some((n_row_start, n_col_start)) = range.start() else {
            return Ok(TypeGrid::new());
        };
        if range.is_empty() {
            return Ok(TypeGrid::new());
        }

        let n_row_start = n_row_start as usize;
        let n_col_start = n_col_start as usize;
        let n_width = n_col_start + range.width();

        let mut l_rows = TypeGrid::with_capacity(n_row_start + range.height());
        for _ in 0..n_row_start {
            l_rows.push(vec![EnumCellValue::Empty; n_width]);
        }
        for row_raw in range.rows() {
            let mut row: TypeRow = Vec::with_capacity(n_width);
            row.resize(n_col_start, EnumCellValue::Empty);
            row.extend(row_raw.iter().map(convert_calamine_data));
            l_rows.push(row);
        }

        Ok(l_rows)
    }
}

/// Map one calamine cell onto the closed cell union.
pub fn convert_calamine_data(value: &Data) -> EnumCellValue {
    match value {
        Data::Empty => EnumCellValue::Empty,
        Data::String(s) => EnumCellValue::Text(s.clone()),
        Data::Float(n) => EnumCellValue::Number(*n),
        Data::Int(n) => EnumCellValue::Number(*n as f64),
        Data::Bool(b) => EnumCellValue::Boolean(*b),
        Data::DateTime(dt) => {
            let n_serial = dt.as_f64();
            if dt.is_duration() {
                return EnumCellValue::Number(n_serial);
            }
            convert_excel_serial_to_datetime(n_serial)
                .map(EnumCellValue::Date)
                .unwrap_or(EnumCellValue::Number(n_serial))
        }
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(EnumCellValue::Date)
            .unwrap_or_else(|| EnumCellValue::Text(s.clone())),
        Data::DurationIso(s) => EnumCellValue::Text(s.clone()),
        Data::Error(e) => EnumCellValue::Text(e.to_string()),
    }
}

fn derive_unreadable(path_file: &Path, err: impl std::fmt::Display) -> XlsxReadError {
    XlsxReadError::UnreadableFile {
        path: path_file.to_path_buf(),
        message: err.to_string(),
    }
}
