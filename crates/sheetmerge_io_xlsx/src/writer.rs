//! XLSX writer kernel that assembles the merged workbook.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tempfile::NamedTempFile;

use crate::spec::{
    EnumCellValue, SpecWorkbookWriteOptions, SpecWorkbookWritten, TypeRow, XlsxWriteError,
};
use crate::util::{
    calculate_column_widths, cast_col_num, cast_row_num, derive_output_file_name,
    derive_unique_output_path,
};

/// Stateful workbook writer.
///
/// The workbook is buffered in memory and only reaches disk in
/// [`Self::close`], through a temporary file that is renamed into place, so a
/// failed run never leaves a partial output behind.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_datetime: Format,
    write_options: SpecWorkbookWriteOptions,
    l_sheet_names: Vec<String>,
    set_sheet_names_existing: BTreeSet<String>,
    n_rows_written: usize,
    written: Option<SpecWorkbookWritten>,
}

impl XlsxWriter {
    /// Create writer bound to output path and options.
    pub fn new(path_file_out: PathBuf, write_options: SpecWorkbookWriteOptions) -> Self {
        let fmt_datetime = Format::new().set_num_format(write_options.num_format_datetime.as_str());
        Self {
            path_file_out,
            workbook: Workbook::new(),
            fmt_datetime,
            write_options,
            l_sheet_names: Vec::new(),
            set_sheet_names_existing: BTreeSet::new(),
            n_rows_written: 0,
            written: None,
        }
    }

    /// Return output file path.
    pub fn file_out(&self) -> &Path {
        &self.path_file_out
    }

    /// Sheet names added so far, in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.l_sheet_names
    }

    /// Add an empty sheet. Returns `false` when the name already exists
    /// (Excel compares sheet names case-insensitively).
    pub fn add_sheet(&mut self, sheet_name: &str) -> Result<bool, XlsxWriteError> {
        if self.written.is_some() {
            return Err(XlsxWriteError::Closed);
        }
        let key = sheet_name.to_lowercase();
        if self.set_sheet_names_existing.contains(&key) {
            return Ok(false);
        }
        self.workbook.add_worksheet().set_name(sheet_name)?;
        self.set_sheet_names_existing.insert(key);
        self.l_sheet_names.push(sheet_name.to_string());
        Ok(true)
    }

    /// Write header rows then data rows into `sheet_name` (created if needed)
    /// and autofit its columns.
    pub fn write_sheet(
        &mut self,
        sheet_name: &str,
        header_rows: &[TypeRow],
        data_rows: &[TypeRow],
    ) -> Result<(), XlsxWriteError> {
        self.add_sheet(sheet_name)?;
        let key = sheet_name.to_lowercase();
        let sheet_name_existing = self
            .l_sheet_names
            .iter()
            .find(|name| name.to_lowercase() == key)
            .cloned()
            .unwrap_or_else(|| sheet_name.to_string());

        let worksheet = self.workbook.worksheet_from_name(&sheet_name_existing)?;
        let n_rows_header = header_rows.len();
        for (n_idx_row, row) in header_rows.iter().enumerate() {
            write_row(worksheet, n_idx_row, row, &self.fmt_datetime)?;
        }
        for (n_idx_row, row) in data_rows.iter().enumerate() {
            write_row(worksheet, n_rows_header + n_idx_row, row, &self.fmt_datetime)?;
        }

        let policy_autofit = &self.write_options.policy_autofit;
        if policy_autofit.if_enabled {
            let l_widths = calculate_column_widths(
                header_rows.iter().chain(data_rows).map(Vec::as_slice),
                policy_autofit,
            );
            for (n_idx_col, n_width) in l_widths.into_iter().enumerate() {
                worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width as f64)?;
            }
        }

        self.n_rows_written += n_rows_header + data_rows.len();
        Ok(())
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<SpecWorkbookWritten, XlsxWriteError> {
        if let Some(written) = &self.written {
            return Ok(written.clone());
        }

        let v_buffer = self.workbook.save_to_buffer()?;
        persist_atomically(&self.path_file_out, &v_buffer)?;

        let written = SpecWorkbookWritten {
            path_file_out: self.path_file_out.clone(),
            sheet_names: self.l_sheet_names.clone(),
            n_rows_written: self.n_rows_written,
        };
        self.written = Some(written.clone());
        Ok(written)
    }
}

/// Build the merged workbook in `dir_output`.
///
/// Every name in `all_sheet_names` becomes a sheet, in order; only
/// `target_sheet` is populated. A target missing from the list is appended
/// last so the merged rows are never dropped.
pub fn write_merged_workbook(
    header_rows: &[TypeRow],
    data_rows: &[TypeRow],
    target_sheet: &str,
    all_sheet_names: &[String],
    dir_output: &Path,
    write_options: &SpecWorkbookWriteOptions,
) -> Result<SpecWorkbookWritten, XlsxWriteError> {
    let datetime_stamp = write_options
        .datetime_stamp
        .unwrap_or_else(|| Local::now().naive_local());
    let name_file_out = derive_output_file_name(
        &write_options.token_output_marker,
        target_sheet,
        &datetime_stamp,
        &write_options.ext_output,
    );
    let path_file_out = derive_unique_output_path(dir_output, &name_file_out);

    let mut writer = XlsxWriter::new(path_file_out, write_options.clone());
    let mut if_target_written = false;
    for sheet_name in all_sheet_names {
        if sheet_name == target_sheet {
            if !if_target_written {
                writer.write_sheet(target_sheet, header_rows, data_rows)?;
                if_target_written = true;
            }
        } else {
            writer.add_sheet(sheet_name)?;
        }
    }
    if !if_target_written {
        log::warn!("Sheet '{target_sheet}' missing from the sheet list; appending it last");
        writer.write_sheet(target_sheet, header_rows, data_rows)?;
    }

    let written = writer.close()?;
    log::info!("Merged workbook saved to {}", written.path_file_out.display());
    Ok(written)
}

fn write_row(
    worksheet: &mut Worksheet,
    n_idx_row: usize,
    row: &[EnumCellValue],
    fmt_datetime: &Format,
) -> Result<(), XlsxWriteError> {
    let n_row = cast_row_num(n_idx_row)?;
    for (n_idx_col, value) in row.iter().enumerate() {
        let n_col = cast_col_num(n_idx_col)?;
        match value {
            EnumCellValue::Empty => {}
            EnumCellValue::Number(n) if n.is_finite() => {
                worksheet.write_number(n_row, n_col, *n)?;
            }
            EnumCellValue::Number(n) => {
                worksheet.write_string(n_row, n_col, n.to_string())?;
            }
            EnumCellValue::Text(s) => {
                worksheet.write_string(n_row, n_col, s)?;
            }
            EnumCellValue::Boolean(b) => {
                worksheet.write_boolean(n_row, n_col, *b)?;
            }
            EnumCellValue::Date(dt) => {
                worksheet.write_datetime_with_format(n_row, n_col, dt, fmt_datetime)?;
            }
        }
    }
    Ok(())
}

fn persist_atomically(path_file_out: &Path, v_buffer: &[u8]) -> Result<(), XlsxWriteError> {
    let derive_io_error = |source: std::io::Error| XlsxWriteError::Io {
        path: path_file_out.to_path_buf(),
        source,
    };

    let dir_parent = match path_file_out.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir_parent).map_err(derive_io_error)?;

    let mut file_tmp = NamedTempFile::new_in(dir_parent).map_err(derive_io_error)?;
    file_tmp.write_all(v_buffer).map_err(derive_io_error)?;
    file_tmp.as_file().sync_all().map_err(derive_io_error)?;
    file_tmp
        .persist_noclobber(path_file_out)
        .map_err(|err| derive_io_error(err.error))?;
    Ok(())
}
