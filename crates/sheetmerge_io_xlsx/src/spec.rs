//! Shared XLSX cell, option and error models.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use rust_xlsxwriter::XlsxError;
use sheetmerge_io_fs::C_TOKEN_OUTPUT_MARKER;

use crate::conf::{
    C_EXT_OUTPUT, C_FMT_DATETIME_TEXT, C_NUM_FORMAT_DATETIME, N_WIDTH_CELL_MAX,
    N_WIDTH_CELL_PADDING,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// One literal cell value. Formulas are never carried, only cached results.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    Empty,
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
    /// Boolean value.
    Boolean(bool),
    /// Date/time value.
    Date(NaiveDateTime),
}

/// One worksheet row.
pub type TypeRow = Vec<EnumCellValue>;
/// Worksheet rows, top to bottom. Row widths may differ.
pub type TypeGrid = Vec<TypeRow>;

impl EnumCellValue {
    /// Return `true` when the cell is absent or its text form is whitespace only.
    ///
    /// Numeric zero and `false` are not blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Boolean(_) | Self::Date(_) => false,
        }
    }

    /// Text form used for width estimation and display.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Self::Date(dt) => dt.format(C_FMT_DATETIME_TEXT).to_string(),
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDateTime> for EnumCellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit policy for the populated sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitPolicy {
    /// Disable to keep Excel default widths.
    pub if_enabled: bool,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitPolicy {
    fn default() -> Self {
        Self {
            if_enabled: true,
            width_cell_max: N_WIDTH_CELL_MAX,
            width_cell_padding: N_WIDTH_CELL_PADDING,
        }
    }
}

/// Options for one merged-workbook write.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWorkbookWriteOptions {
    /// Prefix token of the output file name.
    pub token_output_marker: String,
    /// Output file extension, without the dot.
    pub ext_output: String,
    /// Number format for date cells.
    pub num_format_datetime: String,
    /// Timestamp embedded in the file name; local "now" when `None`.
    pub datetime_stamp: Option<NaiveDateTime>,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitPolicy,
}

impl Default for SpecWorkbookWriteOptions {
    fn default() -> Self {
        Self {
            token_output_marker: C_TOKEN_OUTPUT_MARKER.to_string(),
            ext_output: C_EXT_OUTPUT.to_string(),
            num_format_datetime: C_NUM_FORMAT_DATETIME.to_string(),
            datetime_stamp: None,
            policy_autofit: SpecAutofitPolicy::default(),
        }
    }
}

/// Result of a completed workbook write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWorkbookWritten {
    /// Final output path.
    pub path_file_out: PathBuf,
    /// Sheet names in workbook order.
    pub sheet_names: Vec<String>,
    /// Rows written into the populated sheet.
    pub n_rows_written: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Per-file read failures.
#[derive(Debug, thiserror::Error)]
pub enum XlsxReadError {
    /// File missing, locked, corrupt, or in an unsupported format.
    #[error("Cannot read {}: {message}", path.display())]
    UnreadableFile {
        /// Input file.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// Requested sheet is absent from the workbook.
    #[error("Sheet '{sheet_name}' not found in {}", path.display())]
    SheetNotFound {
        /// Input file.
        path: PathBuf,
        /// Requested sheet.
        sheet_name: String,
    },
}

/// Output workbook failures.
#[derive(Debug, thiserror::Error)]
pub enum XlsxWriteError {
    /// Workbook assembly/serialization failed.
    #[error("xlsx write error: {0}")]
    Workbook(#[from] XlsxError),
    /// Output file could not be created or moved into place.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Output path being written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Row/column index exceeds worksheet limits.
    #[error("{0}")]
    IndexOverflow(String),
    /// Writer already flushed.
    #[error("Cannot write after close().")]
    Closed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
