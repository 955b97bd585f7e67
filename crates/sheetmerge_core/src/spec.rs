//! Merge option, result and top-level error types.

use std::path::PathBuf;

use sheetmerge_io_fs::{DiscoverError, SpecDiscoverOptions};
use sheetmerge_io_xlsx::{SpecWorkbookWriteOptions, TypeRow, XlsxReadError, XlsxWriteError};

use crate::conf::N_ROWS_HEADER_DEFAULT;
use crate::report::ReportMerge;

////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Options for one `merge_sheets` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeOptions {
    /// Leading rows of the target sheet treated as header (>= 1).
    pub n_rows_header: usize,
    /// Rewrite an apparently sequential first column to 1..=n.
    pub if_renumber_first_col: bool,
}

impl Default for SpecMergeOptions {
    fn default() -> Self {
        Self {
            n_rows_header: N_ROWS_HEADER_DEFAULT,
            if_renumber_first_col: true,
        }
    }
}

/// Where the pipeline takes its input files from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumMergeInput {
    /// Scan one directory (non-recursive), oldest file first.
    Directory(PathBuf),
    /// Use these files in the given order.
    Files(Vec<PathBuf>),
}

/// Full pipeline request.
#[derive(Debug, Clone)]
pub struct SpecMergeRun {
    /// Input selection.
    pub input: EnumMergeInput,
    /// Worksheet merged across files.
    pub target_sheet: String,
    /// Output directory; defaults to the input directory / first file's directory.
    pub dir_output: Option<PathBuf>,
    /// Discovery options (directory input only).
    pub spec_discover: SpecDiscoverOptions,
    /// Merge options.
    pub spec_merge: SpecMergeOptions,
    /// Output workbook options.
    pub spec_write: SpecWorkbookWriteOptions,
}

impl SpecMergeRun {
    /// Request with default options.
    pub fn new(input: EnumMergeInput, target_sheet: impl Into<String>) -> Self {
        Self {
            input,
            target_sheet: target_sheet.into(),
            dir_output: None,
            spec_discover: SpecDiscoverOptions::default(),
            spec_merge: SpecMergeOptions::default(),
            spec_write: SpecWorkbookWriteOptions::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Results

/// Header/data split of one sheet grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecClassifiedRows {
    /// First `n_rows_header` rows, verbatim.
    pub header_rows: Vec<TypeRow>,
    /// Remaining rows with entirely empty rows removed.
    pub data_rows: Vec<TypeRow>,
    /// Number of rows after the header before filtering.
    pub n_rows_data_raw: usize,
}

/// Outcome of `merge_sheets`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMergeResult {
    /// Header block captured from the first file with enough rows.
    pub header_rows: Vec<TypeRow>,
    /// Concatenated data rows in file order.
    pub data_rows: Vec<TypeRow>,
    /// Base names of files that contributed at least one data row.
    pub file_order: Vec<String>,
    /// Whether the first column was rewritten to 1..=n.
    pub if_renumbered: bool,
    /// Per-file outcomes.
    pub report: ReportMerge,
}

/// Outcome of `run_merge`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMergeOutcome {
    /// Written workbook.
    pub path_file_out: PathBuf,
    /// Target sheet name.
    pub target_sheet: String,
    /// Sheet names of the written workbook.
    pub sheet_names: Vec<String>,
    /// Header row count written.
    pub n_rows_header: usize,
    /// Data row count written.
    pub n_rows_data: usize,
    /// Base names of contributing files, in merge order.
    pub file_order: Vec<String>,
    /// Per-file outcomes.
    pub report: ReportMerge,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Row classification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// Header-row count of zero.
    #[error("Header row count must be >= 1.")]
    InvalidHeaderRowCount,
    /// Sheet shorter than the header block.
    #[error("Sheet has {n_rows} rows, fewer than the {n_rows_header} header rows")]
    InsufficientHeaderRows {
        /// Rows present.
        n_rows: usize,
        /// Rows required.
        n_rows_header: usize,
    },
}

/// Terminal merge/pipeline failures. Per-file problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// No header captured or no data row accumulated across all files.
    #[error("No valid data found in sheet '{target_sheet}' across {cnt_files} file(s)")]
    NoValidData {
        /// Target sheet.
        target_sheet: String,
        /// Files examined.
        cnt_files: usize,
    },
    /// Header-row count of zero.
    #[error("Header row count must be >= 1.")]
    InvalidHeaderRowCount,
    /// Nothing to merge.
    #[error("No spreadsheet files to merge")]
    NoInputFiles,
    /// Input directory scan failed.
    #[error(transparent)]
    Discover(#[from] DiscoverError),
    /// No input file could be opened to list its sheets.
    #[error(transparent)]
    Read(#[from] XlsxReadError),
    /// Output workbook could not be written.
    #[error("Failed to write merged workbook: {0}")]
    Write(#[from] XlsxWriteError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
