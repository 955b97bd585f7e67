//! `sheetmerge_core` v1:
//! Merge engine that folds one worksheet across many workbooks.
//!
//! - `conf`     : defaults
//! - `spec`     : options/results/errors
//! - `source`   : workbook-codec seam used by the engine
//! - `classify` : header/data row split and empty-row filter
//! - `merge`    : per-file fold, file order, first-column renumbering
//! - `report`   : per-file outcomes and progress side channel
//! - `pipeline` : discover -> list sheets -> merge -> write

pub mod classify;
pub mod conf;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod spec;

pub use classify::{classify_rows, is_row_empty};
pub use merge::{column_looks_sequential, merge_sheets, renumber_first_column};
pub use pipeline::{list_sheet_names_first_readable, resolve_input_files, run_merge};
pub use report::{EnumFileStatus, ProgressLog, ReportMerge, ReportMergeBuilder, SpecMergeFileOutcome};
pub use source::SheetSource;
pub use spec::{
    ClassifyError, EnumMergeInput, MergeError, SpecClassifiedRows, SpecMergeOptions,
    SpecMergeOutcome, SpecMergeResult, SpecMergeRun,
};

pub use sheetmerge_io_fs::{
    DiscoverError, EnumDiscoverPatternMode, SpecDiscoverOptions, discover_spreadsheet_files,
};
pub use sheetmerge_io_xlsx::{
    EnumCellValue, SpecWorkbookWriteOptions, TypeGrid, TypeRow, XlsxReadError, XlsxReader,
    XlsxWriteError, write_merged_workbook,
};
