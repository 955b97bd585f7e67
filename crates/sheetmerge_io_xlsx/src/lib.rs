//! `sheetmerge_io_xlsx` v1:
//! Workbook codec for the merge pipeline.
//!
//! - `conf`   : constants and default presets
//! - `spec`   : cell model, options, errors
//! - `util`   : pure helper functions
//! - `reader` : calamine-backed worksheet reader
//! - `writer` : rust_xlsxwriter-backed workbook writer
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{C_EXT_OUTPUT, C_NUM_FORMAT_DATETIME};
pub use reader::XlsxReader;
pub use spec::{
    EnumCellValue, SpecAutofitPolicy, SpecWorkbookWriteOptions, SpecWorkbookWritten, TypeGrid,
    TypeRow, XlsxReadError, XlsxWriteError,
};
pub use util::{
    calculate_column_widths, convert_excel_serial_to_datetime, derive_output_file_name,
    derive_unique_output_path,
};
pub use writer::{XlsxWriter, write_merged_workbook};
