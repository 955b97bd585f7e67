//! XLSX constants.

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;

/// Extension of generated workbooks.
pub const C_EXT_OUTPUT: &str = "xlsx";
/// Timestamp layout embedded in generated file names.
pub const C_FMT_TIMESTAMP_FILE: &str = "%Y%m%d_%H%M%S";
/// Number format applied to date cells.
pub const C_NUM_FORMAT_DATETIME: &str = "yyyy-mm-dd hh:mm:ss";
/// Text form of date cells.
pub const C_FMT_DATETIME_TEXT: &str = "%Y-%m-%d %H:%M:%S";

/// Autofit upper bound for column width.
pub const N_WIDTH_CELL_MAX: usize = 50;
/// Autofit padding added to the longest text.
pub const N_WIDTH_CELL_PADDING: usize = 2;
