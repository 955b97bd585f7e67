//! Discovery constants.

/// Substring stamped on every generated merge result.
///
/// Files carrying it are never picked up as merge inputs. The value matches the
/// token used by earlier releases so their outputs stay excluded too.
pub const C_TOKEN_OUTPUT_MARKER: &str = "合并结果";

/// Spreadsheet extensions accepted by default (modern, legacy).
pub const TUP_SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Prefix Office uses for owner/lock files next to an open workbook.
pub const C_PREFIX_OFFICE_LOCK: &str = "~$";
