//! Seam between the merge engine and a workbook codec.

use std::path::Path;

use sheetmerge_io_xlsx::{TypeGrid, XlsxReadError, XlsxReader};

/// Read access to workbooks, one call per file.
pub trait SheetSource {
    /// Sheet names in workbook order.
    fn list_sheet_names(&self, path_file: &Path) -> Result<Vec<String>, XlsxReadError>;

    /// All rows of `sheet_name`; empty when the sheet has no cells.
    fn read_sheet_grid(&self, path_file: &Path, sheet_name: &str)
    -> Result<TypeGrid, XlsxReadError>;
}

impl SheetSource for XlsxReader {
    fn list_sheet_names(&self, path_file: &Path) -> Result<Vec<String>, XlsxReadError> {
        XlsxReader::list_sheet_names(self, path_file)
    }

    fn read_sheet_grid(
        &self,
        path_file: &Path,
        sheet_name: &str,
    ) -> Result<TypeGrid, XlsxReadError> {
        XlsxReader::read_sheet_grid(self, path_file, sheet_name)
    }
}
