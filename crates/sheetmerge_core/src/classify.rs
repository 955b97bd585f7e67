//! Header/data row split.

use sheetmerge_io_xlsx::{EnumCellValue, TypeGrid};

use crate::spec::{ClassifyError, SpecClassifiedRows};

/// Return `true` when every cell is absent or whitespace-only text.
///
/// A zero-length row is empty. Numeric zero and `false` are data.
pub fn is_row_empty(row: &[EnumCellValue]) -> bool {
    row.iter().all(EnumCellValue::is_blank)
}

/// Split `grid` into its first `n_rows_header` rows and the non-empty rows after them.
pub fn classify_rows(
    grid: TypeGrid,
    n_rows_header: usize,
) -> Result<SpecClassifiedRows, ClassifyError> {
    if n_rows_header == 0 {
        return Err(ClassifyError::InvalidHeaderRowCount);
    }
    if grid.len() < n_rows_header {
        return Err(ClassifyError::InsufficientHeaderRows {
            n_rows: grid.len(),
            n_rows_header,
        });
    }

    let mut header_rows = grid;
    let data_rows_raw = header_rows.split_off(n_rows_header);
    let n_rows_data_raw = data_rows_raw.len();
    let data_rows = data_rows_raw
        .into_iter()
        .filter(|row| !is_row_empty(row))
        .collect();

    Ok(SpecClassifiedRows {
        header_rows,
        data_rows,
        n_rows_data_raw,
    })
}
