//! Merge engine: an explicit fold over input files.

use std::path::Path;

use sheetmerge_io_xlsx::{EnumCellValue, TypeRow};

use crate::classify::classify_rows;
use crate::report::{EnumFileStatus, ProgressLog, ReportMergeBuilder, SpecMergeFileOutcome};
use crate::source::SheetSource;
use crate::spec::{ClassifyError, MergeError, SpecMergeOptions, SpecMergeResult};

/// Accumulated merge state, threaded by value through the fold.
#[derive(Debug, Default)]
struct StateMerge {
    header_rows: Option<Vec<TypeRow>>,
    data_rows: Vec<TypeRow>,
    file_order: Vec<String>,
    builder_report: ReportMergeBuilder,
}

/// Merge `target_sheet` across `files`, in the given order.
///
/// Per-file failures (unreadable file, missing sheet, empty sheet, sheet shorter
/// than the header block) are logged, recorded in the report and skipped. The
/// header block comes from the first file with at least
/// [`SpecMergeOptions::n_rows_header`] rows and is never replaced.
///
/// Fails with [`MergeError::NoValidData`] when no header was captured or no
/// data row survived, and with [`MergeError::InvalidHeaderRowCount`] for a
/// zero header count.
pub fn merge_sheets<S, P>(
    source: &S,
    files: &[P],
    target_sheet: &str,
    spec_options: &SpecMergeOptions,
    progress: &mut ProgressLog<'_>,
) -> Result<SpecMergeResult, MergeError>
where
    S: SheetSource + ?Sized,
    P: AsRef<Path>,
{
    if spec_options.n_rows_header == 0 {
        return Err(MergeError::InvalidHeaderRowCount);
    }

    let state = files.iter().fold(StateMerge::default(), |state, path_file| {
        step_merge_file(
            state,
            source,
            path_file.as_ref(),
            target_sheet,
            spec_options.n_rows_header,
            progress,
        )
    });

    let StateMerge {
        header_rows,
        data_rows,
        file_order,
        builder_report,
    } = state;

    let header_rows = match header_rows {
        Some(rows) if !data_rows.is_empty() => rows,
        _ => {
            return Err(MergeError::NoValidData {
                target_sheet: target_sheet.to_string(),
                cnt_files: files.len(),
            });
        }
    };

    let if_renumbered = spec_options.if_renumber_first_col
        && column_looks_sequential(data_rows.iter().filter_map(|row| row.first()));
    let data_rows = if if_renumbered {
        progress.info(&format!(
            "First column looks sequential; renumbered 1..={}",
            data_rows.len()
        ));
        renumber_first_column(data_rows)
    } else {
        data_rows
    };

    Ok(SpecMergeResult {
        header_rows,
        data_rows,
        file_order,
        if_renumbered,
        report: builder_report.build(),
    })
}

fn step_merge_file<S: SheetSource + ?Sized>(
    mut state: StateMerge,
    source: &S,
    path_file: &Path,
    target_sheet: &str,
    n_rows_header: usize,
    progress: &mut ProgressLog<'_>,
) -> StateMerge {
    let name_file = derive_file_name(path_file);
    let mut outcome = SpecMergeFileOutcome {
        path: path_file.to_path_buf(),
        name_file: name_file.clone(),
        status: EnumFileStatus::Skipped,
        if_header_source: false,
        n_rows_read: 0,
        n_rows_kept: 0,
        message: String::new(),
    };

    let grid = match source.read_sheet_grid(path_file, target_sheet) {
        Ok(grid) => grid,
        Err(err) => {
            outcome.message = err.to_string();
            progress.warn(&format!("[{name_file}] skipped: {}", outcome.message));
            state.builder_report.add_outcome(outcome);
            return state;
        }
    };
    if grid.is_empty() {
        outcome.message = format!("sheet '{target_sheet}' is empty");
        progress.warn(&format!("[{name_file}] skipped: {}", outcome.message));
        state.builder_report.add_outcome(outcome);
        return state;
    }

    let classified = match classify_rows(grid, n_rows_header) {
        Ok(classified) => classified,
        Err(err @ ClassifyError::InsufficientHeaderRows { .. }) => {
            outcome.message = err.to_string();
            progress.warn(&format!("[{name_file}] skipped: {}", outcome.message));
            state.builder_report.add_outcome(outcome);
            return state;
        }
        Err(err @ ClassifyError::InvalidHeaderRowCount) => {
            outcome.message = err.to_string();
            state.builder_report.add_outcome(outcome);
            return state;
        }
    };

    if state.header_rows.is_none() {
        progress.info(&format!(
            "[{name_file}] header captured (first {n_rows_header} row(s))"
        ));
        state.header_rows = Some(classified.header_rows);
        outcome.if_header_source = true;
    }

    outcome.n_rows_read = classified.n_rows_data_raw;
    outcome.n_rows_kept = classified.data_rows.len();
    if classified.data_rows.is_empty() {
        outcome.status = EnumFileStatus::NoData;
        outcome.message = format!(
            "no data rows after the header ({} read)",
            classified.n_rows_data_raw
        );
        progress.info(&format!("[{name_file}] {}", outcome.message));
    } else {
        outcome.status = EnumFileStatus::Merged;
        outcome.message = format!(
            "extracted {} data row(s) ({} read)",
            outcome.n_rows_kept, outcome.n_rows_read
        );
        progress.info(&format!("[{name_file}] {}", outcome.message));
        state.data_rows.extend(classified.data_rows);
        state.file_order.push(name_file);
    }

    state.builder_report.add_outcome(outcome);
    state
}

/// Return `true` when every non-empty value is a number or a run of ASCII digits.
///
/// Mixed identifiers such as `"A1"` make the column non-sequential. A column
/// with no non-empty value counts as sequential.
pub fn column_looks_sequential<'a, I>(column: I) -> bool
where
    I: IntoIterator<Item = &'a EnumCellValue>,
{
    column.into_iter().all(|value| match value {
        EnumCellValue::Empty => true,
        EnumCellValue::Number(_) => true,
        EnumCellValue::Text(s) => !s.is_empty() && s.chars().all(|chr| chr.is_ascii_digit()),
        EnumCellValue::Boolean(_) | EnumCellValue::Date(_) => false,
    })
}

/// Rewrite the first cell of every row to its 1-based position.
pub fn renumber_first_column(data_rows: Vec<TypeRow>) -> Vec<TypeRow> {
    data_rows
        .into_iter()
        .enumerate()
        .map(|(n_idx, mut row)| {
            if let Some(cell) = row.first_mut() {
                *cell = EnumCellValue::Number((n_idx + 1) as f64);
            }
            row
        })
        .collect()
}

fn derive_file_name(path_file: &Path) -> String {
    path_file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path_file.to_string_lossy().to_string())
}
