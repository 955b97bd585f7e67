//! End-to-end run: resolve inputs, list sheets, merge, write.

use std::path::{Path, PathBuf};

use sheetmerge_io_fs::{SpecDiscoverOptions, discover_spreadsheet_files};
use sheetmerge_io_xlsx::{XlsxReadError, write_merged_workbook};

use crate::merge::merge_sheets;
use crate::report::ProgressLog;
use crate::source::SheetSource;
use crate::spec::{EnumMergeInput, MergeError, SpecMergeOutcome, SpecMergeRun};

/// Resolve the ordered input file list.
///
/// A directory is scanned with `spec_discover` (oldest first); an explicit list
/// is returned as given.
pub fn resolve_input_files(
    input: &EnumMergeInput,
    spec_discover: &SpecDiscoverOptions,
) -> Result<Vec<PathBuf>, MergeError> {
    match input {
        EnumMergeInput::Directory(dir_input) => {
            Ok(discover_spreadsheet_files(dir_input, spec_discover)?)
        }
        EnumMergeInput::Files(l_files) => Ok(l_files.clone()),
    }
}

/// Sheet names of the first file in `files` that opens.
///
/// Unreadable files are skipped; the last read error is returned only when no
/// file opens.
pub fn list_sheet_names_first_readable<S, P>(
    source: &S,
    files: &[P],
) -> Result<Vec<String>, MergeError>
where
    S: SheetSource + ?Sized,
    P: AsRef<Path>,
{
    let mut err_last: Option<XlsxReadError> = None;
    for path_file in files {
        match source.list_sheet_names(path_file.as_ref()) {
            Ok(sheet_names) => return Ok(sheet_names),
            Err(err) => {
                log::warn!("Cannot list sheets: {err}");
                err_last = Some(err);
            }
        }
    }
    match err_last {
        Some(err) => Err(MergeError::Read(err)),
        None => Err(MergeError::NoInputFiles),
    }
}

/// Run one merge and write the result workbook.
///
/// `progress` receives one human-readable line per processed file plus the
/// final save line.
pub fn run_merge<S: SheetSource + ?Sized>(
    source: &S,
    spec_run: &SpecMergeRun,
    progress: Option<&mut dyn FnMut(&str)>,
) -> Result<SpecMergeOutcome, MergeError> {
    let mut progress = ProgressLog::new(progress);

    let l_files = resolve_input_files(&spec_run.input, &spec_run.spec_discover)?;
    if l_files.is_empty() {
        return Err(MergeError::NoInputFiles);
    }
    progress.info(&format!(
        "Merging sheet '{}' across {} file(s)",
        spec_run.target_sheet,
        l_files.len()
    ));

    let all_sheet_names = list_sheet_names_first_readable(source, &l_files)?;
    let result = merge_sheets(
        source,
        &l_files,
        &spec_run.target_sheet,
        &spec_run.spec_merge,
        &mut progress,
    )?;

    let dir_output = resolve_output_dir(spec_run, &l_files);
    let written = write_merged_workbook(
        &result.header_rows,
        &result.data_rows,
        &spec_run.target_sheet,
        &all_sheet_names,
        &dir_output,
        &spec_run.spec_write,
    )?;
    progress.info(&format!(
        "Saved {} (FileOrder: {})",
        written.path_file_out.display(),
        result.file_order.join(", ")
    ));

    Ok(SpecMergeOutcome {
        path_file_out: written.path_file_out,
        target_sheet: spec_run.target_sheet.clone(),
        sheet_names: written.sheet_names,
        n_rows_header: result.header_rows.len(),
        n_rows_data: result.data_rows.len(),
        file_order: result.file_order,
        report: result.report,
    })
}

fn resolve_output_dir(spec_run: &SpecMergeRun, l_files: &[PathBuf]) -> PathBuf {
    if let Some(dir_output) = &spec_run.dir_output {
        return dir_output.clone();
    }
    match &spec_run.input {
        EnumMergeInput::Directory(dir_input) => dir_input.clone(),
        EnumMergeInput::Files(_) => l_files
            .first()
            .and_then(|path_file| path_file.parent())
            .filter(|dir_parent| !dir_parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;
    use sheetmerge_io_xlsx::{TypeGrid, XlsxReadError};

    use super::{list_sheet_names_first_readable, resolve_input_files, resolve_output_dir};
    use crate::source::SheetSource;
    use crate::spec::{EnumMergeInput, MergeError, SpecMergeRun};

    /// Every file except `bad.xlsx` lists the same two sheets.
    struct SourceSheetsOnly;

    impl SheetSource for SourceSheetsOnly {
        fn list_sheet_names(&self, path_file: &Path) -> Result<Vec<String>, XlsxReadError> {
            if path_file.ends_with("bad.xlsx") {
                return Err(XlsxReadError::UnreadableFile {
                    path: path_file.to_path_buf(),
                    message: "not a zip".to_string(),
                });
            }
            Ok(vec!["Summary".to_string(), "Data".to_string()])
        }

        fn read_sheet_grid(&self, path_file: &Path, sheet_name: &str) -> Result<TypeGrid, XlsxReadError> {
            Err(XlsxReadError::SheetNotFound {
                path: path_file.to_path_buf(),
                sheet_name: sheet_name.to_string(),
            })
        }
    }

    #[test]
    fn explicit_file_list_keeps_caller_order() {
        let l_files = vec![PathBuf::from("z.xlsx"), PathBuf::from("a.xlsx")];
        let l_resolved = resolve_input_files(
            &EnumMergeInput::Files(l_files.clone()),
            &Default::default(),
        )
        .unwrap();
        assert_eq!(l_resolved, l_files);
    }

    #[test]
    fn missing_directory_is_a_discover_error() {
        let err = resolve_input_files(
            &EnumMergeInput::Directory(PathBuf::from("/definitely/not/here")),
            &Default::default(),
        )
        .expect_err("must fail");
        assert!(matches!(err, MergeError::Discover(_)));
    }

    #[test]
    fn sheet_names_come_from_first_readable_file() {
        let l_files = vec![PathBuf::from("bad.xlsx"), PathBuf::from("good.xlsx")];
        let sheet_names = list_sheet_names_first_readable(&SourceSheetsOnly, &l_files).unwrap();
        assert_eq!(sheet_names, vec!["Summary", "Data"]);
    }

    #[test]
    fn single_unreadable_file_is_terminal() {
        let err = list_sheet_names_first_readable(&SourceSheetsOnly, &[PathBuf::from("bad.xlsx")])
            .expect_err("must fail");
        assert!(matches!(err, MergeError::Read(XlsxReadError::UnreadableFile { .. })));
    }

    #[test]
    fn output_dir_defaults_to_input_location() {
        let spec_dir = SpecMergeRun::new(EnumMergeInput::Directory(PathBuf::from("/in")), "Data");
        assert_eq!(resolve_output_dir(&spec_dir, &[]), PathBuf::from("/in"));

        let l_files = vec![PathBuf::from("/first/a.xlsx"), PathBuf::from("/second/b.xlsx")];
        let spec_files = SpecMergeRun::new(EnumMergeInput::Files(l_files.clone()), "Data");
        assert_eq!(resolve_output_dir(&spec_files, &l_files), PathBuf::from("/first"));

        let l_bare = vec![PathBuf::from("a.xlsx")];
        let spec_bare = SpecMergeRun::new(EnumMergeInput::Files(l_bare.clone()), "Data");
        assert_eq!(resolve_output_dir(&spec_bare, &l_bare), PathBuf::from("."));

        let mut spec_explicit = spec_bare.clone();
        spec_explicit.dir_output = Some(PathBuf::from("/out"));
        assert_eq!(resolve_output_dir(&spec_explicit, &l_bare), PathBuf::from("/out"));
    }
}
