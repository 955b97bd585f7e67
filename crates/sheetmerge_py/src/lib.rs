use std::collections::BTreeMap;
use std::path::PathBuf;

use pyo3::exceptions::{PyFileNotFoundError, PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyList, PyString};
use sheetmerge_core::conf::C_PREFIX_REPORT;
use sheetmerge_core::{
    DiscoverError, EnumCellValue, EnumDiscoverPatternMode, EnumMergeInput, MergeError,
    ProgressLog, ReportMerge, SpecDiscoverOptions, SpecMergeFileOutcome, SpecMergeOptions,
    SpecMergeRun, TypeRow, XlsxReadError, XlsxReader, discover_spreadsheet_files, merge_sheets,
    run_merge,
};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "sheetmerge.merge.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "SpecMergeFileOutcome")]
#[derive(Debug, Clone)]
struct PySpecMergeFileOutcome {
    #[pyo3(get)]
    path: String,
    #[pyo3(get)]
    name_file: String,
    #[pyo3(get)]
    status: String,
    #[pyo3(get)]
    if_header_source: bool,
    #[pyo3(get)]
    n_rows_read: usize,
    #[pyo3(get)]
    n_rows_kept: usize,
    #[pyo3(get)]
    message: String,
}

impl From<SpecMergeFileOutcome> for PySpecMergeFileOutcome {
    fn from(outcome: SpecMergeFileOutcome) -> Self {
        Self {
            path: outcome.path.to_string_lossy().to_string(),
            name_file: outcome.name_file,
            status: outcome.status.as_str().to_string(),
            if_header_source: outcome.if_header_source,
            n_rows_read: outcome.n_rows_read,
            n_rows_kept: outcome.n_rows_kept,
            message: outcome.message,
        }
    }
}

#[pyclass(name = "ReportMerge")]
#[derive(Debug, Clone)]
struct PyReportMerge {
    #[pyo3(get)]
    path_file_out: Option<String>,
    #[pyo3(get)]
    target_sheet: String,
    #[pyo3(get)]
    sheet_names: Vec<String>,
    #[pyo3(get)]
    n_rows_header: usize,
    #[pyo3(get)]
    n_rows_data: usize,
    #[pyo3(get)]
    file_order: Vec<String>,
    #[pyo3(get)]
    cnt_files: u64,
    #[pyo3(get)]
    cnt_merged: u64,
    #[pyo3(get)]
    cnt_no_data: u64,
    #[pyo3(get)]
    cnt_skipped: u64,
    #[pyo3(get)]
    cnt_rows_data: u64,
    #[pyo3(get)]
    outcomes: Vec<PySpecMergeFileOutcome>,
}

impl PyReportMerge {
    fn from_report(target_sheet: String, file_order: Vec<String>, report: ReportMerge) -> Self {
        Self {
            path_file_out: None,
            target_sheet,
            sheet_names: Vec::new(),
            n_rows_header: 0,
            n_rows_data: report.cnt_rows_data as usize,
            file_order,
            cnt_files: report.cnt_files,
            cnt_merged: report.cnt_merged,
            cnt_no_data: report.cnt_no_data,
            cnt_skipped: report.cnt_skipped,
            cnt_rows_data: report.cnt_rows_data,
            outcomes: report
                .outcomes
                .into_iter()
                .map(PySpecMergeFileOutcome::from)
                .collect(),
        }
    }
}

#[pymethods]
impl PyReportMerge {
    #[getter]
    fn skipped(&self) -> Vec<PySpecMergeFileOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == "skipped")
            .cloned()
            .collect()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_files".to_string(), self.cnt_files);
        dict_counts.insert("cnt_merged".to_string(), self.cnt_merged);
        dict_counts.insert("cnt_no_data".to_string(), self.cnt_no_data);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_rows_data".to_string(), self.cnt_rows_data);
        dict_counts
    }

    #[pyo3(signature = (prefix = C_PREFIX_REPORT))]
    fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} files={} merged={} no_data={} skipped={} rows={}",
            self.cnt_files, self.cnt_merged, self.cnt_no_data, self.cnt_skipped, self.cnt_rows_data
        )
    }

    fn __str__(&self) -> String {
        self.format(C_PREFIX_REPORT)
    }
}

#[pyclass(name = "MergeResult")]
#[derive(Debug, Clone)]
struct PyMergeResult {
    header_rows: Vec<TypeRow>,
    data_rows: Vec<TypeRow>,
    #[pyo3(get)]
    file_order: Vec<String>,
    #[pyo3(get)]
    if_renumbered: bool,
    #[pyo3(get)]
    report: PyReportMerge,
}

#[pymethods]
impl PyMergeResult {
    #[getter]
    fn header_rows<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyList>> {
        convert_rows_to_py(py, &self.header_rows)
    }

    #[getter]
    fn data_rows<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyList>> {
        convert_rows_to_py(py, &self.data_rows)
    }
}

/// Dates surface as `YYYY-MM-DD HH:MM:SS` text; the abi3 build has no datetime C API.
fn convert_cell_to_py<'py>(py: Python<'py>, cell: &EnumCellValue) -> Bound<'py, PyAny> {
    match cell {
        EnumCellValue::Empty => py.None().into_bound(py),
        EnumCellValue::Number(value) => PyFloat::new(py, *value).into_any(),
        EnumCellValue::Boolean(value) => PyBool::new(py, *value).to_owned().into_any(),
        EnumCellValue::Text(_) | EnumCellValue::Date(_) => {
            PyString::new(py, &cell.to_text()).into_any()
        }
    }
}

fn convert_rows_to_py<'py>(py: Python<'py>, rows: &[TypeRow]) -> PyResult<Bound<'py, PyList>> {
    let mut l_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let l_cells: Vec<Bound<'py, PyAny>> =
            row.iter().map(|cell| convert_cell_to_py(py, cell)).collect();
        l_rows.push(PyList::new(py, l_cells)?);
    }
    PyList::new(py, l_rows)
}

fn parse_rule_pattern(value: &str) -> PyResult<EnumDiscoverPatternMode> {
    match value {
        "glob" => Ok(EnumDiscoverPatternMode::Glob),
        "regex" => Ok(EnumDiscoverPatternMode::Regex),
        "literal" => Ok(EnumDiscoverPatternMode::Literal),
        _ => Err(PyValueError::new_err(format!(
            "Invalid pattern strategy: `{value}`. Expected one of: ['glob', 'regex', 'literal']"
        ))),
    }
}

fn map_discover_error(exception: DiscoverError) -> PyErr {
    match exception {
        DiscoverError::NotDirectory(_) => PyFileNotFoundError::new_err(exception.to_string()),
        DiscoverError::InvalidPattern(message) => PyValueError::new_err(message),
        DiscoverError::ReadDir { .. } => PyOSError::new_err(exception.to_string()),
    }
}

fn map_read_error(exception: XlsxReadError) -> PyErr {
    match exception {
        XlsxReadError::UnreadableFile { .. } => PyOSError::new_err(exception.to_string()),
        XlsxReadError::SheetNotFound { .. } => PyValueError::new_err(exception.to_string()),
    }
}

fn map_merge_error(exception: MergeError) -> PyErr {
    match exception {
        MergeError::Discover(err) => map_discover_error(err),
        MergeError::Read(err) => map_read_error(err),
        MergeError::InvalidHeaderRowCount => PyValueError::new_err(exception.to_string()),
        MergeError::NoInputFiles => PyFileNotFoundError::new_err(exception.to_string()),
        MergeError::Write(_) => PyOSError::new_err(exception.to_string()),
        MergeError::NoValidData { .. } => PyRuntimeError::new_err(exception.to_string()),
    }
}

fn build_discover_options(
    patterns_exclude_files: Option<Vec<String>>,
    rule_pattern: &str,
    if_skip_hidden: bool,
) -> PyResult<SpecDiscoverOptions> {
    Ok(SpecDiscoverOptions {
        patterns_exclude_files,
        rule_pattern: parse_rule_pattern(rule_pattern)?,
        if_skip_hidden,
        ..SpecDiscoverOptions::default()
    })
}

#[pyfunction(name = "discover_files")]
#[pyo3(signature = (
    dir_input,
    patterns_exclude_files = None,
    rule_pattern = "glob",
    if_skip_hidden = true
))]
fn discover_files_py(
    py: Python<'_>,
    dir_input: String,
    patterns_exclude_files: Option<Vec<String>>,
    rule_pattern: &str,
    if_skip_hidden: bool,
) -> PyResult<Vec<String>> {
    let spec_discover = build_discover_options(patterns_exclude_files, rule_pattern, if_skip_hidden)?;
    let l_files = py
        .allow_threads(|| discover_spreadsheet_files(dir_input, &spec_discover))
        .map_err(map_discover_error)?;
    Ok(l_files
        .into_iter()
        .map(|path_file| path_file.to_string_lossy().to_string())
        .collect())
}

#[pyfunction(name = "list_sheet_names")]
fn list_sheet_names_py(py: Python<'_>, path_file: String) -> PyResult<Vec<String>> {
    py.allow_threads(|| XlsxReader::new().list_sheet_names(&PathBuf::from(path_file)))
        .map_err(map_read_error)
}

#[pyfunction(name = "merge_files")]
#[pyo3(signature = (files, target_sheet, n_rows_header = 1, if_renumber_first_col = true))]
fn merge_files_py(
    py: Python<'_>,
    files: Vec<String>,
    target_sheet: String,
    n_rows_header: usize,
    if_renumber_first_col: bool,
) -> PyResult<PyMergeResult> {
    let l_files: Vec<PathBuf> = files.into_iter().map(PathBuf::from).collect();
    let spec_merge = SpecMergeOptions {
        n_rows_header,
        if_renumber_first_col,
    };
    let result = py
        .allow_threads(|| {
            merge_sheets(
                &XlsxReader::new(),
                &l_files,
                &target_sheet,
                &spec_merge,
                &mut ProgressLog::silent(),
            )
        })
        .map_err(map_merge_error)?;

    let mut report = PyReportMerge::from_report(target_sheet, result.file_order.clone(), result.report);
    report.n_rows_header = result.header_rows.len();
    Ok(PyMergeResult {
        header_rows: result.header_rows,
        data_rows: result.data_rows,
        file_order: result.file_order,
        if_renumbered: result.if_renumbered,
        report,
    })
}

#[pyfunction(name = "run_merge")]
#[pyo3(signature = (
    target_sheet,
    dir_input = None,
    files = None,
    dir_output = None,
    n_rows_header = 1,
    if_renumber_first_col = true,
    patterns_exclude_files = None,
    rule_pattern = "glob",
    progress = None
))]
#[allow(clippy::too_many_arguments)]
fn run_merge_py(
    py: Python<'_>,
    target_sheet: String,
    dir_input: Option<String>,
    files: Option<Vec<String>>,
    dir_output: Option<String>,
    n_rows_header: usize,
    if_renumber_first_col: bool,
    patterns_exclude_files: Option<Vec<String>>,
    rule_pattern: &str,
    progress: Option<PyObject>,
) -> PyResult<PyReportMerge> {
    let input = match (dir_input, files) {
        (Some(dir_input), None) => EnumMergeInput::Directory(PathBuf::from(dir_input)),
        (None, Some(files)) => EnumMergeInput::Files(files.into_iter().map(PathBuf::from).collect()),
        _ => {
            return Err(PyValueError::new_err(
                "Provide exactly one of `dir_input` or `files`.",
            ));
        }
    };
    let mut spec_run = SpecMergeRun::new(input, target_sheet);
    spec_run.dir_output = dir_output.map(PathBuf::from);
    spec_run.spec_discover = build_discover_options(patterns_exclude_files, rule_pattern, true)?;
    spec_run.spec_merge = SpecMergeOptions {
        n_rows_header,
        if_renumber_first_col,
    };

    let outcome = match progress {
        Some(callback) => {
            let mut err_callback: Option<PyErr> = None;
            let mut forward_progress = |msg: &str| {
                if err_callback.is_none() {
                    if let Err(err) = callback.call1(py, (msg,)) {
                        err_callback = Some(err);
                    }
                }
            };
            let outcome = run_merge(&XlsxReader::new(), &spec_run, Some(&mut forward_progress));
            if let Some(err) = err_callback {
                return Err(err);
            }
            outcome
        }
        None => py.allow_threads(|| run_merge(&XlsxReader::new(), &spec_run, None)),
    }
    .map_err(map_merge_error)?;

    let mut report =
        PyReportMerge::from_report(outcome.target_sheet, outcome.file_order, outcome.report);
    report.path_file_out = Some(outcome.path_file_out.to_string_lossy().to_string());
    report.sheet_names = outcome.sheet_names;
    report.n_rows_header = outcome.n_rows_header;
    report.n_rows_data = outcome.n_rows_data;
    Ok(report)
}

#[pymodule]
fn _sheetmerge_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySpecMergeFileOutcome>()?;
    module.add_class::<PyReportMerge>()?;
    module.add_class::<PyMergeResult>()?;
    module.add_function(wrap_pyfunction!(discover_files_py, module)?)?;
    module.add_function(wrap_pyfunction!(list_sheet_names_py, module)?)?;
    module.add_function(wrap_pyfunction!(merge_files_py, module)?)?;
    module.add_function(wrap_pyfunction!(run_merge_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
