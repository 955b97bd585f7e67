//! Merge report models, mutable report builder and progress side channel.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::conf::C_PREFIX_REPORT;

/// What happened to one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFileStatus {
    /// Contributed at least one data row.
    Merged,
    /// Read fine but had no data row after the header block.
    NoData,
    /// Unreadable, missing the sheet, empty, or shorter than the header block.
    Skipped,
}

impl EnumFileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::NoData => "no_data",
            Self::Skipped => "skipped",
        }
    }
}

/// One per-file outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeFileOutcome {
    /// Input file path.
    pub path: PathBuf,
    /// Input file base name.
    pub name_file: String,
    /// Final status.
    pub status: EnumFileStatus,
    /// The run's header block came from this file.
    pub if_header_source: bool,
    /// Rows after the header block, before empty-row filtering.
    pub n_rows_read: usize,
    /// Data rows appended to the merged dataset.
    pub n_rows_kept: usize,
    /// Human-readable reason or summary.
    pub message: String,
}

/// Aggregate counters and per-file outcomes for one merge run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportMerge {
    /// Files examined.
    pub cnt_files: u64,
    /// Files that contributed data.
    pub cnt_merged: u64,
    /// Files read without data rows.
    pub cnt_no_data: u64,
    /// Files skipped on error.
    pub cnt_skipped: u64,
    /// Data rows in the merged dataset.
    pub cnt_rows_data: u64,
    /// One entry per examined file, in processing order.
    pub outcomes: Vec<SpecMergeFileOutcome>,
}

impl ReportMerge {
    /// Outcomes of skipped files.
    pub fn skipped(&self) -> impl Iterator<Item = &SpecMergeFileOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == EnumFileStatus::Skipped)
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_files".to_string(), self.cnt_files);
        dict_counts.insert("cnt_merged".to_string(), self.cnt_merged);
        dict_counts.insert("cnt_no_data".to_string(), self.cnt_no_data);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_rows_data".to_string(), self.cnt_rows_data);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} files={} merged={} no_data={} skipped={} rows={}",
            self.cnt_files, self.cnt_merged, self.cnt_no_data, self.cnt_skipped, self.cnt_rows_data
        )
    }
}

impl fmt::Display for ReportMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(C_PREFIX_REPORT))
    }
}

/// Mutable accumulator for merge statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportMergeBuilder {
    outcomes: Vec<SpecMergeFileOutcome>,
}

impl ReportMergeBuilder {
    /// Record one file outcome.
    pub fn add_outcome(&mut self, outcome: SpecMergeFileOutcome) {
        self.outcomes.push(outcome);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportMerge {
        let mut report = ReportMerge {
            cnt_files: self.outcomes.len() as u64,
            ..ReportMerge::default()
        };
        for outcome in &self.outcomes {
            match outcome.status {
                EnumFileStatus::Merged => report.cnt_merged += 1,
                EnumFileStatus::NoData => report.cnt_no_data += 1,
                EnumFileStatus::Skipped => report.cnt_skipped += 1,
            }
            report.cnt_rows_data += outcome.n_rows_kept as u64;
        }
        report.outcomes = self.outcomes;
        report
    }
}

/// Status lines routed to `log` and, optionally, to a caller callback.
pub struct ProgressLog<'a> {
    callback: Option<&'a mut dyn FnMut(&str)>,
}

impl<'a> ProgressLog<'a> {
    pub fn new(callback: Option<&'a mut dyn FnMut(&str)>) -> Self {
        Self { callback }
    }

    /// Progress log without a callback.
    pub fn silent() -> Self {
        Self { callback: None }
    }

    pub fn info(&mut self, msg: &str) {
        log::info!("{msg}");
        self.emit(msg);
    }

    pub fn warn(&mut self, msg: &str) {
        log::warn!("{msg}");
        self.emit(msg);
    }

    fn emit(&mut self, msg: &str) {
        if let Some(callback) = self.callback.as_deref_mut() {
            callback(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{EnumFileStatus, ProgressLog, ReportMergeBuilder, SpecMergeFileOutcome};

    fn outcome(name: &str, status: EnumFileStatus, n_rows_kept: usize) -> SpecMergeFileOutcome {
        SpecMergeFileOutcome {
            path: PathBuf::from(name),
            name_file: name.to_string(),
            status,
            if_header_source: false,
            n_rows_read: n_rows_kept,
            n_rows_kept,
            message: String::new(),
        }
    }

    #[test]
    fn report_counts_and_format() {
        let mut builder = ReportMergeBuilder::default();
        builder.add_outcome(outcome("a.xlsx", EnumFileStatus::Merged, 2));
        builder.add_outcome(outcome("b.xlsx", EnumFileStatus::Skipped, 0));
        builder.add_outcome(outcome("c.xlsx", EnumFileStatus::Merged, 3));
        builder.add_outcome(outcome("d.xlsx", EnumFileStatus::NoData, 0));
        let report = builder.build();

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_files"], 4);
        assert_eq!(dict_counts["cnt_merged"], 2);
        assert_eq!(dict_counts["cnt_skipped"], 1);
        assert_eq!(dict_counts["cnt_rows_data"], 5);
        assert_eq!(
            report.to_string(),
            "[MERGE] files=4 merged=2 no_data=1 skipped=1 rows=5"
        );
        let l_skipped: Vec<_> = report.skipped().map(|o| o.name_file.as_str()).collect();
        assert_eq!(l_skipped, vec!["b.xlsx"]);
    }

    #[test]
    fn progress_log_forwards_lines() {
        let mut l_lines = Vec::new();
        {
            let mut callback = |msg: &str| l_lines.push(msg.to_string());
            let callback_dyn: &mut dyn FnMut(&str) = &mut callback;
            let mut progress = ProgressLog::new(Some(callback_dyn));
            progress.info("first");
            progress.warn("second");
        }
        assert_eq!(l_lines, vec!["first", "second"]);

        ProgressLog::silent().info("nobody listens");
    }
}
