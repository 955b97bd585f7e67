//! sheetmerge CLI - merge one worksheet across many workbooks

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use sheetmerge_core::{
    EnumDiscoverPatternMode, EnumMergeInput, SpecDiscoverOptions, SpecMergeRun,
    XlsxReader, discover_spreadsheet_files, run_merge,
};

#[derive(Parser)]
#[command(name = "sheetmerge")]
#[command(
    author,
    version,
    about = "Merge the same worksheet from many workbooks into one"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List spreadsheet files of a directory in merge order (oldest first)
    Files {
        /// Input directory
        dir: PathBuf,

        /// Exclude files whose name matches this pattern (repeatable)
        #[arg(long = "exclude")]
        patterns_exclude: Vec<String>,

        /// How `--exclude` patterns are interpreted
        #[arg(long, value_enum, default_value_t = PatternMode::Glob)]
        pattern_mode: PatternMode,
    },

    /// List sheet names of a workbook
    Sheets {
        /// Input workbook (xlsx, xls)
        input: PathBuf,
    },

    /// Merge one sheet and write `合并结果_<sheet>_<timestamp>.xlsx`
    Merge {
        /// Input workbooks, merged in the given order
        #[arg(conflicts_with = "dir", required_unless_present = "dir")]
        files: Vec<PathBuf>,

        /// Merge every spreadsheet of this directory instead (oldest first)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Worksheet to merge
        #[arg(short, long)]
        sheet: String,

        /// Leading rows treated as header
        #[arg(long, default_value = "1")]
        header_rows: NonZeroUsize,

        /// Output directory (default: input directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Keep the first column as-is even when it looks like a row number
        #[arg(long)]
        no_renumber: bool,

        /// Exclude files whose name matches this pattern (repeatable, directory input)
        #[arg(long = "exclude")]
        patterns_exclude: Vec<String>,

        /// How `--exclude` patterns are interpreted
        #[arg(long, value_enum, default_value_t = PatternMode::Glob)]
        pattern_mode: PatternMode,

        /// Do not print per-file progress
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PatternMode {
    Glob,
    Regex,
    Literal,
}

impl From<PatternMode> for EnumDiscoverPatternMode {
    fn from(mode: PatternMode) -> Self {
        match mode {
            PatternMode::Glob => Self::Glob,
            PatternMode::Regex => Self::Regex,
            PatternMode::Literal => Self::Literal,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Files {
            dir,
            patterns_exclude,
            pattern_mode,
        } => list_files(&dir, build_discover_options(patterns_exclude, pattern_mode)),
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Merge {
            files,
            dir,
            sheet,
            header_rows,
            out_dir,
            no_renumber,
            patterns_exclude,
            pattern_mode,
            quiet,
        } => {
            let input = match dir {
                Some(dir) => EnumMergeInput::Directory(dir),
                None if !files.is_empty() => EnumMergeInput::Files(files),
                None => bail!("Provide input files or --dir"),
            };
            let mut spec_run = SpecMergeRun::new(input, sheet);
            spec_run.dir_output = out_dir;
            spec_run.spec_discover = build_discover_options(patterns_exclude, pattern_mode);
            spec_run.spec_merge.n_rows_header = header_rows.get();
            spec_run.spec_merge.if_renumber_first_col = !no_renumber;
            merge(&spec_run, quiet)
        }
    }
}

fn build_discover_options(
    patterns_exclude: Vec<String>,
    pattern_mode: PatternMode,
) -> SpecDiscoverOptions {
    SpecDiscoverOptions {
        patterns_exclude_files: (!patterns_exclude.is_empty()).then_some(patterns_exclude),
        rule_pattern: pattern_mode.into(),
        ..SpecDiscoverOptions::default()
    }
}

fn list_files(dir: &Path, spec_discover: SpecDiscoverOptions) -> Result<()> {
    let l_files = discover_spreadsheet_files(dir, &spec_discover)
        .with_context(|| format!("Failed to scan '{}'", dir.display()))?;
    if l_files.is_empty() {
        eprintln!("No spreadsheet files in '{}'", dir.display());
    }
    for (n_idx, path_file) in l_files.iter().enumerate() {
        println!("{}\t{}", n_idx + 1, path_file.display());
    }
    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let sheet_names = XlsxReader::new()
        .list_sheet_names(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    for (n_idx, sheet_name) in sheet_names.iter().enumerate() {
        println!("{n_idx}\t{sheet_name}");
    }
    Ok(())
}

fn merge(spec_run: &SpecMergeRun, quiet: bool) -> Result<()> {
    let mut print_progress = |msg: &str| eprintln!("{msg}");
    let progress: Option<&mut dyn FnMut(&str)> = if quiet {
        None
    } else {
        Some(&mut print_progress)
    };

    let outcome = run_merge(&XlsxReader::new(), spec_run, progress)
        .with_context(|| format!("Failed to merge sheet '{}'", spec_run.target_sheet))?;

    println!("Output: {}", outcome.path_file_out.display());
    println!(
        "Rows: {} header + {} data",
        outcome.n_rows_header, outcome.n_rows_data
    );
    println!("FileOrder: {}", outcome.file_order.join(", "));
    println!("{}", outcome.report);
    for file_outcome in outcome.report.skipped() {
        println!("  skipped {}: {}", file_outcome.name_file, file_outcome.message);
    }
    Ok(())
}
