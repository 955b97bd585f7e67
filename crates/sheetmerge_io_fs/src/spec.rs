//! Discovery option models and top-level error types.

use std::path::PathBuf;

use crate::conf::{C_TOKEN_OUTPUT_MARKER, TUP_SPREADSHEET_EXTENSIONS};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for extra exclude patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumDiscoverPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    #[default]
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `discover_spreadsheet_files`.
#[derive(Debug, Clone)]
pub struct SpecDiscoverOptions {
    /// Accepted file extensions, without the leading dot (case-insensitive).
    pub extensions: Vec<String>,
    /// Files whose basename contains this token are excluded.
    pub token_output_marker: String,
    /// Extra exclude patterns applied to file basename.
    pub patterns_exclude_files: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumDiscoverPatternMode,
    /// Skip dot-files and Office `~$` lock files.
    pub if_skip_hidden: bool,
}

impl Default for SpecDiscoverOptions {
    fn default() -> Self {
        Self {
            extensions: TUP_SPREADSHEET_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            token_output_marker: C_TOKEN_OUTPUT_MARKER.to_string(),
            patterns_exclude_files: None,
            rule_pattern: EnumDiscoverPatternMode::Glob,
            if_skip_hidden: true,
        }
    }
}

/// "Top-level call failed" errors for directory discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// Input path is not a directory.
    #[error("Input is not a directory: {}", .0.display())]
    NotDirectory(PathBuf),
    /// Invalid exclude pattern.
    #[error("{0}")]
    InvalidPattern(String),
    /// Directory listing failed.
    #[error("Failed to list directory {}: {source}", path.display())]
    ReadDir {
        /// Directory that could not be listed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
