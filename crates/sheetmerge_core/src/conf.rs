//! Merge defaults.

/// Leading rows treated as header when the caller does not say otherwise.
pub const N_ROWS_HEADER_DEFAULT: usize = 1;

/// Prefix of the one-line report summary.
pub const C_PREFIX_REPORT: &str = "[MERGE]";
