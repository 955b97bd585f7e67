//! `sheetmerge_io_fs` v1:
//! Spreadsheet file discovery for the merge pipeline.
//!
//! - `conf`     : extension and output-marker constants
//! - `spec`     : enums/options/errors
//! - `discover` : directory scan and modification-time ordering
//! - `util`     : pattern matching helpers

pub mod conf;
pub mod discover;
pub mod spec;
mod util;

pub use conf::{C_TOKEN_OUTPUT_MARKER, TUP_SPREADSHEET_EXTENSIONS};
pub use discover::{discover_spreadsheet_files, is_generated_output};
pub use spec::{DiscoverError, EnumDiscoverPatternMode, SpecDiscoverOptions};
