//! Spreadsheet discovery in a single directory.

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::conf::C_PREFIX_OFFICE_LOCK;
use crate::spec::{DiscoverError, SpecDiscoverOptions};
use crate::util::{compile_patterns, has_accepted_extension, is_pattern_matching};

#[derive(Debug, Clone)]
struct SpecFileCandidate {
    path_file: PathBuf,
    name_file: String,
    time_modified: FileTime,
}

/// Return `true` when `name_file` was produced by a previous merge run.
pub fn is_generated_output(name_file: &str, token_output_marker: &str) -> bool {
    !token_output_marker.is_empty() && name_file.contains(token_output_marker)
}

/// List spreadsheet files directly inside `dir_input`, oldest first.
///
/// Only regular files (symlinks are followed) with an accepted extension are
/// returned. Generated merge results, extra exclude-pattern hits and, when
/// [`SpecDiscoverOptions::if_skip_hidden`] is set, dot-files and Office lock
/// files are dropped. Ties on modification time fall back to file name and
/// then full path, so an unchanged directory always yields the same order.
///
/// An empty directory yields `Ok(vec![])`.
pub fn discover_spreadsheet_files<P: AsRef<Path>>(
    dir_input: P,
    spec_options: &SpecDiscoverOptions,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let path_dir_input = dir_input.as_ref().to_path_buf();
    if !path_dir_input.is_dir() {
        return Err(DiscoverError::NotDirectory(path_dir_input));
    }

    let patterns_exclude = compile_patterns(
        spec_options.patterns_exclude_files.as_deref(),
        spec_options.rule_pattern,
    )?;

    let iter_entries = fs::read_dir(&path_dir_input).map_err(|e| DiscoverError::ReadDir {
        path: path_dir_input.clone(),
        source: e,
    })?;

    let mut l_candidates = Vec::new();
    for entry in iter_entries {
        let entry = match entry {
            Ok(v) => v,
            Err(e) => {
                log::debug!("Skipping unreadable entry in {}: {e}", path_dir_input.display());
                continue;
            }
        };
        let path_file = entry.path();
        let name_file = entry.file_name().to_string_lossy().to_string();

        if !has_accepted_extension(&name_file, &spec_options.extensions) {
            continue;
        }
        if is_generated_output(&name_file, &spec_options.token_output_marker) {
            log::debug!("Skipping generated output: {name_file}");
            continue;
        }
        if spec_options.if_skip_hidden
            && (name_file.starts_with('.') || name_file.starts_with(C_PREFIX_OFFICE_LOCK))
        {
            log::debug!("Skipping hidden/lock file: {name_file}");
            continue;
        }
        if is_pattern_matching(&name_file, patterns_exclude.as_ref()) {
            log::debug!("Skipping excluded file: {name_file}");
            continue;
        }

        let meta_file = match fs::metadata(&path_file) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("Skipping {name_file}: {e}");
                continue;
            }
        };
        if !meta_file.is_file() {
            continue;
        }

        l_candidates.push(SpecFileCandidate {
            time_modified: FileTime::from_last_modification_time(&meta_file),
            path_file,
            name_file,
        });
    }

    l_candidates.sort_by(|a, b| {
        a.time_modified
            .cmp(&b.time_modified)
            .then_with(|| a.name_file.cmp(&b.name_file))
            .then_with(|| a.path_file.cmp(&b.path_file))
    });

    Ok(l_candidates
        .into_iter()
        .map(|candidate| candidate.path_file)
        .collect())
}
