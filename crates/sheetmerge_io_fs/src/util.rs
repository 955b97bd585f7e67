use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{DiscoverError, EnumDiscoverPatternMode};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeDiscoverPatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

pub(crate) fn compile_patterns(
    patterns: Option<&[String]>,
    rule_pattern: EnumDiscoverPatternMode,
) -> Result<Option<TypeDiscoverPatternSeq>, DiscoverError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumDiscoverPatternMode::Literal => {
            Ok(Some(TypeDiscoverPatternSeq::Literal(patterns.to_vec())))
        }
        EnumDiscoverPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| {
                        DiscoverError::InvalidPattern(format!("Invalid exclude pattern: {e}"))
                    })?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypeDiscoverPatternSeq::Glob(l_glob)))
        }
        EnumDiscoverPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| {
                    DiscoverError::InvalidPattern(format!("Invalid exclude pattern: {e}"))
                })?;
                l_regex.push(regex);
            }
            Ok(Some(TypeDiscoverPatternSeq::Regex(l_regex)))
        }
    }
}

pub(crate) fn is_pattern_matching(value: &str, patterns: Option<&TypeDiscoverPatternSeq>) -> bool {
    match patterns {
        None => false,
        Some(TypeDiscoverPatternSeq::Literal(v)) => v.iter().any(|p| value.contains(p)),
        Some(TypeDiscoverPatternSeq::Glob(v)) => v.iter().any(|p| p.is_match(value)),
        Some(TypeDiscoverPatternSeq::Regex(v)) => v.iter().any(|p| p.is_match(value)),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExtensionMatching

/// Return `true` when `name_file` ends with one of `extensions` (case-insensitive).
pub(crate) fn has_accepted_extension(name_file: &str, extensions: &[String]) -> bool {
    let Some((_, ext)) = name_file.rsplit_once('.') else {
        return false;
    };
    extensions
        .iter()
        .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
