//! Exclusion predicates for scanned files and directories.
//!
//! All functions are pure: they only look at the strings they are given.

use std::path::{Component, Path};

use crate::spec::SpecExclusionRules;

/// Extension of `name_file`: text after the last `.`, or `""` when there is none.
pub fn derive_extension(name_file: &str) -> &str {
    match name_file.rfind('.') {
        Some(idx) => &name_file[idx + 1..],
        None => "",
    }
}

/// Whether `name_file` exactly matches an excluded file name.
pub fn is_excluded_file(name_file: &str, rules: &SpecExclusionRules) -> bool {
    rules.set_file_names.contains(name_file)
}

/// Whether the extension of `name_file` is excluded.
///
/// Extensionless names only match an explicit `""` entry.
pub fn is_excluded_extension(name_file: &str, rules: &SpecExclusionRules) -> bool {
    rules.set_extensions.contains(derive_extension(name_file))
}

/// Whether any directory component of `path` (the final segment excluded) is
/// an excluded subdirectory name.
pub fn path_has_excluded_ancestor(path: &Path, rules: &SpecExclusionRules) -> bool {
    if rules.set_subdirs.is_empty() {
        return false;
    }
    let Some(path_parent) = path.parent() else {
        return false;
    };
    path_parent.components().any(|c| match c {
        Component::Normal(part) => rules.set_subdirs.contains(part.to_string_lossy().as_ref()),
        _ => false,
    })
}

/// File-level check applied to scanned regular files (name, then extension).
pub(crate) fn is_excluded_by_name(name_file: &str, rules: &SpecExclusionRules) -> bool {
    is_excluded_file(name_file, rules) || is_excluded_extension(name_file, rules)
}
