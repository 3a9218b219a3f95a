//! Copy group option models and error types.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// How an existing destination is judged identical to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCopyCompareMode {
    /// Size and modification time only. A changed file whose size and mtime
    /// were preserved is treated as identical.
    #[default]
    Shallow,
    /// Full byte-for-byte content comparison.
    Deep,
}

/// Result of one successful `copy_if_needed` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyOutcome {
    /// Bytes (or link) were written to the destination.
    Copied,
    /// Destination already judged identical; nothing written.
    Skipped,
}

/// Lifecycle of a [`crate::CopyGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumCopyGroupState {
    /// Constructed, manifest not built yet.
    Unscanned,
    /// Manifest built.
    Scanned,
    /// Copy step ran (possibly with per-file errors).
    Copied,
    /// Independent verification pass ran.
    Verified,
}

/// Category of a per-file/per-group failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyErrorKind {
    /// Group cannot be copied as configured: no destination, a group name
    /// that is not a single path segment, or a destination overlapping the
    /// source.
    Config,
    /// Source directory missing or unreadable.
    Scan,
    /// I/O failure while copying a single file.
    Copy,
    /// Destination does not match the source after copying.
    VerifyMismatch,
}

impl EnumCopyErrorKind {
    /// Short tag used in log lines and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Scan => "scan",
            Self::Copy => "copy",
            Self::VerifyMismatch => "verify",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsInit

/// Exclusion rule sets evaluated for every scanned candidate.
///
/// A candidate is excluded when it matches any entry of any set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecExclusionRules {
    /// File extensions without the leading dot. `""` matches extensionless names.
    pub set_extensions: BTreeSet<String>,
    /// Exact, case-sensitive file names.
    pub set_file_names: BTreeSet<String>,
    /// Directory names matched against every ancestor path component.
    pub set_subdirs: BTreeSet<String>,
}

impl SpecExclusionRules {
    /// Build rule sets from plain string lists.
    pub fn new<I, J, K>(extensions: I, file_names: J, subdirs: K) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            set_extensions: extensions.into_iter().map(Into::into).collect(),
            set_file_names: file_names.into_iter().map(Into::into).collect(),
            set_subdirs: subdirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether no rule of any kind is configured.
    pub fn is_empty(&self) -> bool {
        self.set_extensions.is_empty()
            && self.set_file_names.is_empty()
            && self.set_subdirs.is_empty()
    }
}

/// Static configuration of one copy group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecCopyGroup {
    /// Unique group name; used as a destination path segment.
    pub name_group: String,
    /// Source root directory.
    pub path_dir_src: PathBuf,
    /// Explicit file names under `path_dir_src`. Non-empty replaces scanning.
    pub l_files: Vec<String>,
    /// Descend into subdirectories while scanning.
    pub if_copy_subdirs: bool,
    /// Place every file directly under the group folder.
    pub if_flatten: bool,
    /// Exclusion rules applied while scanning.
    pub rules_exclude: SpecExclusionRules,
    /// Group-specific destination roots. Empty falls back to the global default.
    pub l_paths_dir_dst: Vec<PathBuf>,
}

impl SpecCopyGroup {
    /// Minimal group: name + source, everything else default.
    pub fn new<S, P>(name_group: S, path_dir_src: P) -> Self
    where
        S: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            name_group: name_group.into(),
            path_dir_src: path_dir_src.into(),
            ..Self::default()
        }
    }
}

/// Process-wide defaults shared by every group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecGlobalParams {
    /// Destination root used by groups that configure none.
    pub path_dir_dst_default: Option<PathBuf>,
    /// Insert `YYYY-MM-DD` right under every destination root.
    pub if_date_root: bool,
}

/// Typed run parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecCopyParams {
    /// Run the independent verification pass after copying.
    pub if_verify: bool,
    /// Verification compares full contents instead of size + mtime.
    pub if_deep_verify: bool,
    /// Suppress console output.
    pub if_quiet: bool,
    /// Report every excluded entry at INFO instead of DEBUG.
    pub if_verbose: bool,
    /// Debug-level diagnostics.
    pub if_debug: bool,
    /// Scan only; never write to destinations.
    pub if_dry_run: bool,
    /// Identity check used to skip already-copied files.
    pub rule_compare: EnumCopyCompareMode,
}

/// One manifest entry: file name + parent path relative to the source root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecCopyEntry {
    /// Final path segment of the file.
    pub name_file: OsString,
    /// Parent directory relative to the group source root; empty at top level.
    pub path_rel_parent: PathBuf,
}

impl SpecCopyEntry {
    /// Entry at `path_rel_parent/name_file`.
    pub fn new<N, P>(name_file: N, path_rel_parent: P) -> Self
    where
        N: Into<OsString>,
        P: Into<PathBuf>,
    {
        Self {
            name_file: name_file.into(),
            path_rel_parent: path_rel_parent.into(),
        }
    }

    /// Path relative to the source root.
    pub fn path_rel(&self) -> PathBuf {
        self.path_rel_parent.join(&self.name_file)
    }

    /// Absolute (or cwd-relative) source path under `path_dir_src`.
    pub fn path_src(&self, path_dir_src: &Path) -> PathBuf {
        path_dir_src.join(self.path_rel())
    }
}

/// One failure item with path, category and error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// Failure category.
    pub kind: EnumCopyErrorKind,
    /// User-facing error text.
    pub exception: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failure of a single scan, resolve, copy or verify operation.
///
/// None of these abort a run: [`crate::CopyGroup`] records them in its report
/// and moves on to the next file, destination or group.
#[derive(Debug, Error)]
pub enum CopyGroupError {
    /// Neither the group nor the global parameters name a destination.
    #[error("No destination directory configured for group `{name_group}`")]
    Config {
        /// Group lacking a destination.
        name_group: String,
    },
    /// Group name is empty, contains a separator, or is `.` / `..`.
    #[error("Group name `{name_group}` must be a single directory name")]
    InvalidGroupName {
        /// Offending group name.
        name_group: String,
    },
    /// A destination folder lies inside the source or contains it.
    #[error(
        "Destination {} overlaps source {}",
        path_dst.display(),
        path_src.display()
    )]
    Overlap {
        /// Group source root.
        path_src: PathBuf,
        /// Overlapping group destination folder.
        path_dst: PathBuf,
    },
    /// Source directory missing or unreadable.
    #[error("Failed to scan {}: {message}", path.display())]
    Scan {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// I/O failure while copying one file.
    #[error("Failed to copy {} -> {}: {message}", path_src.display(), path_dst.display())]
    Copy {
        /// Source file.
        path_src: PathBuf,
        /// Destination file.
        path_dst: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// Destination missing or different after copying.
    #[error("Verification failed for {}: {reason}", path_dst.display())]
    VerifyMismatch {
        /// Destination that failed verification.
        path_dst: PathBuf,
        /// What did not match.
        reason: String,
    },
}

impl CopyGroupError {
    /// Category of this error.
    pub fn kind(&self) -> EnumCopyErrorKind {
        match self {
            Self::Config { .. } | Self::InvalidGroupName { .. } | Self::Overlap { .. } => {
                EnumCopyErrorKind::Config
            }
            Self::Scan { .. } => EnumCopyErrorKind::Scan,
            Self::Copy { .. } => EnumCopyErrorKind::Copy,
            Self::VerifyMismatch { .. } => EnumCopyErrorKind::VerifyMismatch,
        }
    }

    pub(crate) fn copy(path_src: &Path, path_dst: &Path, message: impl Into<String>) -> Self {
        Self::Copy {
            path_src: path_src.to_path_buf(),
            path_dst: path_dst.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn mismatch(path_dst: &Path, reason: impl Into<String>) -> Self {
        Self::VerifyMismatch {
            path_dst: path_dst.to_path_buf(),
            reason: reason.into(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
