//! Single-file copy-if-different and verification.

use std::fs::{self, Metadata};
use std::path::Path;

use crate::spec::{CopyGroupError, EnumCopyCompareMode, EnumCopyOutcome};
use crate::util::{
    copy_file_with_metadata, create_symbolic_link, ensure_parent_dir, is_content_identical,
    is_same_link_target, is_shallow_identical, stat_no_follow,
};

/// Copies one source path to one destination path.
///
/// Regular files are copied with their permissions and timestamps; symbolic
/// links are recreated as links. An existing destination judged identical
/// by `rule_compare` is left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyExecutor {
    rule_compare: EnumCopyCompareMode,
}

impl CopyExecutor {
    /// Executor using `rule_compare` for the skip-if-identical check.
    pub fn new(rule_compare: EnumCopyCompareMode) -> Self {
        Self { rule_compare }
    }

    /// Copy `path_src` to `path_dst` unless the destination is already identical.
    pub fn copy_if_needed(
        &self,
        path_src: &Path,
        path_dst: &Path,
    ) -> Result<EnumCopyOutcome, CopyGroupError> {
        let err_copy = |message: String| CopyGroupError::copy(path_src, path_dst, message);

        let meta_src = stat_no_follow(path_src)
            .map_err(|e| err_copy(e.to_string()))?
            .ok_or_else(|| err_copy("source file does not exist".to_string()))?;
        if meta_src.file_type().is_dir() {
            return Err(err_copy("source is a directory".to_string()));
        }

        ensure_parent_dir(path_dst).map_err(|e| err_copy(e.to_string()))?;
        let meta_dst = stat_no_follow(path_dst).map_err(|e| err_copy(e.to_string()))?;

        if let Some(meta_dst) = meta_dst {
            if meta_dst.file_type().is_dir() {
                return Err(err_copy("destination is a directory".to_string()));
            }
            if self
                .is_identical(path_src, &meta_src, path_dst, &meta_dst)
                .map_err(|e| err_copy(e.to_string()))?
            {
                return Ok(EnumCopyOutcome::Skipped);
            }
            // Never write through an existing destination link.
            if meta_dst.file_type().is_symlink() || meta_src.file_type().is_symlink() {
                fs::remove_file(path_dst).map_err(|e| err_copy(e.to_string()))?;
            }
        }

        if meta_src.file_type().is_symlink() {
            create_symbolic_link(path_src, path_dst).map_err(|e| err_copy(e.to_string()))?;
        } else {
            copy_file_with_metadata(path_src, path_dst).map_err(|e| err_copy(e.to_string()))?;
        }
        Ok(EnumCopyOutcome::Copied)
    }

    /// Check that `path_dst` exists and matches `path_src`.
    ///
    /// `if_deep = false` compares size + mtime; `if_deep = true` compares bytes.
    pub fn verify(
        &self,
        path_src: &Path,
        path_dst: &Path,
        if_deep: bool,
    ) -> Result<(), CopyGroupError> {
        let err_mismatch = |reason: String| CopyGroupError::mismatch(path_dst, reason);

        let meta_dst = stat_no_follow(path_dst)
            .map_err(|e| err_mismatch(e.to_string()))?
            .ok_or_else(|| err_mismatch("destination does not exist".to_string()))?;
        let meta_src = stat_no_follow(path_src)
            .map_err(|e| err_mismatch(e.to_string()))?
            .ok_or_else(|| err_mismatch("source no longer exists".to_string()))?;

        if meta_src.file_type().is_symlink() {
            let if_same = meta_dst.file_type().is_symlink()
                && is_same_link_target(path_src, path_dst)
                    .map_err(|e| err_mismatch(e.to_string()))?;
            if !if_same {
                return Err(err_mismatch("link target differs".to_string()));
            }
            return Ok(());
        }

        if !meta_dst.file_type().is_file() {
            return Err(err_mismatch("destination is not a regular file".to_string()));
        }
        if if_deep {
            let if_same = is_content_identical(path_src, path_dst)
                .map_err(|e| err_mismatch(e.to_string()))?;
            if !if_same {
                return Err(err_mismatch("content differs".to_string()));
            }
        } else if !is_shallow_identical(&meta_src, &meta_dst) {
            return Err(err_mismatch("size or modification time differs".to_string()));
        }
        Ok(())
    }

    fn is_identical(
        &self,
        path_src: &Path,
        meta_src: &Metadata,
        path_dst: &Path,
        meta_dst: &Metadata,
    ) -> Result<bool, std::io::Error> {
        if meta_src.file_type().is_symlink() || meta_dst.file_type().is_symlink() {
            return Ok(meta_src.file_type().is_symlink()
                && meta_dst.file_type().is_symlink()
                && is_same_link_target(path_src, path_dst)?);
        }
        match self.rule_compare {
            EnumCopyCompareMode::Shallow => Ok(is_shallow_identical(meta_src, meta_dst)),
            EnumCopyCompareMode::Deep => is_content_identical(path_src, path_dst),
        }
    }
}
