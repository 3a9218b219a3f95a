//! Directory traversal producing a flat copy manifest.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::filter::{is_excluded_by_name, path_has_excluded_ancestor};
use crate::report::ReportCopyBuilder;
use crate::spec::{CopyGroupError, SpecCopyEntry, SpecExclusionRules};

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: String,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: String,
}

/// Walks one source tree and applies exclusion rules.
///
/// Sibling files and subdirectories are visited in name order, so the same
/// tree always yields the same manifest: a directory's own files come first,
/// then each subdirectory's files, depth first.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryScanner<'a> {
    rules_exclude: &'a SpecExclusionRules,
    if_verbose: bool,
}

impl<'a> DirectoryScanner<'a> {
    /// Scanner applying `rules_exclude`.
    pub fn new(rules_exclude: &'a SpecExclusionRules) -> Self {
        Self {
            rules_exclude,
            if_verbose: false,
        }
    }

    /// Report each exclusion at INFO instead of DEBUG.
    pub fn with_verbose(mut self, if_verbose: bool) -> Self {
        self.if_verbose = if_verbose;
        self
    }

    /// Scan `path_dir_root`, descending into subdirectories when `if_recurse`.
    ///
    /// Fails only when the root itself cannot be listed. Unreadable
    /// subdirectories are recorded as warnings and skipped.
    pub fn scan(
        &self,
        path_dir_root: &Path,
        if_recurse: bool,
        builder_cp_report: &mut ReportCopyBuilder,
    ) -> Result<Vec<SpecCopyEntry>, CopyGroupError> {
        if !path_dir_root.is_dir() {
            return Err(CopyGroupError::Scan {
                path: path_dir_root.to_path_buf(),
                message: "source directory does not exist".to_string(),
            });
        }

        let mut l_entries = Vec::new();
        self.walk_directory(
            path_dir_root,
            Path::new(""),
            if_recurse,
            builder_cp_report,
            &mut l_entries,
        )?;
        Ok(l_entries)
    }

    fn walk_directory(
        &self,
        path_dir: &Path,
        path_rel_parent: &Path,
        if_recurse: bool,
        builder_cp_report: &mut ReportCopyBuilder,
        l_entries: &mut Vec<SpecCopyEntry>,
    ) -> Result<(), CopyGroupError> {
        let iter_entries = fs::read_dir(path_dir).map_err(|e| CopyGroupError::Scan {
            path: path_dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
        let mut l_files: Vec<SpecFileEntry> = Vec::new();

        for _entry_res in iter_entries {
            let entry = match _entry_res {
                Ok(v) => v,
                Err(e) => {
                    builder_cp_report.add_warning(format!(
                        "Failed to read directory entry under {} ({e})",
                        path_dir.display()
                    ));
                    continue;
                }
            };
            builder_cp_report.add_scanned();

            let path_entry = entry.path();
            if path_has_excluded_ancestor(&path_entry, self.rules_exclude) {
                self.log_excluded(&path_entry, "one of its parents is an excluded subdirectory");
                builder_cp_report.add_skipped();
                continue;
            }

            let cfg_file_type = match entry.file_type() {
                Ok(v) => v,
                Err(e) => {
                    builder_cp_report
                        .add_warning(format!("Failed to inspect {} ({e})", path_entry.display()));
                    continue;
                }
            };

            let c_name = entry.file_name().to_string_lossy().to_string();
            // Links are copied as links and never descended into.
            if cfg_file_type.is_dir() {
                l_dirs.push(SpecDirEntry {
                    path_dir_src_sub: path_entry,
                    name_dir: c_name,
                });
            } else if cfg_file_type.is_file() || cfg_file_type.is_symlink() {
                l_files.push(SpecFileEntry {
                    path_file_src: path_entry,
                    name_file: c_name,
                });
            } else {
                builder_cp_report
                    .add_warning(format!("Special file skipped: {}", path_entry.display()));
            }
        }

        l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
        l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

        for _file_entry in l_files {
            if is_excluded_by_name(&_file_entry.name_file, self.rules_exclude) {
                self.log_excluded(
                    &_file_entry.path_file_src,
                    "its name or extension is excluded",
                );
                builder_cp_report.add_skipped();
                continue;
            }
            let Some(name_file) = _file_entry.path_file_src.file_name() else {
                continue;
            };
            builder_cp_report.add_matched();
            l_entries.push(SpecCopyEntry::new(name_file, path_rel_parent));
        }

        if !if_recurse {
            if !l_dirs.is_empty() {
                debug!(
                    path = %path_dir.display(),
                    cnt_subdirs = l_dirs.len(),
                    "Subdirectories not descended (copySubdirs disabled)"
                );
            }
            return Ok(());
        }

        for _dir_entry in l_dirs {
            let Some(name_dir) = _dir_entry.path_dir_src_sub.file_name() else {
                continue;
            };
            let path_rel_sub = path_rel_parent.join(name_dir);
            if let Err(e) = self.walk_directory(
                &_dir_entry.path_dir_src_sub,
                &path_rel_sub,
                if_recurse,
                builder_cp_report,
                l_entries,
            ) {
                warn!(path = %_dir_entry.path_dir_src_sub.display(), "{e}");
                builder_cp_report.add_warning(e.to_string());
            }
        }

        Ok(())
    }

    fn log_excluded(&self, path: &Path, reason: &str) {
        if self.if_verbose {
            info!(path = %path.display(), "Excluding: {reason}");
        } else {
            debug!(path = %path.display(), "Excluding: {reason}");
        }
    }
}

/// Manifest for an explicit file list: every name at the top level, unchecked.
pub fn manifest_from_file_list(l_files: &[String]) -> Vec<SpecCopyEntry> {
    l_files
        .iter()
        .map(|name_file| SpecCopyEntry::new(name_file.as_str(), ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::{DirectoryScanner, manifest_from_file_list};
    use crate::report::ReportCopyBuilder;
    use crate::spec::{CopyGroupError, SpecCopyEntry, SpecExclusionRules};

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, txt).expect("write text");
    }

    fn entry(name: &str, parent: &str) -> SpecCopyEntry {
        SpecCopyEntry::new(name, PathBuf::from(parent))
    }

    #[test]
    fn scan_excludes_subdir_and_counts_skip() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("root");
        write_text(&src.join("a.txt"), "a");
        write_text(&src.join("sub/b.txt"), "b");
        write_text(&src.join("node_modules/c.js"), "c");

        let rules = SpecExclusionRules {
            set_subdirs: ["node_modules".to_string()].into(),
            ..SpecExclusionRules::default()
        };
        let mut builder = ReportCopyBuilder::default();
        let l_entries = DirectoryScanner::new(&rules)
            .scan(&src, true, &mut builder)
            .expect("scan");

        assert_eq!(l_entries, vec![entry("a.txt", ""), entry("b.txt", "sub")]);
        assert!(builder.cnt_skipped >= 1);
    }

    #[test]
    fn scan_files_before_descendants_in_name_order() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("root");
        write_text(&src.join("z.txt"), "z");
        write_text(&src.join("b/2.txt"), "2");
        write_text(&src.join("a/deep/1.txt"), "1");
        write_text(&src.join("a/0.txt"), "0");

        let rules = SpecExclusionRules::default();
        let mut builder = ReportCopyBuilder::default();
        let l_entries = DirectoryScanner::new(&rules)
            .scan(&src, true, &mut builder)
            .expect("scan");

        assert_eq!(
            l_entries,
            vec![
                entry("z.txt", ""),
                entry("0.txt", "a"),
                entry("1.txt", "a/deep"),
                entry("2.txt", "b"),
            ]
        );
        assert_eq!(builder.cnt_matched, 4);
    }

    #[test]
    fn scan_without_recursion_ignores_subdirs() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("root");
        write_text(&src.join("top.txt"), "t");
        write_text(&src.join("sub/inner.txt"), "i");

        let rules = SpecExclusionRules::default();
        let mut builder = ReportCopyBuilder::default();
        let l_entries = DirectoryScanner::new(&rules)
            .scan(&src, false, &mut builder)
            .expect("scan");

        assert_eq!(l_entries, vec![entry("top.txt", "")]);
    }

    #[test]
    fn scan_applies_file_and_extension_rules() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("root");
        write_text(&src.join("keep.rs"), "k");
        write_text(&src.join("drop.tmp"), "d");
        write_text(&src.join("package-lock.json"), "p");

        let rules = SpecExclusionRules::new(["tmp"], ["package-lock.json"], Vec::<String>::new());
        let mut builder = ReportCopyBuilder::default();
        let l_entries = DirectoryScanner::new(&rules)
            .scan(&src, true, &mut builder)
            .expect("scan");

        assert_eq!(l_entries, vec![entry("keep.rs", "")]);
        assert_eq!(builder.cnt_skipped, 2);
    }

    #[test]
    fn scan_missing_root_is_scan_error() {
        let tmp = TempDir::new().expect("tempdir");
        let rules = SpecExclusionRules::default();
        let mut builder = ReportCopyBuilder::default();
        let err = DirectoryScanner::new(&rules)
            .scan(&tmp.path().join("missing"), true, &mut builder)
            .expect_err("must fail");
        assert!(matches!(err, CopyGroupError::Scan { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn scan_lists_symlinked_dir_as_entry_without_descending() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("root");
        let outside = tmp.path().join("outside");
        write_text(&outside.join("secret.txt"), "s");
        std::fs::create_dir_all(&src).expect("mkdir");
        std::os::unix::fs::symlink(&outside, src.join("link")).expect("symlink");

        let rules = SpecExclusionRules::default();
        let mut builder = ReportCopyBuilder::default();
        let l_entries = DirectoryScanner::new(&rules)
            .scan(&src, true, &mut builder)
            .expect("scan");

        assert_eq!(l_entries, vec![entry("link", "")]);
    }

    #[test]
    fn file_list_manifest_is_flat_and_unfiltered() {
        let l_entries = manifest_from_file_list(&["a.txt".to_string(), "b.tmp".to_string()]);
        assert_eq!(l_entries, vec![entry("a.txt", ""), entry("b.tmp", "")]);
    }
}
