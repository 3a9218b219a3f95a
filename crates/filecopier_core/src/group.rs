//! Copy group orchestration: scan -> copy -> verify.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::copy::CopyExecutor;
use crate::report::{ReportCopy, ReportCopyBuilder, ReportRun};
use crate::resolve::{DestinationResolver, derive_destination_path};
use crate::scan::{DirectoryScanner, manifest_from_file_list};
use crate::spec::{
    CopyGroupError, EnumCopyGroupState, EnumCopyOutcome, SpecCopyEntry, SpecCopyGroup,
    SpecCopyParams, SpecGlobalParams,
};
use crate::util::{is_overlap, is_plain_relative_path, validate_destination_path_safety};

/// One configured group together with its manifest and counters.
///
/// Failures never escape a group: every scan, resolve, copy and verify
/// problem is logged and recorded in the group's [`ReportCopy`].
#[derive(Debug, Clone)]
pub struct CopyGroup {
    spec_group: SpecCopyGroup,
    spec_params: SpecCopyParams,
    resolver: DestinationResolver,
    executor: CopyExecutor,
    state: EnumCopyGroupState,
    l_entries: Vec<SpecCopyEntry>,
    builder_cp_report: ReportCopyBuilder,
}

impl CopyGroup {
    /// Group resolving date-rooted paths against `date_run`.
    pub fn new(
        spec_group: SpecCopyGroup,
        spec_global: SpecGlobalParams,
        spec_params: SpecCopyParams,
        date_run: NaiveDate,
    ) -> Self {
        Self {
            spec_group,
            spec_params,
            resolver: DestinationResolver::new(spec_global, date_run),
            executor: CopyExecutor::new(spec_params.rule_compare),
            state: EnumCopyGroupState::Unscanned,
            l_entries: Vec::new(),
            builder_cp_report: ReportCopyBuilder::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.spec_group.name_group
    }

    pub fn spec_group(&self) -> &SpecCopyGroup {
        &self.spec_group
    }

    pub fn state(&self) -> EnumCopyGroupState {
        self.state
    }

    /// Manifest built by the last scan.
    pub fn manifest(&self) -> &[SpecCopyEntry] {
        &self.l_entries
    }

    pub fn number_of_files_to_copy(&self) -> usize {
        self.l_entries.len()
    }

    /// Files written so far (cumulative across copy runs).
    pub fn files_copied(&self) -> u64 {
        self.builder_cp_report.cnt_copied
    }

    /// Entries excluded by the last scan.
    pub fn files_skipped(&self) -> u64 {
        self.builder_cp_report.cnt_skipped
    }

    /// Snapshot of counters and collected errors.
    pub fn report(&self) -> ReportCopy {
        self.builder_cp_report.build(&self.spec_group.name_group)
    }

    /// Source path of a manifest entry.
    pub fn source_path(&self, entry: &SpecCopyEntry) -> PathBuf {
        entry.path_src(&self.spec_group.path_dir_src)
    }

    /// Destination paths of a manifest entry (one per destination root).
    pub fn resolve_destinations(
        &self,
        entry: &SpecCopyEntry,
    ) -> Result<Vec<PathBuf>, CopyGroupError> {
        self.resolver.resolve(entry, &self.spec_group)
    }

    /// Rebuild the manifest and reset the exclusion counter.
    ///
    /// A missing source directory is recorded as a scan error and leaves the
    /// manifest empty. So does a destination folder overlapping the source,
    /// recorded as a config error.
    pub fn scan(&mut self) {
        self.builder_cp_report.reset_scan();
        self.l_entries.clear();

        if let Some(e) = self.find_overlap() {
            error!(group = %self.spec_group.name_group, "{e}");
            self.builder_cp_report
                .add_group_error(self.spec_group.path_dir_src.clone(), &e);
            self.state = EnumCopyGroupState::Scanned;
            return;
        }

        if !self.spec_group.l_files.is_empty() {
            self.l_entries = manifest_from_file_list(&self.spec_group.l_files);
            self.builder_cp_report.cnt_matched = self.l_entries.len() as u64;
        } else {
            let scanner = DirectoryScanner::new(&self.spec_group.rules_exclude)
                .with_verbose(self.spec_params.if_verbose);
            match scanner.scan(
                &self.spec_group.path_dir_src,
                self.spec_group.if_copy_subdirs,
                &mut self.builder_cp_report,
            ) {
                Ok(l_entries) => self.l_entries = l_entries,
                Err(e) => {
                    warn!(group = %self.spec_group.name_group, "{e}");
                    self.builder_cp_report
                        .add_group_error(self.spec_group.path_dir_src.clone(), &e);
                }
            }
        }

        debug!(
            group = %self.spec_group.name_group,
            cnt_entries = self.l_entries.len(),
            cnt_skipped = self.builder_cp_report.cnt_skipped,
            "Scan finished"
        );
        self.state = EnumCopyGroupState::Scanned;
    }

    /// Copy every manifest entry to every resolved destination.
    ///
    /// Each fresh copy is immediately checked for existence and size/mtime.
    /// Scans first when the group has not been scanned yet.
    pub fn copy(&mut self) {
        if self.state == EnumCopyGroupState::Unscanned {
            self.scan();
        }

        let l_entries = std::mem::take(&mut self.l_entries);
        for entry in &l_entries {
            let path_src = self.source_path(entry);
            let Some(l_paths_dst) = self.resolve_checked(entry, &path_src) else {
                continue;
            };
            for path_dst in l_paths_dst {
                self.copy_one(&path_src, &path_dst);
            }
        }
        self.l_entries = l_entries;
        self.state = EnumCopyGroupState::Copied;
    }

    /// Re-resolve every manifest entry and confirm each destination still
    /// matches (content comparison when `if_deep_verify`).
    ///
    /// Each destination is checked once, against the last manifest entry
    /// resolving to it, so flattened name collisions are not mismatches.
    pub fn verify(&mut self) {
        if self.state == EnumCopyGroupState::Unscanned {
            self.scan();
        }

        let if_deep = self.spec_params.if_deep_verify;
        let l_entries = std::mem::take(&mut self.l_entries);
        let mut l_pairs: Vec<(PathBuf, PathBuf)> = Vec::new();
        let mut dict_idx_by_dst: HashMap<PathBuf, usize> = HashMap::new();
        for entry in &l_entries {
            let path_src = self.source_path(entry);
            let Some(l_paths_dst) = self.resolve_checked(entry, &path_src) else {
                continue;
            };
            for path_dst in l_paths_dst {
                match dict_idx_by_dst.get(&path_dst) {
                    Some(&idx) => l_pairs[idx].1 = path_src.clone(),
                    None => {
                        dict_idx_by_dst.insert(path_dst.clone(), l_pairs.len());
                        l_pairs.push((path_dst, path_src.clone()));
                    }
                }
            }
        }
        self.l_entries = l_entries;

        for (path_dst, path_src) in l_pairs {
            match self.executor.verify(&path_src, &path_dst, if_deep) {
                Ok(()) => self.builder_cp_report.add_verified(),
                Err(e) => {
                    error!(group = %self.spec_group.name_group, "{e}");
                    self.builder_cp_report.add_group_error(path_dst, &e);
                }
            }
        }
        self.state = EnumCopyGroupState::Verified;
    }

    /// First group folder that contains the source root or lies inside it.
    fn find_overlap(&self) -> Option<CopyGroupError> {
        let path_dir_src = &self.spec_group.path_dir_src;
        if !path_dir_src.is_dir() {
            return None;
        }
        let l_dirs_group = self.resolver.resolve_group_dirs(&self.spec_group).ok()?;
        l_dirs_group
            .into_iter()
            .find(|path_dir_group| is_overlap(path_dir_src, path_dir_group))
            .map(|path_dst| CopyGroupError::Overlap {
                path_src: path_dir_src.clone(),
                path_dst,
            })
    }

    fn copy_one(&mut self, path_src: &Path, path_dst: &Path) {
        match self.executor.copy_if_needed(path_src, path_dst) {
            Ok(EnumCopyOutcome::Copied) => {
                self.builder_cp_report.add_copied();
                info!(
                    group = %self.spec_group.name_group,
                    path = %path_src.display(),
                    dst = %path_dst.display(),
                    "Copied"
                );
                if let Err(e) = self.executor.verify(path_src, path_dst, false) {
                    error!(group = %self.spec_group.name_group, "{e}");
                    self.builder_cp_report
                        .add_group_error(path_dst.to_path_buf(), &e);
                }
            }
            Ok(EnumCopyOutcome::Skipped) => {
                self.builder_cp_report.add_unchanged();
                debug!(
                    group = %self.spec_group.name_group,
                    dst = %path_dst.display(),
                    "Unchanged"
                );
            }
            Err(e) => {
                error!(group = %self.spec_group.name_group, "{e}");
                self.builder_cp_report
                    .add_group_error(path_src.to_path_buf(), &e);
            }
        }
    }

    /// Resolve destinations and reject any that would land outside the group
    /// folder. Problems are recorded; `None` means "skip this entry".
    fn resolve_checked(
        &mut self,
        entry: &SpecCopyEntry,
        path_src: &Path,
    ) -> Option<Vec<PathBuf>> {
        let l_dirs_group = match self.resolver.resolve_group_dirs(&self.spec_group) {
            Ok(v) => v,
            Err(e) => {
                error!(group = %self.spec_group.name_group, path = %path_src.display(), "{e}");
                self.builder_cp_report
                    .add_group_error(path_src.to_path_buf(), &e);
                return None;
            }
        };

        if !is_plain_relative_path(&entry.path_rel()) {
            let e = CopyGroupError::copy(
                path_src,
                &entry.path_rel(),
                "file name must stay inside the source directory",
            );
            error!(group = %self.spec_group.name_group, "{e}");
            self.builder_cp_report
                .add_group_error(path_src.to_path_buf(), &e);
            return None;
        }

        let mut l_paths_dst = Vec::with_capacity(l_dirs_group.len());
        for path_dir_group in &l_dirs_group {
            let path_dst = derive_destination_path(
                entry,
                path_dir_group,
                self.spec_group.if_flatten,
            );
            if let Err(message) = validate_destination_path_safety(&path_dst, path_dir_group) {
                let e = CopyGroupError::copy(path_src, &path_dst, message);
                error!(group = %self.spec_group.name_group, "{e}");
                self.builder_cp_report.add_group_error(path_dst, &e);
                continue;
            }
            l_paths_dst.push(path_dst);
        }
        Some(l_paths_dst)
    }
}

/// Drive groups strictly in order: scan any unscanned group, then copy each
/// group, then (when `if_verify`) verify each group.
///
/// `if_dry_run` stops after scanning.
pub fn run_copy_groups(l_groups: &mut [CopyGroup], spec_params: &SpecCopyParams) -> ReportRun {
    for group in l_groups.iter_mut() {
        if group.state() == EnumCopyGroupState::Unscanned {
            group.scan();
        }
    }

    if !spec_params.if_dry_run {
        for group in l_groups.iter_mut() {
            group.copy();
            info!(
                group = %group.name(),
                path = %group.spec_group().path_dir_src.display(),
                cnt_copied = group.files_copied(),
                "Group copied"
            );
        }
        if spec_params.if_verify {
            for group in l_groups.iter_mut() {
                group.verify();
            }
        }
    }

    ReportRun {
        l_reports: l_groups.iter().map(CopyGroup::report).collect(),
    }
}
