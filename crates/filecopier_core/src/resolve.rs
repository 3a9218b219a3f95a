//! Destination path computation for manifest entries.

use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;

use crate::spec::{CopyGroupError, SpecCopyEntry, SpecCopyGroup, SpecGlobalParams};

/// Format of the date segment inserted by date-rooted layouts.
pub const C_DATE_ROOT_FORMAT: &str = "%Y-%m-%d";

/// Maps manifest entries to destination paths for one run date.
///
/// Layout: `<root>[/<YYYY-MM-DD>]/<group>/[<relative parent>/]<file name>`,
/// once per configured destination root.
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    spec_global: SpecGlobalParams,
    date_run: NaiveDate,
}

impl DestinationResolver {
    /// Resolver for an explicit run date.
    pub fn new(spec_global: SpecGlobalParams, date_run: NaiveDate) -> Self {
        Self {
            spec_global,
            date_run,
        }
    }

    /// Global parameters in effect.
    pub fn spec_global(&self) -> &SpecGlobalParams {
        &self.spec_global
    }

    /// Date used for date-rooted layouts.
    pub fn date_run(&self) -> NaiveDate {
        self.date_run
    }

    /// Group folders (`<root>[/<date>]/<group>`), one per destination root.
    ///
    /// Fails with [`CopyGroupError::Config`] when neither the group nor the
    /// global parameters provide a destination root, and with
    /// [`CopyGroupError::InvalidGroupName`] when the group name is not a
    /// single directory name.
    pub fn resolve_group_dirs(
        &self,
        spec_group: &SpecCopyGroup,
    ) -> Result<Vec<PathBuf>, CopyGroupError> {
        let l_roots: Vec<PathBuf> = if spec_group.l_paths_dir_dst.is_empty() {
            self.spec_global
                .path_dir_dst_default
                .iter()
                .cloned()
                .collect()
        } else {
            spec_group.l_paths_dir_dst.clone()
        };
        if !is_single_segment(&spec_group.name_group) {
            return Err(CopyGroupError::InvalidGroupName {
                name_group: spec_group.name_group.clone(),
            });
        }
        if l_roots.is_empty() {
            return Err(CopyGroupError::Config {
                name_group: spec_group.name_group.clone(),
            });
        }

        let c_date = self.date_run.format(C_DATE_ROOT_FORMAT).to_string();
        Ok(l_roots
            .into_iter()
            .map(|mut path_dir| {
                if self.spec_global.if_date_root {
                    path_dir.push(&c_date);
                }
                path_dir.push(&spec_group.name_group);
                path_dir
            })
            .collect())
    }

    /// Destination paths of `entry`, one per destination root.
    pub fn resolve(
        &self,
        entry: &SpecCopyEntry,
        spec_group: &SpecCopyGroup,
    ) -> Result<Vec<PathBuf>, CopyGroupError> {
        Ok(self
            .resolve_group_dirs(spec_group)?
            .into_iter()
            .map(|path_dir_group| {
                derive_destination_path(entry, &path_dir_group, spec_group.if_flatten)
            })
            .collect())
    }
}

fn is_single_segment(name: &str) -> bool {
    let mut iter_parts = Path::new(name).components();
    matches!(
        (iter_parts.next(), iter_parts.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Place `entry` under `path_dir_group`.
///
/// - `if_flatten = false`: keep the relative parent, reproducing the source tree.
/// - `if_flatten = true`: file name only; same-named files collide (last one wins).
pub fn derive_destination_path(
    entry: &SpecCopyEntry,
    path_dir_group: &Path,
    if_flatten: bool,
) -> PathBuf {
    if if_flatten {
        return path_dir_group.join(&entry.name_file);
    }
    path_dir_group.join(entry.path_rel())
}
