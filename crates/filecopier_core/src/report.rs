//! Copy report models, mutable report builder and aggregate run report.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{CopyGroupError, EnumCopyErrorKind, SpecCopyError};

/// Counters and diagnostics for one copy group.
#[derive(Debug, Default, Clone)]
pub struct ReportCopy {
    /// Group name.
    pub name_group: String,
    /// Directory entries inspected during the last scan.
    pub cnt_scanned: u64,
    /// Manifest entries produced by the last scan.
    pub cnt_matched: u64,
    /// Entries excluded during the last scan.
    pub cnt_skipped: u64,
    /// Files written to a destination (cumulative across copy runs).
    pub cnt_copied: u64,
    /// Copies skipped because the destination was already identical.
    pub cnt_unchanged: u64,
    /// Destinations that passed the verification pass.
    pub cnt_verified: u64,
    /// Non-fatal warnings collected during scan/copy.
    pub warnings: Vec<String>,
    /// Per-file and per-group failures.
    pub errors: Vec<SpecCopyError>,
}

impl ReportCopy {
    /// Number of collected errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Number of errors of one category.
    pub fn error_count_of(&self, kind: EnumCopyErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_unchanged".to_string(), self.cnt_unchanged);
        dict_counts.insert("cnt_verified".to_string(), self.cnt_verified);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scanned={} matched={} skipped={} copied={} unchanged={} verified={} errors={} warnings={}",
            dict_counts["cnt_scanned"],
            dict_counts["cnt_matched"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_copied"],
            dict_counts["cnt_unchanged"],
            dict_counts["cnt_verified"],
            dict_counts["cnt_errors"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(&format!("[{}]", self.name_group)))
    }
}

/// Mutable accumulator owned by a copy group.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    /// See [`ReportCopy::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportCopy::cnt_matched`].
    pub cnt_matched: u64,
    /// See [`ReportCopy::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportCopy::cnt_copied`].
    pub cnt_copied: u64,
    /// See [`ReportCopy::cnt_unchanged`].
    pub cnt_unchanged: u64,
    /// See [`ReportCopy::cnt_verified`].
    pub cnt_verified: u64,
    /// See [`ReportCopy::errors`].
    pub errors: Vec<SpecCopyError>,
    /// See [`ReportCopy::warnings`].
    pub warnings: Vec<String>,
}

impl ReportCopyBuilder {
    /// Clear the per-scan counters; copy history is kept.
    pub fn reset_scan(&mut self) {
        self.cnt_scanned = 0;
        self.cnt_matched = 0;
        self.cnt_skipped = 0;
    }

    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    /// Increment matched count by one.
    pub fn add_matched(&mut self) {
        self.cnt_matched += 1;
    }

    /// Increment skipped (excluded) count by one.
    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Increment copied count by one.
    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    /// Increment unchanged count by one.
    pub fn add_unchanged(&mut self) {
        self.cnt_unchanged += 1;
    }

    /// Increment verified count by one.
    pub fn add_verified(&mut self) {
        self.cnt_verified += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, kind: EnumCopyErrorKind, exception: String) {
        self.errors.push(SpecCopyError {
            path,
            kind,
            exception,
        });
    }

    /// Record a typed operation failure against `path`.
    pub fn add_group_error(&mut self, path: PathBuf, err: &CopyGroupError) {
        self.add_error(path, err.kind(), err.to_string());
    }

    /// Snapshot into an immutable report.
    pub fn build(&self, name_group: &str) -> ReportCopy {
        ReportCopy {
            name_group: name_group.to_string(),
            cnt_scanned: self.cnt_scanned,
            cnt_matched: self.cnt_matched,
            cnt_skipped: self.cnt_skipped,
            cnt_copied: self.cnt_copied,
            cnt_unchanged: self.cnt_unchanged,
            cnt_verified: self.cnt_verified,
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Per-group reports of one run plus totals.
#[derive(Debug, Default, Clone)]
pub struct ReportRun {
    /// Reports in group processing order.
    pub l_reports: Vec<ReportCopy>,
}

impl ReportRun {
    /// Total files copied across groups.
    pub fn cnt_copied(&self) -> u64 {
        self.l_reports.iter().map(|r| r.cnt_copied).sum()
    }

    /// Total entries excluded during scanning across groups.
    pub fn cnt_skipped(&self) -> u64 {
        self.l_reports.iter().map(|r| r.cnt_skipped).sum()
    }

    /// Total copies skipped as already identical.
    pub fn cnt_unchanged(&self) -> u64 {
        self.l_reports.iter().map(|r| r.cnt_unchanged).sum()
    }

    /// Total errors across groups.
    pub fn error_count(&self) -> usize {
        self.l_reports.iter().map(ReportCopy::error_count).sum()
    }

    /// Whether any group recorded an error.
    pub fn has_failures(&self) -> bool {
        self.error_count() > 0
    }
}

impl fmt::Display for ReportRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[RUN] groups={} copied={} unchanged={} skipped={} errors={}",
            self.l_reports.len(),
            self.cnt_copied(),
            self.cnt_unchanged(),
            self.cnt_skipped(),
            self.error_count()
        )
    }
}
