//! `filecopier_core` v1:
//! Scan-and-copy engine for batch, idempotent file mirroring.
//!
//! Modules:
//! - `filter`  : exclusion predicates (extension, file name, ancestor directory)
//! - `scan`    : directory traversal producing the copy manifest
//! - `resolve` : destination path layout (group, date root, flatten, fan-out)
//! - `copy`    : single-file copy-if-different and verification
//! - `group`   : per-group scan -> copy -> verify orchestration
//! - `spec`    : enums/options/errors
//! - `report`  : run-time report model
//! - `util`    : shared helper functions

pub mod copy;
pub mod filter;
pub mod group;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod spec;
mod util;

pub use copy::CopyExecutor;
pub use filter::{is_excluded_extension, is_excluded_file, path_has_excluded_ancestor};
pub use group::{CopyGroup, run_copy_groups};
pub use report::{ReportCopy, ReportCopyBuilder, ReportRun};
pub use resolve::{C_DATE_ROOT_FORMAT, DestinationResolver, derive_destination_path};
pub use scan::{DirectoryScanner, manifest_from_file_list};
pub use spec::{
    CopyGroupError, EnumCopyCompareMode, EnumCopyErrorKind, EnumCopyGroupState,
    EnumCopyOutcome, SpecCopyEntry, SpecCopyError, SpecCopyGroup, SpecCopyParams,
    SpecExclusionRules, SpecGlobalParams,
};
