//! Configuration records and errors.

use std::io;
use std::path::PathBuf;

use filecopier_core::{SpecCopyGroup, SpecExclusionRules, SpecGlobalParams};
use serde::Deserialize;
use thiserror::Error;

/// Default configuration file name.
pub const C_CONFIG_FILE_NAME: &str = "file-copier.toml";
/// Reserved table name of the global section (case-insensitive).
pub const C_GLOBAL_SECTION: &str = "Global";

////////////////////////////////////////////////////////////////////////////////
// #region Records

/// A list given either as one delimited string or as an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnumListValue {
    /// Delimited text, e.g. `"tmp, bak"`.
    Text(String),
    /// Explicit array, e.g. `["tmp", "bak"]`.
    Items(Vec<String>),
}

impl EnumListValue {
    /// Trimmed, non-empty items. `Text` is split on `delimiter`.
    pub fn to_items(&self, delimiter: char) -> Vec<String> {
        let iter_raw: Box<dyn Iterator<Item = &str>> = match self {
            Self::Text(text) => Box::new(text.split(delimiter)),
            Self::Items(items) => Box::new(items.iter().map(String::as_str)),
        };
        iter_raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn _items(value: &Option<EnumListValue>, delimiter: char) -> Vec<String> {
    value
        .as_ref()
        .map(|v| v.to_items(delimiter))
        .unwrap_or_default()
}

/// One group table as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecGroupRecord {
    /// Source root directory.
    #[serde(default)]
    pub directory: String,
    /// One destination or a comma-separated list / array of them.
    #[serde(default)]
    pub dest_dir: Option<EnumListValue>,
    /// Descend into subdirectories.
    #[serde(default)]
    pub copy_subdirs: bool,
    /// Extensions (no dot), comma-separated or array.
    #[serde(default)]
    pub exclude_extensions: Option<EnumListValue>,
    /// Directory names, comma-separated or array.
    #[serde(default)]
    pub exclude_subdirs: Option<EnumListValue>,
    /// Exact file names, comma-separated or array.
    #[serde(default)]
    pub exclude_files: Option<EnumListValue>,
    /// Explicit file list, newline-separated or array. Replaces scanning.
    #[serde(default)]
    pub files: Option<EnumListValue>,
    /// Flatten every file directly under the group folder.
    #[serde(default)]
    pub no_preserve_directory_structure: bool,
}

impl SpecGroupRecord {
    /// Typed group spec named `name_group`.
    pub fn into_spec(self, name_group: &str) -> SpecCopyGroup {
        SpecCopyGroup {
            name_group: name_group.to_string(),
            path_dir_src: PathBuf::from(self.directory.trim()),
            l_files: _items(&self.files, '\n'),
            if_copy_subdirs: self.copy_subdirs,
            if_flatten: self.no_preserve_directory_structure,
            rules_exclude: SpecExclusionRules::new(
                _items(&self.exclude_extensions, ','),
                _items(&self.exclude_files, ','),
                _items(&self.exclude_subdirs, ','),
            ),
            l_paths_dir_dst: _items(&self.dest_dir, ',')
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

/// The `[Global]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecGlobalRecord {
    /// Fallback destination root.
    #[serde(default)]
    pub destination_directory: Option<String>,
    /// Insert today's date under every destination root.
    #[serde(default)]
    pub date_root: bool,
}

impl SpecGlobalRecord {
    /// Typed global parameters. A blank destination counts as unset.
    pub fn into_spec(self) -> SpecGlobalParams {
        SpecGlobalParams {
            path_dir_dst_default: self
                .destination_directory
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            if_date_root: self.date_root,
        }
    }
}

/// Fully loaded configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecConfig {
    /// File the configuration was read from.
    pub path_file: PathBuf,
    /// Global defaults.
    pub spec_global: SpecGlobalParams,
    /// Groups in document order.
    pub l_groups: Vec<SpecCopyGroup>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Configuration loading failure. Always fatal for the run.
#[derive(Debug, Error)]
pub enum ConfError {
    /// Configuration file does not exist.
    #[error("{} not found", path.display())]
    NotFound {
        /// Expected file location.
        path: PathBuf,
    },
    /// Configuration file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Configuration file is not valid TOML.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// A section has the wrong shape or unknown keys.
    #[error("Invalid section `{name}` in {}: {message}", path.display())]
    InvalidSection {
        /// File containing the section.
        path: PathBuf,
        /// Section name.
        name: String,
        /// What is wrong with it.
        message: String,
    },
    /// Executable location could not be determined for the default config path.
    #[error("Failed to locate executable directory: {0}")]
    ExecutableDir(#[source] io::Error),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
