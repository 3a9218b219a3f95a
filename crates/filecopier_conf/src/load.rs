//! Locating, reading and parsing the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::spec::{
    C_CONFIG_FILE_NAME, C_GLOBAL_SECTION, ConfError, SpecConfig, SpecGlobalRecord,
    SpecGroupRecord,
};

/// Directory containing the running executable.
pub fn executable_dir() -> Result<PathBuf, ConfError> {
    let path_exe = std::env::current_exe().map_err(ConfError::ExecutableDir)?;
    Ok(path_exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Configuration file location.
///
/// `None` looks next to the executable; a directory gets the default file
/// name appended; anything else is taken as the file itself.
pub fn resolve_config_path(path_user: Option<&Path>) -> Result<PathBuf, ConfError> {
    let path_base = match path_user {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => executable_dir()?,
    };
    if path_base.is_dir() {
        return Ok(path_base.join(C_CONFIG_FILE_NAME));
    }
    Ok(path_base)
}

/// Read and parse the configuration file at `path_file`.
pub fn load_config(path_file: &Path) -> Result<SpecConfig, ConfError> {
    if !path_file.is_file() {
        return Err(ConfError::NotFound {
            path: path_file.to_path_buf(),
        });
    }
    debug!(path = %path_file.display(), "Loading configuration");
    let text = fs::read_to_string(path_file).map_err(|source| ConfError::Read {
        path: path_file.to_path_buf(),
        source,
    })?;
    parse_config(&text, path_file)
}

/// Parse configuration text. `path_file` is only used in messages.
pub fn parse_config(text: &str, path_file: &Path) -> Result<SpecConfig, ConfError> {
    let table = toml::from_str::<toml::Table>(text).map_err(|source| ConfError::Parse {
        path: path_file.to_path_buf(),
        source,
    })?;

    let mut spec_config = SpecConfig {
        path_file: path_file.to_path_buf(),
        ..SpecConfig::default()
    };
    let err_section = |name: &str, message: String| ConfError::InvalidSection {
        path: path_file.to_path_buf(),
        name: name.to_string(),
        message,
    };

    for (name, value) in table {
        if !value.is_table() {
            return Err(err_section(&name, "expected a table".to_string()));
        }
        if name.eq_ignore_ascii_case(C_GLOBAL_SECTION) {
            let record: SpecGlobalRecord = value
                .try_into()
                .map_err(|e: toml::de::Error| err_section(&name, e.message().to_string()))?;
            spec_config.spec_global = record.into_spec();
            continue;
        }
        if name.trim().is_empty() {
            return Err(err_section(&name, "group name must not be empty".to_string()));
        }

        let record: SpecGroupRecord = value
            .try_into()
            .map_err(|e: toml::de::Error| err_section(&name, e.message().to_string()))?;
        let spec_group = record.into_spec(&name);
        info!(
            group = %spec_group.name_group,
            directory = %spec_group.path_dir_src.display(),
            dest_dirs = ?spec_group.l_paths_dir_dst,
            copy_subdirs = spec_group.if_copy_subdirs,
            flatten = spec_group.if_flatten,
            exclude_extensions = ?spec_group.rules_exclude.set_extensions,
            exclude_subdirs = ?spec_group.rules_exclude.set_subdirs,
            exclude_files = ?spec_group.rules_exclude.set_file_names,
            cnt_files = spec_group.l_files.len(),
            "Loaded group"
        );
        spec_config.l_groups.push(spec_group);
    }

    Ok(spec_config)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::parse_config;
    use crate::spec::ConfError;

    const C_SAMPLE: &str = r#"
[Photos]
directory = "/home/me/Pictures"
destDir = "/mnt/a, /mnt/b"
copySubdirs = true
excludeExtensions = "tmp,bak"
excludeSubdirs = ["node_modules", ".git"]
excludeFiles = "Thumbs.db"

[global]
destinationDirectory = "/backup"
dateRoot = true

[Docs]
directory = "/home/me/Documents"
noPreserveDirectoryStructure = true
files = """
taxes.pdf

resume.docx
"""
"#;

    #[test]
    fn parse_sample_keeps_order_and_splits_lists() {
        let spec_config = parse_config(C_SAMPLE, Path::new("cfg.toml")).expect("parse");
        assert_eq!(
            spec_config.spec_global.path_dir_dst_default,
            Some(PathBuf::from("/backup"))
        );
        assert!(spec_config.spec_global.if_date_root);

        let l_names: Vec<_> = spec_config
            .l_groups
            .iter()
            .map(|g| g.name_group.as_str())
            .collect();
        assert_eq!(l_names, vec!["Photos", "Docs"]);

        let photos = &spec_config.l_groups[0];
        assert_eq!(
            photos.l_paths_dir_dst,
            vec![PathBuf::from("/mnt/a"), PathBuf::from("/mnt/b")]
        );
        assert!(photos.if_copy_subdirs);
        assert!(photos.rules_exclude.set_extensions.contains("bak"));
        assert!(photos.rules_exclude.set_subdirs.contains(".git"));
        assert!(photos.rules_exclude.set_file_names.contains("Thumbs.db"));

        let docs = &spec_config.l_groups[1];
        assert_eq!(docs.l_files, vec!["taxes.pdf", "resume.docx"]);
        assert!(docs.if_flatten);
        assert!(docs.l_paths_dir_dst.is_empty());
    }

    #[test]
    fn unknown_group_key_is_rejected() {
        let err = parse_config(
            "[G]\ndirectory = \"/x\"\nexcludeSubdir = \"oops\"\n",
            Path::new("cfg.toml"),
        )
        .expect_err("must fail");
        assert!(matches!(err, ConfError::InvalidSection { ref name, .. } if name == "G"));
    }

    #[test]
    fn top_level_scalar_is_rejected() {
        let err = parse_config("stray = 1\n", Path::new("cfg.toml")).expect_err("must fail");
        assert!(matches!(err, ConfError::InvalidSection { .. }));
    }

    #[test]
    fn blank_global_destination_is_unset() {
        let spec_config = parse_config(
            "[Global]\ndestinationDirectory = \"  \"\n",
            Path::new("cfg.toml"),
        )
        .expect("parse");
        assert_eq!(spec_config.spec_global.path_dir_dst_default, None);
        assert!(spec_config.l_groups.is_empty());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = parse_config("[G\n", Path::new("cfg.toml")).expect_err("must fail");
        assert!(matches!(err, ConfError::Parse { .. }));
    }
}
