//! `filecopier_log` v1:
//! Logging setup for the `filecopier` binary.
//!
//! Two `tracing` layers: a console layer on stderr whose level follows the
//! quiet/verbose/debug switches, and an optional plain-text file layer backed
//! by a `tracing-appender` rolling file. `RUST_LOG` overrides the file
//! layer's level.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

/// Default log file name, placed next to the executable.
pub const C_LOG_FILE_NAME: &str = "FileCopier.log";
/// Rolled-over log files kept besides the live one.
pub const C_LOG_BACKUPS: usize = 9;
/// First line of every run.
pub const C_RUN_BANNER: &str = "**** Starting copy run";

/// Logging switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLogOptions {
    /// Log file; `None` disables the file layer. With a rotation other than
    /// `NEVER` the period is inserted before the extension
    /// (`FileCopier.2024-01-01.log`).
    pub path_file_log: Option<PathBuf>,
    /// No console output at all.
    pub if_quiet: bool,
    /// Console at INFO.
    pub if_verbose: bool,
    /// Console and file at DEBUG.
    pub if_debug: bool,
    /// How often the log file rolls over.
    pub rotation: Rotation,
    /// Rolled-over files kept; older ones are deleted on rollover.
    pub n_backups: usize,
}

impl Default for SpecLogOptions {
    fn default() -> Self {
        Self {
            path_file_log: None,
            if_quiet: false,
            if_verbose: false,
            if_debug: false,
            rotation: Rotation::DAILY,
            n_backups: C_LOG_BACKUPS,
        }
    }
}

impl SpecLogOptions {
    /// Console level; `None` when quiet.
    pub fn console_level(&self) -> Option<LevelFilter> {
        if self.if_quiet {
            None
        } else if self.if_debug {
            Some(LevelFilter::DEBUG)
        } else if self.if_verbose {
            Some(LevelFilter::INFO)
        } else {
            Some(LevelFilter::WARN)
        }
    }

    /// Default file level when `RUST_LOG` is unset.
    pub fn file_level(&self) -> LevelFilter {
        if self.if_debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }
}

/// Logging could not be set up. Fatal for the run.
#[derive(Debug, Error)]
pub enum LogError {
    /// Log directory could not be created.
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Rolling log file could not be opened.
    #[error("Failed to open log file {}: {source}", path.display())]
    Open {
        /// Configured log file.
        path: PathBuf,
        /// Appender initialization error.
        #[source]
        source: InitError,
    },
    /// A global subscriber is already installed.
    #[error("Failed to install log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// `C_LOG_FILE_NAME` under `path_dir`.
pub fn default_log_path(path_dir: &Path) -> PathBuf {
    path_dir.join(C_LOG_FILE_NAME)
}

/// Rolling appender writing to `path_file`; its stem and extension become
/// the appender's file name prefix and suffix.
pub fn build_file_appender(
    path_file: &Path,
    rotation: Rotation,
    n_backups: usize,
) -> Result<RollingFileAppender, LogError> {
    let path_dir = match path_file.parent() {
        Some(path_parent) if !path_parent.as_os_str().is_empty() => path_parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&path_dir).map_err(|source| LogError::CreateDir {
        path: path_dir.clone(),
        source,
    })?;

    let c_prefix = path_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "FileCopier".to_string());
    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(c_prefix)
        .max_log_files(n_backups + 1);
    if let Some(ext) = path_file.extension() {
        builder = builder.filename_suffix(ext.to_string_lossy().into_owned());
    }
    builder.build(&path_dir).map_err(|source| LogError::Open {
        path: path_file.to_path_buf(),
        source,
    })
}

/// Install the global subscriber. Call once per process.
pub fn init_logging(spec_log: &SpecLogOptions) -> Result<(), LogError> {
    let layer_console = spec_log.console_level().map(|level| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_filter(level)
    });

    let layer_file = match &spec_log.path_file_log {
        Some(path_file) => {
            let appender =
                build_file_appender(path_file, spec_log.rotation.clone(), spec_log.n_backups)?;
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(spec_log.file_level().to_string()));
            Some(
                fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layer_console)
        .with(layer_file)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use tempfile::TempDir;
    use tracing_appender::rolling::Rotation;
    use tracing_subscriber::filter::LevelFilter;

    use super::{C_LOG_BACKUPS, SpecLogOptions, build_file_appender};

    fn l_names(path_dir: &Path) -> Vec<String> {
        let mut l_out: Vec<String> = std::fs::read_dir(path_dir)
            .expect("read dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        l_out.sort();
        l_out
    }

    #[test]
    fn console_level_follows_switches() {
        let base = SpecLogOptions::default();
        assert_eq!(base.console_level(), Some(LevelFilter::WARN));
        assert_eq!(
            SpecLogOptions { if_verbose: true, ..base.clone() }.console_level(),
            Some(LevelFilter::INFO)
        );
        assert_eq!(
            SpecLogOptions { if_verbose: true, if_debug: true, ..base.clone() }.console_level(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            SpecLogOptions { if_quiet: true, if_debug: true, ..base.clone() }.console_level(),
            None
        );
    }

    #[test]
    fn file_defaults() {
        let base = SpecLogOptions::default();
        assert_eq!(base.file_level(), LevelFilter::INFO);
        assert_eq!(base.rotation, Rotation::DAILY);
        assert_eq!(base.n_backups, C_LOG_BACKUPS);
    }

    #[test]
    fn never_rotation_writes_configured_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path_log = tmp.path().join("logs/run.log");

        let mut appender = build_file_appender(&path_log, Rotation::NEVER, 2).expect("appender");
        appender.write_all(b"hello\n").expect("write");
        appender.flush().expect("flush");

        assert_eq!(std::fs::read_to_string(&path_log).expect("read"), "hello\n");
    }

    #[test]
    fn daily_rotation_inserts_date_before_extension() {
        let tmp = TempDir::new().expect("tempdir");
        let path_log = tmp.path().join("run.log");

        let mut appender = build_file_appender(&path_log, Rotation::DAILY, 9).expect("appender");
        appender.write_all(b"line\n").expect("write");
        appender.flush().expect("flush");

        let l_files = l_names(tmp.path());
        assert_eq!(l_files.len(), 1);
        assert!(l_files[0].starts_with("run."));
        assert!(l_files[0].ends_with(".log"));
        assert_ne!(l_files[0], "run.log");
    }
}
