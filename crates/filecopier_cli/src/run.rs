use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use filecopier_conf::{SpecConfig, executable_dir, load_config, resolve_config_path};
use filecopier_core::{CopyGroup, SpecCopyParams, run_copy_groups};
use filecopier_log::{C_RUN_BANNER, SpecLogOptions, default_log_path, init_logging};
use tracing::{info, warn};

use crate::Cli;

pub const N_EXIT_FAILURES: u8 = 1;
pub const N_EXIT_FATAL: u8 = 2;

pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let path_file_log = match &cli.log_file {
        Some(path) => path.clone(),
        None => default_log_path(&executable_dir().context("Failed to locate log directory")?),
    };
    init_logging(&SpecLogOptions {
        path_file_log: Some(path_file_log),
        if_quiet: cli.quiet,
        if_verbose: cli.verbose,
        if_debug: cli.debug,
        ..SpecLogOptions::default()
    })
    .context("Failed to initialize logging")?;
    info!("{C_RUN_BANNER}");

    let path_config = resolve_config_path(cli.config.as_deref())?;
    let spec_config = load_config(&path_config).context("Failed to load configuration")?;
    let spec_params = cli.spec_params();

    let date_run = chrono::Local::now().date_naive();
    let mut l_groups = build_groups(spec_config, spec_params, date_run);
    if cli.print {
        for group in l_groups.iter_mut() {
            group.scan();
            print!("{}", format_manifest(group));
        }
    }

    let report_run = run_copy_groups(&mut l_groups, &spec_params);

    for group in &l_groups {
        let line = format_summary(group, spec_params.if_dry_run);
        info!(group = %group.name(), "{line}");
        if !spec_params.if_quiet {
            println!("{line}");
        }
    }
    for report in &report_run.l_reports {
        if report.error_count() > 0 {
            warn!("{report}");
        } else {
            info!("{report}");
        }
    }
    if report_run.has_failures() {
        warn!("{report_run}");
    } else {
        info!("{report_run}");
    }

    if report_run.has_failures() {
        return Ok(ExitCode::from(N_EXIT_FAILURES));
    }
    Ok(ExitCode::SUCCESS)
}

/// One `CopyGroup` per configured group, in configuration order, all dated
/// `date_run`.
pub fn build_groups(
    spec_config: SpecConfig,
    spec_params: SpecCopyParams,
    date_run: NaiveDate,
) -> Vec<CopyGroup> {
    let SpecConfig {
        spec_global,
        l_groups,
        ..
    } = spec_config;
    l_groups
        .into_iter()
        .map(|spec_group| CopyGroup::new(spec_group, spec_global.clone(), spec_params, date_run))
        .collect()
}

/// `Group <name> (<directory>): copied N files`.
pub fn format_summary(group: &CopyGroup, if_dry_run: bool) -> String {
    let path_dir = group.spec_group().path_dir_src.display();
    if if_dry_run {
        format!(
            "Group {} ({}): {} files to copy",
            group.name(),
            path_dir,
            group.number_of_files_to_copy()
        )
    } else {
        format!(
            "Group {} ({}): copied {} files",
            group.name(),
            path_dir,
            group.files_copied()
        )
    }
}

/// Manifest listing with resolved destinations, one line per destination.
pub fn format_manifest(group: &CopyGroup) -> String {
    let mut out = format!(
        "Group {} ({}): {} files\n",
        group.name(),
        group.spec_group().path_dir_src.display(),
        group.number_of_files_to_copy()
    );
    for entry in group.manifest() {
        let path_src = group.source_path(entry);
        match group.resolve_destinations(entry) {
            Ok(l_paths_dst) => {
                for path_dst in l_paths_dst {
                    let _ = writeln!(out, "  {} -> {}", path_src.display(), path_dst.display());
                }
            }
            Err(err) => {
                let _ = writeln!(out, "  {} -> ({err})", path_src.display());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::NaiveDate;
    use filecopier_conf::SpecConfig;
    use filecopier_core::{SpecCopyEntry, SpecCopyGroup, SpecCopyParams, SpecGlobalParams};
    use tempfile::TempDir;

    use super::{build_groups, format_manifest, format_summary};

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, txt).expect("write text");
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    fn config(path_src: &Path, path_dst: Option<PathBuf>) -> SpecConfig {
        SpecConfig {
            path_file: PathBuf::from("file-copier.toml"),
            spec_global: SpecGlobalParams {
                path_dir_dst_default: path_dst,
                if_date_root: false,
            },
            l_groups: vec![SpecCopyGroup::new("Docs", path_src)],
        }
    }

    #[test]
    fn manifest_lists_each_destination() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        write_text(&src.join("a.txt"), "a");

        let mut l_groups = build_groups(
            config(&src, Some(dst.clone())),
            SpecCopyParams::default(),
            date(),
        );
        let group = &mut l_groups[0];
        group.scan();
        let txt = format_manifest(group);

        assert!(txt.starts_with(&format!("Group Docs ({}): 1 files\n", src.display())));
        assert!(txt.contains(&format!(
            "  {} -> {}",
            src.join("a.txt").display(),
            dst.join("Docs").join("a.txt").display()
        )));
    }

    #[test]
    fn manifest_shows_resolution_error() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        write_text(&src.join("a.txt"), "a");

        let mut l_groups = build_groups(config(&src, None), SpecCopyParams::default(), date());
        let group = &mut l_groups[0];
        group.scan();
        assert!(format_manifest(group).contains("No destination directory configured"));
    }

    #[test]
    fn summary_reports_copied_count() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        write_text(&src.join("a.txt"), "a");
        write_text(&src.join("b.txt"), "b");

        let mut l_groups = build_groups(
            config(&src, Some(tmp.path().join("dst"))),
            SpecCopyParams::default(),
            date(),
        );
        let group = &mut l_groups[0];
        group.copy();

        assert_eq!(
            format_summary(group, false),
            format!("Group Docs ({}): copied 2 files", src.display())
        );
        assert_eq!(
            format_summary(group, true),
            format!("Group Docs ({}): 2 files to copy", src.display())
        );
    }

    #[test]
    fn every_group_shares_the_run_date() {
        let mut spec_config = config(Path::new("/src/a"), Some(PathBuf::from("/backup")));
        spec_config.spec_global.if_date_root = true;
        spec_config
            .l_groups
            .push(SpecCopyGroup::new("Photos", "/src/b"));

        let l_groups = build_groups(spec_config, SpecCopyParams::default(), date());
        let entry = SpecCopyEntry::new("x.txt", "");
        let l_paths: Vec<PathBuf> = l_groups
            .iter()
            .flat_map(|g| g.resolve_destinations(&entry).expect("resolve"))
            .collect();
        assert_eq!(
            l_paths,
            vec![
                PathBuf::from("/backup/2024-01-01/Docs/x.txt"),
                PathBuf::from("/backup/2024-01-01/Photos/x.txt"),
            ]
        );
    }
}
