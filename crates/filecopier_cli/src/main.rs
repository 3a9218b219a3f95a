use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use filecopier_core::{EnumCopyCompareMode, SpecCopyParams};

mod run;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CompareArg {
    /// Size and modification time
    Shallow,
    /// Full file contents
    Deep,
}

impl From<CompareArg> for EnumCopyCompareMode {
    fn from(value: CompareArg) -> Self {
        match value {
            CompareArg::Shallow => Self::Shallow,
            CompareArg::Deep => Self::Deep,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "filecopier")]
#[command(about = "Copy configured groups of files, skipping what is already up to date")]
#[command(version)]
struct Cli {
    /// Configuration file, or a directory containing file-copier.toml
    /// (default: the executable's directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scan only; copy nothing
    #[arg(short = 'n', long)]
    no_copy: bool,

    /// Print every file to copy with its destination(s)
    #[arg(short, long)]
    print: bool,

    /// Verify every destination after copying
    #[arg(short = 'r', long)]
    verify: bool,

    /// Verify by comparing full contents (implies --verify)
    #[arg(long)]
    deep_verify: bool,

    /// How an existing destination is judged up to date
    #[arg(long, value_enum, default_value_t = CompareArg::Shallow)]
    compare: CompareArg,

    /// No console output except --print listings
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Report excluded entries and copied files on the console
    #[arg(short, long)]
    verbose: bool,

    /// Debug diagnostics on the console and in the log file
    #[arg(long)]
    debug: bool,

    /// Log file (default: FileCopier.log next to the executable)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn spec_params(&self) -> SpecCopyParams {
        SpecCopyParams {
            if_verify: self.verify || self.deep_verify,
            if_deep_verify: self.deep_verify,
            if_quiet: self.quiet,
            if_verbose: self.verbose,
            if_debug: self.debug,
            if_dry_run: self.no_copy,
            rule_compare: self.compare.into(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run::run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(run::N_EXIT_FATAL)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use filecopier_core::EnumCopyCompareMode;

    use super::Cli;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_flags_map_to_params() {
        let cli = Cli::try_parse_from(["filecopier", "-n", "-r", "-v", "-c", "/etc/fc"])
            .expect("parse");
        let spec_params = cli.spec_params();
        assert!(spec_params.if_dry_run);
        assert!(spec_params.if_verify);
        assert!(!spec_params.if_deep_verify);
        assert!(spec_params.if_verbose);
        assert_eq!(spec_params.rule_compare, EnumCopyCompareMode::Shallow);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/etc/fc")));
    }

    #[test]
    fn deep_verify_implies_verify() {
        let cli = Cli::try_parse_from(["filecopier", "--deep-verify", "--compare", "deep"])
            .expect("parse");
        let spec_params = cli.spec_params();
        assert!(spec_params.if_verify);
        assert!(spec_params.if_deep_verify);
        assert_eq!(spec_params.rule_compare, EnumCopyCompareMode::Deep);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["filecopier", "-q", "-v"]).is_err());
    }
}
