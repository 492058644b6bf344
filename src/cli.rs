//! Command line definitions.

use clap::{Args, Parser, Subcommand};
use photopress_catalog::Scope;
use std::path::PathBuf;

/// Batch compression of catalogued site photos.
#[derive(Parser, Debug)]
#[command(name = "photopress", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to <config dir>/photopress/photopress.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate thumbnail, preview and optimized renditions for pending photos
    Compress {
        #[command(flatten)]
        scope: RequiredScope,

        /// Report what would be compressed without uploading or updating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Audit how much of the catalog has been compressed
    Verify {
        /// Only audit this project (by its UUID)
        #[arg(long, value_name = "ID")]
        project: Option<String>,
    },
}

/// Compressing everything has to be asked for explicitly.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct RequiredScope {
    /// Only compress photos in this project (by its UUID)
    #[arg(long, value_name = "ID")]
    project: Option<String>,

    /// Compress photos across every project
    #[arg(long)]
    all: bool,
}

impl From<RequiredScope> for Scope {
    fn from(args: RequiredScope) -> Self {
        match args.project {
            Some(project) => Scope::Project(project),
            None => Scope::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("photopress").chain(args.iter().copied()))
    }

    #[rstest]
    #[case::project(&["compress", "--project=1f0c"], Scope::Project("1f0c".to_string()), false)]
    #[case::project_separate_value(&["compress", "--project", "1f0c", "--dry-run"], Scope::Project("1f0c".to_string()), true)]
    #[case::all(&["compress", "--all"], Scope::All, false)]
    #[case::all_dry_run(&["compress", "--dry-run", "--all"], Scope::All, true)]
    fn test_compress_scope(#[case] args: &[&str], #[case] expected: Scope, #[case] expected_dry_run: bool) {
        let Command::Compress { scope, dry_run } = parse(args).unwrap().command else {
            panic!("expected compress");
        };
        assert_eq!(Scope::from(scope), expected);
        assert_eq!(dry_run, expected_dry_run);
    }

    #[rstest]
    #[case::no_scope(&["compress"])]
    #[case::dry_run_alone(&["compress", "--dry-run"])]
    #[case::both_scopes(&["compress", "--all", "--project=1f0c"])]
    #[case::no_command(&[])]
    fn test_usage_errors(#[case] args: &[&str]) {
        let err = parse(args).unwrap_err();
        assert!(!matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion));
    }

    #[test]
    fn test_verify_and_config() {
        let cli = parse(&["verify", "--config", "/etc/photopress.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/photopress.toml")));
        assert!(matches!(cli.command, Command::Verify { project: None }));

        let cli = parse(&["verify", "--project=1f0c"]).unwrap();
        assert!(matches!(cli.command, Command::Verify { project: Some(ref id) } if id == "1f0c"));
    }
}
