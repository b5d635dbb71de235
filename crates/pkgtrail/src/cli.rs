//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use pkgtrail_pkg::{ManagerKind, ManagerSelection};
use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;
use crate::output::{DisplayTz, OutputFormat};

/// Package manager to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerChoice {
    Apt,
    Snap,
    Pip,
    Cargo,
    #[default]
    All,
}

impl ManagerChoice {
    #[must_use]
    pub fn selection(self) -> ManagerSelection {
        match self {
            ManagerChoice::Apt => ManagerSelection::Only(ManagerKind::Apt),
            ManagerChoice::Snap => ManagerSelection::Only(ManagerKind::Snap),
            ManagerChoice::Pip => ManagerSelection::Only(ManagerKind::Pip),
            ManagerChoice::Cargo => ManagerSelection::Only(ManagerKind::Cargo),
            ManagerChoice::All => ManagerSelection::All,
        }
    }
}

/// List top-level installed packages by most recent install/upgrade time
#[derive(Parser, Debug)]
#[command(name = "pkgtrail", version, about, long_about = None)]
pub struct Cli {
    /// Which package ecosystem to query [default: all]
    #[arg(short, long, value_enum)]
    pub manager: Option<ManagerChoice>,

    /// Output format [default: table]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Show only the N most recent entries (0 or negative = all)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Use local time (default)
    #[arg(long = "tz-local", conflicts_with = "no_tz")]
    pub tz_local: bool,

    /// Use UTC time
    #[arg(long = "no-tz")]
    pub no_tz: bool,

    /// Configuration file (defaults to $PKGTRAIL_CONFIG, ./pkgtrail.toml, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print per-manager counts of packages dropped for lack of a timestamp to stderr
    #[arg(long)]
    pub show_skipped: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Report settings after merging flags over config defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub selection: ManagerSelection,
    pub format: OutputFormat,
    pub limit: Option<usize>,
    pub tz: DisplayTz,
}

impl Cli {
    /// Merge explicit flags over `[report]` config values
    #[must_use]
    pub fn report_options(&self, defaults: &ReportConfig) -> ReportOptions {
        let tz = if self.no_tz {
            DisplayTz::Utc
        } else if self.tz_local || !defaults.utc {
            DisplayTz::Local
        } else {
            DisplayTz::Utc
        };

        ReportOptions {
            selection: self.manager.unwrap_or(defaults.manager).selection(),
            format: self.format.unwrap_or(defaults.format),
            limit: usize::try_from(self.limit.unwrap_or(defaults.limit))
                .ok()
                .filter(|l| *l > 0),
            tz,
        }
    }

    /// Log filter directive implied by `-v` flags
    #[must_use]
    pub fn log_level_override(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pkgtrail").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let options = parse(&[]).report_options(&ReportConfig::default());

        assert_eq!(
            options,
            ReportOptions {
                selection: ManagerSelection::All,
                format: OutputFormat::Table,
                limit: None,
                tz: DisplayTz::Local,
            }
        );
    }

    #[test]
    fn test_short_flags() {
        let options = parse(&["-m", "apt", "-f", "csv", "--limit", "3", "--no-tz"])
            .report_options(&ReportConfig::default());

        assert_eq!(options.selection, ManagerSelection::Only(ManagerKind::Apt));
        assert_eq!(options.format, OutputFormat::Csv);
        assert_eq!(options.limit, Some(3));
        assert_eq!(options.tz, DisplayTz::Utc);
    }

    #[test]
    fn test_limit_zero_is_unlimited() {
        let options = parse(&["--limit", "0"]).report_options(&ReportConfig::default());
        assert_eq!(options.limit, None);
    }

    #[test]
    fn test_negative_limit_is_unlimited() {
        let options = parse(&["--limit", "-1"]).report_options(&ReportConfig::default());
        assert_eq!(options.limit, None);

        let defaults = ReportConfig {
            limit: -5,
            ..ReportConfig::default()
        };
        assert_eq!(parse(&[]).report_options(&defaults).limit, None);
    }

    #[test]
    fn test_tz_flags_conflict() {
        let result = Cli::try_parse_from(["pkgtrail", "--tz-local", "--no-tz"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_invalid_manager_rejected() {
        assert!(Cli::try_parse_from(["pkgtrail", "--manager", "dnf"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let defaults = ReportConfig {
            manager: ManagerChoice::Pip,
            format: OutputFormat::Json,
            limit: 10,
            utc: true,
        };

        let from_config = parse(&[]).report_options(&defaults);
        assert_eq!(from_config.selection, ManagerSelection::Only(ManagerKind::Pip));
        assert_eq!(from_config.format, OutputFormat::Json);
        assert_eq!(from_config.limit, Some(10));
        assert_eq!(from_config.tz, DisplayTz::Utc);

        let overridden =
            parse(&["-m", "all", "-f", "table", "--limit", "0", "--tz-local"]).report_options(&defaults);
        assert_eq!(overridden.selection, ManagerSelection::All);
        assert_eq!(overridden.format, OutputFormat::Table);
        assert_eq!(overridden.limit, None);
        assert_eq!(overridden.tz, DisplayTz::Local);
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&[]).log_level_override(), None);
        assert_eq!(parse(&["-v"]).log_level_override(), Some("info"));
        assert_eq!(parse(&["-vvvv"]).log_level_override(), Some("trace"));
    }
}
