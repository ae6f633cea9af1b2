//! Shared CLI definitions for storeviz.
//!
//! Used by the main application and by the build script (manpage).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Upload formats the dashboard accepts.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook (.xlsx)
    Excel,
}

impl FileFormat {
    /// Detect upload format from path extension. Returns None when extension is missing or not accepted.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "csv", "xlsx").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Extensions shown in the upload prompt.
    pub fn accepted_extensions() -> &'static [&'static str] {
        &["csv", "xlsx"]
    }
}

/// Command-line arguments for storeviz
#[derive(Clone, Parser, Debug)]
#[command(
    name = "storeviz",
    version,
    about = "Store data dashboard in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// CSV or Excel (.xlsx) file to upload on startup. Without it the dashboard starts empty.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Enable debug mode: status line with event counters and a log file in the cache directory
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write logs to this file (implies logging even without --debug)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Clear all cache data (upload history, logs) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/storeviz/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Maximum number of rows fed to the bar and line charts (overrides config [chart] row_limit)
    #[arg(long = "chart-row-limit", value_name = "N")]
    pub chart_row_limit: Option<usize>,
}

impl Args {
    /// Build the clap command (used for the manpage).
    pub fn command_for_docs() -> clap::Command {
        Self::command()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("sales.csv")),
            Some(FileFormat::Csv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("SALES.XLSX")),
            Some(FileFormat::Excel)
        );
        assert_eq!(FileFormat::from_path(Path::new("sales.xls")), None);
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_args_path_is_optional() {
        let args = Args::parse_from(["storeviz"]);
        assert!(args.path.is_none());
        assert!(!args.debug);

        let args = Args::parse_from(["storeviz", "store.csv", "--debug"]);
        assert_eq!(args.path, Some(PathBuf::from("store.csv")));
        assert!(args.debug);
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["storeviz", "--force"]).is_err());
        assert!(Args::try_parse_from(["storeviz", "--generate-config", "--force"]).is_ok());
    }

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }
}
