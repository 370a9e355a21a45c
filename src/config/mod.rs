//! # Harness Configuration
//!
//! Everything a run needs to know up front: where the narrative log and the
//! record file go, which system log to tail, how to reach the API, and how
//! verbose the terminal output is.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use crate::auth::BearerToken;
use crate::error::{HarnessError, Result};

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_RECORD_DIR: &str = "result_csv";
pub const DEFAULT_SYSTEM_LOG: &str = "/var/log/messages";
pub const TEST_CONFIG_DIR: &str = "configs";
pub const DEFAULT_RUN_NAME: &str = "test_cmd";

/// Whether terminal output is colored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

impl Color {
    pub fn should_colorize(self) -> bool {
        match self {
            Color::Auto => std::io::stderr().is_terminal(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base directory all other relative locations hang off.
    pub work_dir: PathBuf,
    pub log_dir: String,
    pub record_dir: String,
    /// Stem of the narrative log and record file names.
    pub run_name: String,
    /// Tailed at the end of every test; skipped when absent.
    pub system_log: PathBuf,
    pub verbose: bool,
    pub color: Color,
    /// `host[:port]` of the management API.
    pub api_host: Option<String>,
    pub token: Option<BearerToken>,
    /// Applies to GET requests; mutating calls carry their own timeout.
    pub http_timeout: Option<Duration>,
    pub failfast: bool,
    /// Only tests whose `suite::name` contains this string are run.
    pub filter: Option<String>,
}

impl HarnessConfig {
    pub fn new(work_dir: impl Into<PathBuf>, run_name: impl Into<String>) -> Self {
        let run_name = run_name.into();
        Self {
            work_dir: work_dir.into(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            record_dir: DEFAULT_RECORD_DIR.to_string(),
            run_name: if run_name.trim().is_empty() {
                DEFAULT_RUN_NAME.to_string()
            } else {
                run_name
            },
            system_log: PathBuf::from(DEFAULT_SYSTEM_LOG),
            verbose: true,
            color: Color::Auto,
            api_host: None,
            token: None,
            http_timeout: None,
            failfast: false,
            filter: None,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.work_dir.join(&self.log_dir).join(format!("{}.log", self.run_name))
    }

    pub fn record_path(&self) -> PathBuf {
        self.work_dir.join(&self.record_dir).join(format!("{}.csv", self.run_name))
    }

    /// Creates the log and record directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.log_dir, &self.record_dir] {
            let path = self.work_dir.join(dir);
            fs::create_dir_all(&path).map_err(|e| HarnessError::io(&path, e))?;
        }
        Ok(())
    }

    /// Directory for files tests produce along the way, created on demand.
    pub fn test_config_dir(&self) -> Result<PathBuf> {
        let path = self.work_dir.join(TEST_CONFIG_DIR);
        fs::create_dir_all(&path).map_err(|e| HarnessError::io(&path, e))?;
        Ok(path)
    }
}

/// Derives a run name from a program path: `/x/y/test_pool.rs` → `test_pool`.
pub fn run_name_from(program: &Path) -> String {
    program
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_RUN_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_run_name() {
        let config = HarnessConfig::new("/work", "test_pool");
        assert_eq!(config.log_path(), PathBuf::from("/work/logs/test_pool.log"));
        assert_eq!(config.record_path(), PathBuf::from("/work/result_csv/test_pool.csv"));
    }

    #[test]
    fn blank_run_name_falls_back() {
        let config = HarnessConfig::new("/work", "");
        assert_eq!(config.run_name, DEFAULT_RUN_NAME);
    }

    #[test]
    fn run_name_is_first_dot_segment() {
        assert_eq!(run_name_from(Path::new("/usr/bin/test_pool.tar.gz")), "test_pool");
        assert_eq!(run_name_from(Path::new("restcase")), "restcase");
        assert_eq!(run_name_from(Path::new("")), DEFAULT_RUN_NAME);
    }

    #[test]
    fn ensure_dirs_creates_both() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::new(dir.path(), "run");
        config.ensure_dirs().unwrap();
        assert!(dir.path().join("logs").is_dir());
        assert!(dir.path().join("result_csv").is_dir());
    }

    #[test]
    fn test_config_dir_is_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::new(dir.path(), "run");
        let path = config.test_config_dir().unwrap();
        assert_eq!(path, dir.path().join("configs"));
        assert!(path.is_dir());
    }

    #[test]
    fn explicit_color_choices() {
        assert!(Color::Always.should_colorize());
        assert!(!Color::Never.should_colorize());
    }
}
