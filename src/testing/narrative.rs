use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{HarnessError, Result};
use crate::shell;

/// How many trailing system log lines are inspected at the end of a test.
pub const TAIL_LINES: usize = 30;

const RULE_WIDTH: usize = 35;

pub fn start_banner(description: &str, stamp: &str) -> String {
    banner(&format!("[   Start   {description}  at  {stamp}  ]"))
}

pub fn end_banner(description: &str, stamp: &str) -> String {
    banner(&format!("[   End   {description}  at  {stamp}  ]"))
}

fn banner(inner: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{rule}{inner}{rule}")
}

/// Human-readable log bracketing every test with timestamped banners and
/// carrying the system log lines that appeared while the test ran.
#[derive(Debug, Clone)]
pub struct NarrativeLog {
    path: PathBuf,
    system_log: PathBuf,
    tail_program: String,
}

impl NarrativeLog {
    pub fn new(path: impl Into<PathBuf>, system_log: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            system_log: system_log.into(),
            tail_program: "tail".to_string(),
        }
    }

    #[cfg(test)]
    fn with_tail_program(mut self, program: &str) -> Self {
        self.tail_program = program.to_string();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empties the log (creating it when needed).
    pub fn truncate(&self) -> Result<()> {
        File::create(&self.path).map_err(|e| HarnessError::io(&self.path, e))?;
        Ok(())
    }

    pub fn start(&self, description: &str, stamp: &str) -> Result<()> {
        self.append(&format!("{}\n", start_banner(description, stamp)))
    }

    /// Appends new system log lines, then the end banner and a blank line.
    ///
    /// A tailed line is only written when no whole line of the log (after
    /// trimming) equals it, so lines seen by an earlier test are not
    /// repeated. A line merely contained in a longer logged line is still
    /// written. When the system log cannot be tailed the banner is written
    /// anyway.
    pub fn end(&self, description: &str, stamp: &str) -> Result<()> {
        let lines = self.new_system_lines().unwrap_or_else(|err| {
            warn!(%err, "failed to tail system log");
            Vec::new()
        });
        let mut chunk = String::new();
        for line in lines {
            chunk.push_str(&line);
            chunk.push('\n');
        }
        chunk.push_str(&end_banner(description, stamp));
        chunk.push_str("\n\n");
        self.append(&chunk)
    }

    fn new_system_lines(&self) -> Result<Vec<String>> {
        if !self.system_log.exists() {
            debug!(path = %self.system_log.display(), "system log absent, not tailing");
            return Ok(Vec::new());
        }

        let existing = fs::read_to_string(&self.path).map_err(|e| HarnessError::io(&self.path, e))?;
        let count = TAIL_LINES.to_string();
        let system_log = self.system_log.to_string_lossy();
        let tail = shell::run_program(&self.tail_program, &["-n", count.as_str(), system_log.as_ref()])?;

        let mut seen: HashSet<&str> = existing.lines().map(str::trim).collect();
        Ok(tail
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && seen.insert(*line))
            .map(str::to_string)
            .collect())
    }

    fn append(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| HarnessError::io(&self.path, e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| HarnessError::io(&self.path, e))
    }
}
