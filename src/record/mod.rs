//! # Structured Record
//!
//! One CSV row per recorded test outcome. The file is UTF-8 with a byte-order
//! mark and starts with a single header row. Every operation opens the file,
//! writes and closes it again, so no handle outlives a call.

use std::fmt::{self, Display};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{HarnessError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const COLUMNS: [&str; 5] = ["sequence", "description", "command", "outcome", "note"];

/// Outcome recorded for a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeTag {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "fail")]
    Fail,
    #[serde(rename = "skip")]
    Skip,
    #[serde(rename = "exceptfailure")]
    ExpectedFailure,
    #[serde(rename = "unexpectedsuccess")]
    UnexpectedSuccess,
}

impl OutcomeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeTag::Ok => "ok",
            OutcomeTag::Error => "error",
            OutcomeTag::Fail => "fail",
            OutcomeTag::Skip => "skip",
            OutcomeTag::ExpectedFailure => "exceptfailure",
            OutcomeTag::UnexpectedSuccess => "unexpectedsuccess",
        }
    }
}

impl Display for OutcomeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the record file. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    pub sequence: String,
    pub description: String,
    pub command: String,
    pub outcome: OutcomeTag,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordWriter {
    path: PathBuf,
}

impl RecordWriter {
    /// Creates the file with its header when missing; an existing file is
    /// left as is for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let writer = Self { path: path.into() };
        if !writer.path.exists() {
            writer.truncate()?;
        }
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_row(&self, row: &OutcomeRecord) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| HarnessError::io(&self.path, e))?;
        let mut writer = csv_writer(file);
        writer.serialize(row).map_err(|source| self.csv_error(source))?;
        writer.flush().map_err(|e| HarnessError::io(&self.path, e))
    }

    /// Drops every row, keeping only the header.
    pub fn truncate(&self) -> Result<()> {
        let mut file = File::create(&self.path).map_err(|e| HarnessError::io(&self.path, e))?;
        file.write_all(UTF8_BOM).map_err(|e| HarnessError::io(&self.path, e))?;
        let mut writer = csv_writer(file);
        writer.write_record(COLUMNS).map_err(|source| self.csv_error(source))?;
        writer.flush().map_err(|e| HarnessError::io(&self.path, e))
    }

    fn csv_error(&self, source: csv::Error) -> HarnessError {
        HarnessError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

fn csv_writer(file: File) -> csv::Writer<File> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(file)
}
