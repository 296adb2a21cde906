//! Run-scoped report context.
//!
//! A [`Report`] owns the output sink and the aggregate verdict for exactly one
//! run. Every check writes one `OK`/`FAIL` line through it and the same line is
//! kept as a [`CheckRecord`] for the optional JSON summary.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::util::{now_utc_iso, write_string};

const VERDICT_RULE_WIDTH: usize = 50;
pub const ALL_PASSED: &str = "ALL HOVER CHECKS PASSED";
pub const SOME_FAILED: &str = "SOME HOVER CHECKS FAILED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRecord {
    pub section: String,
    pub status: CheckStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub passed: bool,
    pub ok_count: usize,
    pub fail_count: usize,
    pub checks: Vec<CheckRecord>,
}

impl RunSummary {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.passed { 0 } else { 1 }
    }

    /// Summary for a run that stopped before any section completed.
    #[must_use]
    pub fn aborted(section: &str, message: impl Into<String>) -> Self {
        Self {
            generated_at: now_utc_iso(),
            passed: false,
            ok_count: 0,
            fail_count: 1,
            checks: vec![CheckRecord {
                section: section.to_string(),
                status: CheckStatus::Fail,
                message: message.into(),
            }],
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_string(path, &serde_json::to_string_pretty(self)?)
    }
}

pub struct Report<W: Write> {
    out: W,
    section: String,
    sections_written: usize,
    records: Vec<CheckRecord>,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            section: String::new(),
            sections_written: 0,
            records: Vec::new(),
        }
    }

    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.sections_written > 0 {
            writeln!(self.out)?;
        }
        writeln!(self.out, "--- {title} ---")?;
        self.section = title.to_string();
        self.sections_written += 1;
        Ok(())
    }

    pub fn ok(&mut self, message: impl Into<String>) -> Result<()> {
        self.record(CheckStatus::Ok, message.into())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.record(CheckStatus::Fail, message.into())
    }

    pub fn check(&mut self, passed: bool, message: impl Into<String>) -> Result<()> {
        if passed {
            self.ok(message)
        } else {
            self.fail(message)
        }
    }

    fn record(&mut self, status: CheckStatus, message: String) -> Result<()> {
        match status {
            CheckStatus::Ok => writeln!(self.out, "  OK:   {message}")?,
            CheckStatus::Fail => writeln!(self.out, "  FAIL: {message}")?,
        }
        self.records.push(CheckRecord {
            section: self.section.clone(),
            status,
            message,
        });
        Ok(())
    }

    /// Unindented failure line for conditions that stop the run before any
    /// section starts.
    pub fn abort(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "FAIL: {message}")?;
        self.out.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.records
            .iter()
            .all(|record| record.status == CheckStatus::Ok)
    }

    /// Write the aggregate verdict and hand back the summary.
    pub fn finish(mut self) -> Result<RunSummary> {
        let passed = self.passed();
        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(VERDICT_RULE_WIDTH))?;
        writeln!(self.out, "{}", if passed { ALL_PASSED } else { SOME_FAILED })?;
        self.out.flush()?;

        let fail_count = self
            .records
            .iter()
            .filter(|record| record.status == CheckStatus::Fail)
            .count();
        Ok(RunSummary {
            generated_at: now_utc_iso(),
            passed,
            ok_count: self.records.len() - fail_count,
            fail_count,
            checks: self.records,
        })
    }
}
