//! Run-gate policies deciding whether a finished analysis aborts the build
//!
//! These are the two consumers of resolved configuration sitting at the
//! boundary to the rule-execution engine: they read values from the `build`
//! sub-tree and judge an [`IssueSummary`] after all rules have run.

use serde::Serialize;

use super::{Config, ConfigExt};
use crate::error::LintelError;
use crate::result::Result;

/// Severity of a reported issue, as counted by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

/// Aggregate issue counts handed over by the rule-execution engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueSummary {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }

    fn count_at_or_above(&self, severity: IssueSeverity) -> usize {
        match severity {
            IssueSeverity::Error => self.errors,
            IssueSeverity::Warning => self.errors + self.warnings,
            IssueSeverity::Info => self.total(),
        }
    }
}

/// Aborts the run when the total issue count exceeds `build > maxIssues`.
///
/// A negative maximum disables the gate entirely.
#[derive(Debug, Clone, Copy)]
pub struct MaxIssuePolicy {
    max: i64,
}

impl MaxIssuePolicy {
    pub fn from_config(config: &dyn Config) -> Result<Self> {
        let max = config
            .sub_config("build")
            .value_or_default("maxIssues", 0i64)?;
        Ok(Self { max })
    }

    pub fn check(&self, summary: &IssueSummary) -> Result<()> {
        let found = summary.total();
        if self.max >= 0 && found as i64 > self.max {
            return Err(LintelError::MaxIssuesReached {
                found,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Aborts the run when issues at or above a severity threshold exist,
/// read from `build > failOnSeverity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Never,
    FailOn(IssueSeverity),
}

impl FailurePolicy {
    pub fn from_config(config: &dyn Config) -> Result<Self> {
        let value: String = config
            .sub_config("build")
            .value_or_default("failOnSeverity", "error".to_string())?;
        match value.to_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "info" => Ok(Self::FailOn(IssueSeverity::Info)),
            "warning" => Ok(Self::FailOn(IssueSeverity::Warning)),
            "error" => Ok(Self::FailOn(IssueSeverity::Error)),
            _ => Err(LintelError::UnknownSeverityPolicy { value }),
        }
    }

    pub fn should_fail(&self, summary: &IssueSummary) -> bool {
        match self {
            Self::Never => false,
            Self::FailOn(threshold) => summary.count_at_or_above(*threshold) > 0,
        }
    }
}
