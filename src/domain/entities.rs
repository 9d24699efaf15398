//! # Domain Entities
//!
//! Entities are the "Nouns" of the pipeline toolkit: tables, source
//! locations, copy formats, thresholds, and the result records produced by
//! a run.
//!
//! We use the `serde` crate (Serialize/Deserialize) so these structs can be
//! read straight out of a YAML or JSON pipeline definition.

use crate::domain::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `TableRef` names a warehouse table together with the connection that
/// owns it. The table identifier is validated on construction so that no
/// unchecked text is ever spliced into a statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableRef {
    connection_id: String,
    table: String,
}

impl TableRef {
    pub fn new(connection_id: &str, table: &str) -> Result<Self> {
        if connection_id.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "table reference requires a connection identifier".to_string(),
            ));
        }
        crate::sql_builder::validate_table_name(table)?;
        Ok(Self {
            connection_id: connection_id.to_string(),
            table: table.to_string(),
        })
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn name(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)
    }
}

/// `SourceLocation` is an object-storage address: a bucket plus a key
/// pattern. The key may contain run-scoped placeholders such as `{year}`
/// and `{month}` which are substituted from the run context right before
/// the load executes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceLocation {
    pub bucket: String,
    pub key: String,
}

impl SourceLocation {
    pub fn new(bucket: &str, key: &str) -> Result<Self> {
        if bucket.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "source location requires a bucket".to_string(),
            ));
        }
        if key.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "source location requires a key".to_string(),
            ));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// Renders the full object URI with every placeholder in the key
    /// substituted from `ctx`. An unbound placeholder is a configuration
    /// error and is raised before any session is acquired.
    pub fn render(&self, ctx: &crate::domain::context::RunContext) -> Result<String> {
        let key = crate::domain::context::render_template(&self.key, ctx)?;
        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}

/// `CopyFormat` tells the warehouse how to parse the staged objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CopyFormat {
    /// Delimited text with an optional header to skip.
    Csv {
        #[serde(default = "default_ignore_header")]
        ignore_header: u32,
        #[serde(default = "default_delimiter")]
        delimiter: char,
    },
    /// Newline-delimited JSON, either auto-mapped or driven by a
    /// jsonpaths manifest object.
    Json {
        #[serde(default)]
        jsonpaths: Option<String>,
    },
}

fn default_ignore_header() -> u32 {
    1
}

fn default_delimiter() -> char {
    ','
}

impl Default for CopyFormat {
    fn default() -> Self {
        CopyFormat::Csv {
            ignore_header: default_ignore_header(),
            delimiter: default_delimiter(),
        }
    }
}

impl fmt::Display for CopyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyFormat::Csv { .. } => write!(f, "CSV"),
            CopyFormat::Json { .. } => write!(f, "JSON"),
        }
    }
}

/// `Threshold` is the comparison a data-quality check must satisfy. It is
/// always an explicit parameter of the check; there is no implicit
/// "more than zero" default hiding anywhere.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    GreaterThan(i64),
    AtLeast(i64),
    Equals(i64),
}

impl Threshold {
    pub fn passes(&self, observed: i64) -> bool {
        match self {
            Threshold::GreaterThan(n) => observed > *n,
            Threshold::AtLeast(n) => observed >= *n,
            Threshold::Equals(n) => observed == *n,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::GreaterThan(n) => write!(f, "> {}", n),
            Threshold::AtLeast(n) => write!(f, ">= {}", n),
            Threshold::Equals(n) => write!(f, "== {}", n),
        }
    }
}

/// `CheckExpr` selects what scalar a validation task observes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckExpr {
    /// `SELECT COUNT(*)` on the checked table.
    #[default]
    RowCount,
    /// An arbitrary query returning a single scalar in its first column.
    Scalar(String),
}

/// Terminal states of a data-quality check. A check starts `Pending` and
/// ends `Passed` or `Failed`; there are no intermediate states.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum CheckStatus {
    Pending,
    Passed,
    Failed,
}

/// `CheckResult` is the outcome of one data-quality check: the observed
/// scalar and the threshold it was compared against. It lives only for the
/// duration of a single validation invocation.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub table: String,
    pub observed: Option<i64>,
    pub threshold: Threshold,
    pub status: CheckStatus,
}

impl CheckResult {
    /// A check that has not observed its scalar yet.
    pub fn pending(table: &str, threshold: Threshold) -> Self {
        Self {
            table: table.to_string(),
            observed: None,
            threshold,
            status: CheckStatus::Pending,
        }
    }

    /// Resolves the pending check against the observed scalar (or the
    /// absence of one). The outcome is terminal.
    pub fn resolve(mut self, observed: Option<i64>) -> Self {
        self.observed = observed;
        self.status = match observed {
            Some(value) if self.threshold.passes(value) => CheckStatus::Passed,
            _ => CheckStatus::Failed,
        };
        self
    }

    /// One-line description used when the failure is surfaced to the
    /// scheduler log.
    pub fn describe(&self) -> String {
        match self.observed {
            Some(v) => format!("observed {}, required {}", v, self.threshold),
            None => format!("check returned no rows (required {})", self.threshold),
        }
    }
}

/// `StorageCredentials` authorize the warehouse to read from object
/// storage during a bulk copy.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// `WarehouseConnection` describes how to reach a warehouse endpoint. The
/// password may be left out of the definition file and supplied through
/// the environment at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseConnection {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
}

/// `TaskReport` is the "Report Card" for a completed task invocation.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task: String,
    pub table: String,
    /// Observed row count where the task has one (validation checks).
    pub rows: Option<i64>,
    /// How long the invocation took (in seconds).
    pub duration: f64,
}

impl TaskReport {
    pub fn new(task: &str, table: &str, rows: Option<i64>, duration: f64) -> Self {
        Self {
            task: task.to_string(),
            table: table.to_string(),
            rows,
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ref_rejects_empty_name() {
        assert!(TableRef::new("redshift", "").is_err());
        assert!(TableRef::new("", "trips").is_err());
        assert!(TableRef::new("redshift", "trips").is_ok());
    }

    #[test]
    fn test_threshold_comparisons() {
        assert!(Threshold::GreaterThan(0).passes(1));
        assert!(!Threshold::GreaterThan(0).passes(0));
        assert!(Threshold::AtLeast(5).passes(5));
        assert!(!Threshold::AtLeast(5).passes(4));
        assert!(Threshold::Equals(3).passes(3));
        assert!(!Threshold::Equals(3).passes(2));
    }

    #[test]
    fn test_check_result_resolves_to_terminal_state() {
        let pending = CheckResult::pending("trips", Threshold::GreaterThan(0));
        assert_eq!(pending.status, CheckStatus::Pending);

        let passed = CheckResult::pending("trips", Threshold::GreaterThan(0)).resolve(Some(500));
        assert_eq!(passed.status, CheckStatus::Passed);
        assert_eq!(passed.observed, Some(500));

        let failed = CheckResult::pending("trips", Threshold::GreaterThan(0)).resolve(Some(0));
        assert_eq!(failed.status, CheckStatus::Failed);
        assert_eq!(failed.describe(), "observed 0, required > 0");

        let empty = CheckResult::pending("trips", Threshold::GreaterThan(0)).resolve(None);
        assert_eq!(empty.status, CheckStatus::Failed);
        assert!(empty.describe().contains("no rows"));
    }

    #[test]
    fn test_copy_format_default_is_csv_with_header() {
        match CopyFormat::default() {
            CopyFormat::Csv {
                ignore_header,
                delimiter,
            } => {
                assert_eq!(ignore_header, 1);
                assert_eq!(delimiter, ',');
            }
            other => panic!("unexpected default format: {:?}", other),
        }
    }
}
