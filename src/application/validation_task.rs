//! # Validation Task
//!
//! Asserts a minimal data-quality invariant on a table after a load, the
//! way the warehouse exercises check every staging table: fetch one scalar
//! (row count by default), compare it against an explicit threshold, and
//! fail the run loudly if the comparison does not hold.
//!
//! A failed check is always fatal for the invocation. There is no retry
//! and no recovery here; the caller decides what a failed step means for
//! the rest of the pipeline.

use crate::domain::context::RunContext;
use crate::domain::entities::{CheckExpr, CheckResult, CheckStatus, TableRef, TaskReport, Threshold};
use crate::domain::errors::{PipelineError, Result};
use crate::ports::task_port::{PipelineEnv, Task};
use crate::sql_builder;
use log::{error, info};
use std::time::Instant;

/// Runs a scalar check against a table and compares it to a threshold.
#[derive(Debug)]
pub struct ValidationTask {
    name: String,
    table: TableRef,
    check: CheckExpr,
    threshold: Threshold,
}

impl ValidationTask {
    pub fn new(name: &str, table: TableRef, check: CheckExpr, threshold: Threshold) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "validation task requires a name".to_string(),
            ));
        }
        if let CheckExpr::Scalar(sql) = &check {
            if sql.trim().is_empty() {
                return Err(PipelineError::Configuration(format!(
                    "validation task '{}' has an empty check query",
                    name
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            table,
            check,
            threshold,
        })
    }

    /// Executes the check query and resolves the outcome.
    ///
    /// Split out from `execute` so callers (and tests) can observe the
    /// full `CheckResult`, not just the report.
    pub fn run_check(&self, env: &PipelineEnv) -> Result<CheckResult> {
        let mut session = env.connections.acquire(self.table.connection_id())?;

        let sql = match &self.check {
            CheckExpr::RowCount => sql_builder::row_count(&self.table),
            CheckExpr::Scalar(query) => query.clone(),
        };

        let pending = CheckResult::pending(self.table.name(), self.threshold);
        let observed = session.fetch_scalar(&sql).map_err(|e| {
            PipelineError::DataQuality {
                table: self.table.to_string(),
                reason: format!("check query failed: {}", e),
            }
        })?;

        let result = pending.resolve(observed);
        match result.status {
            CheckStatus::Passed => {
                info!(
                    "Data quality check on {} passed with observed value {} (required {})",
                    self.table,
                    result.observed.unwrap_or_default(),
                    self.threshold
                );
                Ok(result)
            }
            _ => {
                error!(
                    "Data quality check on {} failed: {}",
                    self.table,
                    result.describe()
                );
                Err(PipelineError::DataQuality {
                    table: self.table.to_string(),
                    reason: result.describe(),
                })
            }
        }
    }
}

impl Task for ValidationTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &RunContext, env: &PipelineEnv) -> Result<TaskReport> {
        let started = Instant::now();
        let result = self.run_check(env)?;
        Ok(TaskReport::new(
            &self.name,
            self.table.name(),
            result.observed,
            started.elapsed().as_secs_f64(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{failing_env, recording_env};
    use crate::domain::entities::CheckStatus;
    use chrono::NaiveDate;

    fn ctx() -> RunContext {
        RunContext::new(
            NaiveDate::from_ymd_opt(2018, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn check_trips(threshold: Threshold) -> ValidationTask {
        ValidationTask::new(
            "check_trips",
            TableRef::new("redshift", "trips").unwrap(),
            CheckExpr::RowCount,
            threshold,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_name_fails_at_construction() {
        let err = ValidationTask::new(
            "",
            TableRef::new("redshift", "trips").unwrap(),
            CheckExpr::RowCount,
            Threshold::GreaterThan(0),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_empty_scalar_check_fails_at_construction() {
        let err = ValidationTask::new(
            "check",
            TableRef::new("redshift", "trips").unwrap(),
            CheckExpr::Scalar("  ".to_string()),
            Threshold::GreaterThan(0),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_zero_rows_fails_referencing_table() {
        let (env, _calls) = recording_env(Some(0));
        let err = check_trips(Threshold::GreaterThan(0))
            .execute(&ctx(), &env)
            .unwrap_err();
        match err {
            PipelineError::DataQuality { table, reason } => {
                assert_eq!(table, "trips");
                assert!(reason.contains("observed 0"));
                assert!(reason.contains("> 0"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_result_set_fails_referencing_table() {
        let (env, _calls) = recording_env(None);
        let err = check_trips(Threshold::GreaterThan(0))
            .execute(&ctx(), &env)
            .unwrap_err();
        match err {
            PipelineError::DataQuality { table, reason } => {
                assert_eq!(table, "trips");
                assert!(reason.contains("no rows"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_positive_count_passes_and_records_observed_value() {
        let (env, calls) = recording_env(Some(500));
        let task = check_trips(Threshold::GreaterThan(0));

        let result = task.run_check(&env).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
        assert_eq!(result.observed, Some(500));
        assert_eq!(result.threshold, Threshold::GreaterThan(0));

        let report = task.execute(&ctx(), &env).unwrap();
        assert_eq!(report.rows, Some(500));
        assert_eq!(report.table, "trips");

        assert!(calls
            .statements()
            .iter()
            .all(|sql| sql == "SELECT COUNT(*) FROM \"trips\""));
    }

    #[test]
    fn test_count_below_explicit_threshold_fails() {
        let (env, _calls) = recording_env(Some(3));
        let err = check_trips(Threshold::AtLeast(10))
            .execute(&ctx(), &env)
            .unwrap_err();
        match err {
            PipelineError::DataQuality { reason, .. } => {
                assert!(reason.contains("observed 3"));
                assert!(reason.contains(">= 10"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_query_error_surfaces_as_data_quality_failure() {
        let (env, calls) = recording_env(Some(500));
        calls.fail_fetch("relation \"trips\" does not exist");

        let err = check_trips(Threshold::GreaterThan(0))
            .execute(&ctx(), &env)
            .unwrap_err();
        match err {
            PipelineError::DataQuality { table, reason } => {
                assert_eq!(table, "trips");
                assert!(reason.contains("does not exist"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_connection_failure_prevents_check_query() {
        let (env, calls) = failing_env();
        let err = check_trips(Threshold::GreaterThan(0))
            .execute(&ctx(), &env)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Connection { .. }));
        assert!(calls.statements().is_empty());
    }

    #[test]
    fn test_custom_scalar_check_uses_given_query() {
        let (env, calls) = recording_env(Some(0));
        let task = ValidationTask::new(
            "check_null_ids",
            TableRef::new("redshift", "trips").unwrap(),
            CheckExpr::Scalar("SELECT COUNT(*) FROM \"trips\" WHERE \"bikeid\" IS NULL".to_string()),
            Threshold::Equals(0),
        )
        .unwrap();

        let result = task.run_check(&env).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
        assert!(calls.statements()[0].contains("WHERE \"bikeid\" IS NULL"));
    }
}
