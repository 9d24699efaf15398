//! # Facts Task
//!
//! Materializes a summary table from an origin table: MIN, MAX and AVG of
//! one fact column, grouped by one dimension column. The destination is
//! dropped and recreated on every run, so the task is idempotent.
//!
//! The drop and the create are one retried-together unit. If the create
//! fails after the drop succeeded, a retry rebuilds the table from
//! scratch; nothing downstream should read the destination mid-run.

use crate::domain::context::RunContext;
use crate::domain::entities::{TableRef, TaskReport};
use crate::domain::errors::{PipelineError, Result};
use crate::ports::task_port::{PipelineEnv, Task};
use crate::sql_builder;
use log::info;
use std::time::Instant;

/// Rebuilds a grouped MIN/MAX/AVG summary of an origin table.
#[derive(Debug)]
pub struct FactsTask {
    name: String,
    origin: TableRef,
    destination: TableRef,
    fact_column: String,
    groupby_column: String,
}

impl FactsTask {
    pub fn new(
        name: &str,
        origin: TableRef,
        destination: TableRef,
        fact_column: &str,
        groupby_column: &str,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "facts task requires a name".to_string(),
            ));
        }
        if origin.connection_id() != destination.connection_id() {
            return Err(PipelineError::Configuration(format!(
                "facts task '{}' must read and write through the same connection",
                name
            )));
        }
        sql_builder::validate_identifier(fact_column)?;
        sql_builder::validate_identifier(groupby_column)?;
        Ok(Self {
            name: name.to_string(),
            origin,
            destination,
            fact_column: fact_column.to_string(),
            groupby_column: groupby_column.to_string(),
        })
    }
}

impl Task for FactsTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &RunContext, env: &PipelineEnv) -> Result<TaskReport> {
        let started = Instant::now();
        let mut session = env.connections.acquire(self.destination.connection_id())?;

        info!(
            "Rebuilding {} from {} (fact: {}, grouped by {})",
            self.destination, self.origin, self.fact_column, self.groupby_column
        );

        session
            .execute(&sql_builder::drop_table_if_exists(&self.destination))
            .map_err(|e| PipelineError::Load {
                table: self.destination.to_string(),
                reason: format!("drop failed: {}", e),
            })?;

        let create_sql = sql_builder::create_facts_table(
            &self.destination,
            &self.origin,
            &self.fact_column,
            &self.groupby_column,
        );
        session.execute(&create_sql).map_err(|e| PipelineError::Load {
            table: self.destination.to_string(),
            reason: e.to_string(),
        })?;

        info!("Facts table {} rebuilt", self.destination);
        Ok(TaskReport::new(
            &self.name,
            self.destination.name(),
            None,
            started.elapsed().as_secs_f64(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::recording_env;
    use chrono::NaiveDate;

    fn ctx() -> RunContext {
        RunContext::new(
            NaiveDate::from_ymd_opt(2018, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn trip_facts() -> FactsTask {
        FactsTask::new(
            "calculate_trip_facts",
            TableRef::new("redshift", "trips").unwrap(),
            TableRef::new("redshift", "trip_facts").unwrap(),
            "tripduration",
            "bikeid",
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_columns_fail_at_construction() {
        let origin = TableRef::new("redshift", "trips").unwrap();
        let dest = TableRef::new("redshift", "trip_facts").unwrap();

        let bad_fact = FactsTask::new(
            "facts",
            origin.clone(),
            dest.clone(),
            "tripduration; DROP TABLE trips",
            "bikeid",
        );
        assert!(matches!(
            bad_fact.unwrap_err(),
            PipelineError::Configuration(_)
        ));

        let bad_group = FactsTask::new("facts", origin, dest, "tripduration", "");
        assert!(matches!(
            bad_group.unwrap_err(),
            PipelineError::Configuration(_)
        ));
    }

    #[test]
    fn test_mismatched_connections_fail_at_construction() {
        let err = FactsTask::new(
            "facts",
            TableRef::new("redshift", "trips").unwrap(),
            TableRef::new("other_warehouse", "trip_facts").unwrap(),
            "tripduration",
            "bikeid",
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_drop_precedes_create() {
        let (env, calls) = recording_env(Some(500));
        trip_facts().execute(&ctx(), &env).unwrap();

        let statements = calls.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "DROP TABLE IF EXISTS \"trip_facts\"");
        assert!(statements[1].starts_with("CREATE TABLE \"trip_facts\" AS"));
        assert!(statements[1].contains("GROUP BY \"bikeid\""));
    }

    #[test]
    fn test_create_failure_surfaces_as_load_error() {
        let (env, calls) = recording_env(Some(500));
        calls.fail_execute("permission denied for schema public");

        let err = trip_facts().execute(&ctx(), &env).unwrap_err();
        match err {
            PipelineError::Load { table, reason } => {
                assert_eq!(table, "trip_facts");
                assert!(reason.contains("permission denied"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
