//! # Load Task
//!
//! Copies a staged object (CSV or JSON) from object storage into a
//! destination warehouse table with a single bulk-copy command.
//!
//! With `truncate` set, the destination is emptied first and the whole
//! invocation is idempotent: re-running it converges on the same table
//! contents. Without `truncate` the copy appends, and repeated runs WILL
//! duplicate rows. Callers that let a scheduler retry this task should
//! keep `truncate` on.

use crate::domain::context::RunContext;
use crate::domain::entities::{CopyFormat, SourceLocation, TableRef, TaskReport};
use crate::domain::errors::{PipelineError, Result};
use crate::ports::task_port::{PipelineEnv, Task};
use crate::sql_builder;
use log::info;
use std::time::Instant;

/// Moves one dataset from object storage into a destination table.
#[derive(Debug)]
pub struct LoadTask {
    name: String,
    table: TableRef,
    source: SourceLocation,
    credentials_id: String,
    format: CopyFormat,
    truncate: bool,
}

impl LoadTask {
    /// All required parameters are checked here, before the task can ever
    /// reach a data store.
    pub fn new(
        name: &str,
        table: TableRef,
        source: SourceLocation,
        credentials_id: &str,
        format: CopyFormat,
        truncate: bool,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "load task requires a name".to_string(),
            ));
        }
        if credentials_id.trim().is_empty() {
            return Err(PipelineError::Configuration(format!(
                "load task '{}' requires a credential identifier",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            table,
            source,
            credentials_id: credentials_id.to_string(),
            format,
            truncate,
        })
    }
}

impl Task for LoadTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &RunContext, env: &PipelineEnv) -> Result<TaskReport> {
        let started = Instant::now();

        // Templates and credentials resolve before any session is acquired.
        let location = self.source.render(ctx)?;
        let credentials = env.credentials.lookup(&self.credentials_id)?;

        let mut session = env.connections.acquire(self.table.connection_id())?;

        if self.truncate {
            info!("Truncating {} before load", self.table);
            session
                .execute(&sql_builder::truncate_table(&self.table))
                .map_err(|e| PipelineError::Load {
                    table: self.table.to_string(),
                    reason: format!("truncate failed: {}", e),
                })?;
        }

        info!(
            "Copying {} into {} ({} format)",
            location, self.table, self.format
        );
        let copy_sql =
            sql_builder::copy_from_object_store(&self.table, &location, &credentials, &self.format);
        session.execute(&copy_sql).map_err(|e| PipelineError::Load {
            table: self.table.to_string(),
            reason: e.to_string(),
        })?;

        info!("Load into {} finished", self.table);
        Ok(TaskReport::new(
            &self.name,
            self.table.name(),
            None,
            started.elapsed().as_secs_f64(),
        ))
    }
}
