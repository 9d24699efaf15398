// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Pipeline Runner
//!
//! Runs an ordered list of tasks against a shared environment, the way the
//! warehouse exercises run their copy and insert steps back to back. The
//! runner introduces no concurrency and no retry logic: it times each
//! task, logs its outcome, and halts at the first failure so steps that
//! depend on earlier data are never attempted against a broken state.
//!
//! When the tasks are embedded in an external scheduler instead, that
//! scheduler owns ordering, parallel branches, retries and timeouts; this
//! runner is the minimal stand-in for local and scripted runs.

use crate::domain::context::RunContext;
use crate::domain::entities::TaskReport;
use crate::domain::errors::Result;
use crate::ports::task_port::{PipelineEnv, Task};
use log::{error, info};

/// An ordered pipeline of tasks sharing one environment.
pub struct Pipeline {
    name: String,
    tasks: Vec<Box<dyn Task>>,
    env: PipelineEnv,
}

impl Pipeline {
    pub fn new(name: &str, tasks: Vec<Box<dyn Task>>, env: PipelineEnv) -> Self {
        Self {
            name: name.to_string(),
            tasks,
            env,
        }
    }

    /// Executes every task in order. The first error halts the run and
    /// propagates to the caller; reports cover the completed tasks.
    pub fn run(&self, ctx: &RunContext) -> Result<Vec<TaskReport>> {
        info!(
            "Starting pipeline '{}' ({} tasks, execution date {})",
            self.name,
            self.tasks.len(),
            ctx.execution_date().format("%Y-%m-%d %H:%M:%S")
        );

        let mut reports = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            info!("Running task '{}'", task.name());
            let report = task.execute(ctx, &self.env).map_err(|e| {
                error!("Task '{}' failed: {}", task.name(), e);
                e
            })?;
            info!(
                "Task '{}' finished in {:.2}s",
                task.name(),
                report.duration
            );
            reports.push(report);
        }

        info!("Pipeline '{}' finished: {} tasks ran", self.name, reports.len());
        Ok(reports)
    }
}
