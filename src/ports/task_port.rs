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

//! # Task Port
//!
//! The uniform shape every pipeline step implements. A task is constructed
//! once, at pipeline-definition time, from parameters that are validated up
//! front; it is immutable afterwards and invoked once per run.
//!
//! `execute` performs exactly one logical unit of work against the
//! warehouse. A task that issues several statements (truncate before copy,
//! drop before create) treats them as a single retried-together unit; no
//! partial commit across the sub-steps is assumed. Errors are never caught
//! inside a task. They propagate so the caller can mark the step failed.

use crate::domain::context::RunContext;
use crate::domain::entities::TaskReport;
use crate::domain::errors::Result;
use crate::ports::connection_port::{ConnectionPort, CredentialPort};
use std::sync::Arc;

/// Run-scoped collaborators handed to each task invocation. Tasks share
/// nothing else; in particular there is no ambient configuration and no
/// connection cache.
pub struct PipelineEnv {
    pub connections: Arc<dyn ConnectionPort>,
    pub credentials: Arc<dyn CredentialPort>,
}

/// A single unit of pipeline work.
pub trait Task: Send + Sync {
    /// The step identity, unique within a pipeline definition.
    fn name(&self) -> &str;

    /// Performs the task's unit of work. Invoked by the runner (or an
    /// external scheduler) exactly once per run, possibly concurrently
    /// with other tasks on other threads.
    fn execute(&self, ctx: &RunContext, env: &PipelineEnv) -> Result<TaskReport>;
}
