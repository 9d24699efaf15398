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

//! Core error definitions for the pipeline toolkit.
//!
//! This module provides a centralized `PipelineError` enum and a `Result`
//! type used throughout the crate. Every error a task raises propagates to
//! the caller untouched: the toolkit performs no internal retries, backoff,
//! or partial-failure recovery. Retry policy belongs to whatever scheduler
//! invokes the tasks.

use thiserror::Error;

/// Error types encountered while defining or running a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Bad or missing parameters, detected when a task is constructed and
    /// before any data store is touched.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A named connection or credential identifier could not be resolved
    /// into a live session, or the handshake itself failed.
    #[error("Connection '{id}' failed: {reason}")]
    Connection { id: String, reason: String },

    /// The bulk-copy operation against the warehouse reported failure.
    #[error("Load failed for {table}: {reason}")]
    Load { table: String, reason: String },

    /// A data-quality check failed, returned no data, or errored. The
    /// reason carries the observed value and the threshold so the failure
    /// can be diagnosed from the scheduler's log alone.
    #[error("Data quality check failed for {table}: {reason}")]
    DataQuality { table: String, reason: String },

    /// Raw driver-level failure. Tasks re-wrap this into `Load` or
    /// `DataQuality` at the operation boundary.
    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for the pipeline toolkit.
pub type Result<T> = std::result::Result<T, PipelineError>;
