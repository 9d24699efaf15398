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

//! # Driver Port
//!
//! This Port is the whole surface the toolkit needs from a warehouse: run
//! a statement, fetch a scalar. It does not care whether the warehouse is
//! Redshift, plain PostgreSQL, or a mock recording statements for a test.

use crate::domain::errors::Result;

/// A live warehouse session.
///
/// A session is acquired fresh for one task invocation and dropped when
/// the invocation returns, on success and on error alike. Dropping the
/// session releases the underlying network handle.
pub trait DriverPort: Send {
    /// Runs a statement (or a statement batch) for its side effect.
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Runs a query and returns the scalar in the first column of the
    /// first row, or `None` when the query yields no rows.
    fn fetch_scalar(&mut self, sql: &str) -> Result<Option<i64>>;
}
