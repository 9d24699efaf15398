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

//! PostgreSQL/Redshift implementation of the driver port. One adapter
//! wraps one client; dropping the adapter closes the session.

use crate::domain::errors::{PipelineError, Result};
use crate::ports::driver_port::DriverPort;
use postgres::Client;

pub struct PostgresDriverAdapter {
    client: Client,
}

impl PostgresDriverAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DriverPort for PostgresDriverAdapter {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.client
            .batch_execute(sql)
            .map_err(|e| PipelineError::Database(e.to_string()))
    }

    fn fetch_scalar(&mut self, sql: &str) -> Result<Option<i64>> {
        let row = self
            .client
            .query_opt(sql, &[])
            .map_err(|e| PipelineError::Database(e.to_string()))?;

        match row {
            None => Ok(None),
            Some(row) => {
                let value: i64 = row
                    .try_get(0)
                    .map_err(|e| PipelineError::Database(e.to_string()))?;
                Ok(Some(value))
            }
        }
    }
}
