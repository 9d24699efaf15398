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

//! Connection registry over the PostgreSQL wire protocol (which Redshift
//! speaks as well). The registry is built once from the pipeline
//! definition and handed to every task; each acquisition opens a fresh
//! session, so no connection state survives a task invocation.

use crate::domain::entities::WarehouseConnection;
use crate::domain::errors::{PipelineError, Result};
use crate::infrastructure::postgres::postgres_driver_adapter::PostgresDriverAdapter;
use crate::ports::connection_port::ConnectionPort;
use crate::ports::driver_port::DriverPort;
use log::info;
use postgres::{Client, NoTls};
use std::collections::HashMap;

pub struct PostgresConnectionAdapter {
    connections: HashMap<String, WarehouseConnection>,
}

impl PostgresConnectionAdapter {
    pub fn new(connections: HashMap<String, WarehouseConnection>) -> Self {
        Self { connections }
    }
}

impl ConnectionPort for PostgresConnectionAdapter {
    fn acquire(&self, id: &str) -> Result<Box<dyn DriverPort>> {
        let settings = self.connections.get(id).ok_or_else(|| {
            PipelineError::Connection {
                id: id.to_string(),
                reason: "unknown connection identifier".to_string(),
            }
        })?;

        info!(
            "Opening session '{}' ({}:{}/{})",
            id, settings.host, settings.port, settings.database
        );

        let params = format!(
            "host={} port={} dbname={} user={} password={}",
            settings.host,
            settings.port,
            settings.database,
            settings.username,
            settings.password.as_deref().unwrap_or_default()
        );

        let client = Client::connect(&params, NoTls).map_err(|e| {
            PipelineError::Connection {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Box::new(PostgresDriverAdapter::new(client)))
    }
}
