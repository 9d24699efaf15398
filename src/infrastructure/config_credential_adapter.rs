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

//! Credential registry backed by the pipeline definition. Object-storage
//! credentials are looked up by identifier at execution time, never held
//! by the tasks themselves.

use crate::domain::entities::StorageCredentials;
use crate::domain::errors::{PipelineError, Result};
use crate::ports::connection_port::CredentialPort;
use std::collections::HashMap;

pub struct ConfigCredentialAdapter {
    credentials: HashMap<String, StorageCredentials>,
}

impl ConfigCredentialAdapter {
    pub fn new(credentials: HashMap<String, StorageCredentials>) -> Self {
        Self { credentials }
    }
}

impl CredentialPort for ConfigCredentialAdapter {
    fn lookup(&self, id: &str) -> Result<StorageCredentials> {
        self.credentials.get(id).cloned().ok_or_else(|| {
            PipelineError::Connection {
                id: id.to_string(),
                reason: "unknown credential identifier".to_string(),
            }
        })
    }
}
