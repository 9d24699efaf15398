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

//! # Connection Port
//!
//! Tasks never hold connection details. They hold *identifiers*, and at
//! execution time they ask this Port to turn an identifier into a live
//! session. An unknown identifier, or a failed handshake, surfaces as a
//! `Connection` error and is fatal for the invocation.
//!
//! Sessions are never cached or shared between tasks. Every acquisition
//! produces a fresh handle that the task drops before returning.

use crate::domain::entities::StorageCredentials;
use crate::domain::errors::Result;
use crate::ports::driver_port::DriverPort;

/// Resolves a named connection identifier into a live warehouse session.
pub trait ConnectionPort: Send + Sync {
    fn acquire(&self, id: &str) -> Result<Box<dyn DriverPort>>;
}

/// Resolves a named credential identifier into object-storage credentials
/// for a bulk copy.
pub trait CredentialPort: Send + Sync {
    fn lookup(&self, id: &str) -> Result<StorageCredentials>;
}
