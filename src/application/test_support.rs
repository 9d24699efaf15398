//! Mock environment shared by the task and pipeline tests. The mock
//! warehouse records every statement it is handed and answers scalar
//! queries from a canned value.

use crate::domain::entities::StorageCredentials;
use crate::domain::errors::{PipelineError, Result};
use crate::ports::connection_port::{ConnectionPort, CredentialPort};
use crate::ports::driver_port::DriverPort;
use crate::ports::task_port::PipelineEnv;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct SharedState {
    statements: Mutex<Vec<String>>,
    scalar: Mutex<Option<i64>>,
    execute_script: Mutex<VecDeque<std::result::Result<(), String>>>,
    execute_error: Mutex<Option<String>>,
    fetch_error: Mutex<Option<String>>,
    acquisitions: AtomicUsize,
}

/// Handle the tests keep to inspect and steer the mock warehouse.
#[derive(Clone)]
pub struct RecordedCalls(Arc<SharedState>);

impl RecordedCalls {
    /// Every statement handed to any session, in call order.
    pub fn statements(&self) -> Vec<String> {
        self.0.statements.lock().unwrap().clone()
    }

    /// How many sessions were acquired.
    pub fn acquisitions(&self) -> usize {
        self.0.acquisitions.load(Ordering::SeqCst)
    }

    /// Makes every subsequent `execute` fail with the given reason.
    pub fn fail_execute(&self, reason: &str) {
        *self.0.execute_error.lock().unwrap() = Some(reason.to_string());
    }

    /// Makes every subsequent `fetch_scalar` fail with the given reason.
    pub fn fail_fetch(&self, reason: &str) {
        *self.0.fetch_error.lock().unwrap() = Some(reason.to_string());
    }
}

struct MockDriver(Arc<SharedState>);

impl DriverPort for MockDriver {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.0.statements.lock().unwrap().push(sql.to_string());

        if let Some(result) = self.0.execute_script.lock().unwrap().pop_front() {
            return result.map_err(PipelineError::Database);
        }
        if let Some(reason) = self.0.execute_error.lock().unwrap().clone() {
            return Err(PipelineError::Database(reason));
        }
        Ok(())
    }

    fn fetch_scalar(&mut self, sql: &str) -> Result<Option<i64>> {
        if let Some(reason) = self.0.fetch_error.lock().unwrap().clone() {
            return Err(PipelineError::Database(reason));
        }
        self.0.statements.lock().unwrap().push(sql.to_string());
        Ok(*self.0.scalar.lock().unwrap())
    }
}

struct MockConnections(Arc<SharedState>);

impl ConnectionPort for MockConnections {
    fn acquire(&self, _id: &str) -> Result<Box<dyn DriverPort>> {
        self.0.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockDriver(self.0.clone())))
    }
}

/// Rejects every identifier, simulating a registry that knows nothing.
struct UnknownConnections;

impl ConnectionPort for UnknownConnections {
    fn acquire(&self, id: &str) -> Result<Box<dyn DriverPort>> {
        Err(PipelineError::Connection {
            id: id.to_string(),
            reason: "unknown connection identifier".to_string(),
        })
    }
}

struct MockCredentials;

impl CredentialPort for MockCredentials {
    fn lookup(&self, _id: &str) -> Result<StorageCredentials> {
        Ok(StorageCredentials {
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "SECRET".to_string(),
        })
    }
}

/// A recording environment whose scalar queries answer `scalar`.
pub fn recording_env(scalar: Option<i64>) -> (PipelineEnv, RecordedCalls) {
    let state = Arc::new(SharedState {
        scalar: Mutex::new(scalar),
        ..SharedState::default()
    });
    let env = PipelineEnv {
        connections: Arc::new(MockConnections(state.clone())),
        credentials: Arc::new(MockCredentials),
    };
    (env, RecordedCalls(state))
}

/// Like `recording_env`, but the first `execute` calls consume scripted
/// results before the driver falls back to succeeding.
pub fn scripted_env(
    execute_results: Vec<std::result::Result<(), String>>,
    scalar: Option<i64>,
) -> (PipelineEnv, RecordedCalls) {
    let state = Arc::new(SharedState {
        scalar: Mutex::new(scalar),
        execute_script: Mutex::new(execute_results.into()),
        ..SharedState::default()
    });
    let env = PipelineEnv {
        connections: Arc::new(MockConnections(state.clone())),
        credentials: Arc::new(MockCredentials),
    };
    (env, RecordedCalls(state))
}

/// An environment whose connection registry rejects every identifier.
pub fn failing_env() -> (PipelineEnv, RecordedCalls) {
    let state = Arc::new(SharedState::default());
    let env = PipelineEnv {
        connections: Arc::new(UnknownConnections),
        credentials: Arc::new(MockCredentials),
    };
    (env, RecordedCalls(state))
}
