//! # Warehouse Pipelines (Rust)
//!
//! A small toolkit of reusable, idempotent pipeline tasks: bulk-copy a
//! staged CSV/JSON object into a warehouse table, validate the result
//! with a scalar data-quality check, and rebuild summary (facts) tables.
//!
//! The crate follows the **Hexagonal Architecture** (Ports and Adapters):
//! tasks talk to the warehouse through a two-method driver port, so the
//! same pipeline definition runs against Redshift, plain PostgreSQL, or a
//! mock in the tests.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod sql_builder;

use crate::application::pipeline::Pipeline;
use crate::config::{AppConfig, CliArgs};
use crate::domain::context::RunContext;
use crate::infrastructure::config_credential_adapter::ConfigCredentialAdapter;
use crate::infrastructure::postgres::postgres_connection_adapter::PostgresConnectionAdapter;
use crate::ports::task_port::PipelineEnv;
use clap::Parser;
use log::{error, info};
use std::process;
use std::sync::Arc;

fn main() {
    // 1. Initialize Logging
    env_logger::init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Load Config
    let mut config = match AppConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load pipeline definition: {}", e);
            process::exit(1);
        }
    };

    // Passwords may be kept out of the definition file and supplied via
    // the environment instead.
    for connection in config.connections.values_mut() {
        if connection.password.is_none() {
            connection.password = std::env::var("WAREHOUSE_PASSWORD").ok();
        }
    }

    if let Err(e) = config.validate() {
        error!("Invalid pipeline definition: {}", e);
        process::exit(1);
    }

    // 4. Resolve the logical execution date
    let execution_date = match &args.execution_date {
        Some(raw) => match config::parse_execution_date(raw) {
            Ok(ts) => ts,
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        },
        None => chrono::Utc::now().naive_utc(),
    };

    let mut ctx = RunContext::new(execution_date);
    for pair in &args.params {
        match pair.split_once('=') {
            Some((key, value)) => ctx = ctx.with_param(key, value),
            None => {
                error!("Invalid --param \"{}\" (expected KEY=VALUE)", pair);
                process::exit(1);
            }
        }
    }

    // 5. Wire the Hexagonal Components
    let env = PipelineEnv {
        connections: Arc::new(PostgresConnectionAdapter::new(config.connections.clone())),
        credentials: Arc::new(ConfigCredentialAdapter::new(config.credentials.clone())),
    };

    let tasks = match config.build_tasks() {
        Ok(tasks) => tasks,
        Err(e) => {
            error!("Invalid task definition: {}", e);
            process::exit(1);
        }
    };

    // 6. Run the Pipeline
    let pipeline = Pipeline::new(&config.pipeline.name, tasks, env);
    match pipeline.run(&ctx) {
        Ok(reports) => {
            info!(
                "Pipeline '{}' succeeded: {} tasks completed.",
                config.pipeline.name,
                reports.len()
            );
        }
        Err(e) => {
            error!("Pipeline '{}' failed: {}", config.pipeline.name, e);
            process::exit(1);
        }
    }
}
