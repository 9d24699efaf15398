use crate::application::facts_task::FactsTask;
use crate::application::load_task::LoadTask;
use crate::application::validation_task::ValidationTask;
use crate::domain::entities::{
    CheckExpr, CopyFormat, SourceLocation, StorageCredentials, TableRef, Threshold,
    WarehouseConnection,
};
use crate::domain::errors::{PipelineError, Result};
use crate::ports::task_port::Task;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub connections: HashMap<String, WarehouseConnection>,
    #[serde(default)]
    pub credentials: HashMap<String, StorageCredentials>,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    pub name: String,
    pub tasks: Vec<TaskSpec>,
}

/// One task entry in the pipeline definition file.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskSpec {
    Load {
        name: String,
        connection: String,
        table: String,
        bucket: String,
        key: String,
        credentials: String,
        #[serde(default)]
        format: CopyFormat,
        #[serde(default)]
        truncate: bool,
    },
    Validate {
        name: String,
        connection: String,
        table: String,
        #[serde(default)]
        check: CheckExpr,
        threshold: Threshold,
    },
    Facts {
        name: String,
        connection: String,
        origin_table: String,
        destination_table: String,
        fact_column: String,
        groupby_column: String,
    },
}

impl TaskSpec {
    pub fn name(&self) -> &str {
        match self {
            TaskSpec::Load { name, .. } => name,
            TaskSpec::Validate { name, .. } => name,
            TaskSpec::Facts { name, .. } => name,
        }
    }

    pub fn connection_id(&self) -> &str {
        match self {
            TaskSpec::Load { connection, .. } => connection,
            TaskSpec::Validate { connection, .. } => connection,
            TaskSpec::Facts { connection, .. } => connection,
        }
    }

    pub fn credentials_id(&self) -> Option<&str> {
        match self {
            TaskSpec::Load { credentials, .. } => Some(credentials),
            _ => None,
        }
    }

    /// Builds the task value, running all construction-time validation.
    pub fn to_task(&self) -> Result<Box<dyn Task>> {
        match self {
            TaskSpec::Load {
                name,
                connection,
                table,
                bucket,
                key,
                credentials,
                format,
                truncate,
            } => {
                let task = LoadTask::new(
                    name,
                    TableRef::new(connection, table)?,
                    SourceLocation::new(bucket, key)?,
                    credentials,
                    format.clone(),
                    *truncate,
                )?;
                Ok(Box::new(task))
            }
            TaskSpec::Validate {
                name,
                connection,
                table,
                check,
                threshold,
            } => {
                let task = ValidationTask::new(
                    name,
                    TableRef::new(connection, table)?,
                    check.clone(),
                    *threshold,
                )?;
                Ok(Box::new(task))
            }
            TaskSpec::Facts {
                name,
                connection,
                origin_table,
                destination_table,
                fact_column,
                groupby_column,
            } => {
                let task = FactsTask::new(
                    name,
                    TableRef::new(connection, origin_table)?,
                    TableRef::new(connection, destination_table)?,
                    fact_column,
                    groupby_column,
                )?;
                Ok(Box::new(task))
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the pipeline definition (YAML or JSON)
    #[arg(short, long)]
    pub config: String,

    /// Logical execution date, YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS.
    /// Defaults to the current UTC time.
    #[arg(long)]
    pub execution_date: Option<String>,

    /// Extra template parameters as KEY=VALUE, repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: AppConfig = if path.ends_with(".json") {
            serde_json::from_str(&contents)
                .map_err(|e| PipelineError::Configuration(format!("{}: {}", path, e)))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| PipelineError::Configuration(format!("{}: {}", path, e)))?
        };

        Ok(config)
    }

    /// Cross-checks the definition: every task must reference a declared
    /// connection and credential identifier, and task names must be
    /// unique within the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.tasks.is_empty() {
            return Err(PipelineError::Configuration(format!(
                "pipeline '{}' defines no tasks",
                self.pipeline.name
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for spec in &self.pipeline.tasks {
            if !seen.insert(spec.name()) {
                return Err(PipelineError::Configuration(format!(
                    "duplicate task name '{}'",
                    spec.name()
                )));
            }
            if !self.connections.contains_key(spec.connection_id()) {
                return Err(PipelineError::Configuration(format!(
                    "task '{}' references undeclared connection '{}'",
                    spec.name(),
                    spec.connection_id()
                )));
            }
            if let Some(creds) = spec.credentials_id() {
                if !self.credentials.contains_key(creds) {
                    return Err(PipelineError::Configuration(format!(
                        "task '{}' references undeclared credentials '{}'",
                        spec.name(),
                        creds
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds the full ordered task list from the definition.
    pub fn build_tasks(&self) -> Result<Vec<Box<dyn Task>>> {
        self.pipeline.tasks.iter().map(|spec| spec.to_task()).collect()
    }
}

/// Parses a logical execution date from the command line. A bare date
/// means midnight of that day.
pub fn parse_execution_date(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }
    Err(PipelineError::Configuration(format!(
        "cannot parse execution date \"{}\" (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)",
        raw
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PIPELINE_YAML: &str = r#"
connections:
  redshift:
    host: "example.us-west-2.redshift.amazonaws.com"
    port: 5439
    database: "dwh"
    username: "awsuser"
    password: "secret"
credentials:
  aws_credentials:
    access_key_id: "AKIATEST"
    secret_access_key: "SECRET"
pipeline:
  name: "divvy_trips"
  tasks:
    - type: load
      name: "load_trips"
      connection: "redshift"
      table: "trips"
      bucket: "udac-data-pipelines"
      key: "divvy/partitioned/{year}/{month}/divvy_trips.csv"
      credentials: "aws_credentials"
      truncate: true
    - type: validate
      name: "check_trips"
      connection: "redshift"
      table: "trips"
      threshold:
        greater_than: 0
    - type: facts
      name: "calculate_trip_facts"
      connection: "redshift"
      origin_table: "trips"
      destination_table: "trip_facts"
      fact_column: "tripduration"
      groupby_column: "bikeid"
"#;

    fn write_config(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_config() {
        let file = write_config(PIPELINE_YAML, ".yaml");
        let config = AppConfig::from_file(file.path().to_str().unwrap())
            .expect("Failed to parse config");

        assert_eq!(config.pipeline.name, "divvy_trips");
        assert_eq!(config.pipeline.tasks.len(), 3);
        assert!(config.connections.contains_key("redshift"));
        assert_eq!(config.connections["redshift"].port, 5439);

        config.validate().unwrap();
        let tasks = config.build_tasks().unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].name(), "load_trips");
        assert_eq!(tasks[1].name(), "check_trips");
    }

    #[test]
    fn test_load_json_config() {
        let json = r#"
{
  "connections": {
    "redshift": {
      "host": "localhost",
      "port": 5439,
      "database": "dwh",
      "username": "awsuser",
      "password": null
    }
  },
  "pipeline": {
    "name": "stations",
    "tasks": [
      {
        "type": "validate",
        "name": "check_stations",
        "connection": "redshift",
        "table": "stations",
        "threshold": { "greater_than": 0 }
      }
    ]
  }
}
"#;
        let file = write_config(json, ".json");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.pipeline.tasks.len(), 1);
    }

    #[test]
    fn test_validate_rejects_undeclared_connection() {
        let yaml = PIPELINE_YAML.replace("connection: \"redshift\"", "connection: \"missing\"");
        let file = write_config(&yaml, ".yaml");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_duplicate_task_names() {
        let yaml = PIPELINE_YAML.replace("name: \"check_trips\"", "name: \"load_trips\"");
        let file = write_config(&yaml, ".yaml");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_tasks_rejects_bad_identifiers() {
        let yaml = PIPELINE_YAML.replace("table: \"trips\"", "table: \"trips; DROP TABLE x\"");
        let file = write_config(&yaml, ".yaml");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert!(config.build_tasks().is_err());
    }

    #[test]
    fn test_parse_execution_date() {
        let midnight = parse_execution_date("2018-05-01").unwrap();
        assert_eq!(midnight.format("%Y-%m-%dT%H:%M:%S").to_string(), "2018-05-01T00:00:00");

        let with_time = parse_execution_date("2018-05-01T06:30:00").unwrap();
        assert_eq!(with_time.format("%H:%M").to_string(), "06:30");

        assert!(parse_execution_date("May 1st 2018").is_err());
    }
}
