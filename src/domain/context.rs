//! # Run Context
//!
//! The run context carries the values a scheduler injects into each task
//! invocation, most importantly the logical execution timestamp. The
//! context is read-only: tasks resolve template placeholders from it but
//! never write back.
//!
//! The logical execution timestamp is the nominal time a run represents,
//! independent of the wall clock at which the run actually happens. Source
//! keys partitioned by date (`.../{year}/{month}/trips.csv`) resolve
//! against it, so a backfill for May 2018 reads May 2018's objects no
//! matter when it runs.

use crate::domain::errors::{PipelineError, Result};
use chrono::{Datelike, NaiveDateTime};
use std::collections::HashMap;

/// Run-scoped values injected by the caller.
#[derive(Debug, Clone)]
pub struct RunContext {
    execution_date: NaiveDateTime,
    params: HashMap<String, String>,
}

impl RunContext {
    pub fn new(execution_date: NaiveDateTime) -> Self {
        Self {
            execution_date,
            params: HashMap::new(),
        }
    }

    /// Adds a custom template parameter on top of the built-in date parts.
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn execution_date(&self) -> NaiveDateTime {
        self.execution_date
    }

    /// Resolves one placeholder name to its value. Date parts render the
    /// way the upstream partitioning scheme wrote them: no zero padding on
    /// `month` and `day`.
    pub fn placeholder(&self, name: &str) -> Option<String> {
        match name {
            "year" => Some(self.execution_date.year().to_string()),
            "month" => Some(self.execution_date.month().to_string()),
            "day" => Some(self.execution_date.day().to_string()),
            "ds" => Some(self.execution_date.format("%Y-%m-%d").to_string()),
            "ts" => Some(self.execution_date.format("%Y-%m-%dT%H:%M:%S").to_string()),
            other => self.params.get(other).cloned(),
        }
    }
}

/// Substitutes every `{name}` placeholder in `template` from the context.
///
/// A placeholder with no binding, or an unterminated `{`, is a
/// configuration error: a task must never start executing with an
/// unresolved template.
pub fn render_template(template: &str, ctx: &RunContext) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }

        let mut name = String::new();
        let mut closed = false;
        for inner in chars.by_ref() {
            if inner == '}' {
                closed = true;
                break;
            }
            name.push(inner);
        }

        if !closed {
            return Err(PipelineError::Configuration(format!(
                "unterminated placeholder in template \"{}\"",
                template
            )));
        }

        match ctx.placeholder(&name) {
            Some(value) => out.push_str(&value),
            None => {
                return Err(PipelineError::Configuration(format!(
                    "unbound placeholder `{{{}}}` in template \"{}\"",
                    name, template
                )))
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn may_first_2018() -> RunContext {
        RunContext::new(
            NaiveDate::from_ymd_opt(2018, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_year_month_substitution() {
        let ctx = may_first_2018();
        let rendered = render_template(
            "divvy/partitioned/{year}/{month}/divvy_trips.csv",
            &ctx,
        )
        .unwrap();
        assert_eq!(rendered, "divvy/partitioned/2018/5/divvy_trips.csv");
    }

    #[test]
    fn test_ds_and_ts_substitution() {
        let ctx = may_first_2018();
        assert_eq!(render_template("{ds}", &ctx).unwrap(), "2018-05-01");
        assert_eq!(
            render_template("{ts}", &ctx).unwrap(),
            "2018-05-01T00:00:00"
        );
    }

    #[test]
    fn test_custom_param() {
        let ctx = may_first_2018().with_param("dataset", "divvy");
        assert_eq!(
            render_template("{dataset}/{year}.csv", &ctx).unwrap(),
            "divvy/2018.csv"
        );
    }

    #[test]
    fn test_unbound_placeholder_is_config_error() {
        let ctx = may_first_2018();
        let err = render_template("data/{quarter}/trips.csv", &ctx).unwrap_err();
        match err {
            PipelineError::Configuration(msg) => assert!(msg.contains("quarter")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_placeholder_is_config_error() {
        let ctx = may_first_2018();
        assert!(render_template("data/{year/trips.csv", &ctx).is_err());
    }

    #[test]
    fn test_template_without_placeholders_passes_through() {
        let ctx = may_first_2018();
        assert_eq!(
            render_template("divvy/unpartitioned/divvy_stations_2017.csv", &ctx).unwrap(),
            "divvy/unpartitioned/divvy_stations_2017.csv"
        );
    }
}
