//! Centralized statement building for the warehouse.
//!
//! Every SQL string the toolkit sends is assembled here, from identifiers
//! that were validated when the task was constructed. Literals (object
//! URIs, credentials, delimiters) are escaped before they are embedded in
//! the opaque copy command.

use crate::domain::entities::{CopyFormat, StorageCredentials, TableRef};
use crate::domain::errors::{PipelineError, Result};

/// Validates a bare identifier: letters, digits, `_` and `$`, not starting
/// with a digit.
pub fn validate_identifier(ident: &str) -> Result<()> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(PipelineError::Configuration(format!(
            "invalid identifier: \"{}\"",
            ident
        )))
    }
}

/// Validates a table name, which may be schema-qualified with a single dot.
pub fn validate_table_name(table: &str) -> Result<()> {
    let parts: Vec<&str> = table.split('.').collect();
    if parts.is_empty() || parts.len() > 2 {
        return Err(PipelineError::Configuration(format!(
            "invalid table name: \"{}\"",
            table
        )));
    }
    for part in parts {
        validate_identifier(part)?;
    }
    Ok(())
}

/// Double-quotes each segment of a (possibly schema-qualified) table name.
fn quote_table(table: &TableRef) -> String {
    table
        .name()
        .split('.')
        .map(|part| format!("\"{}\"", part))
        .collect::<Vec<_>>()
        .join(".")
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident)
}

/// Escapes a string literal by doubling embedded single quotes.
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

pub fn row_count(table: &TableRef) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_table(table))
}

pub fn truncate_table(table: &TableRef) -> String {
    format!("TRUNCATE TABLE {}", quote_table(table))
}

pub fn drop_table_if_exists(table: &TableRef) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_table(table))
}

/// Builds the warehouse bulk-copy command for a staged object. The
/// resulting text is opaque to the toolkit; the driver hands it to the
/// warehouse unchanged.
pub fn copy_from_object_store(
    table: &TableRef,
    location: &str,
    credentials: &StorageCredentials,
    format: &CopyFormat,
) -> String {
    let mut lines = vec![
        format!("COPY {}", quote_table(table)),
        format!("FROM '{}'", escape_literal(location)),
        format!("ACCESS_KEY_ID '{}'", escape_literal(&credentials.access_key_id)),
        format!(
            "SECRET_ACCESS_KEY '{}'",
            escape_literal(&credentials.secret_access_key)
        ),
    ];

    match format {
        CopyFormat::Csv {
            ignore_header,
            delimiter,
        } => {
            lines.push(format!("IGNOREHEADER {}", ignore_header));
            lines.push(format!(
                "DELIMITER '{}'",
                escape_literal(&delimiter.to_string())
            ));
        }
        CopyFormat::Json { jsonpaths } => {
            let mapping = jsonpaths
                .as_deref()
                .map(escape_literal)
                .unwrap_or_else(|| "auto".to_string());
            lines.push(format!("FORMAT AS JSON '{}'", mapping));
        }
    }

    lines.join("\n")
}

/// Builds the summary-table select for a facts task: MIN/MAX/AVG of the
/// fact column grouped by the group-by column.
pub fn create_facts_table(
    destination: &TableRef,
    origin: &TableRef,
    fact_column: &str,
    groupby_column: &str,
) -> String {
    format!(
        "CREATE TABLE {dest} AS\nSELECT\n  {group},\n  MAX({fact}) AS {max_alias},\n  MIN({fact}) AS {min_alias},\n  AVG({fact}) AS {avg_alias}\nFROM {origin}\nGROUP BY {group}",
        dest = quote_table(destination),
        origin = quote_table(origin),
        fact = quote_ident(fact_column),
        group = quote_ident(groupby_column),
        max_alias = quote_ident(&format!("max_{}", fact_column)),
        min_alias = quote_ident(&format!("min_{}", fact_column)),
        avg_alias = quote_ident(&format!("avg_{}", fact_column)),
    )
}
