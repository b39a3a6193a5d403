//! Output formatting shared by CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::validation::ValidationResult;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.",
                s
            ),
        }
    }
}

/// Print serializable data as JSON or YAML
pub fn print_output<T: Serialize>(data: &T, format: &str) -> Result<()> {
    match format.parse::<OutputFormat>()? {
        OutputFormat::Json => print_json(data),
        OutputFormat::Yaml => print_yaml(data),
        OutputFormat::Table => {
            anyhow::bail!("Table format is only available for validation results")
        }
    }
}

pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

pub fn print_yaml<T: Serialize>(data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
    println!("{}", yaml);
    Ok(())
}

/// Print violations in the requested format
pub fn print_violations(result: &ValidationResult, format: &str) -> Result<()> {
    match format.parse::<OutputFormat>()? {
        OutputFormat::Table => {
            print_violation_table(result);
            Ok(())
        }
        _ => print_output(result, format),
    }
}

fn print_violation_table(result: &ValidationResult) {
    if result.is_empty() {
        println!("No violations");
        return;
    }

    print_table_header(&[("FIELD", 34), ("VIOLATION", 50)]);
    for (field, message) in result.iter() {
        println!("{:<34} {}", field.as_str(), truncate(message, 50));
    }
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

pub fn print_table_header(columns: &[(&str, usize)]) {
    println!();
    let mut header = String::new();
    for (name, width) in columns {
        header.push_str(&format!("{:<width$} ", name, width = width));
    }
    println!("{}", header.trim());

    let total_width: usize = columns.iter().map(|(_, w)| w + 1).sum();
    print_separator(total_width.saturating_sub(1));
}
