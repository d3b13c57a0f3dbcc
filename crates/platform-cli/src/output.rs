//! Rendering of command results.

use crate::CliError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output format options
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML output
    Yaml,
    /// Human-readable text
    Text,
}

/// Render a JSON value in the requested format.
pub fn render(value: &Value, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| CliError::Output {
            message: e.to_string(),
        }),
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| CliError::Output {
                message: e.to_string(),
            }),
        OutputFormat::Text => Ok(render_text(value)),
    }
}

/// Plain text: scalars bare, one `key: value` line per object field and one
/// line per array item. Nested structures are written as compact JSON.
fn render_text(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, scalar_text(value)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
