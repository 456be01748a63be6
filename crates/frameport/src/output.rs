use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print a flat report. Top-level fields become table rows; nested values
/// are rendered as compact JSON.
pub fn print_report<T: Serialize>(report: &T, format: OutputFormat) {
    let value = serde_json::to_value(report).unwrap_or(Value::Null);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in fields(&value) {
                table.add_row(vec![field, value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (field, value) in fields(&value) {
                println!("{field}={value}");
            }
        }
    }
}

fn fields(value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(field, _)| field.as_str() != "schema_id")
            .map(|(field, value)| (field.clone(), render(value)))
            .collect(),
        other => vec![("value".to_string(), render(other))],
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
