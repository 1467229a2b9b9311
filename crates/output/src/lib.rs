use std::collections::BTreeSet;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Asana wraps every payload in `{"data": ...}`.
const ENVELOPE: &str = "data";

/// Columns shown first when present, in this order.
const LEADING_COLUMNS: [&str; 3] = ["gid", "name", "resource_type"];

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
    Csv,
    Quiet,
}

pub struct OutputRenderer {
    format: OutputFormat,
}

impl OutputRenderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render an API response, looking through the `data` envelope.
    pub fn render_response(&self, response: &Value) -> Result<()> {
        self.render(Self::unwrap_envelope(response))
    }

    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        if let Some(output) = self.to_text(&json_value)? {
            println!("{output}");
        }
        Ok(())
    }

    /// Format `value` without printing. `None` means there is nothing to show.
    pub fn to_text(&self, value: &Value) -> Result<Option<String>> {
        let text = match self.format {
            OutputFormat::Table => match Self::coerce_rows(value) {
                Some((headers, rows)) => Some(Self::table(headers, rows)),
                None => Self::fallback(value)?,
            },
            OutputFormat::Json => Some(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Some(serde_yaml::to_string(value)?),
            OutputFormat::Csv => match Self::coerce_rows(value) {
                Some((headers, rows)) => Some(Self::csv(headers, rows)),
                None => Self::fallback(value)?,
            },
            OutputFormat::Quiet => {
                let ids = Self::quiet_ids(value);
                if ids.is_empty() {
                    None
                } else {
                    Some(ids.join("\n"))
                }
            }
        };

        Ok(text)
    }

    fn unwrap_envelope(value: &Value) -> &Value {
        match value {
            Value::Object(obj) => obj.get(ENVELOPE).unwrap_or(value),
            other => other,
        }
    }

    fn fallback(value: &Value) -> Result<Option<String>> {
        match value {
            Value::Null => Ok(None),
            Value::Object(obj) if !obj.is_empty() => {
                let rows = obj
                    .iter()
                    .map(|(key, val)| vec![key.clone(), Self::value_to_string(val)])
                    .collect();
                Ok(Some(Self::table(
                    vec!["field".to_string(), "value".to_string()],
                    rows,
                )))
            }
            other => Ok(Some(serde_json::to_string_pretty(other)?)),
        }
    }

    fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(headers);
        for row in rows {
            builder.push_record(row);
        }
        builder.build().with(Style::rounded()).to_string()
    }

    fn csv(headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(headers.join(","));
        for row in rows {
            let cells: Vec<String> = row.iter().map(|cell| Self::csv_cell(cell)).collect();
            lines.push(cells.join(","));
        }
        lines.join("\n")
    }

    fn csv_cell(cell: &str) -> String {
        if cell.contains([',', '"', '\n']) {
            format!("\"{}\"", cell.replace('"', "\"\""))
        } else {
            cell.to_string()
        }
    }

    fn quiet_ids(value: &Value) -> Vec<String> {
        match value {
            Value::Array(rows) => rows.iter().filter_map(Self::identifier).collect(),
            Value::Null => Vec::new(),
            other => Self::identifier(other).into_iter().collect(),
        }
    }

    fn identifier(value: &Value) -> Option<String> {
        match value {
            Value::Object(obj) => obj
                .get("gid")
                .or_else(|| obj.get("id"))
                .filter(|id| !id.is_null())
                .map(Self::value_to_string),
            Value::Null => None,
            other => Some(Self::value_to_string(other)),
        }
    }

    fn coerce_rows(value: &Value) -> Option<(Vec<String>, Vec<Vec<String>>)> {
        let rows = match value {
            Value::Array(rows) if !rows.is_empty() => rows,
            _ => return None,
        };

        let mut keys = BTreeSet::new();
        for row in rows {
            if let Value::Object(obj) = row {
                keys.extend(obj.keys().cloned());
            }
        }

        if keys.is_empty() {
            return None;
        }

        let mut headers: Vec<String> = LEADING_COLUMNS
            .iter()
            .filter(|col| keys.remove(**col))
            .map(|col| col.to_string())
            .collect();
        headers.extend(keys);

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let record = headers
                .iter()
                .map(|header| {
                    row.get(header)
                        .map(Self::value_to_string)
                        .unwrap_or_default()
                })
                .collect();
            data.push(record);
        }

        Some((headers, data))
    }

    fn value_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Object(obj) => match obj.get("name").and_then(Value::as_str) {
                Some(name) => name.to_string(),
                None => serde_json::to_string(value).unwrap_or_default(),
            },
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}
