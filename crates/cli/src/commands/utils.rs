use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

/// Build a request payload from an optional raw JSON object plus individual
/// flags. Flags that were given override keys from the raw JSON.
pub fn build_payload(raw: Option<&str>, fields: &[(&str, Option<&str>)]) -> Result<Value> {
    let mut data = match raw {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("--data is not valid JSON")? {
            Value::Object(map) => map,
            _ => bail!("--data must be a JSON object"),
        },
        None => Map::new(),
    };

    for (key, value) in fields {
        if let Some(value) = value {
            data.insert((*key).to_string(), Value::from(*value));
        }
    }

    if data.is_empty() {
        bail!("Nothing to send: pass --data or at least one field flag");
    }

    Ok(Value::Object(data))
}
