use serde_json::{json, Map, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".to_string(), json!(true));
            response.insert("message".to_string(), json!(message));

            match data {
                Some(Value::Object(fields)) => response.extend(fields),
                Some(other) => {
                    response.insert("data".to_string(), other);
                }
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a raw API payload. Text mode prints a list as one line per record.
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => match value {
            Value::Array(items) if items.is_empty() => println!("(none)"),
            Value::Array(items) => {
                for item in items {
                    println!("{}", summary_line(item));
                }
            }
            Value::Object(fields) => {
                for (key, field) in fields {
                    println!("{}: {}", key, plain(field));
                }
            }
            other => println!("{}", plain(other)),
        },
    }
    Ok(())
}

/// `id  name  (extra)` for a record; whatever is present.
pub fn summary_line(item: &Value) -> String {
    let id = item.get("id").map(plain).unwrap_or_default();
    let name = item
        .get("name")
        .or_else(|| item.get("email"))
        .map(plain)
        .unwrap_or_default();
    let extra = ["class", "board", "role", "status"]
        .iter()
        .find_map(|key| item.get(*key))
        .map(|v| format!("  ({})", plain(v)))
        .unwrap_or_default();
    format!("{}  {}{}", id, name, extra)
}

/// A JSON value without quotes around strings.
pub fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Parse `key=value` pairs into a JSON object. Values that parse as JSON keep
/// their type; anything else is a string.
pub fn parse_fields(pairs: &[String]) -> anyhow::Result<Value> {
    let mut object = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected key=value, got '{}'", pair))?;
        if key.is_empty() {
            return Err(anyhow::anyhow!("Empty field name in '{}'", pair));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        object.insert(key.to_string(), value);
    }
    Ok(Value::Object(object))
}

/// Read a JSON document from stdin
pub fn read_stdin_json() -> anyhow::Result<Value> {
    let value: Value = serde_json::from_reader(std::io::stdin().lock())
        .map_err(|e| anyhow::anyhow!("Invalid JSON on stdin: {}", e))?;
    Ok(value)
}
