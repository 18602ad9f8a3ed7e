//! Terminal rendering of tool output

use agent_utils::EnvStatus;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde_json::{Map, Value};

/// Longest cell printed before truncation, transcripts run to pages
const MAX_CELL_CHARS: usize = 120;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn cell_text(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate(&text, MAX_CELL_CHARS)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max).collect();
    format!("{kept}…")
}

/// Render an array of records as a table, columns in order of first appearance
///
/// Returns `None` when `data` is not a non-empty array of objects.
pub fn records_table(data: &Value) -> Option<Table> {
    let records: Vec<&Map<String, Value>> = data
        .as_array()?
        .iter()
        .map(Value::as_object)
        .collect::<Option<_>>()?;
    if records.is_empty() {
        return None;
    }

    let mut header: Vec<&str> = Vec::new();
    for record in &records {
        for name in record.keys() {
            if !header.contains(&name.as_str()) {
                header.push(name);
            }
        }
    }

    let mut table = new_table();
    table.set_header(header.iter().copied());
    for record in records {
        table.add_row(
            header
                .iter()
                .map(|name| record.get(*name).map(cell_text).unwrap_or_default()),
        );
    }
    Some(table)
}

/// Print a `{ symbol, data, guidance }` tool result
pub fn print_tool_output(output: &Value, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    if let Some(symbol) = output.get("symbol").and_then(Value::as_str) {
        println!("{symbol}");
    }

    let data = output.get("data").unwrap_or(output);
    match records_table(data) {
        Some(table) => println!("{table}"),
        None => println!("{}", serde_json::to_string_pretty(data)?),
    }

    if let Some(guidance) = output.get("guidance").and_then(Value::as_str) {
        println!("\n{guidance}");
    }
    Ok(())
}

pub fn tools_table(definitions: &[agent_tools::ToolDefinition]) -> Table {
    let mut table = new_table();
    table.set_header(["Tool", "Parameters", "Description"]);
    for definition in definitions {
        let params = definition.input_schema["properties"]
            .as_object()
            .map(|props| props.keys().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        table.add_row([definition.name.clone(), params, definition.description.clone()]);
    }
    table
}

pub fn env_table(statuses: &[EnvStatus]) -> Table {
    let mut table = new_table();
    table.set_header(["Variable", "Required", "Value", "Where to get it"]);
    for status in statuses {
        let required = if status.requirement.required { "yes" } else { "no" };
        let value = status.masked_value.as_deref().unwrap_or("not set");
        table.add_row([
            status.requirement.name,
            required,
            value,
            status.requirement.help,
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_table_unions_columns() {
        let data = json!([
            { "date": "2026-10-16", "close": 10.5 },
            { "date": "2026-10-15", "volume": 900 }
        ]);
        let rendered = records_table(&data).unwrap().to_string();
        assert!(rendered.contains("date"));
        assert!(rendered.contains("close"));
        assert!(rendered.contains("volume"));
        assert!(rendered.contains("10.5"));
    }

    #[test]
    fn test_records_table_rejects_other_shapes() {
        assert!(records_table(&json!({ "intrinsicValue": 10.0 })).is_none());
        assert!(records_table(&json!([])).is_none());
        assert!(records_table(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
