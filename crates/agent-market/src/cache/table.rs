//! Tabular values and their stored form

use crate::api::types::Record;
use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Version of the stored table envelope
const TABLE_FORMAT: u32 = 1;

/// A single typed table value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Bool(v) => Value::Bool(*v),
            Cell::Int(v) => Value::from(*v),
            Cell::Float(v) => Value::from(*v),
            Cell::Text(v) => Value::String(v.clone()),
        }
    }
}

/// Non-finite floats have no stored form and become `Null`
impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_finite() { Cell::Float(v) } else { Cell::Null }
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Null, Cell::from)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        v.map_or(Cell::Null, Cell::Text)
    }
}

impl From<&Value> for Cell {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map_or(Cell::Null, Cell::from),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

/// One row: its index label and one cell per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub index: String,
    pub values: Vec<Cell>,
}

/// Rows by named columns with an index column, in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    index_name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format: u32,
    table: &'a Table,
}

#[derive(Deserialize)]
struct Envelope {
    format: u32,
    table: Table,
}

impl Table {
    pub fn new<S: Into<String>>(
        index_name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table with a fixed column set from JSON records
    ///
    /// Fields outside `columns` are dropped and missing ones become `Null`.
    pub fn from_records(index_field: &str, columns: &[&str], records: &[Record]) -> Self {
        let mut table = Self::new(index_field, columns.iter().copied());
        for record in records {
            let values = columns
                .iter()
                .map(|c| record.get(*c).map_or(Cell::Null, Cell::from))
                .collect();
            table.rows.push(Row {
                index: index_label(record.get(index_field)),
                values,
            });
        }
        table
    }

    /// Build a table keeping every field, columns in order of first appearance
    pub fn from_records_all_columns(index_field: &str, records: &[Record]) -> Self {
        let mut columns: Vec<&str> = Vec::new();
        for record in records {
            for name in record.keys() {
                if name != index_field && !columns.contains(&name.as_str()) {
                    columns.push(name);
                }
            }
        }
        Self::from_records(index_field, &columns, records)
    }

    /// Append a row; NaN and infinite floats are stored as `Null`
    pub fn push_row(&mut self, index: impl Into<String>, values: Vec<Cell>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(MarketError::SerializationError(format!(
                "row has {} values, table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        let values = values
            .into_iter()
            .map(|cell| match cell {
                Cell::Float(v) if !v.is_finite() => Cell::Null,
                other => other,
            })
            .collect();
        self.rows.push(Row {
            index: index.into(),
            values,
        });
        Ok(())
    }

    /// Append the rows of a table with identical columns
    pub fn append(&mut self, other: Table) -> Result<()> {
        if other.columns != self.columns {
            return Err(MarketError::SerializationError(
                "cannot append a table with different columns".to_string(),
            ));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Table {
        Table {
            index_name: self.index_name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let pos = self.column_position(name)?;
        Some(self.rows.iter().map(|r| &r.values[pos]).collect())
    }

    /// Cell at the `row`-th row of a column
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let pos = self.column_position(column)?;
        self.rows.get(row).map(|r| &r.values[pos])
    }

    /// Cell by index label and column
    pub fn lookup(&self, index: &str, column: &str) -> Option<&Cell> {
        let pos = self.column_position(column)?;
        self.rows
            .iter()
            .find(|r| r.index == index)
            .map(|r| &r.values[pos])
    }

    /// Render rows as JSON objects, index first
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = serde_json::Map::new();
                record.insert(self.index_name.clone(), Value::String(row.index.clone()));
                for (name, cell) in self.columns.iter().zip(&row.values) {
                    record.insert(name.clone(), cell.to_json());
                }
                Value::Object(record)
            })
            .collect()
    }

    /// Encode for the key-value store
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&EnvelopeRef {
            format: TABLE_FORMAT,
            table: self,
        })
        .map_err(|e| MarketError::SerializationError(e.to_string()))
    }

    /// Decode a stored table, rejecting unknown formats and ragged rows
    pub fn from_bytes(bytes: &[u8]) -> Result<Table> {
        let envelope: Envelope = serde_json::from_slice(bytes)
            .map_err(|e| MarketError::SerializationError(e.to_string()))?;

        if envelope.format != TABLE_FORMAT {
            return Err(MarketError::SerializationError(format!(
                "unsupported table format {}",
                envelope.format
            )));
        }

        let table = envelope.table;
        if let Some(row) = table
            .rows
            .iter()
            .find(|r| r.values.len() != table.columns.len())
        {
            return Err(MarketError::SerializationError(format!(
                "row {} has {} values, table has {} columns",
                row.index,
                row.values.len(),
                table.columns.len()
            )));
        }

        Ok(table)
    }
}

fn index_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Encode a scalar as its decimal string
pub fn encode_scalar(value: f64) -> Vec<u8> {
    value.to_string().into_bytes()
}

pub fn decode_scalar(bytes: &[u8]) -> Result<f64> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| MarketError::SerializationError(e.to_string()))?;
    text.trim()
        .parse::<f64>()
        .map_err(|e| MarketError::SerializationError(format!("{text:?} is not a number: {e}")))
}
