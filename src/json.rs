//! Filtering dynamic JSON objects.
//!
//! Used by the `filterql` binary: the field set is declared at runtime as
//! `Name:type` pairs and each field reads the same-named key of a row.

use crate::access::{DataType, FieldRegistry, Value};
use crate::error::RegistryError;
use anyhow::{anyhow, bail, Context, Result};
use std::io::Read;
use std::str::FromStr;

/// One row of input: a JSON object
pub type JsonRow = serde_json::Map<String, serde_json::Value>;

/// A field declared as `Name:type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub data_type: DataType,
}

impl FromStr for FieldSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, type_name) = s
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("expected NAME:TYPE, got '{}'", s))?;
        let name = name.trim();
        if name.is_empty() {
            bail!("missing field name in '{}'", s);
        }
        Ok(FieldSpec {
            name: name.to_string(),
            data_type: parse_data_type(type_name.trim())?,
        })
    }
}

/// Parse a type name as printed by `DataType`'s `Display`
pub fn parse_data_type(name: &str) -> Result<DataType> {
    let data_type = match name.to_ascii_lowercase().as_str() {
        "bool" | "boolean" => DataType::Boolean,
        "int32" | "int" => DataType::Int32,
        "int64" | "long" => DataType::Int64,
        "float64" | "double" => DataType::Float64,
        "string" => DataType::String,
        "date" => DataType::Date,
        "datetime" => DataType::DateTime,
        "guid" | "uuid" => DataType::Guid,
        _ => bail!("unknown field type '{}'", name),
    };
    Ok(data_type)
}

/// Build a registry whose fields read keys of a JSON object
pub fn registry(specs: &[FieldSpec]) -> Result<FieldRegistry<JsonRow>, RegistryError> {
    specs
        .iter()
        .fold(FieldRegistry::builder(), |builder, spec| {
            let key = spec.name.clone();
            let data_type = spec.data_type;
            builder.field(spec.name.clone(), data_type, move |row: &JsonRow| {
                row.get(&key)
                    .map_or(Value::Null, |json| json_to_value(json, data_type))
            })
        })
        .build()
}

/// Convert a JSON value to a field value. Anything that does not fit the
/// declared type reads as `Null`.
pub fn json_to_value(json: &serde_json::Value, data_type: DataType) -> Value {
    use serde_json::Value as Json;

    match (json, data_type) {
        (Json::Bool(b), DataType::Boolean) => Value::Boolean(*b),
        (Json::Number(n), DataType::Int32) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map_or(Value::Null, Value::Int32),
        (Json::Number(n), DataType::Int64) => n.as_i64().map_or(Value::Null, Value::Int64),
        (Json::Number(n), DataType::Float64) => n.as_f64().map_or(Value::Null, Value::Float64),
        (Json::String(s), DataType::String) => Value::String(s.clone()),
        (Json::String(s), DataType::Date | DataType::DateTime | DataType::Guid) => {
            data_type.parse_literal(s).unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// Read a JSON array of objects
pub fn load_rows(reader: impl Read) -> Result<Vec<JsonRow>> {
    let json: serde_json::Value =
        serde_json::from_reader(reader).context("Failed to parse input as JSON")?;

    let items = match json {
        serde_json::Value::Array(items) => items,
        other => bail!("expected a JSON array of objects, got {}", type_name(&other)),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            serde_json::Value::Object(row) => Ok(row),
            other => Err(anyhow!(
                "element {} is {}, expected an object",
                idx,
                type_name(&other)
            )),
        })
        .collect()
}

fn type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
