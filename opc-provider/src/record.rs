//! Typed access to nested configuration records
//!
//! Nested blocks (network interfaces, storage attachments, orchestrated
//! instances) arrive as `Value::Map` records inside a `Value::List`.

use std::collections::HashMap;

use opc_core::normalize::get_string_list;
use opc_core::resource::Value;
use opc_core::{Error, Result};

/// Borrowed view over one configuration record
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Block name used in error messages (e.g., "network interface")
    kind: &'static str,
    fields: &'a HashMap<String, Value>,
}

impl<'a> Record<'a> {
    pub fn new(kind: &'static str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Map(fields) => Ok(Self { kind, fields }),
            other => Err(Error::validation(format!(
                "{} must be a block, found {}",
                kind,
                other.type_name()
            ))),
        }
    }

    pub fn from_map(kind: &'static str, fields: &'a HashMap<String, Value>) -> Self {
        Self { kind, fields }
    }

    pub fn fields(&self) -> &'a HashMap<String, Value> {
        self.fields
    }

    /// Optional string; empty strings count as unset
    pub fn string(&self, key: &str) -> Result<Option<String>> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mistyped(key, "String", other)),
        }
    }

    pub fn require_string(&self, key: &str) -> Result<String> {
        self.string(key)?
            .ok_or_else(|| Error::validation(format!("'{}' is required for {}", key, self.kind)))
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(self.mistyped(key, "Int", other)),
        }
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mistyped(key, "Bool", other)),
        }
    }

    /// Optional JSON document held in a string attribute
    pub fn json(&self, key: &str) -> Result<Option<serde_json::Value>> {
        self.string(key)?
            .map(|doc| parse_json(key, &doc))
            .transpose()
    }

    pub fn strings(&self, key: &str) -> Result<Vec<String>> {
        get_string_list(self.fields, key)
    }

    /// Whether the key holds a non-empty value
    pub fn is_set(&self, key: &str) -> bool {
        match self.fields.get(key) {
            None => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::List(items)) => !items.is_empty(),
            Some(Value::Map(map)) => !map.is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(Value::Int(_)) => true,
        }
    }

    fn mistyped(&self, key: &str, expected: &str, got: &Value) -> Error {
        Error::validation(format!(
            "'{}' of {} must be {}, found {}",
            key,
            self.kind,
            expected,
            got.type_name()
        ))
    }
}

fn parse_json(key: &str, doc: &str) -> Result<serde_json::Value> {
    serde_json::from_str(doc)
        .map_err(|e| Error::parse(format!("{} is not valid JSON: {}", key, e)))
}

/// State form of a JSON document: compact, object keys sorted
pub fn json_value(doc: &serde_json::Value) -> Value {
    Value::String(doc.to_string())
}

/// Canonical text of a configured JSON document
///
/// Configured and stored documents are compared in this form.
pub fn canonical_json(key: &str, doc: &str) -> Result<String> {
    parse_json(key, doc).map(|json| json.to_string())
}

/// Iterate the records of a nested block list
///
/// A missing block is an empty list.
pub fn records<'a>(kind: &'static str, value: Option<&'a Value>) -> Result<Vec<Record<'a>>> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::List(items)) => items.iter().map(|item| Record::new(kind, item)).collect(),
        Some(other) => Err(Error::validation(format!(
            "{} blocks must be a list, found {}",
            kind,
            other.type_name()
        ))),
    }
}

/// Builder for an output record; empty values are skipped
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: HashMap<String, Value>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn set_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.set(key, v),
            _ => self,
        }
    }

    pub fn set_list(mut self, key: &str, values: &[String]) -> Self {
        if !values.is_empty() {
            self.fields.insert(
                key.to_string(),
                Value::List(values.iter().cloned().map(Value::String).collect()),
            );
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Map(self.fields)
    }
}
