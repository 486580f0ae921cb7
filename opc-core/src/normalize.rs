//! List normalization - Canonical ordering of unordered collections
//!
//! Tags, SSH keys and similar sets come back from the API in arbitrary order.
//! They are sorted before being written to state so that equal sets compare
//! equal. Duplicates are kept: the API decides whether they are meaningful.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::resource::Value;

/// Sort strings in ascending, case-sensitive order
pub fn normalize_strings(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

/// Sort integers in ascending order
pub fn normalize_ints(mut values: Vec<i64>) -> Vec<i64> {
    values.sort();
    values
}

/// Sorted `Value::List` of strings, ready to be stored
pub fn string_list_value<I, S>(values: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values = normalize_strings(values.into_iter().map(Into::into).collect());
    Value::List(values.into_iter().map(Value::String).collect())
}

/// Sorted `Value::List` of integers, ready to be stored
pub fn int_list_value(values: impl IntoIterator<Item = i64>) -> Value {
    let values = normalize_ints(values.into_iter().collect());
    Value::List(values.into_iter().map(Value::Int).collect())
}

/// Read a list of strings from an attribute map
///
/// A missing attribute yields an empty list.
pub fn get_string_list(attributes: &HashMap<String, Value>, key: &str) -> Result<Vec<String>> {
    match attributes.get(key) {
        None => Ok(Vec::new()),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(Error::validation(format!(
                    "'{}' must be a list of strings, found {}",
                    key,
                    other.type_name()
                ))),
            })
            .collect(),
        Some(other) => Err(Error::validation(format!(
            "'{}' must be a list, found {}",
            key,
            other.type_name()
        ))),
    }
}

/// Read a list of integers from an attribute map
///
/// A missing attribute yields an empty list.
pub fn get_int_list(attributes: &HashMap<String, Value>, key: &str) -> Result<Vec<i64>> {
    match attributes.get(key) {
        None => Ok(Vec::new()),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| match item {
                Value::Int(n) => Ok(*n),
                other => Err(Error::validation(format!(
                    "'{}' must be a list of integers, found {}",
                    key,
                    other.type_name()
                ))),
            })
            .collect(),
        Some(other) => Err(Error::validation(format!(
            "'{}' must be a list, found {}",
            key,
            other.type_name()
        ))),
    }
}
