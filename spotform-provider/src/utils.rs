//! Helpers for reading nested block attributes and writing tri-state leaves
//!
//! Readers are tolerant: a missing key or a value of the wrong shape is
//! reported as `None`, never as an error.

use std::collections::HashMap;

use spotform_core::resource::{FromValue, Value};
use spotform_sdk::Optional;

pub type Attributes = HashMap<String, Value>;

fn get<T: FromValue>(m: &Attributes, key: &str) -> Option<T> {
    m.get(key).and_then(Value::try_as)
}

/// Non-empty string
pub fn string(m: &Attributes, key: &str) -> Option<String> {
    get::<String>(m, key).filter(|s| !s.is_empty())
}

pub fn bool(m: &Attributes, key: &str) -> Option<bool> {
    get(m, key)
}

/// Strictly positive integer
pub fn positive_int(m: &Attributes, key: &str) -> Option<i64> {
    get::<i64>(m, key).filter(|v| *v > 0)
}

/// Integer unless it equals the "not set" sentinel
pub fn int_or_sentinel(m: &Attributes, key: &str, sentinel: i64) -> Option<i64> {
    get::<i64>(m, key).and_then(|v| Optional::from_sentinel(v, sentinel))
}

/// Float unless it equals the "not set" sentinel
pub fn float_or_sentinel(m: &Attributes, key: &str, sentinel: f64) -> Option<f64> {
    get::<f64>(m, key).and_then(|v| Optional::from_sentinel(v, sentinel))
}

/// Non-empty strings of a list attribute
pub fn strings(m: &Attributes, key: &str) -> Vec<String> {
    get::<Vec<String>>(m, key)
        .unwrap_or_default()
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
}

/// Elements of a nested block list or set
pub fn blocks<'a>(m: &'a Attributes, key: &str) -> impl Iterator<Item = &'a Attributes> {
    m.get(key)
        .and_then(Value::items)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_map)
}

/// First element of a single nested block
pub fn first_block<'a>(m: &'a Attributes, key: &str) -> Option<&'a Attributes> {
    m.get(key).and_then(Value::first_block)
}

/// Store an expanded leaf. A value is set; an absent value clears the
/// field when `nullify` holds and leaves it untouched otherwise.
pub fn assign<T>(field: &mut Optional<T>, value: Option<T>, nullify: bool) {
    match value {
        Some(v) => *field = Optional::Value(v),
        None if nullify => *field = Optional::Null,
        None => {}
    }
}

/// Flattened integer leaf, with `sentinel` standing in for a missing value
pub fn int_value(field: &Optional<i64>, sentinel: i64) -> Value {
    Value::Int(field.value_or(sentinel))
}

pub fn float_value(field: &Optional<f64>, sentinel: f64) -> Value {
    Value::Float(field.value_or(sentinel))
}

pub fn string_value(field: &Optional<String>) -> Value {
    Value::String(field.value_or_default())
}

pub fn bool_value(field: &Optional<bool>) -> Value {
    Value::Bool(field.value_or_default())
}

/// Build a block element from `(name, value)` pairs
pub fn block<const N: usize>(entries: [(&str, Value); N]) -> Attributes {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> Attributes {
        block([
            ("host", Value::from("nomad.local")),
            ("empty", Value::from("")),
            ("port", Value::Int(4646)),
            ("cooldown", Value::Int(-1)),
            ("percentage", Value::Float(-1.0)),
            ("enabled", Value::Bool(false)),
            (
                "queues",
                Value::List(vec![Value::from("q1"), Value::from(""), Value::Int(3)]),
            ),
            (
                "sets",
                Value::Set(vec![
                    Value::Map(block([("key", Value::from("a"))])),
                    Value::Map(block([("key", Value::from("b"))])),
                ]),
            ),
        ])
    }

    #[test]
    fn tolerant_readers() {
        let m = attrs();
        assert_eq!(string(&m, "host").as_deref(), Some("nomad.local"));
        assert_eq!(string(&m, "empty"), None);
        assert_eq!(string(&m, "port"), None);
        assert_eq!(string(&m, "missing"), None);
        assert_eq!(positive_int(&m, "port"), Some(4646));
        assert_eq!(positive_int(&m, "host"), None);
        assert_eq!(bool(&m, "enabled"), Some(false));
    }

    #[test]
    fn sentinel_readers() {
        let m = attrs();
        assert_eq!(int_or_sentinel(&m, "cooldown", -1), None);
        assert_eq!(int_or_sentinel(&m, "port", -1), Some(4646));
        assert_eq!(float_or_sentinel(&m, "percentage", -1.0), None);
        assert_eq!(float_or_sentinel(&m, "port", -1.0), Some(4646.0));
    }

    #[test]
    fn collections() {
        let m = attrs();
        assert_eq!(strings(&m, "queues"), vec!["q1".to_string()]);
        assert_eq!(blocks(&m, "sets").count(), 2);
        assert_eq!(blocks(&m, "missing").count(), 0);
        assert!(first_block(&m, "sets").is_some());
        assert!(first_block(&m, "host").is_none());
    }

    #[test]
    fn assign_respects_nullify() {
        let mut field: Optional<i64> = Optional::Unset;
        assign(&mut field, None, false);
        assert!(field.is_unset());
        assign(&mut field, None, true);
        assert!(field.is_null());
        assign(&mut field, Some(3), true);
        assert_eq!(field, Optional::Value(3));
    }

    #[test]
    fn flattened_leaves() {
        assert_eq!(int_value(&Optional::Unset, -1), Value::Int(-1));
        assert_eq!(int_value(&Optional::Null, 1357997531), Value::Int(1357997531));
        assert_eq!(int_value(&Optional::Value(300), -1), Value::Int(300));
        assert_eq!(string_value(&Optional::Null), Value::from(""));
        assert_eq!(bool_value(&Optional::Value(true)), Value::Bool(true));
    }
}
