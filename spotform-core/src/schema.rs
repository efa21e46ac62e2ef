//! Schema - Define type schemas for resources
//!
//! Each registered field carries an attribute schema; the field map
//! assembles them into the resource schema the framework validates against.

use std::collections::HashMap;
use std::fmt;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Floating point number
    Float,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Set (unordered, no duplicates)
    Set(Box<AttributeType>),
    /// Map with string keys
    Map(Box<AttributeType>),
    /// Nested block element (a map with its own attribute schemas)
    Block(Vec<AttributeSchema>),
}

impl AttributeType {
    /// Single nested block: a list holding one block element
    pub fn block(attributes: Vec<AttributeSchema>) -> AttributeType {
        AttributeType::List(Box::new(AttributeType::Block(attributes)))
    }

    /// Set of nested block elements
    pub fn block_set(attributes: Vec<AttributeSchema>) -> AttributeType {
        AttributeType::Set(Box::new(AttributeType::Block(attributes)))
    }

    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Float, Value::Float(_) | Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Set(inner), Value::Set(items) | Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                    if items[..i].contains(item) {
                        return Err(TypeError::DuplicateItem { index: i });
                    }
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Block(attributes), Value::Map(map)) => {
                for attr in attributes {
                    match map.get(&attr.name) {
                        Some(v) => attr.validate(v).map_err(|e| TypeError::MapValueError {
                            key: attr.name.clone(),
                            inner: Box::new(e),
                        })?,
                        None if attr.required => {
                            return Err(TypeError::MissingRequired {
                                name: attr.name.clone(),
                            });
                        }
                        None => {}
                    }
                }
                if let Some(unknown) = map
                    .keys()
                    .find(|k| !attributes.iter().any(|a| &a.name == *k))
                {
                    return Err(TypeError::UnknownAttribute {
                        name: unknown.clone(),
                    });
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    /// The value the framework reports for an unset attribute of this type
    pub fn zero_value(&self) -> Value {
        match self {
            AttributeType::String | AttributeType::Enum(_) => Value::String(String::new()),
            AttributeType::Int => Value::Int(0),
            AttributeType::Float => Value::Float(0.0),
            AttributeType::Bool => Value::Bool(false),
            AttributeType::Custom { base, .. } => base.zero_value(),
            AttributeType::List(_) => Value::List(Vec::new()),
            AttributeType::Set(_) => Value::Set(Vec::new()),
            AttributeType::Map(_) | AttributeType::Block(_) => Value::Map(HashMap::new()),
        }
    }

    /// Fill defaults inside nested blocks.
    ///
    /// Optional block attributes that are missing get their default or the
    /// zero value; required ones are left missing so expand can report them.
    pub fn apply_defaults(&self, value: Value) -> Value {
        match (self, value) {
            (AttributeType::List(inner), Value::List(items)) => {
                Value::List(items.into_iter().map(|v| inner.apply_defaults(v)).collect())
            }
            (AttributeType::Set(inner), Value::Set(items) | Value::List(items)) => {
                Value::Set(items.into_iter().map(|v| inner.apply_defaults(v)).collect())
            }
            (AttributeType::Block(attributes), Value::Map(mut map)) => {
                for attr in attributes {
                    match map.remove(&attr.name) {
                        Some(v) => {
                            map.insert(attr.name.clone(), attr.attr_type.apply_defaults(v));
                        }
                        None if !attr.required => {
                            let filled = attr
                                .default
                                .clone()
                                .unwrap_or_else(|| attr.attr_type.zero_value());
                            map.insert(attr.name.clone(), filled);
                        }
                        None => {}
                    }
                }
                Value::Map(map)
            }
            (_, v) => v,
        }
    }

    /// Convert a JSON document into a value of this type
    pub fn value_from_json(&self, json: &serde_json::Value) -> Result<Value, TypeError> {
        let mismatch = || TypeError::TypeMismatch {
            expected: self.type_name(),
            got: json_type_name(json).to_string(),
        };

        match self {
            AttributeType::String | AttributeType::Enum(_) => json
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(mismatch),
            AttributeType::Int => json.as_i64().map(Value::Int).ok_or_else(mismatch),
            AttributeType::Float => json.as_f64().map(Value::Float).ok_or_else(mismatch),
            AttributeType::Bool => json.as_bool().map(Value::Bool).ok_or_else(mismatch),
            AttributeType::Custom { base, .. } => base.value_from_json(json),
            AttributeType::List(inner) | AttributeType::Set(inner) => {
                let array = json.as_array().ok_or_else(mismatch)?;
                let items = array
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        inner
                            .value_from_json(item)
                            .map_err(|e| TypeError::ListItemError {
                                index: i,
                                inner: Box::new(e),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if matches!(self, AttributeType::Set(_)) {
                    Ok(Value::Set(items))
                } else {
                    Ok(Value::List(items))
                }
            }
            AttributeType::Map(inner) => {
                let object = json.as_object().ok_or_else(mismatch)?;
                let mut map = HashMap::new();
                for (k, v) in object {
                    let value = inner
                        .value_from_json(v)
                        .map_err(|e| TypeError::MapValueError {
                            key: k.clone(),
                            inner: Box::new(e),
                        })?;
                    map.insert(k.clone(), value);
                }
                Ok(Value::Map(map))
            }
            AttributeType::Block(attributes) => {
                let object = json.as_object().ok_or_else(mismatch)?;
                let mut map = HashMap::new();
                for (k, v) in object {
                    if v.is_null() {
                        continue;
                    }
                    let attr = attributes.iter().find(|a| &a.name == k).ok_or_else(|| {
                        TypeError::UnknownAttribute { name: k.clone() }
                    })?;
                    let value =
                        attr.attr_type
                            .value_from_json(v)
                            .map_err(|e| TypeError::MapValueError {
                                key: k.clone(),
                                inner: Box::new(e),
                            })?;
                    map.insert(k.clone(), value);
                }
                Ok(Value::Map(map))
            }
        }
    }

    /// Human-readable type name (e.g. "List<Block>")
    pub fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Float => "Float".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Set(inner) => format!("Set<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block(_) => "Block".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "Bool",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "Int",
        serde_json::Value::Number(_) => "Float",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Array(_) => "List",
        serde_json::Value::Object(_) => "Map",
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' allows at most {max} items, got {got}")]
    TooManyItems { name: String, max: usize, got: usize },

    #[error("Duplicate set item at index {index}")]
    DuplicateItem { index: usize },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Value may be filled in by the remote side
    pub computed: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Upper bound on list/set length
    pub max_items: Option<usize>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            default: None,
            description: None,
            max_items: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Check a value against the type and the item limit
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        self.attr_type.validate(value)?;
        if let (Some(max), Some(items)) = (self.max_items, value.items())
            && items.len() > max
        {
            return Err(TypeError::TooManyItems {
                name: self.name.clone(),
                max,
                got: items.len(),
            });
        }
        Ok(())
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        // Check required attributes
        for (name, schema) in &self.attributes {
            if schema.required && !attributes.contains_key(name) && schema.default.is_none() {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        // Type check each attribute
        for (name, value) in attributes {
            match self.attributes.get(name) {
                Some(schema) => {
                    if let Err(e) = schema.validate(value) {
                        errors.push(e);
                    }
                }
                None => errors.push(TypeError::UnknownAttribute { name: name.clone() }),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill top-level defaults and nested block defaults
    pub fn apply_defaults(&self, mut attributes: HashMap<String, Value>) -> HashMap<String, Value> {
        for (name, schema) in &self.attributes {
            match attributes.remove(name) {
                Some(value) => {
                    attributes.insert(name.clone(), schema.attr_type.apply_defaults(value));
                }
                None => {
                    if let Some(default) = &schema.default {
                        attributes.insert(name.clone(), default.clone());
                    }
                }
            }
        }
        attributes
    }

    /// Build an attribute map from a JSON object, typed by this schema
    pub fn attributes_from_json(
        &self,
        json: &serde_json::Value,
    ) -> Result<HashMap<String, Value>, TypeError> {
        let object = json.as_object().ok_or_else(|| TypeError::TypeMismatch {
            expected: "Map".to_string(),
            got: json_type_name(json).to_string(),
        })?;

        let mut attributes = HashMap::new();
        for (name, value) in object {
            if value.is_null() {
                continue;
            }
            let schema = self
                .attributes
                .get(name)
                .ok_or_else(|| TypeError::UnknownAttribute { name: name.clone() })?;
            let value = schema
                .attr_type
                .value_from_json(value)
                .map_err(|e| TypeError::MapValueError {
                    key: name.clone(),
                    inner: Box::new(e),
                })?;
            attributes.insert(name.clone(), value);
        }
        Ok(attributes)
    }
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// TCP port (1-65535)
    pub fn port() -> AttributeType {
        AttributeType::Custom {
            name: "Port".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| match value {
                Value::Int(n) if (1..=65535).contains(n) => Ok(()),
                Value::Int(n) => Err(format!("Port {} out of range 1-65535", n)),
                _ => Err("Expected integer".to_string()),
            },
        }
    }

    /// Percentage (0-100), or -1 meaning "not set"
    pub fn percentage() -> AttributeType {
        AttributeType::Custom {
            name: "Percentage".to_string(),
            base: Box::new(AttributeType::Float),
            validate: |value| {
                let n = match value {
                    Value::Float(f) => *f,
                    Value::Int(i) => *i as f64,
                    _ => return Err("Expected number".to_string()),
                };
                if n == -1.0 || (0.0..=100.0).contains(&n) {
                    Ok(())
                } else {
                    Err(format!("Percentage {} out of range 0-100", n))
                }
            },
        }
    }
}
