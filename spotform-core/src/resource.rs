//! Resource - Attribute values and the per-operation resource data accessor

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::{ResourceSchema, TypeError};

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource type (e.g., "spotinst_elastigroup_aws")
    pub resource_type: String,
    /// Remote identifier (e.g., "sig-1234abcd"), or "(new)" before creation
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

/// Attribute value of a resource
///
/// Nested blocks are represented as a `List` (or `Set`) of `Map` elements,
/// the same shape the framework hands to expand functions.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    /// Unordered collection; equality ignores element order
    Set(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => {
                // Multiset comparison: each element of `b` matches at most once
                let mut unmatched: Vec<&Value> = b.iter().collect();
                a.len() == b.len()
                    && a.iter().all(|x| match unmatched.iter().position(|y| *y == x) {
                        Some(i) => {
                            unmatched.swap_remove(i);
                            true
                        }
                        None => false,
                    })
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Tolerant accessor: a shape mismatch yields `None`, never an error.
    pub fn try_as<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }

    /// Whether this is the zero value of its kind (`GetOk` semantics)
    pub fn is_zero(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Bool(b) => !b,
            Value::List(items) | Value::Set(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Elements of a list or a set
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// First element of a single-block list, if it is a map
    pub fn first_block(&self) -> Option<&HashMap<String, Value>> {
        self.items()?.first()?.as_map()
    }

    /// Wrap attributes as a single-element block list
    pub fn block(attributes: HashMap<String, Value>) -> Value {
        Value::List(vec![Value::Map(attributes)])
    }

    /// Convert to JSON (sets become arrays)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) | Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub(crate) fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Float(_) => "Float".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Set(_) => "Set".to_string(),
            Value::Map(_) => "Map".to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items.into_iter().map(Value::String).collect())
    }
}

/// Types that can be extracted from a [`Value`] without failing
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            // Whole numbers arrive as integers from some config sources
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: &Value) -> Option<Self> {
        value.items().map(<[Value]>::to_vec)
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: &Value) -> Option<Self> {
        value
            .items()
            .map(|items| items.iter().filter_map(Value::try_as::<String>).collect())
    }
}

impl FromValue for HashMap<String, Value> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_map().cloned()
    }
}

/// Attribute accessor for one in-flight operation
///
/// During create and update a config is attached and `get` reads from it;
/// during read only the state is present. `set` always writes state.
#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<ResourceSchema>,
    id: Option<String>,
    state: HashMap<String, Value>,
    config: Option<HashMap<String, Value>>,
}

impl ResourceData {
    pub fn new(schema: Arc<ResourceSchema>) -> Self {
        Self {
            schema,
            id: None,
            state: HashMap::new(),
            config: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_state(mut self, state: HashMap<String, Value>) -> Self {
        self.state = state;
        self
    }

    /// Attach the desired configuration; schema defaults are filled in.
    pub fn with_config(mut self, config: HashMap<String, Value>) -> Self {
        self.config = Some(self.schema.apply_defaults(config));
        self
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match &self.config {
            Some(config) => config.get(key),
            None => self.state.get(key),
        }
    }

    /// Like `get`, but zero values count as absent
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_zero())
    }

    /// Whether the configured value differs from the prior state.
    ///
    /// Absent and zero values compare equal, as the framework treats them.
    pub fn has_change(&self, key: &str) -> bool {
        let Some(config) = &self.config else {
            return false;
        };
        let desired = config.get(key).filter(|v| !v.is_zero());
        let current = self.state.get(key).filter(|v| !v.is_zero());
        desired != current
    }

    /// Write an attribute into state, checked against the schema
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), TypeError> {
        let schema = self
            .schema
            .attributes
            .get(key)
            .ok_or_else(|| TypeError::UnknownAttribute {
                name: key.to_string(),
            })?;
        schema.validate(&value)?;
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    pub fn state(&self) -> &HashMap<String, Value> {
        &self.state
    }

    pub fn into_state(self) -> HashMap<String, Value> {
        self.state
    }
}
