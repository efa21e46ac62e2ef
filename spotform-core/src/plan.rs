//! Plan - The write request an operation would send
//!
//! A Plan is computed without side effects; applying it is up to the caller.

use std::fmt;

/// Kind of write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update { id: String },
    /// Nothing in the configuration differs from state
    NoChange { id: String },
}

/// Write request for one resource
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub resource_type: String,
    pub operation: Operation,
    /// Sparse request body; `None` when there is nothing to send
    pub body: Option<serde_json::Value>,
}

impl Plan {
    pub fn create(resource_type: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            operation: Operation::Create,
            body: Some(body),
        }
    }

    pub fn update(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            operation: Operation::Update { id: id.into() },
            body: Some(body),
        }
    }

    pub fn no_change(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            operation: Operation::NoChange { id: id.into() },
            body: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_none()
    }

    /// Dotted paths the request explicitly clears (sent as `null`)
    pub fn cleared_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if let Some(body) = &self.body {
            collect_null_paths(body, String::new(), &mut paths);
        }
        paths.sort();
        paths
    }
}

fn collect_null_paths(value: &serde_json::Value, prefix: String, paths: &mut Vec<String>) {
    if let serde_json::Value::Object(map) = value {
        for (key, v) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            if v.is_null() {
                paths.push(path);
            } else {
                collect_null_paths(v, path, paths);
            }
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Operation::Create => write!(f, "Plan: create {}", self.resource_type),
            Operation::Update { id } => write!(f, "Plan: update {} ({})", self.resource_type, id),
            Operation::NoChange { id } => {
                write!(f, "No changes: {} ({})", self.resource_type, id)
            }
        }
    }
}
