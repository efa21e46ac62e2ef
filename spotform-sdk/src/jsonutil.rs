//! Sparse JSON encoding of API objects
//!
//! Requests carry three states per field: an absent key leaves the remote
//! value untouched, a value replaces it, and `null` clears it. Objects
//! generated by `api_object!` serialize through [`serialize_entry`], which
//! applies these rules together with the object's force-send list.

use heck::ToUpperCamelCase;
use serde::Serialize;
use serde::ser::{Error as _, SerializeMap};

use crate::optional::Optional;

/// Errors produced while encoding a request body
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to encode request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request body must be a JSON object, got {0}")]
    NotAnObject(String),
}

/// Upper-camel field name used in force-send and null-field lists
/// (e.g. "aclToken" -> "AclToken")
pub fn go_name(json_name: &str) -> String {
    json_name.to_upper_camel_case()
}

/// Write one field of an API object.
///
/// - `Value` is written as is.
/// - `Null` is written as `null`.
/// - `Unset` is omitted, unless force-sent, in which case the type's zero
///   value is written.
/// - A field that is both force-sent and `Null` is rejected.
pub fn serialize_entry<M, T>(
    map: &mut M,
    key: &'static str,
    field: &Optional<T>,
    force_send: &[String],
) -> Result<(), M::Error>
where
    M: SerializeMap,
    T: Serialize + Default,
{
    let forced = !force_send.is_empty() && force_send.iter().any(|f| *f == go_name(key));
    match field {
        Optional::Value(v) => map.serialize_entry(key, v),
        Optional::Null if forced => Err(M::Error::custom(format!(
            "conflicting intent for field '{}': force-sent and null",
            go_name(key)
        ))),
        Optional::Null => map.serialize_entry(key, &Option::<T>::None),
        Optional::Unset if forced => map.serialize_entry(key, &T::default()),
        Optional::Unset => Ok(()),
    }
}

/// Encode an API object as a sparse JSON document
pub fn marshal_json<T: Serialize + ?Sized>(object: &T) -> Result<serde_json::Value, EncodeError> {
    let value = serde_json::to_value(object)?;
    if !value.is_object() {
        return Err(EncodeError::NotAnObject(value.to_string()));
    }
    Ok(value)
}

/// Encode an API object as a sparse JSON string
pub fn marshal_json_string<T: Serialize + ?Sized>(object: &T) -> Result<String, EncodeError> {
    let value = marshal_json(object)?;
    Ok(serde_json::to_string(&value)?)
}

/// Apply a sparse document onto a stored one (JSON merge patch).
///
/// Absent keys are untouched, `null` removes a key, objects merge
/// recursively and anything else replaces the stored value.
pub fn merge_patch(target: &mut serde_json::Value, patch: &serde_json::Value) {
    let serde_json::Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = serde_json::Value::Object(serde_json::Map::new());
    }
    if let serde_json::Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(
                    target_map
                        .entry(key.clone())
                        .or_insert(serde_json::Value::Null),
                    value,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn go_names() {
        assert_eq!(go_name("aclToken"), "AclToken");
        assert_eq!(go_name("httpPutResponseHopLimit"), "HttpPutResponseHopLimit");
        assert_eq!(go_name("name"), "Name");
    }

    #[test]
    fn merge_patch_semantics() {
        let mut stored = json!({
            "name": "web",
            "integration": {"nomad": {"aclToken": "abc", "masterHost": "h"}},
            "tags": [1, 2]
        });
        merge_patch(
            &mut stored,
            &json!({
                "integration": {"nomad": {"aclToken": null}},
                "tags": [3]
            }),
        );
        assert_eq!(
            stored,
            json!({
                "name": "web",
                "integration": {"nomad": {"masterHost": "h"}},
                "tags": [3]
            })
        );
    }

    #[test]
    fn merge_patch_creates_missing_objects() {
        let mut stored = json!({});
        merge_patch(&mut stored, &json!({"a": {"b": 1, "c": null}}));
        assert_eq!(stored, json!({"a": {"b": 1}}));
    }

    #[test]
    fn marshal_rejects_non_objects() {
        assert!(matches!(
            marshal_json(&vec![1, 2]),
            Err(EncodeError::NotAnObject(_))
        ));
    }
}
