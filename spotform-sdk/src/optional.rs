//! Tri-state optional field values
//!
//! An API object field is either untouched, set to a value, or explicitly
//! cleared. Only the last two reach the wire: `Value` as the value and
//! `Null` as JSON `null`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Optional<T> {
    /// Not specified; omitted from requests
    #[default]
    Unset,
    /// Specified value
    Value(T),
    /// Explicitly cleared; sent as `null`
    Null,
}

impl<T> Optional<T> {
    /// `Some` becomes a value, `None` an explicit clear
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Optional::Value(v),
            None => Optional::Null,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Optional::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Optional::Null)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Optional::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Optional::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Optional::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Optional::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Optional<&T> {
        match self {
            Optional::Unset => Optional::Unset,
            Optional::Value(v) => Optional::Value(v),
            Optional::Null => Optional::Null,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Optional<U> {
        match self {
            Optional::Unset => Optional::Unset,
            Optional::Value(v) => Optional::Value(f(v)),
            Optional::Null => Optional::Null,
        }
    }

    /// Turn an unset or cleared field into a default value and borrow it
    pub fn get_or_insert_default(&mut self) -> &mut T
    where
        T: Default,
    {
        if !self.is_value() {
            *self = Optional::Value(T::default());
        }
        match self {
            Optional::Value(v) => v,
            _ => unreachable!("field was just set"),
        }
    }
}

impl<T: Clone> Optional<T> {
    /// The value, or `default` when unset or cleared
    pub fn value_or(&self, default: T) -> T {
        self.value().cloned().unwrap_or(default)
    }
}

impl<T: Clone + Default> Optional<T> {
    /// The value, or the type's zero value when unset or cleared
    pub fn value_or_default(&self) -> T {
        self.value().cloned().unwrap_or_default()
    }
}

impl<T: PartialEq> Optional<T> {
    /// Value unless it equals the legacy "not set" marker
    pub fn from_sentinel(value: T, sentinel: T) -> Option<T> {
        (value != sentinel).then_some(value)
    }
}

impl<T> From<T> for Optional<T> {
    fn from(value: T) -> Self {
        Optional::Value(value)
    }
}

impl<T: Serialize> Serialize for Optional<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Optional::Value(v) => v.serialize(serializer),
            Optional::Unset | Optional::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Optional<T> {
    /// Present `null` decodes as `Null`; a missing field relies on
    /// `#[serde(default)]` to stay `Unset`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Optional::from_option(Option::<T>::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_option_records_clear_intent() {
        assert_eq!(Optional::from_option(Some(3)), Optional::Value(3));
        assert_eq!(Optional::<i64>::from_option(None), Optional::Null);
    }

    #[test]
    fn accessors() {
        let v: Optional<String> = Optional::Value("abc".to_string());
        assert_eq!(v.value_or_default(), "abc");
        assert_eq!(Optional::<String>::Null.value_or_default(), "");
        assert_eq!(Optional::<i64>::Unset.value_or(-1), -1);
        assert!(Optional::<i64>::Unset.is_unset());
        assert!(Optional::<i64>::Null.is_null());
        assert_eq!(Optional::Value(2).map(|v| v * 2), Optional::Value(4));
    }

    #[test]
    fn get_or_insert_default_replaces_null() {
        let mut v: Optional<Vec<i64>> = Optional::Null;
        v.get_or_insert_default().push(1);
        assert_eq!(v, Optional::Value(vec![1]));
    }

    #[test]
    fn sentinel_maps_to_none() {
        assert_eq!(Optional::from_sentinel(-1, -1), None);
        assert_eq!(Optional::from_sentinel(300, -1), Some(300));
        assert_eq!(Optional::from_sentinel(1357997531, 1357997531), None);
    }

    #[test]
    fn decode_null_as_cleared() {
        let v: Optional<String> = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
        let v: Optional<String> = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(v, Optional::Value("x".to_string()));
    }
}
