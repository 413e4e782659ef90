use crate::value::{PropType, Value};

/// A named, typed value attached to an [`Item`](crate::Item).
///
/// A property with an empty name is treated as an invalid slot: the store
/// never allocates one, and merge and the decoders skip it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Property {
    name: String,
    value: Value,
}

impl Property {
    pub fn new<N: Into<String>, V: Into<Value>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub(crate) fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Value::None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn prop_type(&self) -> PropType {
        self.value.prop_type()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }

    /// Replaces the value; a previously held string is dropped here.
    pub fn set<V: Into<Value>>(&mut self, value: V) {
        self.value = value.into();
    }

    /// Adds `value` to the current one if the types match, otherwise sets it.
    pub fn add<V: Into<Value>>(&mut self, value: V) {
        self.value.accumulate(value.into());
    }

    /// Copies name and value from `other`, deep-copying any string payload.
    pub(crate) fn assign_from(&mut self, other: &Property) {
        self.name.clone_from(&other.name);
        self.value = other.value.clone();
    }
}
