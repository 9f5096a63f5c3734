//! Attribute bag with "given" tracking.
//!
//! A command type declares its attribute names once through an
//! [`AttributeSchema`]. Instances carry [`Attributes`]: the shape is fixed by
//! the schema, values are JSON and may be reassigned before the command runs.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AttributeError;

#[derive(Debug, Clone, PartialEq)]
struct Declared {
    name: &'static str,
    default: Option<Value>,
}

/// Declared attribute names of a command type, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSchema {
    declared: Vec<Declared>,
}

impl AttributeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute with no default (`null` until given).
    pub fn attribute(self, name: &'static str) -> Self {
        self.declare(name, None)
    }

    /// Declare an attribute holding `default` until given.
    pub fn attribute_with_default(self, name: &'static str, default: impl Into<Value>) -> Self {
        self.declare(name, Some(default.into()))
    }

    fn declare(mut self, name: &'static str, default: Option<Value>) -> Self {
        self.declared.retain(|d| d.name != name);
        self.declared.push(Declared { name, default });
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declared.iter().any(|d| d.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.declared.iter().map(|d| d.name)
    }

    /// Attributes holding only defaults; nothing is given.
    pub fn defaults(&self) -> Attributes {
        let slots = self
            .declared
            .iter()
            .map(|d| {
                let value = d.default.clone().unwrap_or(Value::Null);
                (d.name.to_string(), Slot { value, given: false })
            })
            .collect();
        Attributes { slots }
    }

    /// Build attributes from construction input.
    ///
    /// `input` must be a JSON object or `null`. Every key present is given,
    /// including keys whose value is `null`.
    pub fn build(&self, input: Value) -> Result<Attributes, AttributeError> {
        let supplied = match input {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(AttributeError::NotAnObject {
                    found: json_kind(&other),
                });
            }
        };

        let mut attributes = self.defaults();
        for (name, value) in supplied {
            attributes.assign(&name, value)?;
        }
        Ok(attributes)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    value: Value,
    given: bool,
}

/// Attribute values of one command instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    slots: BTreeMap<String, Slot>,
}

impl Attributes {
    /// An empty bag, for commands that take no named attributes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Whether `name` was explicitly supplied at construction or through [`set`](Self::set).
    pub fn is_given(&self, name: &str) -> bool {
        self.slots.get(name).is_some_and(|slot| slot.given)
    }

    /// Current value, given or default.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.value)
    }

    /// Current value deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, AttributeError> {
        let value = self.get(name).ok_or_else(|| AttributeError::unknown(name))?;
        T::deserialize(value).map_err(|source| AttributeError::invalid(name, source))
    }

    /// Assign a declared attribute; it becomes given.
    pub fn set(&mut self, name: &str, value: impl Serialize) -> Result<(), AttributeError> {
        let value =
            serde_json::to_value(value).map_err(|source| AttributeError::invalid(name, source))?;
        self.assign(name, value)
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| AttributeError::unknown(name))?;
        slot.value = value;
        slot.given = true;
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn given_names(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.given)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All current values as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.slots
                .iter()
                .map(|(name, slot)| (name.clone(), slot.value.clone()))
                .collect(),
        )
    }
}

/// Presence semantics: `null`, `false`, whitespace-only strings and empty
/// collections are blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

pub fn is_present(value: &Value) -> bool {
    !is_blank(value)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
