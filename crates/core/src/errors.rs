//! Structured error collection keyed by field.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Key under which messages are recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKey {
    /// Errors about the command as a whole.
    Base,
    /// Errors about a single attribute.
    Field(String),
}

impl ErrorKey {
    pub const BASE_NAME: &'static str = "base";

    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == Self::BASE_NAME {
            Self::Base
        } else {
            Self::Field(name)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Base => Self::BASE_NAME,
            Self::Field(name) => name,
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, Self::Base)
    }
}

impl core::fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ErrorKey {
    fn from(value: &str) -> Self {
        Self::field(value)
    }
}

impl From<String> for ErrorKey {
    fn from(value: String) -> Self {
        Self::field(value)
    }
}

impl From<&ErrorKey> for ErrorKey {
    fn from(value: &ErrorKey) -> Self {
        value.clone()
    }
}

/// Ordered mapping from [`ErrorKey`] to messages.
///
/// Keys keep first-insertion order; messages under a key keep insertion order.
/// A key never maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors {
    entries: Vec<(ErrorKey, Vec<String>)>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` under `key`.
    pub fn add(&mut self, key: impl Into<ErrorKey>, message: impl Into<String>) {
        let key = key.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((key, vec![message])),
        }
    }

    /// Messages under `key`; empty when nothing was recorded.
    pub fn get(&self, key: impl Into<ErrorKey>) -> &[String] {
        let key = key.into();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn base(&self) -> &[String] {
        self.get(ErrorKey::Base)
    }

    pub fn contains_key(&self, key: impl Into<ErrorKey>) -> bool {
        !self.get(key).is_empty()
    }

    /// Append every message of `other`, keeping duplicates.
    pub fn merge(&mut self, other: &Errors) {
        for (key, messages) in &other.entries {
            for message in messages {
                self.add(key.clone(), message.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_present(&self) -> bool {
        !self.is_empty()
    }

    /// Total number of messages across all keys.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ErrorKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Every (key, message) pair in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&ErrorKey, &str)> {
        self.entries
            .iter()
            .flat_map(|(key, messages)| messages.iter().map(move |m| (key, m.as_str())))
    }

    /// Human-readable messages: base messages verbatim, field messages prefixed.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .map(|(key, message)| match key {
                ErrorKey::Base => message.to_string(),
                ErrorKey::Field(name) => format!("{} {}", humanize(name), message),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = (&'a ErrorKey, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a ErrorKey, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl core::fmt::Display for Errors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Serialize for ErrorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ErrorKey::field)
    }
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, messages) in &self.entries {
            map.serialize_entry(key, messages)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Errors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ErrorsVisitor;

        impl<'de> Visitor<'de> for ErrorsVisitor {
            type Value = Errors;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a map of keys to message lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Errors, A::Error> {
                let mut errors = Errors::new();
                while let Some((key, messages)) = access.next_entry::<ErrorKey, Vec<String>>()? {
                    for message in messages {
                        errors.add(key.clone(), message);
                    }
                }
                Ok(errors)
            }
        }

        deserializer.deserialize_map(ErrorsVisitor)
    }
}
