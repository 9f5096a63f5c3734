//! Declarative validation rules over an attribute bag.

use serde_json::Value;

use crate::attributes::{Attributes, is_blank};
use crate::errors::Errors;

pub const BLANK: &str = "can't be blank";
pub const EXCLUSION: &str = "is not included in the list";

/// Bounds for a length rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Length {
    pub minimum: Option<usize>,
    pub maximum: Option<usize>,
}

impl Length {
    pub fn minimum(minimum: usize) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: None,
        }
    }

    pub fn maximum(maximum: usize) -> Self {
        Self {
            minimum: None,
            maximum: Some(maximum),
        }
    }

    pub fn between(minimum: usize, maximum: usize) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }
    }

    fn check(&self, value: &Value) -> Option<String> {
        let length = measure(value);
        if let Some(min) = self.minimum.filter(|min| length < *min) {
            return Some(format!("is too short (minimum is {min} {})", characters(min)));
        }
        if let Some(max) = self.maximum.filter(|max| length > *max) {
            return Some(format!("is too long (maximum is {max} {})", characters(max)));
        }
        None
    }
}

fn measure(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => other.to_string().chars().count(),
    }
}

fn characters(n: usize) -> &'static str {
    if n == 1 { "character" } else { "characters" }
}

type CustomRule<T> = Box<dyn Fn(&T, &mut Errors)>;

enum Rule<T: ?Sized> {
    Presence(&'static str),
    Length(&'static str, Length),
    Inclusion(&'static str, Vec<Value>),
    Custom(CustomRule<T>),
}

/// Ordered rule list; rules run in declaration order and all of them run.
pub struct Validations<T: ?Sized> {
    rules: Vec<Rule<T>>,
}

impl<T: ?Sized> Default for Validations<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T: ?Sized> core::fmt::Debug for Validations<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Validations")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl<T: ?Sized> Validations<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presence(mut self, name: &'static str) -> Self {
        self.rules.push(Rule::Presence(name));
        self
    }

    pub fn length(mut self, name: &'static str, length: Length) -> Self {
        self.rules.push(Rule::Length(name, length));
        self
    }

    pub fn inclusion<I, V>(mut self, name: &'static str, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        self.rules.push(Rule::Inclusion(name, allowed));
        self
    }

    /// Custom rule with access to the validated object.
    pub fn validate_with(mut self, rule: impl Fn(&T, &mut Errors) + 'static) -> Self {
        self.rules.push(Rule::Custom(Box::new(rule)));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule and collect what failed.
    pub fn run(&self, target: &T, attributes: &Attributes) -> Errors {
        let mut errors = Errors::new();
        for rule in &self.rules {
            match rule {
                Rule::Presence(name) => {
                    if attributes.get(name).is_none_or(is_blank) {
                        errors.add(*name, BLANK);
                    }
                }
                Rule::Length(name, length) => {
                    let value = attributes.get(name).unwrap_or(&Value::Null);
                    if let Some(message) = length.check(value) {
                        errors.add(*name, message);
                    }
                }
                Rule::Inclusion(name, allowed) => {
                    let value = attributes.get(name).unwrap_or(&Value::Null);
                    if !allowed.contains(value) {
                        errors.add(*name, EXCLUSION);
                    }
                }
                Rule::Custom(rule) => rule(target, &mut errors),
            }
        }
        if errors.is_present() {
            tracing::trace!(failures = errors.len(), "validation rules failed");
        }
        errors
    }
}
