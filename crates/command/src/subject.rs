//! Change detection against a backing domain object.
//!
//! A command type names one of its attributes as its subject: the object the
//! other given attributes are compared against. The name is a per-type
//! constant, so every instance shares it and nothing can reassign it.
//!
//! The subject is compared in its JSON form. By default it is the value of the
//! named attribute; a command holding a typed domain object overrides
//! [`Subject::resolve_subject`] to serialize it instead.
//!
//! ```ignore
//! impl Subject for RenameUser {
//!     const SUBJECT_NAME: Option<&'static str> = Some("user");
//! }
//!
//! if self.changed("name")? { /* ... */ }
//! ```

use serde_json::Value;

use cmdkit_core::{CommandError, CommandResult, is_present};

use crate::command::Command;

/// How sequence-valued attributes are compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Comparison {
    /// Sequences are compared as multisets; reordering alone is not a change.
    #[default]
    Lenient,
    /// Plain equality; any difference, including order, is a change.
    Strict,
}

pub trait Subject: Command {
    /// Attribute holding the subject. `None` means the type never configured one.
    const SUBJECT_NAME: Option<&'static str> = None;

    /// Look the subject up. Called at most once per instance.
    fn resolve_subject(&self, name: &str) -> Option<Value> {
        self.attributes().get(name).cloned()
    }

    /// The subject, resolved on first access and memoized.
    fn subject(&self) -> CommandResult<Option<&Value>> {
        let name =
            Self::SUBJECT_NAME.ok_or_else(|| CommandError::undefined_subject(self.command_name()))?;
        let resolved = self
            .state()
            .subject_cell()
            .get_or_init(|| self.resolve_subject(name));
        Ok(resolved.as_ref())
    }

    /// Lenient change check; see [`changed_with`](Self::changed_with).
    fn changed(&self, name: &str) -> CommandResult<bool> {
        self.changed_with(name, Comparison::Lenient)
    }

    /// Strict change check; see [`changed_with`](Self::changed_with).
    fn changed_strict(&self, name: &str) -> CommandResult<bool> {
        self.changed_with(name, Comparison::Strict)
    }

    /// Whether the given value of `name` differs from the subject's.
    ///
    /// Never changed when `name` was not given, when the subject is blank, or
    /// when the subject has no field called `name`.
    fn changed_with(&self, name: &str, comparison: Comparison) -> CommandResult<bool> {
        if !self.given(name) {
            return Ok(false);
        }
        let Some(subject) = self.subject()?.filter(|subject| is_present(subject)) else {
            return Ok(false);
        };
        let Some(original) = subject.as_object().and_then(|fields| fields.get(name)) else {
            return Ok(false);
        };
        let given = self.attributes().get(name).unwrap_or(&Value::Null);
        Ok(differs(given, original, comparison))
    }
}

/// Compare a given value against the subject's current value.
pub fn differs(given: &Value, original: &Value, comparison: Comparison) -> bool {
    match (given, comparison) {
        (Value::Array(given), Comparison::Lenient) => match original {
            Value::Null => !given.is_empty(),
            Value::Array(original) => !same_elements(given, original),
            _ => true,
        },
        _ => given != original,
    }
}

/// Multiset equality: same elements with the same multiplicities, any order.
fn same_elements(left: &[Value], right: &[Value]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut remaining: Vec<&Value> = right.iter().collect();
    for value in left {
        match remaining.iter().position(|candidate| *candidate == value) {
            Some(index) => {
                remaining.swap_remove(index);
            }
            None => return false,
        }
    }
    true
}
