//! The command contract and per-instance state.
//!
//! A command captures intent (its attributes), decides whether it may run,
//! validates itself and performs one unit of work, exactly once. Outcomes are
//! read back through [`Command::errors`] and [`Command::result`].
//!
//! ## Lifecycle
//!
//! ```text
//! constructed → (setters) → call() → success | failure | raised
//! ```
//!
//! `call()` runs the stages in order and stops at the first one that fails:
//!
//! 1. guard against a second run (`AlreadyExecuted`)
//! 2. `authorized()`, recording `unauthorized` under the base key when denied
//! 3. `before_validation()` followed by the `validations()` rules
//! 4. `noop()`, skipping execution without failing
//! 5. `execute()`, whose value becomes the result once its errors are merged
//!
//! The command is marked as called whichever way the run ends.

use std::cell::OnceCell;

use serde_json::Value;

use cmdkit_core::{AttributeSchema, Attributes, CommandError, CommandResult, Errors, Validations};

use crate::outcome::ExposesErrors;
use crate::pipeline;
use crate::rescuable::Rescuers;

/// Message recorded under the base key when authorization is denied.
pub const UNAUTHORIZED: &str = "unauthorized";

/// State every command instance owns.
///
/// Concrete commands embed one and hand it out through
/// [`Command::state`]/[`Command::state_mut`].
#[derive(Debug, Clone)]
pub struct CommandState<O> {
    attributes: Attributes,
    called: bool,
    errors: Errors,
    result: Option<O>,
    subject: OnceCell<Option<Value>>,
}

impl<O> Default for CommandState<O> {
    fn default() -> Self {
        Self::new(Attributes::new())
    }
}

impl<O> CommandState<O> {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            called: false,
            errors: Errors::new(),
            result: None,
            subject: OnceCell::new(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    pub fn result(&self) -> Option<&O> {
        self.result.as_ref()
    }

    pub fn is_called(&self) -> bool {
        self.called
    }

    pub(crate) fn mark_called(&mut self) {
        self.called = true;
    }

    pub(crate) fn set_result(&mut self, result: O) {
        self.result = Some(result);
    }

    pub(crate) fn clear_result(&mut self) {
        self.result = None;
    }

    pub(crate) fn subject_cell(&self) -> &OnceCell<Option<Value>> {
        &self.subject
    }
}

/// A single-use unit of work.
///
/// Only [`state`](Self::state), [`state_mut`](Self::state_mut) and, in
/// practice, [`execute`](Self::execute) need implementing; every other hook
/// has a default.
pub trait Command {
    /// Value produced by `execute`.
    type Output: ExposesErrors;

    fn state(&self) -> &CommandState<Self::Output>;

    fn state_mut(&mut self) -> &mut CommandState<Self::Output>;

    /// Stable name used in logs and programmer errors.
    fn command_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether the caller may run this command.
    fn authorized(&self) -> bool {
        true
    }

    /// Runs after authorization, right before the validation rules.
    fn before_validation(&mut self) {}

    /// Validation rules, run in declaration order.
    fn validations(&self) -> Validations<Self> {
        Validations::new()
    }

    /// When true at the moment execution would start, execution is skipped.
    ///
    /// A skipped command is successful and has no result.
    fn noop(&self) -> bool {
        false
    }

    /// The unit of work.
    fn execute(&mut self) -> anyhow::Result<Self::Output> {
        Err(CommandError::not_implemented(self.command_name()).into())
    }

    /// Handlers consulted when `execute` raises.
    fn rescuers(&self) -> Rescuers<Self>
    where
        Self: Sized,
    {
        Rescuers::new()
    }

    /// Run the command. Returns the command itself for chaining.
    ///
    /// Domain failures end up in [`errors`](Self::errors); only programmer
    /// errors and unhandled execution errors are returned as `Err`.
    fn call(&mut self) -> CommandResult<&mut Self>
    where
        Self: Sized,
    {
        pipeline::run(self)?;
        Ok(self)
    }

    fn is_called(&self) -> bool {
        self.state().is_called()
    }

    fn is_success(&self) -> bool {
        self.is_called() && self.errors().is_empty()
    }

    fn is_successful(&self) -> bool {
        self.is_success()
    }

    fn is_failed(&self) -> bool {
        self.is_called() && self.errors().is_present()
    }

    fn is_failure(&self) -> bool {
        self.is_failed()
    }

    fn errors(&self) -> &Errors {
        self.state().errors()
    }

    fn result(&self) -> Option<&Self::Output> {
        self.state().result()
    }

    fn attributes(&self) -> &Attributes {
        self.state().attributes()
    }

    /// Whether `name` was explicitly supplied, as opposed to holding a default.
    fn given(&self, name: &str) -> bool {
        self.attributes().is_given(name)
    }
}

/// Commands constructed from a named attribute bag.
pub trait FromAttributes: Command + Sized {
    /// Declared attribute names of this command type.
    fn schema() -> AttributeSchema;

    /// Construct from already-built attributes.
    ///
    /// Commands that adjust their input right after construction do it here.
    fn from_attributes(attributes: Attributes) -> Self;

    /// Build from a JSON object of attribute values.
    fn build(input: Value) -> CommandResult<Self> {
        let attributes = Self::schema().build(input)?;
        Ok(Self::from_attributes(attributes))
    }

    /// Build and immediately call.
    fn call_with(input: Value) -> CommandResult<Self> {
        call(Self::build(input)?)
    }
}

/// Call an already constructed command and hand it back.
pub fn call<C: Command>(mut command: C) -> CommandResult<C> {
    command.call()?;
    Ok(command)
}
