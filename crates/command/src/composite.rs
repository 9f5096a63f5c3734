//! Running child commands from inside a parent's `execute`.
//!
//! Children run strictly in the order the parent calls them. The first child
//! that reports failure halts the parent: its errors are merged into the
//! parent and the parent ends without a result, whatever partial work the
//! earlier children produced. A child that *raises* is not a halt; the error
//! leaves the parent's `call()` unchanged.
//!
//! ```ignore
//! fn execute(&mut self) -> anyhow::Result<&'static str> {
//!     call_subcommand(&mut self.create_account)?;
//!     call_subcommand(&mut self.send_welcome)?;
//!     Ok("onboarded")
//! }
//! ```

use std::any::Any;

use cmdkit_core::{CommandError, CommandResult, Errors};

use crate::command::Command;

/// Halt signal raised by the runners below when a child failed.
///
/// Absorbed at the parent's execute boundary; it never leaves the parent.
#[derive(Debug, Clone, thiserror::Error)]
#[error("subcommand `{command}` failed: {errors}")]
pub struct SubcommandFailure {
    command: &'static str,
    errors: Errors,
}

impl SubcommandFailure {
    pub fn new(command: &'static str, errors: Errors) -> Self {
        Self { command, errors }
    }

    /// Name of the child that failed.
    pub fn command(&self) -> &'static str {
        self.command
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }
}

/// Object-safe view of a command, for heterogeneous child lists.
pub trait Subcommand {
    fn name(&self) -> &'static str;

    fn invoke(&mut self) -> CommandResult<()>;

    fn called(&self) -> bool;

    fn succeeded(&self) -> bool;

    fn reported_errors(&self) -> &Errors;

    fn output(&self) -> Option<&dyn Any>;
}

impl<C> Subcommand for C
where
    C: Command,
    C::Output: Any,
{
    fn name(&self) -> &'static str {
        self.command_name()
    }

    fn invoke(&mut self) -> CommandResult<()> {
        self.call().map(|_| ())
    }

    fn called(&self) -> bool {
        self.is_called()
    }

    fn succeeded(&self) -> bool {
        self.is_success()
    }

    fn reported_errors(&self) -> &Errors {
        self.errors()
    }

    fn output(&self) -> Option<&dyn Any> {
        self.result().map(|result| result as &dyn Any)
    }
}

/// Run `child` unless the caller already did, then return its result.
///
/// A failed child turns into [`SubcommandFailure`]; propagate it with `?`.
pub fn call_subcommand<C: Command>(child: &mut C) -> anyhow::Result<Option<&C::Output>> {
    let name = child.command_name();
    if child.is_called() {
        tracing::debug!(subcommand = name, "reusing outcome of a pre-run subcommand");
    } else {
        tracing::debug!(subcommand = name, "running subcommand");
        child.call().map_err(escalate)?;
    }

    if child.is_success() {
        return Ok(child.result());
    }
    Err(SubcommandFailure::new(name, child.errors().clone()).into())
}

/// [`call_subcommand`] for a type-erased child.
pub fn call_dyn_subcommand(child: &mut dyn Subcommand) -> anyhow::Result<Option<&dyn Any>> {
    let name = child.name();
    if !child.called() {
        tracing::debug!(subcommand = name, "running subcommand");
        child.invoke().map_err(escalate)?;
    }

    if child.succeeded() {
        return Ok(child.output());
    }
    Err(SubcommandFailure::new(name, child.reported_errors().clone()).into())
}

/// Run children in order, stopping at the first failure or raised error.
pub fn call_subcommands(children: &mut [Box<dyn Subcommand>]) -> anyhow::Result<()> {
    for child in children.iter_mut() {
        call_dyn_subcommand(child.as_mut())?;
    }
    Ok(())
}

/// A child's execution error is re-raised as itself, not wrapped, so it reaches
/// the parent's caller unchanged.
fn escalate(err: CommandError) -> anyhow::Error {
    match err {
        CommandError::Execution(inner) => inner,
        misuse => misuse.into(),
    }
}
