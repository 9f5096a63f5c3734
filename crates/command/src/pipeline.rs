//! The execution state machine behind [`Command::call`](crate::Command::call).

use cmdkit_core::{CommandError, CommandResult, ErrorKey};

use crate::command::{Command, UNAUTHORIZED};
use crate::composite::SubcommandFailure;
use crate::outcome::{ErrorsView, ExposesErrors};
use crate::rescuable::Rescue;

pub(crate) fn run<C: Command>(command: &mut C) -> CommandResult<()> {
    let name = command.command_name();
    if command.is_called() {
        tracing::warn!(command = name, "call attempted on an executed command");
        return Err(CommandError::already_executed(name));
    }

    let span = tracing::debug_span!("command", command = name);
    let _entered = span.enter();

    let outcome = perform(command, name);
    command.state_mut().mark_called();

    match &outcome {
        Ok(()) if command.is_success() => tracing::debug!("command succeeded"),
        Ok(()) => tracing::debug!(errors = %command.errors(), "command failed"),
        Err(err) => tracing::warn!(error = %err, "command raised"),
    }
    outcome
}

fn perform<C: Command>(command: &mut C, name: &'static str) -> CommandResult<()> {
    if !command.authorized() {
        tracing::debug!("authorization denied");
        command
            .state_mut()
            .errors_mut()
            .add(ErrorKey::Base, UNAUTHORIZED);
    }
    if command.errors().is_present() {
        return Ok(());
    }

    command.before_validation();
    let validations = command.validations();
    let found = validations.run(&*command, command.attributes());
    if found.is_present() {
        tracing::debug!(errors = %found, "validation failed");
        command.state_mut().errors_mut().merge(&found);
    }
    if command.errors().is_present() {
        return Ok(());
    }

    if command.noop() {
        tracing::debug!("noop; execution skipped");
        return Ok(());
    }

    match command.execute() {
        Ok(output) => accept(command, name, output),
        Err(err) => recover(command, err),
    }
}

/// Merge the errors a result exposes, then keep it as the command's result.
fn accept<C: Command>(
    command: &mut C,
    name: &'static str,
    output: C::Output,
) -> CommandResult<()> {
    match output.errors_view() {
        ErrorsView::Absent => {}
        ErrorsView::Recognized(errors) => {
            if errors.is_present() {
                tracing::debug!(errors = %errors, "merging errors exposed by the result");
            }
            command.state_mut().errors_mut().merge(errors);
        }
        ErrorsView::Unrecognized { kind } => {
            return Err(CommandError::unsupported_errors(name, kind));
        }
    }
    command.state_mut().set_result(output);
    Ok(())
}

/// Route an error raised by `execute`.
///
/// A sub-command halt is always absorbed here. Programmer errors pass through
/// untouched. Everything else goes to the command's rescuers.
fn recover<C: Command>(command: &mut C, err: anyhow::Error) -> CommandResult<()> {
    let err = match err.downcast::<SubcommandFailure>() {
        Ok(failure) => {
            tracing::debug!(
                subcommand = failure.command(),
                errors = %failure.errors(),
                "subcommand failed; halting"
            );
            let state = command.state_mut();
            state.errors_mut().merge(failure.errors());
            state.clear_result();
            return Ok(());
        }
        Err(err) => err,
    };

    let err = match err.downcast::<CommandError>() {
        Ok(CommandError::Execution(inner)) => inner,
        Ok(misuse) => return Err(misuse),
        Err(err) => err,
    };

    let rescuers = command.rescuers();
    match rescuers.dispatch(command, err) {
        Rescue::Handled { kind } => {
            tracing::debug!(kind, "execution error rescued");
            Ok(())
        }
        Rescue::Unhandled(err) => Err(CommandError::Execution(err)),
    }
}
