//! `cmdkit-command`: single-use command objects.
//!
//! A command is run once through [`Command::call`]. The pipeline authorizes,
//! validates, optionally skips, then executes, recording domain failures in
//! the command's [`Errors`](cmdkit_core::Errors) rather than raising them.
//!
//! ```ignore
//! use cmdkit_command::prelude::*;
//!
//! let command = RegisterUser::call_with(json!({ "email": "jo@example.com" }))?;
//! if command.is_failure() {
//!     for message in command.errors().full_messages() { /* ... */ }
//! }
//! ```
//!
//! Beyond the core pipeline:
//!
//! - [`composite`]: run child commands, halting on the first failed child
//! - [`subject`]: compare given attributes against a backing object
//! - [`rescuable`]: map raised error kinds to handlers
//! - [`transaction`]: wrap child runs in an external unit of atomicity

pub mod command;
pub mod composite;
pub mod outcome;
mod pipeline;
pub mod rescuable;
pub mod subject;
pub mod transaction;

pub use command::{Command, CommandState, FromAttributes, UNAUTHORIZED, call};
pub use composite::{
    Subcommand, SubcommandFailure, call_dyn_subcommand, call_subcommand, call_subcommands,
};
pub use outcome::{ErrorsView, ExposesErrors};
pub use rescuable::{Rescue, Rescuers};
pub use subject::{Comparison, Subject, differs};
pub use transaction::{Transaction, with_transaction};

/// Everything a command definition usually needs.
pub mod prelude {
    pub use crate::{
        Command, CommandState, Comparison, ErrorsView, ExposesErrors, FromAttributes, Rescuers,
        Subcommand, SubcommandFailure, Subject, Transaction, UNAUTHORIZED, call,
        call_dyn_subcommand, call_subcommand, call_subcommands, with_transaction,
    };
    pub use cmdkit_core::{
        AttributeSchema, Attributes, CommandError, CommandResult, ErrorKey, Errors, Length,
        Validations,
    };
}
