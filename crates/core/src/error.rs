//! Programmer-error model.
//!
//! Domain failures (authorization denial, validation, merged child errors) are
//! never raised: they are recorded in [`Errors`](crate::Errors). The types here
//! describe misuse of a command or an error nobody handled.

use thiserror::Error;

/// Result type returned by command entry points.
pub type CommandResult<T> = Result<T, CommandError>;

/// Failure that escapes `call()`.
///
/// Everything except `Execution` indicates a defect in the calling code or in
/// the command definition itself.
#[derive(Debug, Error)]
pub enum CommandError {
    /// `call()` was invoked on an instance that already ran.
    #[error("command `{command}` has already been executed")]
    AlreadyExecuted { command: &'static str },

    /// The command type never supplied an `execute` body.
    #[error("command `{command}` does not implement execute")]
    NotImplemented { command: &'static str },

    /// The result exposes errors that are not an `Errors` collection.
    #[error("command `{command}` returned errors of kind `{kind}`; unable to merge")]
    UnsupportedErrors {
        command: &'static str,
        kind: &'static str,
    },

    /// Subject resolution was attempted without a configured subject name.
    #[error("command `{command}` has no subject name configured")]
    UndefinedSubject { command: &'static str },

    /// The attribute bag could not be built or updated.
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// `execute` raised and no rescuer handled it.
    #[error(transparent)]
    Execution(anyhow::Error),
}

impl CommandError {
    pub fn already_executed(command: &'static str) -> Self {
        Self::AlreadyExecuted { command }
    }

    pub fn not_implemented(command: &'static str) -> Self {
        Self::NotImplemented { command }
    }

    pub fn unsupported_errors(command: &'static str, kind: &'static str) -> Self {
        Self::UnsupportedErrors { command, kind }
    }

    pub fn undefined_subject(command: &'static str) -> Self {
        Self::UndefinedSubject { command }
    }

    /// The unhandled runtime error, if this is an `Execution` failure.
    pub fn execution(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Execution(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true for the kinds that indicate misuse rather than a runtime failure.
    pub fn is_programmer_error(&self) -> bool {
        !matches!(self, Self::Execution(_))
    }
}

/// Failure while building or updating an attribute bag.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// The name is not part of the command's declared attributes.
    #[error("unknown attribute `{name}`")]
    Unknown { name: String },

    /// Construction input was not a JSON object.
    #[error("attributes must be given as an object, found {found}")]
    NotAnObject { found: &'static str },

    /// A value could not be converted to or from its JSON representation.
    #[error("attribute `{name}` is invalid: {source}")]
    Invalid {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AttributeError {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::Unknown { name: name.into() }
    }

    pub fn invalid(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Invalid {
            name: name.into(),
            source,
        }
    }
}
