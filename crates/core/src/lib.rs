//! `cmdkit-core`: building blocks shared by every command.
//!
//! This crate holds the collaborators the command pipeline relies on: the
//! error collection, the attribute bag and its validation rules, and the
//! programmer-error taxonomy. It knows nothing about execution.

pub mod attributes;
pub mod error;
pub mod errors;
pub mod validation;

pub use attributes::{AttributeSchema, Attributes, is_blank, is_present};
pub use error::{AttributeError, CommandError, CommandResult};
pub use errors::{ErrorKey, Errors};
pub use validation::{Length, Validations};
