//! Wrapping a composite's child runs in an external transaction.
//!
//! The command core never owns storage. A parent that needs its children's
//! side effects to be all-or-nothing hands a [`Transaction`] to
//! [`with_transaction`], which commits on success and rolls back on any error,
//! a sub-command halt included. The error is re-raised after the rollback so
//! the parent's execute boundary still merges the failed child's errors and
//! clears the result.

use crate::composite::SubcommandFailure;

/// Unit of atomicity provided by a storage collaborator.
pub trait Transaction {
    type Error: std::error::Error + Send + Sync + 'static;

    fn begin(&mut self) -> Result<(), Self::Error>;

    fn commit(&mut self) -> Result<(), Self::Error>;

    fn rollback(&mut self) -> Result<(), Self::Error>;
}

/// Run `body` inside `transaction`.
///
/// A failing rollback is logged; the body's error is the one returned.
pub fn with_transaction<X, T, F>(transaction: &mut X, body: F) -> anyhow::Result<T>
where
    X: Transaction + ?Sized,
    F: FnOnce() -> anyhow::Result<T>,
{
    transaction.begin()?;

    match body() {
        Ok(value) => {
            transaction.commit()?;
            tracing::debug!("transaction committed");
            Ok(value)
        }
        Err(err) => {
            let halted = err.is::<SubcommandFailure>();
            match transaction.rollback() {
                Ok(()) => tracing::debug!(halted, "transaction rolled back"),
                Err(rollback) => {
                    tracing::warn!(halted, error = %rollback, "transaction rollback failed")
                }
            }
            Err(err)
        }
    }
}
