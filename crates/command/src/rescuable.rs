//! Declarative error-kind → handler dispatch around `execute`.
//!
//! A command lists its handlers in [`Command::rescuers`](crate::Command::rescuers).
//! When `execute` raises, handlers are consulted in registration order and the
//! first one whose kind matches runs. A matched error does not escape `call()`;
//! the command keeps whatever errors the handler recorded. Unmatched errors
//! leave `call()` as `CommandError::Execution`.
//!
//! A handler registered for `E` matches when the raised error, or any error
//! in its source chain, is an `E`.

use std::any::type_name;

type Handler<C> = Box<dyn Fn(&mut C, &anyhow::Error)>;

struct Rescuer<C> {
    kind: &'static str,
    matches: fn(&anyhow::Error) -> bool,
    handler: Handler<C>,
}

/// Ordered handler registry for command type `C`.
pub struct Rescuers<C> {
    rescuers: Vec<Rescuer<C>>,
}

/// Outcome of offering an error to the registry.
#[derive(Debug)]
pub enum Rescue {
    Handled { kind: &'static str },
    Unhandled(anyhow::Error),
}

impl<C> Default for Rescuers<C> {
    fn default() -> Self {
        Self {
            rescuers: Vec::new(),
        }
    }
}

impl<C> core::fmt::Debug for Rescuers<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.rescuers.iter().map(|r| r.kind))
            .finish()
    }
}

impl<C> Rescuers<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle errors of type `E` (directly raised or anywhere in the source chain).
    pub fn rescue_from<E>(mut self, handler: impl Fn(&mut C, &E) + 'static) -> Self
    where
        C: 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.rescuers.push(Rescuer {
            kind: type_name::<E>(),
            matches: is_kind::<E>,
            handler: Box::new(move |command: &mut C, err: &anyhow::Error| {
                if let Some(cause) = find::<E>(err) {
                    handler(command, cause);
                }
            }),
        });
        self
    }

    /// Handle any error not claimed by an earlier registration.
    pub fn rescue_all(mut self, handler: impl Fn(&mut C, &anyhow::Error) + 'static) -> Self {
        self.rescuers.push(Rescuer {
            kind: "any",
            matches: |_| true,
            handler: Box::new(handler),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.rescuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rescuers.is_empty()
    }

    /// Whether some handler would claim `err`.
    pub fn handles(&self, err: &anyhow::Error) -> bool {
        self.rescuers.iter().any(|r| (r.matches)(err))
    }

    /// Run the first matching handler, or give the error back.
    pub fn dispatch(&self, command: &mut C, err: anyhow::Error) -> Rescue {
        match self.rescuers.iter().find(|r| (r.matches)(&err)) {
            Some(rescuer) => {
                (rescuer.handler)(command, &err);
                Rescue::Handled { kind: rescuer.kind }
            }
            None => Rescue::Unhandled(err),
        }
    }
}

fn is_kind<E>(err: &anyhow::Error) -> bool
where
    E: std::error::Error + Send + Sync + 'static,
{
    find::<E>(err).is_some()
}

fn find<E>(err: &anyhow::Error) -> Option<&E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    err.downcast_ref::<E>()
        .or_else(|| err.chain().find_map(|cause| cause.downcast_ref::<E>()))
}
