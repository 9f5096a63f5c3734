//! How a result value reports errors of its own.
//!
//! When `execute` returns a value that carries an [`Errors`] collection (a
//! validated domain object, say), those errors are merged into the command.
//! A value that reports errors in any other shape makes the run fail with
//! `UnsupportedErrors` instead of silently dropping them.

use std::collections::{BTreeMap, HashMap};

use cmdkit_core::{Attributes, Errors};

/// What a result exposes about errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorsView<'a> {
    /// No error accessor at all.
    Absent,
    /// An error collection that can be merged.
    Recognized(&'a Errors),
    /// Errors in a shape that cannot be merged.
    Unrecognized { kind: &'static str },
}

impl ErrorsView<'_> {
    /// Unmergeable errors of type `T`.
    pub fn unrecognized<T: ?Sized>() -> Self {
        Self::Unrecognized {
            kind: std::any::type_name::<T>(),
        }
    }
}

/// Implemented by every command output type.
///
/// The default exposes nothing; domain objects that carry errors override it.
pub trait ExposesErrors {
    fn errors_view(&self) -> ErrorsView<'_> {
        ErrorsView::Absent
    }
}

macro_rules! exposes_nothing {
    ($($t:ty),* $(,)?) => {
        $(impl ExposesErrors for $t {})*
    };
}

exposes_nothing!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
    serde_json::Value,
    Attributes,
);

impl<T> ExposesErrors for Vec<T> {}

impl<K, V> ExposesErrors for BTreeMap<K, V> {}

impl<K, V, S> ExposesErrors for HashMap<K, V, S> {}

impl<T: ExposesErrors> ExposesErrors for Option<T> {
    fn errors_view(&self) -> ErrorsView<'_> {
        match self {
            Some(value) => value.errors_view(),
            None => ErrorsView::Absent,
        }
    }
}

impl<T: ExposesErrors + ?Sized> ExposesErrors for Box<T> {
    fn errors_view(&self) -> ErrorsView<'_> {
        (**self).errors_view()
    }
}
