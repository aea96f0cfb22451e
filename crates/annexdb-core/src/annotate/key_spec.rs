use crate::{traits::FieldValue, value::Value};
use std::{fmt, sync::Arc};

/// Boxed error type produced by fallible computed keys.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A host callable computing one value from one record.
pub type PropertyFn<E> = Arc<dyn Fn(&E) -> Result<Value, BoxError>>;

///
/// KeySpec
///
/// Closed key specification: a property/field name, a host callable,
/// or an ordered composite of the first two (one level deep, used for
/// multi-key sorts). Dispatch is explicit per variant; there is no
/// runtime type inspection.
///

pub enum KeySpec<E> {
    Name(String),
    Call(PropertyFn<E>),
    Composite(Vec<KeyAtom<E>>),
}

///
/// KeyAtom
/// A composite element: names and callables only, never nested.
///

pub enum KeyAtom<E> {
    Name(String),
    Call(PropertyFn<E>),
}

impl<E> KeySpec<E> {
    /// Key by a property or stored-field name.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Key by an infallible callable.
    pub fn call<V, F>(f: F) -> Self
    where
        V: FieldValue,
        F: Fn(&E) -> V + 'static,
    {
        Self::Call(Arc::new(move |entity| Ok(f(entity).to_value())))
    }

    /// Key by a fallible callable; the error is surfaced as
    /// `AnnotateError::KeyEvaluation` wrapping the original cause.
    pub fn try_call<V, Err, F>(f: F) -> Self
    where
        V: FieldValue,
        Err: Into<BoxError>,
        F: Fn(&E) -> Result<V, Err> + 'static,
    {
        Self::Call(Arc::new(move |entity| {
            f(entity).map(FieldValue::to_value).map_err(Into::into)
        }))
    }

    /// Key by an ordered composite of names and callables.
    pub fn composite(atoms: impl IntoIterator<Item = KeyAtom<E>>) -> Self {
        Self::Composite(atoms.into_iter().collect())
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Default annotation output name: `<name>_property` for bare name
    /// specs (never colliding with the attribute itself), nothing for
    /// callables and composites.
    #[must_use]
    pub fn default_output_name(&self) -> Option<String> {
        match self {
            Self::Name(name) => Some(format!("{name}_property")),
            Self::Call(_) | Self::Composite(_) => None,
        }
    }
}

impl<E> KeyAtom<E> {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn call<V, F>(f: F) -> Self
    where
        V: FieldValue,
        F: Fn(&E) -> V + 'static,
    {
        Self::Call(Arc::new(move |entity| Ok(f(entity).to_value())))
    }
}

impl<E> Clone for KeySpec<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Name(name) => Self::Name(name.clone()),
            Self::Call(f) => Self::Call(Arc::clone(f)),
            Self::Composite(atoms) => Self::Composite(atoms.clone()),
        }
    }
}

impl<E> Clone for KeyAtom<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Name(name) => Self::Name(name.clone()),
            Self::Call(f) => Self::Call(Arc::clone(f)),
        }
    }
}

impl<E> fmt::Debug for KeySpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Call(_) => f.debug_tuple("Call").field(&"<fn>").finish(),
            Self::Composite(atoms) => f.debug_tuple("Composite").field(atoms).finish(),
        }
    }
}

impl<E> fmt::Debug for KeyAtom<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Call(_) => f.debug_tuple("Call").field(&"<fn>").finish(),
        }
    }
}

impl<E> From<&str> for KeySpec<E> {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl<E> From<String> for KeySpec<E> {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<E, const N: usize> From<[&str; N]> for KeySpec<E> {
    fn from(names: [&str; N]) -> Self {
        Self::Composite(names.into_iter().map(KeyAtom::name).collect())
    }
}

impl<E, const N: usize> From<[KeyAtom<E>; N]> for KeySpec<E> {
    fn from(atoms: [KeyAtom<E>; N]) -> Self {
        Self::Composite(atoms.into())
    }
}
