//! Cache Key Module
//!
//! Builds deterministic, hashable cache keys from a call's arguments.
//!
//! A call is described by a [`CallArgs`]: a positional argument list plus an
//! optional set of named arguments. Named arguments are normalized by sorting
//! on name, so `f(x = 1, y = 2)` and `f(y = 2, x = 1)` produce the same key.

use crate::error::{MemoError, Result};

// == Argument Value ==
/// A dynamically-typed argument value supplied at call time.
///
/// `Float` values carry no total equality (NaN) and therefore cannot
/// participate in a cache key; passing one surfaces
/// [`MemoError::UnhashableArgument`] before the computation runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Absent value
    None,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point (not key-able)
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

// == Conversions ==
impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(v as i64)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(v: Vec<u8>) -> Self {
        ArgValue::Bytes(v)
    }
}

// == Key Atom ==
/// The hashable form of an [`ArgValue`], usable inside a [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyAtom {
    /// Absent value
    None,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// UTF-8 string
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl KeyAtom {
    // == From Argument ==
    /// Converts an argument value into its hashable form.
    ///
    /// # Errors
    /// Returns [`MemoError::UnhashableArgument`] for `Float` values; `context`
    /// names the argument's position for the error message.
    pub fn from_arg(value: &ArgValue, context: &str) -> Result<Self> {
        match value {
            ArgValue::None => Ok(KeyAtom::None),
            ArgValue::Bool(b) => Ok(KeyAtom::Bool(*b)),
            ArgValue::Int(i) => Ok(KeyAtom::Int(*i)),
            ArgValue::Str(s) => Ok(KeyAtom::Str(s.clone())),
            ArgValue::Bytes(b) => Ok(KeyAtom::Bytes(b.clone())),
            ArgValue::Float(f) => Err(MemoError::UnhashableArgument(format!(
                "float value {} at {} cannot form part of a cache key",
                f, context
            ))),
        }
    }
}

// == Call Arguments ==
/// The full argument list of one call to a memoized computation.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    /// Positional arguments, in call order
    positional: Vec<ArgValue>,
    /// Named arguments, in call-site order (normalized at key-build time)
    named: Vec<(String, ArgValue)>,
}

impl CallArgs {
    // == Constructor ==
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Add Positional ==
    /// Appends a positional argument.
    pub fn pos(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    // == Add Named ==
    /// Appends a named argument. Call-site ordering is irrelevant to key
    /// identity; names are sorted during key construction.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    /// Returns the positional arguments.
    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    /// Returns the named arguments in call-site order.
    pub fn named_args(&self) -> &[(String, ArgValue)] {
        &self.named
    }

    /// Returns the first positional argument, if any (the owner under
    /// per-owner scoping).
    pub fn owner(&self) -> Option<&ArgValue> {
        self.positional.first()
    }
}

// == Cache Key ==
/// An opaque, hashable key built deterministically from a call's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Positional argument atoms, in call order
    positional: Vec<KeyAtom>,
    /// Named argument atoms sorted by name; None when named args are excluded
    named: Option<Vec<(String, KeyAtom)>>,
}

// == Key Builder ==
/// Builds a [`CacheKey`] from a call's arguments.
///
/// If `include_named` is false the key is the positional tuple alone;
/// otherwise it is the pair of the positional tuple and the named arguments
/// sorted by name. Pure function, no side effects.
///
/// # Errors
/// Returns [`MemoError::UnhashableArgument`] if any participating argument
/// cannot be hashed; the wrapped computation is never invoked in that case.
pub fn build_key(args: &CallArgs, include_named: bool) -> Result<CacheKey> {
    let mut positional = Vec::with_capacity(args.positional().len());
    for (i, value) in args.positional().iter().enumerate() {
        positional.push(KeyAtom::from_arg(value, &format!("position {}", i))?);
    }

    let named = if include_named {
        let mut pairs = Vec::with_capacity(args.named_args().len());
        for (name, value) in args.named_args() {
            pairs.push((
                name.clone(),
                KeyAtom::from_arg(value, &format!("named argument `{}`", name))?,
            ));
        }
        // Sort by name so call-site ordering does not affect identity
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Some(pairs)
    } else {
        None
    };

    Ok(CacheKey { positional, named })
}
