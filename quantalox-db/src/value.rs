//! Parameter and column value types for the typed `SQLite` store.

use strum::Display;
use thiserror::Error;

/// A value that can be bound to a prepared statement parameter or read from
/// a result column.
///
/// Mirrors the engine's five storage classes. Extraction never coerces: asking
/// a `Text` value for an integer is a [`TypeMismatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit IEEE float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
}

/// A single result row: one value per selected column, in column order.
pub type Row = Vec<Value>;

/// An ordered sequence of rows. Empty when nothing matched.
pub type Rows = Vec<Row>;

/// Discriminant of a [`Value`], used in mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    /// See [`Value::Null`].
    Null,
    /// See [`Value::Integer`].
    Integer,
    /// See [`Value::Real`].
    Real,
    /// See [`Value::Text`].
    Text,
    /// See [`Value::Blob`].
    Blob,
}

/// Requested kind differs from the stored kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("type mismatch: expected {expected}, found {found}")]
pub struct TypeMismatch {
    /// Kind the caller asked for.
    pub expected: ValueKind,
    /// Kind actually stored.
    pub found: ValueKind,
}

impl Value {
    /// Returns the kind of the active variant.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Integer(_) => ValueKind::Integer,
            Self::Real(_) => ValueKind::Real,
            Self::Text(_) => ValueKind::Text,
            Self::Blob(_) => ValueKind::Blob,
        }
    }

    /// Returns `true` for SQL NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    const fn mismatch(&self, expected: ValueKind) -> TypeMismatch {
        TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// Extracts an integer.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] unless the value is [`Value::Integer`].
    pub fn as_integer(&self) -> Result<i64, TypeMismatch> {
        match self {
            Self::Integer(v) => Ok(*v),
            other => Err(other.mismatch(ValueKind::Integer)),
        }
    }

    /// Extracts a float.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] unless the value is [`Value::Real`]. Integers
    /// are not widened.
    pub fn as_real(&self) -> Result<f64, TypeMismatch> {
        match self {
            Self::Real(v) => Ok(*v),
            other => Err(other.mismatch(ValueKind::Real)),
        }
    }

    /// Borrows the text.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] unless the value is [`Value::Text`].
    pub fn as_text(&self) -> Result<&str, TypeMismatch> {
        match self {
            Self::Text(v) => Ok(v),
            other => Err(other.mismatch(ValueKind::Text)),
        }
    }

    /// Borrows the blob bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] unless the value is [`Value::Blob`].
    pub fn as_blob(&self) -> Result<&[u8], TypeMismatch> {
        match self {
            Self::Blob(v) => Ok(v),
            other => Err(other.mismatch(ValueKind::Blob)),
        }
    }

    /// Takes the text out of the value.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] unless the value is [`Value::Text`].
    pub fn into_text(self) -> Result<String, TypeMismatch> {
        match self {
            Self::Text(v) => Ok(v),
            other => Err(other.mismatch(ValueKind::Text)),
        }
    }

    /// Takes the blob out of the value.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] unless the value is [`Value::Blob`].
    pub fn into_blob(self) -> Result<Vec<u8>, TypeMismatch> {
        match self {
            Self::Blob(v) => Ok(v),
            other => Err(other.mismatch(ValueKind::Blob)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl TryFrom<Value> for i64 {
    type Error = TypeMismatch;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_integer()
    }
}

impl TryFrom<Value> for f64 {
    type Error = TypeMismatch;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_real()
    }
}

impl TryFrom<Value> for String {
    type Error = TypeMismatch;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.into_text()
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = TypeMismatch;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.into_blob()
    }
}

/// Convenience macro for building a parameter set.
///
/// Usage: `params![1_i64, blob.as_slice(), "text", 2.5]`
#[macro_export]
macro_rules! params {
    ($($val:expr),* $(,)?) => {
        ::std::vec![$($crate::Value::from($val)),*]
    };
}
