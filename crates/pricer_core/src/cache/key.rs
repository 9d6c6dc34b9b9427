//! Composite cache keys.

use std::fmt;

/// One positional argument of a memoised operation.
///
/// Scalars are stored by bit pattern so that keys stay `Eq + Hash`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// Textual argument, typically an identifier.
    Text(String),
    /// Integer argument, typically a component index.
    Index(usize),
    /// Floating-point argument, stored as `f64::to_bits`.
    Scalar(u64),
}

impl KeyPart {
    /// Scalar argument; `-0.0` and `0.0` map to the same key.
    pub fn scalar(value: f64) -> Self {
        Self::Scalar((value + 0.0).to_bits())
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<usize> for KeyPart {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{}", text),
            Self::Index(index) => write!(f, "{}", index),
            Self::Scalar(bits) => write!(f, "{}", f64::from_bits(*bits)),
        }
    }
}

/// Key of a memoised call: operation name plus positional arguments.
///
/// Argument order matters: `("noises", [a, b])` and `("noises", [b, a])` are
/// different keys.
///
/// # Examples
///
/// ```
/// use pricer_core::cache::{CacheKey, KeyPart};
///
/// let key = CacheKey::new("noises", vec!["eq".into(), KeyPart::Index(3)]);
/// assert_eq!(key.to_string(), "noises(eq, 3)");
/// assert_ne!(key, CacheKey::op("noises"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    args: Vec<KeyPart>,
}

impl CacheKey {
    /// Key of `operation` called with `args`.
    pub fn new(operation: &'static str, args: Vec<KeyPart>) -> Self {
        Self { operation, args }
    }

    /// Key of an operation without extra arguments.
    pub fn op(operation: &'static str) -> Self {
        Self::new(operation, Vec::new())
    }

    /// Operation name.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Positional arguments.
    pub fn args(&self) -> &[KeyPart] {
        &self.args
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operation)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
