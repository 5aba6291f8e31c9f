//! Typed setting values and the coercion of raw tokens into them.
//!
//! Every raw token that becomes a setting value (a `name=value` update, a
//! `--oldest` flag, a retention horizon) goes through [`coerce`]. The attempt
//! order is part of the persisted-settings contract and must not change:
//!
//! 1. `true` / `false` (any case) → [`TypedValue::Bool`]
//! 2. base-10 integer with optional sign → [`TypedValue::Int`]
//! 3. finite floating-point number → [`TypedValue::Float`]
//! 4. contains `,` → [`TypedValue::StringList`] (pieces trimmed, empties kept)
//! 5. anything else → [`TypedValue::String`], verbatim

use serde::Serialize;

/// Delimiter that turns a token into a list.
pub const LIST_DELIMITER: char = ',';

/// A setting value of exactly one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringList(Vec<String>),
}

impl TypedValue {
    /// Name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Bool(_) => "bool",
            TypedValue::Int(_) => "int",
            TypedValue::Float(_) => "float",
            TypedValue::String(_) => "string",
            TypedValue::StringList(_) => "list",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// View the value as a list. A lone string is a one-element list.
    pub fn to_list(&self) -> Option<Vec<String>> {
        match self {
            TypedValue::StringList(items) => Some(items.clone()),
            TypedValue::String(s) => Some(vec![s.clone()]),
            _ => None,
        }
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Bool(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Int(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::String(value)
    }
}

impl From<Vec<String>> for TypedValue {
    fn from(value: Vec<String>) -> Self {
        TypedValue::StringList(value)
    }
}

/// Renders the value for display. Lists are joined with [`LIST_DELIMITER`].
///
/// Not an inverse of [`coerce`]: a one-element list renders as a bare string,
/// numeric-looking strings re-coerce as numbers, and items containing the
/// delimiter split apart. Persistence goes through typed KDL instead.
impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Int(i) => write!(f, "{}", i),
            // Debug keeps the decimal point on whole floats ("3.0", not "3")
            TypedValue::Float(x) => write!(f, "{:?}", x),
            TypedValue::String(s) => write!(f, "{}", s),
            TypedValue::StringList(items) => {
                write!(f, "{}", items.join(&LIST_DELIMITER.to_string()))
            }
        }
    }
}

/// Coerce a raw token into a [`TypedValue`]. Total and pure.
pub fn coerce(raw: &str) -> TypedValue {
    let token = raw.trim();

    if token.eq_ignore_ascii_case("true") {
        return TypedValue::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return TypedValue::Bool(false);
    }

    if let Ok(i) = token.parse::<i64>() {
        return TypedValue::Int(i);
    }

    // f64's parser also accepts "inf" and "nan"; those stay strings.
    if let Ok(x) = token.parse::<f64>() {
        if x.is_finite() {
            return TypedValue::Float(x);
        }
    }

    if raw.contains(LIST_DELIMITER) {
        return TypedValue::StringList(
            raw.split(LIST_DELIMITER)
                .map(|piece| piece.trim().to_string())
                .collect(),
        );
    }

    TypedValue::String(raw.to_string())
}
