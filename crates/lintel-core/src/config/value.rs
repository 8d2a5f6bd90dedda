//! Property tree model and typed value coercion
//!
//! Configuration documents are held as immutable trees of [`PropertyValue`]s.
//! Readers request typed values through [`ConfigValue`]; the target shape is
//! taken from the default value's type, and coercion failures carry the full
//! dotted property path plus the literal offending value so the user can find
//! the exact line to fix. Coercion runs at read time, never at load time, so
//! a malformed value for a key nobody reads never fails a run.

use crate::error::LintelError;
use crate::result::Result;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// An immutable, order-preserving mapping from property keys to values.
pub type PropertyTree = IndexMap<String, PropertyValue>;

/// A single configuration value as stored in a property tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<PropertyValue>),
    Map(PropertyTree),
}

impl PropertyValue {
    /// Nested tree access; `None` for scalar and list values.
    pub fn as_map(&self) -> Option<&PropertyTree> {
        match self {
            PropertyValue::Map(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, PropertyValue::String(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PropertyValue::List(_))
    }
}

/// Renders the value the way it appeared in the document, for diagnostics.
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{s}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::Float(x) => write!(f, "{x}"),
            PropertyValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            PropertyValue::Map(_) => write!(f, "{{...}}"),
        }
    }
}

/// A list entry carrying an optional free-text justification.
///
/// Written in documents either as a bare string or as a small mapping:
///
/// ```yaml
/// ignoreNumbers:
///   - '0'
///   - value: '100'
///     reason: 'percentage bound'
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueWithReason {
    pub value: String,
    pub reason: Option<String>,
}

impl ValueWithReason {
    pub fn new(value: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            value: value.into(),
            reason,
        }
    }
}

/// The closed set of shapes a reader can request.
///
/// Keeping this explicit (instead of dispatching on the default's runtime
/// class) makes the coercion rules exhaustive and statically checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Bool,
    Int,
    Float,
    Str,
    StringList,
    ValueList,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueShape::Bool => "Boolean",
            ValueShape::Int => "Int",
            ValueShape::Float => "Float",
            ValueShape::Str => "String",
            ValueShape::StringList => "List",
            ValueShape::ValueList => "List",
        };
        write!(f, "{name}")
    }
}

/// Types a configuration value can be coerced into.
///
/// `path` is the full dotted path of the property being read, already joined
/// for display; it appears verbatim in every coercion error.
pub trait ConfigValue: Sized {
    const SHAPE: ValueShape;

    fn coerce(raw: &PropertyValue, path: &str) -> Result<Self>;
}

impl ConfigValue for bool {
    const SHAPE: ValueShape = ValueShape::Bool;

    fn coerce(raw: &PropertyValue, path: &str) -> Result<Self> {
        match raw {
            PropertyValue::Bool(b) => Ok(*b),
            // Only the exact literals are accepted; "True", "yes" etc. are
            // misconfigurations we want surfaced, not guessed at.
            PropertyValue::String(s) if s == "true" => Ok(true),
            PropertyValue::String(s) if s == "false" => Ok(false),
            PropertyValue::String(s) => Err(LintelError::not_a_boolean(path, s)),
            other => Err(LintelError::type_mismatch(
                path,
                other.to_string(),
                Self::SHAPE,
            )),
        }
    }
}

impl ConfigValue for i64 {
    const SHAPE: ValueShape = ValueShape::Int;

    fn coerce(raw: &PropertyValue, path: &str) -> Result<Self> {
        match raw {
            PropertyValue::Int(i) => Ok(*i),
            PropertyValue::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| LintelError::type_mismatch(path, s, Self::SHAPE)),
            other => Err(LintelError::type_mismatch(
                path,
                other.to_string(),
                Self::SHAPE,
            )),
        }
    }
}

impl ConfigValue for f64 {
    const SHAPE: ValueShape = ValueShape::Float;

    fn coerce(raw: &PropertyValue, path: &str) -> Result<Self> {
        match raw {
            PropertyValue::Float(x) => Ok(*x),
            PropertyValue::Int(i) => Ok(*i as f64),
            PropertyValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| LintelError::type_mismatch(path, s, Self::SHAPE)),
            other => Err(LintelError::type_mismatch(
                path,
                other.to_string(),
                Self::SHAPE,
            )),
        }
    }
}

impl ConfigValue for String {
    const SHAPE: ValueShape = ValueShape::Str;

    fn coerce(raw: &PropertyValue, path: &str) -> Result<Self> {
        match raw {
            PropertyValue::String(s) => Ok(s.clone()),
            other => Err(LintelError::type_mismatch(
                path,
                other.to_string(),
                Self::SHAPE,
            )),
        }
    }
}

impl ConfigValue for Vec<String> {
    const SHAPE: ValueShape = ValueShape::StringList;

    fn coerce(raw: &PropertyValue, path: &str) -> Result<Self> {
        match raw {
            // Legacy shape: a comma-separated string splits into a list.
            PropertyValue::String(s) => Ok(split_comma_list(s)),
            PropertyValue::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        PropertyValue::String(s) => values.push(s.clone()),
                        _ => {
                            return Err(LintelError::non_string_list(path, raw.to_string()));
                        }
                    }
                }
                Ok(values)
            }
            other => Err(LintelError::type_mismatch(
                path,
                other.to_string(),
                Self::SHAPE,
            )),
        }
    }
}

impl ConfigValue for Vec<ValueWithReason> {
    const SHAPE: ValueShape = ValueShape::ValueList;

    fn coerce(raw: &PropertyValue, path: &str) -> Result<Self> {
        match raw {
            PropertyValue::String(s) => Ok(split_comma_list(s)
                .into_iter()
                .map(|value| ValueWithReason::new(value, None))
                .collect()),
            PropertyValue::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        PropertyValue::String(s) => values.push(ValueWithReason::new(s, None)),
                        PropertyValue::Map(map) => {
                            let value = match map.get("value") {
                                Some(PropertyValue::String(s)) => s.clone(),
                                _ => {
                                    return Err(LintelError::non_string_list(
                                        path,
                                        raw.to_string(),
                                    ));
                                }
                            };
                            let reason = match map.get("reason") {
                                Some(PropertyValue::String(s)) => Some(s.clone()),
                                None => None,
                                Some(_) => {
                                    return Err(LintelError::non_string_list(
                                        path,
                                        raw.to_string(),
                                    ));
                                }
                            };
                            values.push(ValueWithReason::new(value, reason));
                        }
                        _ => {
                            return Err(LintelError::non_string_list(path, raw.to_string()));
                        }
                    }
                }
                Ok(values)
            }
            other => Err(LintelError::type_mismatch(
                path,
                other.to_string(),
                Self::SHAPE,
            )),
        }
    }
}

fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
