//! Parameter values bound to a statement

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::domain::DomainError;

/// A single bound value.
///
/// Also used as the component type of a [`CacheKey`](crate::domain::cache::CacheKey),
/// so equality and hashing are structural: arrays compare element by element and
/// floats compare by bit pattern.
#[derive(Debug, Clone)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Array(Vec<ParamValue>),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Text(v) => v.hash(state),
            Self::Bytes(v) => v.hash(state),
            Self::Array(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<T: Into<ParamValue>> FromIterator<T> for ParamValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Array(iter.into_iter().map(Into::into).collect())
    }
}

/// The parameter object handed to a statement invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParameterObject {
    /// No parameters
    #[default]
    None,
    /// A single value bound to every mapping
    Scalar(ParamValue),
    /// Values looked up by property name
    Named(BTreeMap<String, ParamValue>),
}

impl ParameterObject {
    /// Creates an empty named parameter object
    pub fn named() -> Self {
        Self::Named(BTreeMap::new())
    }

    /// Adds a named value, converting a scalar or empty object into a named one
    pub fn with(self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let mut values = match self {
            Self::Named(values) => values,
            _ => BTreeMap::new(),
        };

        values.insert(name.into(), value.into());
        Self::Named(values)
    }

    /// Resolves the value bound to `property`.
    ///
    /// A scalar object binds its single value to every property. On a named
    /// object a missing property reads as `Null`; a dotted path (`user.id`)
    /// can only descend through a missing or null value.
    pub fn resolve(&self, property: &str) -> Result<ParamValue, DomainError> {
        match self {
            Self::None => Ok(ParamValue::Null),
            Self::Scalar(value) => Ok(value.clone()),
            Self::Named(values) => {
                let (head, rest) = match property.split_once('.') {
                    Some((head, rest)) => (head, Some(rest)),
                    None => (property, None),
                };

                match (values.get(head), rest) {
                    (None, _) | (Some(ParamValue::Null), Some(_)) => Ok(ParamValue::Null),
                    (Some(value), None) => Ok(value.clone()),
                    (Some(value), Some(rest)) => Err(DomainError::key_composition(format!(
                        "Cannot read '{}' from parameter '{}' holding {}",
                        rest, head, value
                    ))),
                }
            }
        }
    }
}

impl From<ParamValue> for ParameterObject {
    fn from(value: ParamValue) -> Self {
        Self::Scalar(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrays_compare_element_wise() {
        let a: ParamValue = vec![1i64, 2, 3].into_iter().collect();
        let b = ParamValue::Array(vec![
            ParamValue::Int(1),
            ParamValue::Int(2),
            ParamValue::Int(3),
        ]);

        assert_eq!(a, b);
        assert_ne!(a, ParamValue::Array(vec![ParamValue::Int(1)]));
    }

    #[test]
    fn test_float_equality_uses_bits() {
        assert_eq!(ParamValue::Float(f64::NAN), ParamValue::Float(f64::NAN));
        assert_ne!(ParamValue::Float(0.0), ParamValue::Float(-0.0));
    }

    #[test]
    fn test_display() {
        let value: ParamValue = vec!["a", "b"].into_iter().collect();
        assert_eq!(value.to_string(), "[a,b]");
        assert_eq!(ParamValue::Bytes(vec![0xab, 0x01]).to_string(), "0xab01");
        assert_eq!(ParamValue::from(None::<i64>).to_string(), "null");
    }

    #[test]
    fn test_resolve_named() {
        let params = ParameterObject::named().with("id", 7).with("name", "ada");

        assert_eq!(params.resolve("id").unwrap(), ParamValue::Int(7));
        assert_eq!(params.resolve("name").unwrap(), ParamValue::from("ada"));
        assert_eq!(params.resolve("missing").unwrap(), ParamValue::Null);
    }

    #[test]
    fn test_resolve_nested_path() {
        let params = ParameterObject::named()
            .with("id", 7)
            .with("manager", ParamValue::Null);

        assert_eq!(params.resolve("owner.id").unwrap(), ParamValue::Null);
        assert_eq!(params.resolve("manager.id").unwrap(), ParamValue::Null);
        assert!(matches!(
            params.resolve("id.value"),
            Err(DomainError::KeyComposition { .. })
        ));
    }

    #[test]
    fn test_resolve_scalar_and_none() {
        let scalar = ParameterObject::from(ParamValue::Int(42));
        assert_eq!(scalar.resolve("anything").unwrap(), ParamValue::Int(42));
        assert_eq!(ParameterObject::None.resolve("id").unwrap(), ParamValue::Null);
    }
}
