//! Operator attributes: the static configuration a graph node carries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Error;

/// The value of a single attribute.
///
/// Deserializes from plain JSON values: `1` is an [AttributeValue::Int],
/// `[1, 2]` is [AttributeValue::Ints], and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Float(f32),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
    String(String),
}

impl AttributeValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Ints(_) => "ints",
            Self::Floats(_) => "floats",
            Self::String(_) => "string",
        }
    }
}

macro_rules! from_num {
    ($Variant:ident, $Ty:ty, [$($Src:ty),+]) => {
        $(
            impl From<$Src> for AttributeValue {
                fn from(value: $Src) -> Self {
                    Self::$Variant(value as $Ty)
                }
            }
        )+
    };
}

macro_rules! from_vec {
    ($Variant:ident, $Ty:ty, [$($Src:ty),+]) => {
        $(
            impl From<Vec<$Src>> for AttributeValue {
                fn from(value: Vec<$Src>) -> Self {
                    Self::$Variant(value.into_iter().map(|v| v as $Ty).collect())
                }
            }
        )+
    };
}

from_num!(Int, i64, [i32, i64]);
from_num!(Float, f32, [f32, f64]);
from_vec!(Ints, i64, [i32, i64]);
from_vec!(Floats, f32, [f32, f64]);

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Named attributes of a node.
///
/// ```rust
/// # use trainops::prelude::*;
/// let attrs = NodeAttributes::new().with("axis", -1).with("split", vec![2, 3]);
/// assert_eq!(attrs.get_int("axis").unwrap(), -1);
/// assert_eq!(attrs.get_ints("split").unwrap(), Some(&[2, 3][..]));
/// assert_eq!(attrs.get_int_or("missing", 0).unwrap(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAttributes(BTreeMap<String, AttributeValue>);

impl NodeAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style version of [NodeAttributes::insert].
    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<AttributeValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The integer attribute `name`, which must be present.
    pub fn get_int(&self, name: &str) -> Result<i64, Error> {
        match self.get(name) {
            Some(AttributeValue::Int(v)) => Ok(*v),
            Some(other) => Err(wrong_kind(name, "int", other)),
            None => Err(Error::MissingAttribute(name.to_string())),
        }
    }

    /// The integer attribute `name`, or `default` when it is absent.
    pub fn get_int_or(&self, name: &str, default: i64) -> Result<i64, Error> {
        match self.get(name) {
            None => Ok(default),
            Some(_) => self.get_int(name),
        }
    }

    /// The integer list attribute `name`, if present.
    pub fn get_ints(&self, name: &str) -> Result<Option<&[i64]>, Error> {
        match self.get(name) {
            Some(AttributeValue::Ints(v)) => Ok(Some(v)),
            Some(other) => Err(wrong_kind(name, "ints", other)),
            None => Ok(None),
        }
    }
}

fn wrong_kind(name: &str, expected: &str, found: &AttributeValue) -> Error {
    Error::InvalidAttribute {
        name: name.to_string(),
        reason: format!("expected {expected}, found {}", found.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_values() {
        let attrs: NodeAttributes =
            serde_json::from_str(r#"{"axis": 1, "alpha": 0.5, "split": [1, 2], "mode": "x"}"#)
                .unwrap();
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs.get("axis"), Some(&AttributeValue::Int(1)));
        assert_eq!(attrs.get("alpha"), Some(&AttributeValue::Float(0.5)));
        assert_eq!(attrs.get("split"), Some(&AttributeValue::Ints(vec![1, 2])));
        assert_eq!(attrs.get("mode"), Some(&AttributeValue::String("x".into())));
    }

    #[test]
    fn test_get_int() {
        let attrs = NodeAttributes::new().with("axis", 2).with("name", "concat");
        assert_eq!(attrs.get_int("axis").unwrap(), 2);
        assert!(matches!(
            attrs.get_int("missing"),
            Err(Error::MissingAttribute(n)) if n == "missing"
        ));
        assert!(matches!(
            attrs.get_int("name"),
            Err(Error::InvalidAttribute { .. })
        ));
        assert!(attrs.get_int_or("name", 0).is_err());
        assert_eq!(attrs.get_int_or("other", 7).unwrap(), 7);
    }

    #[test]
    fn test_get_ints() {
        let attrs = NodeAttributes::new().with("split", vec![1, 2]).with("axis", 0);
        assert_eq!(attrs.get_ints("split").unwrap(), Some(&[1, 2][..]));
        assert_eq!(attrs.get_ints("missing").unwrap(), None);
        assert!(attrs.get_ints("axis").is_err());
    }

    #[test]
    fn test_round_trips_through_json() {
        let attrs = NodeAttributes::new().with("axis", -1).with("split", vec![3, 4]);
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"axis":-1,"split":[3,4]}"#);
    }
}
