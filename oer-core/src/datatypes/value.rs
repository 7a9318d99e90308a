//! Runtime values for compiled OER types

use crate::datatypes::bit_string::BitString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value encoded from, or decoded into, by a compiled type
///
/// The variant expected by a compiled type follows its ASN.1 type:
/// SEQUENCE and SET use `Structure`, SEQUENCE OF and SET OF use `Array`,
/// CHOICE uses `Choice` with the name of the chosen alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// NULL
    Null,
    /// BOOLEAN
    Boolean(bool),
    /// INTEGER
    Integer(i128),
    /// ENUMERATED, by name
    Enumerated(String),
    /// BIT STRING
    BitString(BitString),
    /// OCTET STRING
    OctetString(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Any of the known-multiplier character string types
    String(String),
    /// SEQUENCE or SET, keyed by member name
    Structure(BTreeMap<String, Value>),
    /// SEQUENCE OF or SET OF
    Array(Vec<Value>),
    /// CHOICE: alternative name and its value
    Choice(String, Box<Value>),
}

impl Value {
    /// Constructs an integer value
    pub fn new_integer(value: impl Into<i128>) -> Self {
        Value::Integer(value.into())
    }

    /// Constructs an enumerated value from its name
    pub fn new_enumerated(name: impl Into<String>) -> Self {
        Value::Enumerated(name.into())
    }

    /// Constructs a character string value
    pub fn new_string(string: impl Into<String>) -> Self {
        Value::String(string.into())
    }

    /// Constructs a structure from `(member name, value)` pairs
    pub fn new_structure<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Structure(
            members
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Constructs a choice value
    pub fn new_choice(name: impl Into<String>, value: Value) -> Self {
        Value::Choice(name.into(), Box::new(value))
    }

    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Enumerated(_) => "enumerated",
            Value::BitString(_) => "bit string",
            Value::OctetString(_) => "octet string",
            Value::String(_) => "string",
            Value::Structure(_) => "structure",
            Value::Array(_) => "array",
            Value::Choice(_, _) => "choice",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enumerated(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Structure(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Get the chosen alternative of a choice value
    pub fn as_choice(&self) -> Option<(&str, &Value)> {
        match self {
            Value::Choice(name, value) => Some((name, value)),
            _ => None,
        }
    }

    /// Look up a member of a structure value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_structure().and_then(|members| members.get(name))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value as i128)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::OctetString(value)
    }
}

impl From<BitString> for Value {
    fn from(value: BitString) -> Self {
        Value::BitString(value)
    }
}
