//! Bencode value types

use std::collections::BTreeMap;

use bytes::Bytes;

/// A decoded bencode value
///
/// Dicts keep canonical key order via `BTreeMap`; keys are raw byte
/// strings, exactly as they appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed integer (`i...e`)
    Int(i64),
    /// Length-prefixed byte string
    Bytes(Bytes),
    /// List (`l...e`)
    List(Vec<Value>),
    /// Dict (`d...e`) with sorted, unique byte-string keys
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Build a byte-string value
    pub fn bytes(data: impl Into<Bytes>) -> Value {
        Value::Bytes(data.into())
    }

    /// Build a byte-string value from text
    pub fn str(s: &str) -> Value {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The value as text, if it is a UTF-8 byte string
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Int(7).as_str(), None);
        assert_eq!(Value::str("hi").as_str(), Some("hi"));
        assert_eq!(Value::bytes(&[0xff, 0xfe][..]).as_str(), None);
        assert!(Value::List(vec![]).as_list().is_some());
        assert!(Value::Dict(BTreeMap::new()).as_dict().is_some());
    }
}
