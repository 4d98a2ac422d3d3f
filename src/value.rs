// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::collections::{
    BTreeMap,
    BTreeSet,
};
use std::fmt;

use ordered_float::OrderedFloat;
use serde_derive::{
    Deserialize,
    Serialize,
};
use uuid::Uuid;

/// We define a set of types, associated with simple integers, to describe the
/// shape of a `Value` in error messages. The tags are never written to disk by
/// themselves; the object codec relies on serde's own variant indices.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Type {
    Nil = 1,
    Bool = 2,
    Int = 3,
    Float = 4,
    Str = 5,
    Blob = 6,
    Uuid = 7,
    List = 8,
    Set = 9,
    Map = 10,
}

impl Type {
    pub fn to_tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Type::Nil => "nil",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Float => "float",
            Type::Str => "str",
            Type::Blob => "blob",
            Type::Uuid => "uuid",
            Type::List => "list",
            Type::Set => "set",
            Type::Map => "map",
        })
    }
}

/// An application-level key or value. Everything a store hands back is a
/// `Value`, and everything it accepts converts into one.
///
/// Values are totally ordered (floats via `OrderedFloat`) so that they can be
/// members of a `Set` or keys of a `Map`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    List(Vec<Value>),
    Set(BTreeSet<Value>),
    Map(BTreeMap<Value, Value>),
}

impl Value {
    pub fn value_type(&self) -> Type {
        match self {
            Value::Nil => Type::Nil,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::Str,
            Value::Blob(_) => Type::Blob,
            Value::Uuid(_) => Type::Uuid,
            Value::List(_) => Type::List,
            Value::Set(_) => Type::Set,
            Value::Map(_) => Type::Map,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v.0),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Blob(b) => {
                f.write_str("b\"")?;
                for byte in b {
                    for c in std::ascii::escape_default(*byte) {
                        write!(f, "{}", c as char)?;
                    }
                }
                f.write_str("\"")
            },
            Value::Uuid(u) => write!(f, "{}", u),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            },
            Value::Set(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            },
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            },
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Value {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Float(OrderedFloat(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Value {
        Value::Blob(v.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(v: &[u8; N]) -> Value {
        Value::Blob(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Value {
        Value::Blob(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Value {
        Value::Uuid(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Value {
        Value::List(v)
    }
}

impl From<BTreeSet<Value>> for Value {
    fn from(v: BTreeSet<Value>) -> Value {
        Value::Set(v)
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(v: BTreeMap<Value, Value>) -> Value {
        Value::Map(v)
    }
}

impl<A, B> From<(A, B)> for Value
where
    A: Into<Value>,
    B: Into<Value>,
{
    fn from((a, b): (A, B)) -> Value {
        Value::List(vec![a.into(), b.into()])
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Value {
        v.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from("a"), Value::Str("a".to_string()));
        assert_eq!(Value::from(b"a\0b"), Value::Blob(vec![b'a', 0, b'b']));
        assert_eq!(Value::from(7), Value::Int(7));
        assert_eq!(Value::from(("k", 1)), Value::List(vec![Value::from("k"), Value::Int(1)]));
        assert_eq!(Value::from(1.5).value_type(), Type::Float);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(b"a\0").to_string(), "b\"a\\x00\"");
        let list = Value::List(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(list.to_string(), "[1, \"x\"]");
    }

    #[test]
    fn test_values_can_be_set_members() {
        let mut set = BTreeSet::new();
        set.insert(Value::from(2.0));
        set.insert(Value::from(1.0));
        set.insert(Value::from(2.0));
        assert_eq!(set.len(), 2);
    }
}
