use crate::model::{Atom, Path, ValueType};
use std::{path::PathBuf, sync::Arc};

/// Attribute values.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Float3(glam::Vec3),
    String(Arc<str>),
    Token(Atom),
    /// Path to an external file (e.g. a texture).
    Asset(PathBuf),
    IntArray(Arc<[i32]>),
    /// Relationship target.
    Rel(Path),
}

impl Value {
    /// Returns the type of this value.
    pub fn ty(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Float3(_) => ValueType::Float3,
            Value::String(_) => ValueType::String,
            Value::Token(_) => ValueType::Token,
            Value::Asset(_) => ValueType::Asset,
            Value::IntArray(_) => ValueType::IntArray,
            Value::Rel(_) => ValueType::Relationship,
        }
    }

    pub fn as_token(&self) -> Option<&Atom> {
        if let Value::Token(token) = self {
            Some(token)
        } else {
            None
        }
    }

    /// Returns a reference to the string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(str) = self {
            Some(str)
        } else {
            None
        }
    }

    pub fn as_asset(&self) -> Option<&std::path::Path> {
        if let Value::Asset(path) = self {
            Some(path)
        } else {
            None
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        if let Value::IntArray(array) = self {
            Some(array)
        } else {
            None
        }
    }

    pub fn as_rel(&self) -> Option<&Path> {
        if let Value::Rel(path) = self {
            Some(path)
        } else {
            None
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<glam::Vec3> for Value {
    fn from(v: glam::Vec3) -> Self {
        Value::Float3(v)
    }
}

impl From<Atom> for Value {
    fn from(v: Atom) -> Self {
        Value::Token(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v.into())
    }
}

impl From<PathBuf> for Value {
    fn from(v: PathBuf) -> Self {
        Value::Asset(v)
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Value::IntArray(v.into())
    }
}

impl From<Path> for Value {
    fn from(v: Path) -> Self {
        Value::Rel(v)
    }
}

/// Conversion from a `Value`, used by typed metadata accessors.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Atom {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_token().cloned()
    }
}
