//! Type description.
use std::{fmt, str::FromStr};

/// Types of attribute values.
///
/// The string representation (`Display` / `FromStr`) doubles as the element name used in the XML
/// document format.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Float3,
    String,
    Token,
    Asset,
    IntArray,
    Relationship,
}

impl ValueType {
    pub const ALL: [ValueType; 9] = [
        ValueType::Bool,
        ValueType::Int,
        ValueType::Float,
        ValueType::Float3,
        ValueType::String,
        ValueType::Token,
        ValueType::Asset,
        ValueType::IntArray,
        ValueType::Relationship,
    ];

    /// Name of the type in the document format.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Float3 => "float3",
            ValueType::String => "string",
            ValueType::Token => "token",
            ValueType::Asset => "asset",
            ValueType::IntArray => "intArray",
            ValueType::Relationship => "rel",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::ALL.iter().copied().find(|ty| ty.name() == s).ok_or(())
    }
}
