use crate::model::{Atom, Path, Value, ValueType};

////////////////////////////////////////////////////////////////////////////////////////////////////
// Attribute
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An attribute of a `Prim`.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    /// Path of this attribute in the document tree. Contains the name of the attribute.
    pub path: Path,

    /// Declared type.
    pub ty: ValueType,

    /// Value of the attribute, `None` if it was created without a value.
    pub value: Option<Value>,

    /// Connection source (path to a property on another prim).
    ///
    /// There is at most one source per attribute: connecting again replaces the previous source.
    pub connection: Option<Path>,
}

impl Attribute {
    pub(crate) fn new(path: Path, ty: ValueType) -> Attribute {
        Attribute {
            path,
            ty,
            value: None,
            connection: None,
        }
    }

    /// Name of the attribute
    pub fn name(&self) -> Atom {
        self.path.name()
    }
}
