use crate::model::{Atom, Attribute, FromValue, Metadata, Path, Value};
use imbl::OrdMap;
use std::fmt;

/// Whether a prim carries a defining opinion.
///
/// `Over` prims are placeholders that only exist to hold overrides for a prim defined elsewhere;
/// they have no type of their own and are skipped by anything that looks for defined geometry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Specifier {
    Def,
    Over,
}

impl Specifier {
    pub fn name(&self) -> &'static str {
        match self {
            Specifier::Def => "def",
            Specifier::Over => "over",
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Well-known prim type names.
pub mod types {
    pub const MESH: &str = "Mesh";
    pub const XFORM: &str = "Xform";
    pub const SCOPE: &str = "Scope";
    pub const GEOM_SUBSET: &str = "GeomSubset";
    pub const MATERIAL: &str = "Material";
    pub const SHADER: &str = "Shader";
}

/// Prims: typed, named nodes of the document tree.
#[derive(Clone, Debug)]
pub struct Prim {
    /// Path of this prim in the document tree.
    pub path: Path,
    /// Type name (e.g. `Mesh`), empty for untyped prims.
    pub type_name: Atom,
    pub specifier: Specifier,
    pub metadata: OrdMap<Atom, Value>,
    pub attributes: OrdMap<Atom, Attribute>,
    pub children: OrdMap<Atom, Prim>,
}

impl Prim {
    pub fn new(path: Path, type_name: Atom, specifier: Specifier) -> Prim {
        Prim {
            path,
            type_name,
            specifier,
            metadata: OrdMap::new(),
            attributes: OrdMap::new(),
            children: OrdMap::new(),
        }
    }

    /// Returns the name of this prim.
    pub fn name(&self) -> Atom {
        self.path.name()
    }

    /// Returns whether this prim has a defining opinion.
    pub fn is_defined(&self) -> bool {
        self.specifier == Specifier::Def
    }

    /// Returns whether this prim is defined and has the specified type.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.is_defined() && self.type_name == type_name
    }

    /// Finds a child prim by name.
    pub fn find_child(&self, name: &Atom) -> Option<&Prim> {
        self.children.get(name)
    }

    /// Finds a child prim by name and returns a mutable reference to it.
    pub fn find_child_mut(&mut self, name: &Atom) -> Option<&mut Prim> {
        self.children.get_mut(name)
    }

    /// Adds a child prim. Used internally by `Document` and the reader.
    pub(crate) fn add_child(&mut self, prim: Prim) {
        self.children.insert(prim.name(), prim);
    }

    /// Returns the attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(&Atom::from(name))
    }

    /// Returns the value of the attribute with the given name, if it has one.
    pub fn attribute_value(&self, name: &str) -> Option<&Value> {
        self.attribute(name).and_then(|attr| attr.value.as_ref())
    }

    /// Returns the value of a well-known metadata entry.
    pub fn find_metadata<T: FromValue>(&self, metadata: Metadata<T>) -> Option<T> {
        self.metadata.get(&Atom::from(metadata.name)).and_then(T::from_value)
    }
}
