//! Capability interface over a scene document store.
//!
//! The binding engine never touches a concrete store directly: it goes through `Stage`, which
//! provides path-addressed prim definition, typed attributes, connections and an explicit `save`.
mod shade;

pub use shade::{bind_material, bound_material, Input, Material, Output, Shader, INFO_ID, MATERIAL_BINDING};

use crate::model::{Atom, Attribute, Document, DocumentFile, Error, Metadata, Path, Prim, Value, ValueType};

pub trait Stage {
    /// Read access to the document tree.
    fn document(&self) -> &Document;

    /// Defines a prim of the given type. Idempotent: an existing prim at `path` is reused.
    fn define_prim(&mut self, path: &Path, type_name: &str) -> Result<(), Error>;

    /// Removes a prim and its descendants.
    fn remove_prim(&mut self, path: &Path) -> Result<(), Error>;

    /// Creates an attribute (or returns the existing one) and returns its path.
    fn create_attribute(&mut self, prim: &Path, name: &str, ty: ValueType) -> Result<Path, Error>;

    /// Sets the value of an attribute.
    fn set_value(&mut self, attribute: &Path, value: Value) -> Result<(), Error>;

    /// Connects an attribute to a source property. The previous source, if any, is replaced.
    fn connect(&mut self, attribute: &Path, source: &Path) -> Result<(), Error>;

    /// Removes the connection of an attribute.
    fn disconnect(&mut self, attribute: &Path) -> Result<(), Error>;

    /// Sets a token-valued metadata entry on a prim.
    fn set_metadata(&mut self, prim: &Path, metadata: Metadata<Atom>, value: Atom) -> Result<(), Error>;

    /// Persists the document.
    fn save(&mut self) -> Result<(), Error>;

    fn prim(&self, path: &Path) -> Option<&Prim> {
        self.document().find_prim(path)
    }

    fn attribute(&self, path: &Path) -> Option<&Attribute> {
        self.document().find_attribute(path)
    }

    /// All prims in depth-first order, parents before children.
    fn traverse(&self) -> Vec<&Prim> {
        self.document().traverse()
    }
}

impl Stage for DocumentFile {
    fn document(&self) -> &Document {
        DocumentFile::document(self)
    }

    fn define_prim(&mut self, path: &Path, type_name: &str) -> Result<(), Error> {
        self.document_mut().define_prim(path, type_name)?;
        Ok(())
    }

    fn remove_prim(&mut self, path: &Path) -> Result<(), Error> {
        self.document_mut().remove_prim(path)
    }

    fn create_attribute(&mut self, prim: &Path, name: &str, ty: ValueType) -> Result<Path, Error> {
        self.document_mut().create_attribute(prim, name, ty)
    }

    fn set_value(&mut self, attribute: &Path, value: Value) -> Result<(), Error> {
        self.document_mut().set_value(attribute, value)
    }

    fn connect(&mut self, attribute: &Path, source: &Path) -> Result<(), Error> {
        self.document_mut().connect(attribute, source)
    }

    fn disconnect(&mut self, attribute: &Path) -> Result<(), Error> {
        self.document_mut().disconnect(attribute)
    }

    fn set_metadata(&mut self, prim: &Path, metadata: Metadata<Atom>, value: Atom) -> Result<(), Error> {
        self.document_mut().set_metadata(prim, metadata, value)
    }

    fn save(&mut self) -> Result<(), Error> {
        DocumentFile::save(self)
    }
}
