use crate::model::{Atom, FromValue};
use std::{fmt, marker::PhantomData};

////////////////////////////////////////////////////////////////////////////////////////////////////
// Metadata
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A token that represents a well-known metadata entry.
pub struct Metadata<T> {
    pub name: &'static str,
    _phantom: PhantomData<T>,
}

impl<T: FromValue> Metadata<T> {
    pub const fn new(name: &'static str) -> Metadata<T> {
        Metadata {
            name,
            _phantom: PhantomData,
        }
    }
}

impl<T> Copy for Metadata<T> {}

impl<T> Clone for Metadata<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> fmt::Debug for Metadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Metadata").field(&self.name).finish()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Well-known metadata entries
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Model kind of a prim (`component`, `group`, `assembly`...).
pub const KIND: Metadata<Atom> = Metadata::new("kind");
/// API schema applied to a prim (e.g. `MaterialBindingAPI`).
pub const API_SCHEMAS: Metadata<Atom> = Metadata::new("apiSchemas");

/// Value of `KIND` for the top-level asset prims that own a material library.
pub const KIND_COMPONENT: &str = "component";
