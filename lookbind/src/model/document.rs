use crate::model::{Atom, Attribute, Error, Metadata, Path, Prim, Specifier, Value, ValueType};

/// In-memory scene document: a tree of prims rooted at `/`.
#[derive(Clone, Debug)]
pub struct Document {
    /// Revision number, incremented on every change.
    pub revision: usize,
    /// Root prim. Untyped, never removed.
    pub root: Prim,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

/// Returns the names of the prims leading to `path`, from the root down.
fn prim_names(path: &Path) -> Vec<Atom> {
    let mut names = Vec::new();
    let mut p = Some(path.prim_path());
    while let Some(cur) = p {
        if cur.is_root() {
            break;
        }
        names.push(cur.name());
        p = cur.parent();
    }
    names.reverse();
    names
}

impl Document {
    /// Creates a new, empty document.
    pub fn new() -> Document {
        Document {
            revision: 0,
            root: Prim::new(Path::root(), Atom::default(), Specifier::Def),
        }
    }

    /// Finds the prim at the given path.
    pub fn find_prim(&self, path: &Path) -> Option<&Prim> {
        if path.is_property() {
            return None;
        }
        let mut prim = &self.root;
        for name in prim_names(path) {
            prim = prim.find_child(&name)?;
        }
        Some(prim)
    }

    /// Finds the prim at the given path and returns a mutable reference to it.
    pub fn find_prim_mut(&mut self, path: &Path) -> Option<&mut Prim> {
        if path.is_property() {
            return None;
        }
        let mut prim = &mut self.root;
        for name in prim_names(path) {
            prim = prim.find_child_mut(&name)?;
        }
        Some(prim)
    }

    fn prim_mut_or_err(&mut self, path: &Path) -> Result<&mut Prim, Error> {
        self.find_prim_mut(path).ok_or_else(|| Error::NoObjectAtPath(path.clone()))
    }

    /// Finds the attribute at the given property path.
    pub fn find_attribute(&self, path: &Path) -> Option<&Attribute> {
        if !path.is_property() {
            return None;
        }
        self.find_prim(&path.prim_path())?.attributes.get(&path.name())
    }

    fn attribute_mut_or_err(&mut self, path: &Path) -> Result<&mut Attribute, Error> {
        let prim_path = path.prim_path();
        let name = path.name();
        self.find_prim_mut(&prim_path)
            .and_then(|prim| prim.attributes.get_mut(&name))
            .ok_or_else(|| Error::NoObjectAtPath(path.clone()))
    }

    fn define_with_specifier(&mut self, path: &Path, type_name: &Atom, specifier: Specifier) -> Result<&mut Prim, Error> {
        if path.is_root() || path.is_property() {
            return Err(Error::PathSyntax(path.to_string()));
        }
        let parent_path = path.parent().unwrap_or_else(Path::root);
        let name = path.name();
        self.revision += 1;
        let parent = self.prim_mut_or_err(&parent_path)?;
        if parent.find_child(&name).is_none() {
            parent.add_child(Prim::new(path.clone(), type_name.clone(), specifier));
        }
        let prim = parent
            .find_child_mut(&name)
            .ok_or_else(|| Error::NoObjectAtPath(path.clone()))?;
        Ok(prim)
    }

    /// Defines a prim of the given type at `path`.
    ///
    /// Defining a prim at an existing path is not an error: the existing prim is kept (with its
    /// attributes and children), its type is updated, and a placeholder `over` becomes defined.
    /// The parent prim must exist.
    pub fn define_prim(&mut self, path: &Path, type_name: impl Into<Atom>) -> Result<&mut Prim, Error> {
        let type_name = type_name.into();
        let prim = self.define_with_specifier(path, &type_name, Specifier::Def)?;
        prim.type_name = type_name;
        prim.specifier = Specifier::Def;
        Ok(prim)
    }

    /// Creates an untyped `over` placeholder at `path` if nothing exists there yet.
    pub fn override_prim(&mut self, path: &Path) -> Result<&mut Prim, Error> {
        self.define_with_specifier(path, &Atom::default(), Specifier::Over)
    }

    /// Removes the prim at `path` and all its descendants.
    pub fn remove_prim(&mut self, path: &Path) -> Result<(), Error> {
        if path.is_root() {
            return Err(Error::RemoveRoot);
        }
        let parent_path = path.parent().unwrap_or_else(Path::root);
        let parent = self.prim_mut_or_err(&parent_path)?;
        if parent.children.remove(&path.name()).is_none() {
            return Err(Error::NoObjectAtPath(path.clone()));
        }
        self.revision += 1;
        Ok(())
    }

    /// Creates an attribute on the prim at `prim_path` and returns its path.
    ///
    /// If the attribute already exists it is left untouched (including its declared type).
    pub fn create_attribute(&mut self, prim_path: &Path, name: impl Into<Atom>, ty: ValueType) -> Result<Path, Error> {
        let name = name.into();
        let prim = self.prim_mut_or_err(prim_path)?;
        let path = prim_path.join_property(name.clone());
        if !prim.attributes.contains_key(&name) {
            prim.attributes.insert(name, Attribute::new(path.clone(), ty));
        }
        self.revision += 1;
        Ok(path)
    }

    /// Sets the value of the attribute at `path`. The value must match the declared type.
    ///
    /// Asset paths must be valid UTF-8 so that they can be written out unchanged.
    pub fn set_value(&mut self, path: &Path, value: Value) -> Result<(), Error> {
        if let Value::Asset(ref asset) = value {
            if asset.to_str().is_none() {
                return Err(Error::NonUtf8AssetPath(asset.clone()));
            }
        }
        let attr = self.attribute_mut_or_err(path)?;
        if attr.ty != value.ty() {
            return Err(Error::MismatchedTypes {
                path: path.clone(),
                expected: attr.ty,
                actual: value.ty(),
            });
        }
        attr.value = Some(value);
        self.revision += 1;
        Ok(())
    }

    /// Connects the attribute at `path` to `source`, replacing any previous connection.
    pub fn connect(&mut self, path: &Path, source: &Path) -> Result<(), Error> {
        if self.find_attribute(source).is_none() {
            return Err(Error::NoObjectAtPath(source.clone()));
        }
        let attr = self.attribute_mut_or_err(path)?;
        attr.connection = Some(source.clone());
        self.revision += 1;
        Ok(())
    }

    /// Removes the connection of the attribute at `path`, if any.
    pub fn disconnect(&mut self, path: &Path) -> Result<(), Error> {
        let attr = self.attribute_mut_or_err(path)?;
        attr.connection = None;
        self.revision += 1;
        Ok(())
    }

    /// Sets a well-known metadata entry on the prim at `path`.
    pub fn set_metadata<T: Into<Value>>(&mut self, path: &Path, metadata: Metadata<T>, value: T) -> Result<(), Error> {
        let prim = self.prim_mut_or_err(path)?;
        prim.metadata.insert(Atom::from(metadata.name), value.into());
        self.revision += 1;
        Ok(())
    }

    /// Returns all prims of the document in depth-first order, parents before their children.
    ///
    /// The root prim itself is not included. Siblings are visited in name order.
    pub fn traverse(&self) -> Vec<&Prim> {
        fn visit<'a>(prim: &'a Prim, out: &mut Vec<&'a Prim>) {
            for child in prim.children.values() {
                out.push(child);
                visit(child, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.root, &mut out);
        out
    }

    /// Returns the descendants of the prim at `path` (excluding itself) in traversal order.
    pub fn descendants(&self, path: &Path) -> Vec<&Prim> {
        self.traverse()
            .into_iter()
            .filter(|prim| &prim.path != path && path.is_prefix_of(&prim.path))
            .collect()
    }

}
