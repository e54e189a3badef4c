use crate::model::{Atom, Error};
use dashmap::DashMap;
use lazy_static::lazy_static;
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

#[derive(Clone, Debug)]
enum PathNodeKind {
    Root,
    Prim { parent: Arc<PathNode>, name: Atom },
    Property { parent: Arc<PathNode>, name: Atom },
}

#[derive(Debug)]
struct PathNode {
    kind: PathNodeKind,
}

impl PathNode {
    fn new_root() -> Arc<PathNode> {
        Arc::new(PathNode {
            kind: PathNodeKind::Root,
        })
    }

    fn write(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            PathNodeKind::Root => Ok(()),
            PathNodeKind::Prim { parent, name } => {
                parent.write(f)?;
                write!(f, "/{}", name)
            }
            PathNodeKind::Property { parent, name } => {
                parent.write(f)?;
                write!(f, ".{}", name)
            }
        }
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
struct PathKey {
    parent: usize, // pointer
    part: Atom,
    property: bool,
}

lazy_static! {
    static ref ROOT_PATH_NODE: Arc<PathNode> = PathNode::new_root();
    static ref PATH_NODE_TABLE: DashMap<PathKey, Arc<PathNode>> = DashMap::new();
}

/// Returns whether `name` can be used as a prim name.
///
/// Prim names are non-empty and made of ASCII letters, digits and underscores only.
pub fn is_valid_prim_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns whether `name` can be used as a property name (prim name characters plus `:` namespaces).
pub fn is_valid_property_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(':')
        && !name.ends_with(':')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

//--------------------------------------------------------------------------------------------------

/// Interned paths to objects in a scene document.
///
/// # Examples of paths
///
/// - `/asset/geo/mesh`: absolute path to a prim
/// - `/asset/materials/wood/surface.inputs:base`: path to a property of a prim
///
/// Two paths are equal if and only if they point to the same interned node, so comparison and
/// hashing are pointer operations.
#[derive(Clone)]
pub struct Path {
    node: Arc<PathNode>,
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Path(`{}`)", self)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.node.kind {
            PathNodeKind::Root => write!(f, "/"),
            _ => self.node.write(f),
        }
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(Arc::as_ptr(&self.node) as usize)
    }
}

impl Path {
    /// Returns the path to the root object.
    pub fn root() -> Path {
        Path {
            node: ROOT_PATH_NODE.clone(),
        }
    }

    fn intern(&self, name: Atom, property: bool) -> Path {
        let node = PATH_NODE_TABLE
            .entry(PathKey {
                parent: Arc::as_ptr(&self.node) as usize,
                part: name.clone(),
                property,
            })
            .or_insert_with(|| {
                let parent = self.node.clone();
                Arc::new(PathNode {
                    kind: if property {
                        PathNodeKind::Property { parent, name }
                    } else {
                        PathNodeKind::Prim { parent, name }
                    },
                })
            })
            .clone();
        Path { node }
    }

    /// Returns a new prim path with the specified part appended to it.
    ///
    /// Panics if this is a property path or if `part` is not a valid prim name.
    pub fn join(&self, part: impl Into<Atom>) -> Path {
        let name = part.into();
        assert!(!self.is_property(), "cannot append a prim name to a property path");
        assert!(is_valid_prim_name(&name), "invalid prim name: `{}`", name);
        self.intern(name, false)
    }

    /// Same as `join`, but returns an error instead of panicking on invalid names.
    pub fn try_join(&self, part: impl Into<Atom>) -> Result<Path, Error> {
        let name = part.into();
        if self.is_property() || !is_valid_prim_name(&name) {
            return Err(Error::PathSyntax(format!("{}/{}", self, name)));
        }
        Ok(self.intern(name, false))
    }

    /// Returns the path of the property `name` on the prim at this path.
    ///
    /// Panics if this is already a property path, the root, or if `name` is not a valid property name.
    pub fn join_property(&self, name: impl Into<Atom>) -> Path {
        let name = name.into();
        assert!(!self.is_property() && !self.is_root(), "properties can only be attached to prims");
        assert!(is_valid_property_name(&name), "invalid property name: `{}`", name);
        self.intern(name, true)
    }

    /// Returns whether this is the root path.
    pub fn is_root(&self) -> bool {
        Arc::ptr_eq(&self.node, &ROOT_PATH_NODE)
    }

    /// Returns whether this path points to a property.
    pub fn is_property(&self) -> bool {
        matches!(self.node.kind, PathNodeKind::Property { .. })
    }

    /// Returns the parent path. The parent of a property path is its prim.
    pub fn parent(&self) -> Option<Path> {
        match self.node.kind {
            PathNodeKind::Root => None,
            PathNodeKind::Prim { ref parent, .. } | PathNodeKind::Property { ref parent, .. } => Some(Path {
                node: parent.clone(),
            }),
        }
    }

    /// Returns the path of the prim this path refers to: itself for prim paths, the owning prim for
    /// property paths.
    pub fn prim_path(&self) -> Path {
        if self.is_property() {
            self.parent().unwrap_or_else(Path::root)
        } else {
            self.clone()
        }
    }

    /// Returns whether this path is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        let mut p = Some(other.clone());
        while let Some(cur) = p {
            if &cur == self {
                return true;
            }
            p = cur.parent();
        }
        false
    }

    /// Returns the name of the object referred to by the path, which is the last part of the path.
    pub fn name(&self) -> Atom {
        match self.node.kind {
            PathNodeKind::Root => Atom::default(),
            PathNodeKind::Prim { ref name, .. } | PathNodeKind::Property { ref name, .. } => name.clone(),
        }
    }

    /// Parses a path from its string representation.
    pub fn parse(path: &str) -> Result<Path, Error> {
        let syntax_error = || Error::PathSyntax(path.to_string());
        let rest = path.strip_prefix('/').ok_or_else(syntax_error)?;
        if rest.is_empty() {
            return Ok(Path::root());
        }

        let (prims, property) = match rest.rsplit_once('/') {
            Some((head, last)) => match last.split_once('.') {
                Some((prim, prop)) => (format!("{}/{}", head, prim), Some(prop)),
                None => (rest.to_string(), None),
            },
            None => match rest.split_once('.') {
                Some((prim, prop)) => (prim.to_string(), Some(prop)),
                None => (rest.to_string(), None),
            },
        };

        let mut result = Path::root();
        for part in prims.split('/') {
            result = result.try_join(part).map_err(|_| syntax_error())?;
        }
        if let Some(prop) = property {
            if !is_valid_property_name(prop) || result.is_root() {
                return Err(syntax_error());
            }
            result = result.join_property(prop);
        }
        Ok(result)
    }
}
