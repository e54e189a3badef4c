use crate::{
    model::{types, Atom, Path, Prim},
    stage::Stage,
};

/// Name of the subset attribute describing what the indices refer to.
pub const ELEMENT_TYPE: &str = "elementType";
/// Name of the subset attribute holding the element indices.
pub const INDICES: &str = "indices";
/// Name of the subset attribute grouping subsets by purpose.
pub const FAMILY_NAME: &str = "familyName";

const DEFAULT_ELEMENT_TYPE: &str = "face";

/// A face subset of a mesh, the join key between geometry and materials.
#[derive(Clone, Debug, PartialEq)]
pub struct SubsetRef {
    pub path: Path,
    /// Subset name, also used as material name and texture namespace.
    pub name: Atom,
    /// Mesh the subset partitions.
    pub mesh: Path,
    pub element_type: Atom,
    pub indices: Vec<i32>,
}

impl SubsetRef {
    fn from_prim(prim: &Prim) -> SubsetRef {
        SubsetRef {
            path: prim.path.clone(),
            name: prim.name(),
            mesh: prim.path.parent().unwrap_or_else(Path::root),
            element_type: prim
                .attribute_value(ELEMENT_TYPE)
                .and_then(|v| v.as_token().cloned())
                .unwrap_or_else(|| Atom::from(DEFAULT_ELEMENT_TYPE)),
            indices: prim
                .attribute_value(INDICES)
                .and_then(|v| v.as_int_array())
                .map(|indices| indices.to_vec())
                .unwrap_or_default(),
        }
    }
}

/// Returns every defined subset of the document, in traversal order.
///
/// `over` placeholders are skipped, and so are subsets whose parent is not a mesh.
pub fn find_subsets<S: Stage + ?Sized>(stage: &S) -> Vec<SubsetRef> {
    let mut subsets = Vec::new();
    for prim in stage.traverse() {
        if !prim.is_a(types::GEOM_SUBSET) {
            continue;
        }
        let parent_is_mesh = prim
            .path
            .parent()
            .and_then(|parent| stage.prim(&parent))
            .map_or(false, |parent| parent.is_a(types::MESH));
        if !parent_is_mesh {
            debug!("ignoring subset `{}`: parent is not a mesh", prim.path);
            continue;
        }
        subsets.push(SubsetRef::from_prim(prim));
    }
    subsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, DocumentFile, MemoryBackend, Value, ValueType};

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn stage_with(doc: impl FnOnce(&mut Document)) -> DocumentFile {
        let mut file = DocumentFile::create(Box::new(MemoryBackend::default()));
        doc(file.document_mut());
        file
    }

    #[test]
    fn finds_subsets_in_traversal_order() {
        let stage = stage_with(|doc| {
            doc.define_prim(&path("/asset"), types::XFORM).unwrap();
            doc.define_prim(&path("/asset/mesh"), types::MESH).unwrap();
            doc.define_prim(&path("/asset/mesh/wood"), types::GEOM_SUBSET).unwrap();
            doc.define_prim(&path("/asset/mesh/metal"), types::GEOM_SUBSET).unwrap();
            let indices = doc
                .create_attribute(&path("/asset/mesh/wood"), INDICES, ValueType::IntArray)
                .unwrap();
            doc.set_value(&indices, Value::from(vec![0, 1, 2])).unwrap();
        });
        let subsets = find_subsets(&stage);
        let names: Vec<&str> = subsets.iter().map(|s| &*s.name).collect();
        assert_eq!(names, ["metal", "wood"]);
        assert_eq!(subsets[1].mesh, path("/asset/mesh"));
        assert_eq!(subsets[1].indices, [0, 1, 2]);
        assert_eq!(subsets[1].element_type, "face");
        assert!(subsets[0].indices.is_empty());
    }

    #[test]
    fn skips_overs_and_orphans() {
        let stage = stage_with(|doc| {
            doc.define_prim(&path("/asset"), types::XFORM).unwrap();
            doc.define_prim(&path("/asset/mesh"), types::MESH).unwrap();
            doc.override_prim(&path("/asset/mesh/placeholder")).unwrap().type_name = Atom::from(types::GEOM_SUBSET);
            doc.define_prim(&path("/asset/orphan"), types::GEOM_SUBSET).unwrap();
        });
        assert!(find_subsets(&stage).is_empty());
    }
}
