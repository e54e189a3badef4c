use crate::{
    bind::{build_material, find_subsets, GraphConfig, TextureMap, TextureResolver, FAMILY_NAME},
    config::BindConfig,
    error::{Error, ErrorContextExt},
    model::{self, metadata, types, Atom, Path, Value, ValueType},
    stage::{bind_material, Stage},
};
use serde::Serialize;
use std::{path::Path as FsPath, sync::Arc};

/// Name of the scope holding the materials of a component.
pub const MATERIALS_SCOPE: &str = "materials";
/// `familyName` of subsets bound by the engine.
pub const MATERIAL_BIND_FAMILY: &str = "materialBind";

/// What the materials were bound to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindMode {
    /// One material per distinct subset name.
    Subsets,
    /// No subsets in the document: one material per mesh.
    Meshes,
}

/// A generated material and what it is bound to.
#[derive(Clone, Debug, Serialize)]
pub struct MaterialReport {
    pub material: String,
    pub textures: TextureMap,
    /// Slots for which several textures matched.
    pub ambiguous: Vec<String>,
    pub bound_to: Vec<String>,
}

impl MaterialReport {
    /// Whether no texture at all was found for this material.
    pub fn is_unmatched(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Summary of a binding run over one document.
#[derive(Clone, Debug, Serialize)]
pub struct AssignReport {
    pub mode: BindMode,
    pub materials: Vec<MaterialReport>,
    /// Subsets (or meshes) outside every component, left without a material.
    pub unbound: Vec<String>,
}

impl AssignReport {
    /// Materials for which no texture was found.
    pub fn unmatched(&self) -> impl Iterator<Item = &MaterialReport> {
        self.materials.iter().filter(|m| m.is_unmatched())
    }

    pub fn binding_count(&self) -> usize {
        self.materials.iter().map(|m| m.bound_to.len()).sum()
    }

    /// Whether every piece of geometry got a material with at least one texture.
    pub fn is_complete(&self) -> bool {
        self.unbound.is_empty() && self.unmatched().next().is_none()
    }
}

/// Groups `(name, target)` pairs by name, in order of first appearance.
fn group_by_name(targets: impl Iterator<Item = (Atom, Path)>) -> Vec<(Atom, Vec<Path>)> {
    let mut groups: Vec<(Atom, Vec<Path>)> = Vec::new();
    for (name, target) in targets {
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, paths)) => paths.push(target),
            None => groups.push((name, vec![target])),
        }
    }
    groups
}

fn is_component(prim: &model::Prim) -> bool {
    prim.is_defined()
        && prim
            .find_metadata(metadata::KIND)
            .map_or(false, |kind| kind == metadata::KIND_COMPONENT)
}

/// Tags a subset as bound by material name.
fn mark_subset<S: Stage + ?Sized>(stage: &mut S, subset: &Path) -> Result<(), model::Error> {
    // keep the declared type of an authored familyName
    let declared = stage
        .prim(subset)
        .and_then(|prim| prim.attribute(FAMILY_NAME))
        .map(|attr| attr.ty);
    let value = match declared {
        Some(ValueType::String) => Value::String(Arc::from(MATERIAL_BIND_FAMILY)),
        _ => Value::Token(Atom::from(MATERIAL_BIND_FAMILY)),
    };
    let attr = stage.create_attribute(subset, FAMILY_NAME, value.ty())?;
    stage.set_value(&attr, value)
}

struct MaterialJob<'a> {
    name: &'a Atom,
    targets: &'a [Path],
    library: &'a Path,
    mode: BindMode,
}

fn assign_material<S: Stage + ?Sized>(
    stage: &mut S,
    resolver: &TextureResolver,
    texture_folder: &FsPath,
    graph: &GraphConfig,
    job: MaterialJob,
) -> Result<MaterialReport, Error> {
    let material_path = job.library.try_join(job.name)?;
    let resolution = resolver.resolve(job.name, texture_folder)?;
    if resolution.is_empty() {
        warn!(
            "no texture found for `{}` in `{}`",
            job.name,
            texture_folder.display()
        );
    }

    let graph = build_material(stage, &material_path, &resolution.textures, graph)?;
    for target in job.targets {
        bind_material(stage, target, &graph.material)?;
        if job.mode == BindMode::Subsets {
            mark_subset(stage, target)?;
        }
        info!("bound `{}` to `{}`", material_path, target);
    }

    Ok(MaterialReport {
        material: material_path.to_string(),
        textures: resolution.textures,
        ambiguous: resolution.ambiguous.into_keys().collect(),
        bound_to: job.targets.iter().map(|p| p.to_string()).collect(),
    })
}

/// Generates and binds materials for every component of the document, then saves it once.
///
/// If the document has geometry subsets, each component gets one material per distinct subset
/// name, bound to the subsets with that name. Otherwise each mesh of the component gets a
/// material named after it. Materials live in a `materials` scope under the component, and
/// their textures are looked up in `texture_folder` using the material name as namespace.
///
/// Nothing is saved if an error occurs.
pub fn assign_materials<S: Stage + ?Sized>(
    stage: &mut S,
    texture_folder: &FsPath,
    config: &BindConfig,
) -> Result<AssignReport, Error> {
    if !texture_folder.is_dir() {
        return Err(crate::bind::ResolveError::FolderNotFound(texture_folder.to_path_buf()).into());
    }
    let resolver = TextureResolver::new(config.resolver.clone());

    let subsets = find_subsets(stage);
    let mode = if subsets.is_empty() {
        BindMode::Meshes
    } else {
        BindMode::Subsets
    };
    debug!("{} subsets found, binding {:?}", subsets.len(), mode);

    let mut components: Vec<Path> = Vec::new();
    for prim in stage.traverse() {
        if !is_component(prim) {
            continue;
        }
        if components.iter().any(|c| c.is_prefix_of(&prim.path)) {
            warn!("ignoring component `{}` nested in another component", prim.path);
            continue;
        }
        components.push(prim.path.clone());
    }
    if components.is_empty() {
        // untagged assets: each top-level prim holds one asset
        components = stage
            .traverse()
            .into_iter()
            .filter(|prim| prim.is_defined() && !prim.is_a(types::MESH))
            .filter(|prim| prim.path.parent().map_or(false, |parent| parent.is_root()))
            .map(|prim| prim.path.clone())
            .collect();
        warn!(
            "no component prim found, using the {} top-level prims as components",
            components.len()
        );
    }

    let targets: Vec<Path> = match mode {
        BindMode::Subsets => subsets.iter().map(|subset| subset.path.clone()).collect(),
        BindMode::Meshes => stage
            .traverse()
            .into_iter()
            .filter(|prim| prim.is_a(types::MESH))
            .map(|prim| prim.path.clone())
            .collect(),
    };
    let unbound: Vec<String> = targets
        .iter()
        .filter(|target| !components.iter().any(|c| c.is_prefix_of(target)))
        .map(|target| target.to_string())
        .collect();
    for target in unbound.iter() {
        warn!("`{}` is outside every component, left unbound", target);
    }

    let mut report = AssignReport {
        mode,
        materials: vec![],
        unbound,
    };

    for component in components {
        let groups = match mode {
            BindMode::Subsets => group_by_name(
                subsets
                    .iter()
                    .filter(|subset| component.is_prefix_of(&subset.path))
                    .map(|subset| (subset.name.clone(), subset.path.clone())),
            ),
            BindMode::Meshes => group_by_name(
                stage
                    .document()
                    .descendants(&component)
                    .into_iter()
                    .filter(|prim| prim.is_a(types::MESH))
                    .map(|prim| (prim.name(), prim.path.clone())),
            ),
        };

        let library = component
            .try_join(MATERIALS_SCOPE)
            .context(format!("asset `{}`", component))?;
        stage
            .define_prim(&library, types::SCOPE)
            .context(format!("asset `{}`", component))?;

        for (name, targets) in groups.iter() {
            let job = MaterialJob {
                name,
                targets,
                library: &library,
                mode,
            };
            let material = assign_material(stage, &resolver, texture_folder, &config.graph, job)
                .context(format!("material `{}` of asset `{}`", name, component))?;
            report.materials.push(material);
        }
    }

    stage.save().context("could not save document")?;
    info!(
        "{} materials, {} bindings, {} unmatched, {} unbound",
        report.materials.len(),
        report.binding_count(),
        report.unmatched().count(),
        report.unbound.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Document, DocumentFile, MemoryBackend},
        stage::bound_material,
    };
    use std::fs;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn component(doc: &mut Document, p: &str) {
        doc.define_prim(&path(p), types::XFORM).unwrap();
        doc.set_metadata(&path(p), metadata::KIND, Atom::from(metadata::KIND_COMPONENT))
            .unwrap();
    }

    fn open(doc: Document) -> (DocumentFile, MemoryBackend) {
        let backend = MemoryBackend::new(doc.display_xml().to_string());
        let file = DocumentFile::open(Box::new(backend.clone())).unwrap();
        (file, backend)
    }

    #[test]
    fn subsets_sharing_a_name_share_a_material() {
        let mut doc = Document::new();
        component(&mut doc, "/chair");
        doc.define_prim(&path("/chair/geo"), types::XFORM).unwrap();
        doc.define_prim(&path("/chair/geo/seat"), types::MESH).unwrap();
        doc.define_prim(&path("/chair/geo/legs"), types::MESH).unwrap();
        doc.define_prim(&path("/chair/geo/seat/wood"), types::GEOM_SUBSET).unwrap();
        doc.define_prim(&path("/chair/geo/seat/metal"), types::GEOM_SUBSET).unwrap();
        doc.define_prim(&path("/chair/geo/legs/wood"), types::GEOM_SUBSET).unwrap();
        let (mut stage, backend) = open(doc);
        let textures = tempfile::tempdir().unwrap();

        let report = assign_materials(&mut stage, textures.path(), &BindConfig::default()).unwrap();
        assert_eq!(report.mode, BindMode::Subsets);
        let materials: Vec<&str> = report.materials.iter().map(|m| m.material.as_str()).collect();
        // traversal order: legs before seat
        assert_eq!(materials, ["/chair/materials/wood", "/chair/materials/metal"]);
        assert_eq!(report.unmatched().count(), 2);

        let wood = path("/chair/materials/wood");
        assert_eq!(bound_material(&stage, &path("/chair/geo/seat/wood")), Some(wood.clone()));
        assert_eq!(bound_material(&stage, &path("/chair/geo/legs/wood")), Some(wood));
        assert_eq!(
            stage
                .prim(&path("/chair/geo/seat/wood"))
                .unwrap()
                .attribute_value(FAMILY_NAME),
            Some(&Value::Token(Atom::from(MATERIAL_BIND_FAMILY)))
        );
        let scope = stage.prim(&path("/chair/materials")).unwrap();
        assert!(scope.is_a(types::SCOPE));
        assert_eq!(scope.children.len(), 2);
        assert_eq!(backend.store_count(), 1);
    }

    #[test]
    fn falls_back_to_meshes() {
        let mut doc = Document::new();
        component(&mut doc, "/crate");
        doc.define_prim(&path("/crate/geo"), types::XFORM).unwrap();
        doc.define_prim(&path("/crate/geo/lid"), types::MESH).unwrap();
        doc.define_prim(&path("/crate/geo/box"), types::MESH).unwrap();
        // not a component: left alone
        doc.define_prim(&path("/loose"), types::MESH).unwrap();
        let (mut stage, backend) = open(doc);

        let textures = tempfile::tempdir().unwrap();
        fs::write(textures.path().join("Lid_BaseColor.png"), b"").unwrap();

        let report = assign_materials(&mut stage, textures.path(), &BindConfig::default()).unwrap();
        assert_eq!(report.mode, BindMode::Meshes);
        assert_eq!(report.materials.len(), 2);
        assert_eq!(
            bound_material(&stage, &path("/crate/geo/lid")),
            Some(path("/crate/materials/lid"))
        );
        assert_eq!(
            report.materials[1].textures["base_color"],
            textures.path().join("Lid_BaseColor.png")
        );
        assert_eq!(report.unmatched().map(|m| m.material.as_str()).collect::<Vec<_>>(), ["/crate/materials/box"]);
        assert!(bound_material(&stage, &path("/loose")).is_none());
        assert_eq!(report.unbound, ["/loose"]);
        assert!(!report.is_complete());
        // meshes are not tagged
        assert!(stage.prim(&path("/crate/geo/lid")).unwrap().attribute(FAMILY_NAME).is_none());
        assert_eq!(backend.store_count(), 1);
    }

    #[test]
    fn failure_leaves_document_unsaved() {
        let mut doc = Document::new();
        component(&mut doc, "/rock");
        doc.define_prim(&path("/rock/mesh"), types::MESH).unwrap();
        doc.define_prim(&path("/rock/mesh/moss"), types::GEOM_SUBSET).unwrap();
        let (mut stage, backend) = open(doc);

        let textures = tempfile::tempdir().unwrap();
        let missing = textures.path().join("missing");
        let err = assign_materials(&mut stage, &missing, &BindConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "resolution error");

        fs::write(textures.path().join("moss_basecolor_a.png"), b"").unwrap();
        fs::write(textures.path().join("moss_basecolor_b.png"), b"").unwrap();
        let mut config = BindConfig::default();
        config.resolver.ambiguity = crate::bind::AmbiguityPolicy::Strict;
        let err = assign_materials(&mut stage, textures.path(), &config).unwrap_err();
        assert!(err.to_string().contains("material `moss` of asset `/rock`"));
        assert_eq!(backend.store_count(), 0);
    }

    #[test]
    fn existing_string_family_name_is_kept_as_string() {
        let mut doc = Document::new();
        component(&mut doc, "/rock");
        doc.define_prim(&path("/rock/mesh"), types::MESH).unwrap();
        doc.define_prim(&path("/rock/mesh/moss"), types::GEOM_SUBSET).unwrap();
        doc.create_attribute(&path("/rock/mesh/moss"), FAMILY_NAME, ValueType::String)
            .unwrap();
        let (mut stage, _) = open(doc);
        let textures = tempfile::tempdir().unwrap();
        assign_materials(&mut stage, textures.path(), &BindConfig::default()).unwrap();
        assert_eq!(
            stage
                .prim(&path("/rock/mesh/moss"))
                .unwrap()
                .attribute_value(FAMILY_NAME)
                .and_then(Value::as_str),
            Some(MATERIAL_BIND_FAMILY)
        );
    }

    #[test]
    fn untagged_top_level_prims_are_components() {
        let mut doc = Document::new();
        doc.define_prim(&path("/rock"), types::XFORM).unwrap();
        doc.define_prim(&path("/rock/mesh"), types::MESH).unwrap();
        doc.define_prim(&path("/rock/mesh/rock_a"), types::GEOM_SUBSET).unwrap();
        let (mut stage, backend) = open(doc);
        let textures = tempfile::tempdir().unwrap();
        fs::write(textures.path().join("rock_a_basecolor.png"), b"").unwrap();

        let report = assign_materials(&mut stage, textures.path(), &BindConfig::default()).unwrap();
        assert_eq!(report.materials.len(), 1);
        assert_eq!(report.materials[0].material, "/rock/materials/rock_a");
        assert!(report.unbound.is_empty());
        assert!(report.is_complete());
        assert_eq!(
            bound_material(&stage, &path("/rock/mesh/rock_a")),
            Some(path("/rock/materials/rock_a"))
        );
        assert_eq!(backend.store_count(), 1);
    }

    #[test]
    fn subsets_outside_components_are_reported() {
        let mut doc = Document::new();
        component(&mut doc, "/rock");
        doc.define_prim(&path("/rock/mesh"), types::MESH).unwrap();
        doc.define_prim(&path("/rock/mesh/rock_a"), types::GEOM_SUBSET).unwrap();
        doc.define_prim(&path("/props"), types::XFORM).unwrap();
        doc.define_prim(&path("/props/mesh"), types::MESH).unwrap();
        doc.define_prim(&path("/props/mesh/pebble"), types::GEOM_SUBSET).unwrap();
        let (mut stage, _) = open(doc);
        let textures = tempfile::tempdir().unwrap();
        fs::write(textures.path().join("rock_a_basecolor.png"), b"").unwrap();
        fs::write(textures.path().join("pebble_basecolor.png"), b"").unwrap();

        let report = assign_materials(&mut stage, textures.path(), &BindConfig::default()).unwrap();
        assert_eq!(report.materials.len(), 1);
        assert_eq!(report.unmatched().count(), 0);
        assert_eq!(report.unbound, ["/props/mesh/pebble"]);
        assert!(!report.is_complete());
        assert!(bound_material(&stage, &path("/props/mesh/pebble")).is_none());
    }
}
