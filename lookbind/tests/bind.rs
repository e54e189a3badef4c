use lookbind::{
    bind::{assign_materials, BindMode, MATERIAL_BIND_FAMILY, SURFACE_SHADER},
    config::{BindConfig, LibraryProfile},
    library::{collect_assets, TextureSource},
    model::{metadata, types, Atom, Document, DocumentFile, MemoryBackend, Path, Value, ValueType},
    stage::{bound_material, Stage},
};
use std::{fs, path::PathBuf};

/// Shows the matching logs of the engine in test output (`RUST_LOG=debug`).
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn path(s: &str) -> Path {
    Path::parse(s).unwrap()
}

/// A component with one mesh split in two subsets.
fn rock_document() -> Document {
    let mut doc = Document::new();
    doc.define_prim(&path("/rock"), types::XFORM).unwrap();
    doc.set_metadata(&path("/rock"), metadata::KIND, Atom::from(metadata::KIND_COMPONENT))
        .unwrap();
    doc.define_prim(&path("/rock/geo"), types::XFORM).unwrap();
    doc.define_prim(&path("/rock/geo/mesh"), types::MESH).unwrap();
    for (name, indices) in [("rock_a", vec![0, 1]), ("rock_b", vec![2, 3])] {
        let subset = path("/rock/geo/mesh").join(name);
        doc.define_prim(&subset, types::GEOM_SUBSET).unwrap();
        let attr = doc.create_attribute(&subset, "indices", ValueType::IntArray).unwrap();
        doc.set_value(&attr, Value::from(indices)).unwrap();
        doc.create_attribute(&subset, "familyName", ValueType::Token).unwrap();
    }
    doc
}

fn texture_folder(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        fs::write(dir.path().join(file), b"").unwrap();
    }
    dir
}

fn base_color_texture(stage: &dyn Stage, material: &Path) -> Option<PathBuf> {
    let input = stage.attribute(
        &material
            .join(SURFACE_SHADER)
            .join_property("inputs:base_color"),
    )?;
    let source = input.connection.as_ref()?;
    let node = stage.prim(&source.prim_path())?;
    node.attribute_value("inputs:file")?.as_asset().map(|p| p.to_path_buf())
}

#[test]
fn two_subsets_two_materials() {
    init_logging();
    let textures = texture_folder(&["rock_a_basecolor.png", "rock_b_basecolor.png"]);
    let backend = MemoryBackend::new(rock_document().display_xml().to_string());
    let mut stage = DocumentFile::open(Box::new(backend.clone())).unwrap();

    let report = assign_materials(&mut stage, textures.path(), &BindConfig::default()).unwrap();
    assert_eq!(report.mode, BindMode::Subsets);
    assert_eq!(report.materials.len(), 2);
    assert_eq!(report.unmatched().count(), 0);
    assert_eq!(backend.store_count(), 1);

    for name in ["rock_a", "rock_b"] {
        let material = path("/rock/materials").join(name);
        assert_eq!(
            base_color_texture(&stage, &material),
            Some(textures.path().join(format!("{}_basecolor.png", name)))
        );
        let subset = path("/rock/geo/mesh").join(name);
        assert_eq!(bound_material(&stage, &subset), Some(material));
    }
}

#[test]
fn round_trip_through_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("rock.scene");
    fs::write(&document, rock_document().display_xml().to_string()).unwrap();
    let textures = texture_folder(&["rock_a_basecolor.png", "rock_a_normal.png", "rock_b_specular.png"]);

    let mut config = BindConfig::default();
    config.graph.preview_surface = true;
    let mut stage = DocumentFile::open_path(&document).unwrap();
    assign_materials(&mut stage, textures.path(), &config).unwrap();
    assert!(!stage.has_unsaved_changes());

    let reopened = DocumentFile::open_path(&document).unwrap();
    let before: Vec<String> = stage.traverse().iter().map(|p| p.path.to_string()).collect();
    let after: Vec<String> = reopened.traverse().iter().map(|p| p.path.to_string()).collect();
    assert_eq!(before, after);

    for (old, new) in stage.traverse().into_iter().zip(reopened.traverse()) {
        assert_eq!(old.type_name, new.type_name);
        assert_eq!(old.specifier, new.specifier);
        assert_eq!(old.metadata, new.metadata);
        let old_attrs: Vec<_> = old.attributes.values().map(|a| (a.path.clone(), a.ty, a.value.clone(), a.connection.clone())).collect();
        let new_attrs: Vec<_> = new.attributes.values().map(|a| (a.path.clone(), a.ty, a.value.clone(), a.connection.clone())).collect();
        assert_eq!(old_attrs, new_attrs, "attributes of `{}`", old.path);
    }

    assert_eq!(
        base_color_texture(&reopened, &path("/rock/materials/rock_a")),
        Some(textures.path().join("rock_a_basecolor.png"))
    );
    assert_eq!(
        reopened
            .prim(&path("/rock/geo/mesh/rock_b"))
            .unwrap()
            .attribute_value("familyName"),
        Some(&Value::Token(Atom::from(MATERIAL_BIND_FAMILY)))
    );
}

#[test]
fn library_batch() {
    init_logging();
    let lib = tempfile::tempdir().unwrap();
    let asset = lib.path().join("rock_01");
    fs::create_dir_all(asset.join("usd")).unwrap();
    fs::write(asset.join("usd/rock_01.scene"), rock_document().display_xml().to_string()).unwrap();
    for file in ["rock_a_basecolor.jpg", "rock_a_displacement.exr", "rock_b_basecolor.jpg"] {
        fs::write(asset.join(file), b"").unwrap();
    }

    let profile = LibraryProfile::Megascans;
    let config = profile.default_config();
    let assets = collect_assets(lib.path(), &TextureSource::Profile(profile), &config.document_extension).unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].textures, asset);

    let mut stage = DocumentFile::open_path(&assets[0].document).unwrap();
    let report = assign_materials(&mut stage, &assets[0].textures, &config).unwrap();
    let rock_a = &report.materials[0];
    assert_eq!(rock_a.material, "/rock/materials/rock_a");
    assert_eq!(rock_a.textures["displacement"], asset.join("rock_a_displacement.exr"));
    assert!(!report.materials[1].textures.contains_key("displacement"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["mode"], "subsets");
    assert_eq!(json["materials"][1]["bound_to"][0], "/rock/geo/mesh/rock_b");
}
