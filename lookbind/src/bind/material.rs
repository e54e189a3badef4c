//! Material shading network generation.
//!
//! Each material gets a MaterialX standard surface, a displacement shader and one texture node
//! per resolved slot:
//!
//! ```text
//! /asset/materials/rock                   Material
//!     outputs:mtlx:surface       ──► mtlxstandard_surface.outputs:out
//!     outputs:surface            ──► mtlxstandard_surface.outputs:out
//!     outputs:mtlx:displacement  ──► mtlxdisplacement.outputs:out
//!   mtlxstandard_surface                  Shader  ND_standard_surface_surfaceshader
//!     inputs:base_color          ──► mtlx_base_color.outputs:rgb
//!   mtlxdisplacement                      Shader  ND_displacement_float
//!     inputs:displacement        ──► mtlx_displacement.outputs:rgb
//!   mtlx_base_color                       Shader  ND_UsdUVTexture
//!   mtlx_displacement                     Shader  ND_UsdUVTexture
//! ```
use crate::{
    bind::TextureMap,
    model::{Error, Path, Value, ValueType},
    stage::{Material, Shader, Stage},
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SURFACE_SHADER: &str = "mtlxstandard_surface";
pub const SURFACE_SHADER_ID: &str = "ND_standard_surface_surfaceshader";
pub const DISPLACEMENT_SHADER: &str = "mtlxdisplacement";
pub const DISPLACEMENT_SHADER_ID: &str = "ND_displacement_float";
pub const TEXTURE_SHADER_PREFIX: &str = "mtlx_";
pub const TEXTURE_SHADER_ID: &str = "ND_UsdUVTexture";
pub const PREVIEW_SHADER: &str = "preview_surface";
pub const PREVIEW_SHADER_ID: &str = "UsdPreviewSurface";

/// Slot routed to the displacement shader instead of the surface shader.
pub const DISPLACEMENT_SLOT: &str = "displacement";

/// Default shader parameter value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParamDefault {
    Float(f32),
    Color([f32; 3]),
}

impl ParamDefault {
    pub fn ty(&self) -> ValueType {
        match self {
            ParamDefault::Float(_) => ValueType::Float,
            ParamDefault::Color(_) => ValueType::Float3,
        }
    }

    pub fn value(&self) -> Value {
        match *self {
            ParamDefault::Float(v) => Value::Float(v),
            ParamDefault::Color(c) => Value::Float3(Vec3::from(c)),
        }
    }
}

/// Starting look of every generated material: a neutral dielectric.
pub const STANDARD_SURFACE_DEFAULTS: [(&str, ParamDefault); 11] = [
    ("base", ParamDefault::Float(1.0)),
    ("coat", ParamDefault::Float(0.0)),
    ("coat_roughness", ParamDefault::Float(0.1)),
    ("emission", ParamDefault::Float(0.0)),
    ("emission_color", ParamDefault::Color([1.0, 1.0, 1.0])),
    ("metalness", ParamDefault::Float(0.0)),
    ("specular", ParamDefault::Float(1.0)),
    ("specular_color", ParamDefault::Color([1.0, 1.0, 1.0])),
    ("specular_IOR", ParamDefault::Float(1.5)),
    ("specular_roughness", ParamDefault::Float(0.2)),
    ("transmission", ParamDefault::Float(0.0)),
];

pub const DISPLACEMENT_DEFAULTS: [(&str, ParamDefault); 1] = [("scale", ParamDefault::Float(0.0001))];

pub const PREVIEW_SURFACE_DEFAULTS: [(&str, ParamDefault); 4] = [
    ("diffuseColor", ParamDefault::Color([0.8, 0.8, 0.8])),
    ("roughness", ParamDefault::Float(0.2)),
    ("metallic", ParamDefault::Float(0.0)),
    ("ior", ParamDefault::Float(1.5)),
];

/// Options of the network generator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Also generate a `UsdPreviewSurface` network on the `preview:surface` output.
    pub preview_surface: bool,
}

/// Handles to the nodes of a generated material.
#[derive(Clone, Debug)]
pub struct MaterialGraph {
    pub material: Material,
    pub surface: Shader,
    pub displacement: Shader,
    /// Texture nodes by slot.
    pub textures: BTreeMap<String, Shader>,
    pub preview: Option<Shader>,
}

/// Defines a shader, sets its id, resets its inputs to `defaults` and drops all its connections.
fn reset_shader<S: Stage + ?Sized>(
    stage: &mut S,
    path: &Path,
    id: &str,
    defaults: &[(&str, ParamDefault)],
) -> Result<Shader, Error> {
    let shader = Shader::define(stage, path)?;
    shader.set_id(stage, id)?;
    for input in shader.inputs(stage) {
        if input.source(stage).is_some() {
            input.disconnect(stage)?;
        }
    }
    for (name, default) in defaults {
        shader.create_input(stage, name, default.ty())?.set(stage, default.value())?;
    }
    Ok(shader)
}

/// Creates or updates the material at `material_path` so that it samples exactly `textures`.
///
/// Rebuilding an existing material keeps the node paths, but the inputs and connections only
/// reflect the last call. Texture nodes of slots absent from `textures` are removed.
pub fn build_material<S: Stage + ?Sized>(
    stage: &mut S,
    material_path: &Path,
    textures: &TextureMap,
    config: &GraphConfig,
) -> Result<MaterialGraph, Error> {
    let material = Material::define(stage, material_path)?;

    let surface = reset_shader(
        stage,
        &material_path.try_join(SURFACE_SHADER)?,
        SURFACE_SHADER_ID,
        &STANDARD_SURFACE_DEFAULTS,
    )?;
    let surface_out = surface.create_output(stage, "out", ValueType::Token)?;

    let displacement = reset_shader(
        stage,
        &material_path.try_join(DISPLACEMENT_SHADER)?,
        DISPLACEMENT_SHADER_ID,
        &DISPLACEMENT_DEFAULTS,
    )?;
    let displacement_out = displacement.create_output(stage, "out", ValueType::Token)?;

    // texture nodes left over from a previous build
    let stale: Vec<Path> = stage
        .prim(material_path)
        .map(|prim| {
            prim.children
                .values()
                .filter(|child| {
                    child
                        .name()
                        .strip_prefix(TEXTURE_SHADER_PREFIX)
                        .map_or(false, |slot| !textures.contains_key(slot))
                })
                .map(|child| child.path.clone())
                .collect()
        })
        .unwrap_or_default();
    for path in stale {
        debug!("removing stale texture node `{}`", path);
        stage.remove_prim(&path)?;
    }

    let mut texture_nodes = BTreeMap::new();
    for (slot, file) in textures {
        let node_path = material_path.try_join(format!("{}{}", TEXTURE_SHADER_PREFIX, slot))?;
        let node = reset_shader(stage, &node_path, TEXTURE_SHADER_ID, &[])?;
        node.create_input(stage, "file", ValueType::Asset)?
            .set(stage, file.clone())?;
        let rgb = node.create_output(stage, "rgb", ValueType::Float3)?;

        let target = if slot == DISPLACEMENT_SLOT { &displacement } else { &surface };
        target
            .create_input(stage, slot, ValueType::Float3)?
            .connect_to_source(stage, &rgb)?;
        info!("{}: {} ← `{}`", material_path, slot, file.display());
        texture_nodes.insert(slot.clone(), node);
    }

    material.create_output(stage, "mtlx:surface")?.connect_to_source(stage, &surface_out)?;
    material
        .create_output(stage, "mtlx:displacement")?
        .connect_to_source(stage, &displacement_out)?;
    material.create_surface_output(stage)?.connect_to_source(stage, &surface_out)?;

    let preview_path = material_path.try_join(PREVIEW_SHADER)?;
    let preview = if config.preview_surface {
        let preview = reset_shader(stage, &preview_path, PREVIEW_SHADER_ID, &PREVIEW_SURFACE_DEFAULTS)?;
        let preview_out = preview.create_output(stage, "surface", ValueType::Token)?;
        material
            .create_output(stage, "preview:surface")?
            .connect_to_source(stage, &preview_out)?;
        Some(preview)
    } else {
        if stage.prim(&preview_path).is_some() {
            stage.remove_prim(&preview_path)?;
            let output = material.output("preview:surface");
            if stage.attribute(output.path()).is_some() {
                stage.disconnect(output.path())?;
            }
        }
        None
    };

    Ok(MaterialGraph {
        material,
        surface,
        displacement,
        textures: texture_nodes,
        preview,
    })
}
