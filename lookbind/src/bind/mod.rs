//! Texture resolution, material generation and binding.
mod assign;
mod material;
mod normalize;
mod subset;
mod texture;

pub use assign::{assign_materials, AssignReport, BindMode, MaterialReport, MATERIALS_SCOPE, MATERIAL_BIND_FAMILY};
pub use material::{
    build_material, GraphConfig, MaterialGraph, ParamDefault, DISPLACEMENT_DEFAULTS, DISPLACEMENT_SHADER,
    DISPLACEMENT_SHADER_ID, DISPLACEMENT_SLOT, PREVIEW_SHADER, PREVIEW_SHADER_ID, PREVIEW_SURFACE_DEFAULTS,
    STANDARD_SURFACE_DEFAULTS, SURFACE_SHADER, SURFACE_SHADER_ID, TEXTURE_SHADER_ID, TEXTURE_SHADER_PREFIX,
};
pub use normalize::normalize;
pub use subset::{find_subsets, SubsetRef, ELEMENT_TYPE, FAMILY_NAME, INDICES};
pub use texture::{
    default_slots, resolve, AmbiguityPolicy, ResolveError, Resolution, ResolverConfig, TextureMap, TextureResolver,
};
