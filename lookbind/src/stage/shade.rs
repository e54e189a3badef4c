use crate::{
    model::{metadata, types, Atom, Error, Path, Value, ValueType},
    stage::Stage,
};

/// Name of the token attribute holding the shader implementation identifier.
pub const INFO_ID: &str = "info:id";
/// Name of the relationship binding a material to geometry.
pub const MATERIAL_BINDING: &str = "material:binding";

const INPUTS_PREFIX: &str = "inputs:";
const OUTPUTS_PREFIX: &str = "outputs:";
const MATERIAL_BINDING_API: &str = "MaterialBindingAPI";

////////////////////////////////////////////////////////////////////////////////////////////////////
// Inputs & outputs
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A shader or material input (`inputs:<name>` attribute).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Input {
    path: Path,
}

impl Input {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the input without the `inputs:` namespace.
    pub fn base_name(&self) -> String {
        let name = self.path.name();
        name.strip_prefix(INPUTS_PREFIX).unwrap_or(&*name).to_string()
    }

    pub fn set<S: Stage + ?Sized>(&self, stage: &mut S, value: impl Into<Value>) -> Result<(), Error> {
        stage.set_value(&self.path, value.into())
    }

    /// Connects this input to `source`. Replaces any previous connection.
    pub fn connect_to_source<S: Stage + ?Sized>(&self, stage: &mut S, source: &Output) -> Result<(), Error> {
        stage.connect(&self.path, &source.path)
    }

    pub fn disconnect<S: Stage + ?Sized>(&self, stage: &mut S) -> Result<(), Error> {
        stage.disconnect(&self.path)
    }

    /// Returns the output this input is connected to.
    pub fn source<S: Stage + ?Sized>(&self, stage: &S) -> Option<Output> {
        stage
            .attribute(&self.path)
            .and_then(|attr| attr.connection.clone())
            .map(|path| Output { path })
    }
}

/// A shader or material output (`outputs:<name>` attribute).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Output {
    path: Path,
}

impl Output {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connects this output to `source` (material outputs forward shader outputs).
    pub fn connect_to_source<S: Stage + ?Sized>(&self, stage: &mut S, source: &Output) -> Result<(), Error> {
        stage.connect(&self.path, &source.path)
    }

    pub fn source<S: Stage + ?Sized>(&self, stage: &S) -> Option<Output> {
        stage
            .attribute(&self.path)
            .and_then(|attr| attr.connection.clone())
            .map(|path| Output { path })
    }
}

fn create_input<S: Stage + ?Sized>(stage: &mut S, prim: &Path, name: &str, ty: ValueType) -> Result<Input, Error> {
    let path = stage.create_attribute(prim, &format!("{}{}", INPUTS_PREFIX, name), ty)?;
    Ok(Input { path })
}

fn create_output<S: Stage + ?Sized>(stage: &mut S, prim: &Path, name: &str, ty: ValueType) -> Result<Output, Error> {
    let path = stage.create_attribute(prim, &format!("{}{}", OUTPUTS_PREFIX, name), ty)?;
    Ok(Output { path })
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Shader
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Handle to a `Shader` prim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shader {
    path: Path,
}

impl Shader {
    /// Defines (or reuses) a shader prim at `path`.
    pub fn define<S: Stage + ?Sized>(stage: &mut S, path: &Path) -> Result<Shader, Error> {
        stage.define_prim(path, types::SHADER)?;
        Ok(Shader { path: path.clone() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets the shader implementation identifier.
    pub fn set_id<S: Stage + ?Sized>(&self, stage: &mut S, id: &str) -> Result<(), Error> {
        let attr = stage.create_attribute(&self.path, INFO_ID, ValueType::Token)?;
        stage.set_value(&attr, Value::Token(id.into()))
    }

    pub fn id<S: Stage + ?Sized>(&self, stage: &S) -> Option<Atom> {
        stage
            .prim(&self.path)
            .and_then(|prim| prim.attribute_value(INFO_ID))
            .and_then(|value| value.as_token().cloned())
    }

    pub fn create_input<S: Stage + ?Sized>(&self, stage: &mut S, name: &str, ty: ValueType) -> Result<Input, Error> {
        create_input(stage, &self.path, name, ty)
    }

    pub fn create_output<S: Stage + ?Sized>(&self, stage: &mut S, name: &str, ty: ValueType) -> Result<Output, Error> {
        create_output(stage, &self.path, name, ty)
    }

    /// Handle to the input `name`. The input may not exist.
    pub fn input(&self, name: &str) -> Input {
        Input {
            path: self.path.join_property(format!("{}{}", INPUTS_PREFIX, name)),
        }
    }

    /// Returns all the inputs authored on this shader.
    pub fn inputs<S: Stage + ?Sized>(&self, stage: &S) -> Vec<Input> {
        stage
            .prim(&self.path)
            .map(|prim| {
                prim.attributes
                    .values()
                    .filter(|attr| attr.name().starts_with(INPUTS_PREFIX))
                    .map(|attr| Input { path: attr.path.clone() })
                    .collect()
            })
            .unwrap_or_default()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Material
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Handle to a `Material` prim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Material {
    path: Path,
}

impl Material {
    /// Defines (or reuses) a material prim at `path`.
    pub fn define<S: Stage + ?Sized>(stage: &mut S, path: &Path) -> Result<Material, Error> {
        stage.define_prim(path, types::MATERIAL)?;
        Ok(Material { path: path.clone() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates a terminal output, e.g. `mtlx:surface`.
    pub fn create_output<S: Stage + ?Sized>(&self, stage: &mut S, name: &str) -> Result<Output, Error> {
        create_output(stage, &self.path, name, ValueType::Token)
    }

    /// Creates the universal render context `surface` output.
    pub fn create_surface_output<S: Stage + ?Sized>(&self, stage: &mut S) -> Result<Output, Error> {
        self.create_output(stage, "surface")
    }

    /// Handle to the output `name`. The output may not exist.
    pub fn output(&self, name: &str) -> Output {
        Output {
            path: self.path.join_property(format!("{}{}", OUTPUTS_PREFIX, name)),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Binding
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Adds `schema` to a comma-separated list of applied API schemas.
fn append_schema(existing: Option<Atom>, schema: &str) -> Atom {
    match existing {
        Some(list) if list.split(',').any(|s| s.trim() == schema) => list,
        Some(list) if !list.trim().is_empty() => Atom::from(format!("{}, {}", list, schema)),
        _ => Atom::from(schema),
    }
}

/// Binds `material` to the geometry prim at `prim`.
///
/// The binding is a single relationship: binding again replaces the previous target.
/// API schemas already applied to the prim are kept.
pub fn bind_material<S: Stage + ?Sized>(stage: &mut S, prim: &Path, material: &Material) -> Result<(), Error> {
    let existing = stage
        .prim(prim)
        .ok_or_else(|| Error::NoObjectAtPath(prim.clone()))?
        .find_metadata(metadata::API_SCHEMAS);
    let schemas = append_schema(existing, MATERIAL_BINDING_API);
    stage.set_metadata(prim, metadata::API_SCHEMAS, schemas)?;
    let rel = stage.create_attribute(prim, MATERIAL_BINDING, ValueType::Relationship)?;
    stage.set_value(&rel, Value::Rel(material.path.clone()))
}

/// Returns the path of the material bound to `prim`, if any.
pub fn bound_material<S: Stage + ?Sized>(stage: &S, prim: &Path) -> Option<Path> {
    stage
        .prim(prim)
        .and_then(|prim| prim.attribute_value(MATERIAL_BINDING))
        .and_then(|value| value.as_rel().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentFile, MemoryBackend};

    fn stage() -> DocumentFile {
        DocumentFile::create(Box::new(MemoryBackend::default()))
    }

    #[test]
    fn shader_inputs_and_connections() {
        let mut stage = stage();
        let mat = Material::define(&mut stage, &Path::parse("/mat").unwrap()).unwrap();
        let shader = Shader::define(&mut stage, &mat.path().join("surface")).unwrap();
        shader.set_id(&mut stage, "ND_standard_surface_surfaceshader").unwrap();
        let base = shader.create_input(&mut stage, "base", ValueType::Float).unwrap();
        base.set(&mut stage, 1.0f32).unwrap();
        let out = shader.create_output(&mut stage, "out", ValueType::Token).unwrap();
        let surface = mat.create_surface_output(&mut stage).unwrap();
        surface.connect_to_source(&mut stage, &out).unwrap();

        assert_eq!(shader.id(&stage).unwrap(), "ND_standard_surface_surfaceshader");
        assert_eq!(shader.inputs(&stage), vec![base.clone()]);
        assert_eq!(base.base_name(), "base");
        assert_eq!(shader.input("base"), base);
        assert_eq!(mat.output("surface").source(&stage), Some(out));
    }

    #[test]
    fn rebinding_replaces_target() {
        let mut stage = stage();
        let mesh = Path::parse("/mesh").unwrap();
        stage.define_prim(&mesh, types::MESH).unwrap();
        let a = Material::define(&mut stage, &Path::parse("/a").unwrap()).unwrap();
        let b = Material::define(&mut stage, &Path::parse("/b").unwrap()).unwrap();
        bind_material(&mut stage, &mesh, &a).unwrap();
        bind_material(&mut stage, &mesh, &b).unwrap();
        assert_eq!(bound_material(&stage, &mesh), Some(b.path().clone()));
        let prim = stage.prim(&mesh).unwrap();
        assert_eq!(prim.attributes.len(), 1);
        assert_eq!(
            prim.find_metadata(metadata::API_SCHEMAS),
            Some(Atom::from("MaterialBindingAPI"))
        );
    }

    #[test]
    fn binding_keeps_applied_schemas() {
        let mut stage = stage();
        let mesh = Path::parse("/mesh").unwrap();
        stage.define_prim(&mesh, types::MESH).unwrap();
        stage
            .set_metadata(&mesh, metadata::API_SCHEMAS, Atom::from("SkelBindingAPI"))
            .unwrap();
        let a = Material::define(&mut stage, &Path::parse("/a").unwrap()).unwrap();
        bind_material(&mut stage, &mesh, &a).unwrap();
        bind_material(&mut stage, &mesh, &a).unwrap();
        assert_eq!(
            stage.prim(&mesh).unwrap().find_metadata(metadata::API_SCHEMAS),
            Some(Atom::from("SkelBindingAPI, MaterialBindingAPI"))
        );
        assert!(bind_material(&mut stage, &Path::parse("/missing").unwrap(), &a).is_err());
    }
}
