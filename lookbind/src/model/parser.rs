//! XML reader and writer for scene documents.
//!
//! ```xml
//! <document>
//!   <prim name="asset" type="Xform" spec="def" kind="component">
//!     <prim name="materials" type="Scope" spec="def">
//!       <prim name="wood" type="Material" spec="def">
//!         <token name="outputs:surface" connect="/asset/materials/wood/mtlxstandard_surface.outputs:out"/>
//!       </prim>
//!     </prim>
//!   </prim>
//! </document>
//! ```
//!
//! Attributes are elements named after their value type, with the value in the `value` XML
//! attribute (absent for attributes without a value) and an optional `connect` source path.
use crate::model::{is_valid_property_name, metadata, Atom, Attribute, Document, Path, Prim, Specifier, Value, ValueType};
use std::{
    fmt,
    num::{ParseFloatError, ParseIntError},
    str::{FromStr, ParseBoolError},
};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////////////////////////
// Error
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("XML parse error: {0}")]
    ParseError(#[from] roxmltree::Error),
    #[error("no <document> element found")]
    MissingDocumentElement,
    #[error("more than one <document> element found")]
    TooManyDocuments,
    #[error("missing `{attribute}` attribute on <{element}>")]
    MissingAttribute { element: String, attribute: &'static str },
    #[error("invalid name or path: `{0}`")]
    InvalidPath(String),
    #[error("integer parse error")]
    ParseIntError(#[from] ParseIntError),
    #[error("float parse error")]
    ParseFloatError(#[from] ParseFloatError),
    #[error("boolean error")]
    ParseBoolError(#[from] ParseBoolError),
    #[error("invalid value format")]
    InvalidValueFormat,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Text value parsers
////////////////////////////////////////////////////////////////////////////////////////////////////

fn parse_array<T: FromStr>(text: &str) -> Result<Vec<T>, ReadError>
where
    ReadError: From<<T as FromStr>::Err>,
{
    let mut result = Vec::new();
    if text.trim().is_empty() {
        return Ok(result);
    }
    for elem in text.split(',') {
        result.push(elem.trim().parse::<T>()?);
    }
    Ok(result)
}

/// Parsing functions for vector value representations.
///
/// Vectors are represented as n comma-separated values, possibly with whitespace between the values,
/// where n is exactly the number of vector components (e.g. "0.0, 1.0, 0.0" for a float3).
macro_rules! impl_parse_vector {
    ($vec_ty:ty, $elem_ty:ty, $len:literal, $parse_fn:ident) => {
        fn $parse_fn(text: &str) -> Result<$vec_ty, ReadError> {
            let mut out = <$vec_ty>::default();
            let mut n_comp = 0;
            for comp in text.split(',') {
                if n_comp >= $len {
                    return Err(ReadError::InvalidValueFormat);
                }
                out[n_comp] = comp.trim().parse::<$elem_ty>()?;
                n_comp += 1;
            }
            if n_comp != $len {
                return Err(ReadError::InvalidValueFormat);
            }
            Ok(out)
        }
    };
}

impl_parse_vector!(glam::Vec3, f32, 3, parse_vec3);

fn parse_value(ty: ValueType, text: &str) -> Result<Value, ReadError> {
    Ok(match ty {
        ValueType::Bool => Value::Bool(text.trim().parse()?),
        ValueType::Int => Value::Int(text.trim().parse()?),
        ValueType::Float => Value::Float(text.trim().parse()?),
        ValueType::Float3 => Value::Float3(parse_vec3(text)?),
        ValueType::String => Value::String(text.into()),
        ValueType::Token => Value::Token(text.into()),
        ValueType::Asset => Value::Asset(text.into()),
        ValueType::IntArray => Value::IntArray(parse_array::<i32>(text)?.into()),
        ValueType::Relationship => {
            Value::Rel(Path::parse(text).map_err(|_| ReadError::InvalidPath(text.to_string()))?)
        }
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Prims
////////////////////////////////////////////////////////////////////////////////////////////////////

fn property_path(prim_path: &Path, name: &str) -> Result<Path, ReadError> {
    if !is_valid_property_name(name) {
        return Err(ReadError::InvalidPath(format!("{}.{}", prim_path, name)));
    }
    Ok(prim_path.join_property(name))
}

fn read_attribute(prim_path: &Path, ty: ValueType, xml_node: roxmltree::Node) -> Result<Attribute, ReadError> {
    let mut name = None;
    let mut value = None;
    let mut connection = None;

    for attr in xml_node.attributes() {
        match attr.name() {
            "name" => name = Some(attr.value()),
            "value" => value = Some(parse_value(ty, attr.value())?),
            "connect" => {
                connection = Some(Path::parse(attr.value()).map_err(|_| ReadError::InvalidPath(attr.value().to_string()))?)
            }
            _ => {
                warn!("unrecognized attribute: {}=\"{}\"", attr.name(), attr.value());
            }
        }
    }

    let name = name.ok_or_else(|| ReadError::MissingAttribute {
        element: ty.to_string(),
        attribute: "name",
    })?;
    let path = property_path(prim_path, name)?;
    Ok(Attribute {
        path,
        ty,
        value,
        connection,
    })
}

impl Prim {
    fn read(parent_path: &Path, xml_node: roxmltree::Node) -> Result<Prim, ReadError> {
        let mut name = None;
        let mut type_name = Atom::default();
        let mut specifier = Specifier::Def;
        let mut metadata = Vec::new();

        for attr in xml_node.attributes() {
            match attr.name() {
                "name" => name = Some(attr.value()),
                "type" => type_name = attr.value().into(),
                "spec" => {
                    specifier = match attr.value() {
                        "def" => Specifier::Def,
                        "over" => Specifier::Over,
                        other => {
                            error!("invalid specifier: `{}`", other);
                            return Err(ReadError::InvalidValueFormat);
                        }
                    }
                }
                key @ ("kind" | "apiSchemas") => {
                    metadata.push((Atom::from(key), Value::Token(attr.value().into())));
                }
                _ => {
                    warn!("unrecognized prim attribute: {}=\"{}\"", attr.name(), attr.value());
                }
            }
        }

        let name = name.ok_or_else(|| ReadError::MissingAttribute {
            element: "prim".to_string(),
            attribute: "name",
        })?;
        let path = parent_path
            .try_join(name)
            .map_err(|_| ReadError::InvalidPath(format!("{}/{}", parent_path, name)))?;
        let mut prim = Prim::new(path.clone(), type_name, specifier);
        for (key, value) in metadata {
            prim.metadata.insert(key, value);
        }

        for n in xml_node.children() {
            if !n.is_element() {
                continue;
            }
            match n.tag_name().name() {
                "prim" => {
                    let child = Prim::read(&path, n)?;
                    prim.add_child(child);
                }
                ty_name => match ty_name.parse::<ValueType>() {
                    Ok(ty) => {
                        let attr = read_attribute(&path, ty, n)?;
                        prim.attributes.insert(attr.name(), attr);
                    }
                    Err(()) => {
                        warn!("unknown value type: `<{ty_name}>`");
                    }
                },
            }
        }

        Ok(prim)
    }
}

impl Document {
    /// Reads a document from its XML representation.
    pub fn from_xml(xml: &str) -> Result<Document, ReadError> {
        let xml = roxmltree::Document::parse(xml)?;
        let mut seen_document = false;
        let mut document = Document::new();

        for child in xml.root().children() {
            if !child.is_element() {
                continue;
            }
            match child.tag_name().name() {
                "document" => {
                    if seen_document {
                        return Err(ReadError::TooManyDocuments);
                    }
                    seen_document = true;

                    for node in child.children() {
                        if !node.is_element() {
                            continue;
                        }
                        match node.tag_name().name() {
                            "prim" => {
                                let prim = Prim::read(&Path::root(), node)?;
                                document.root.add_child(prim);
                            }
                            other => {
                                warn!("unknown element tag: `<{}>`", other)
                            }
                        }
                    }
                }
                other => {
                    warn!("unknown element: `<{}>`", other)
                }
            }
        }

        if !seen_document {
            return Err(ReadError::MissingDocumentElement);
        }

        Ok(document)
    }

    /// Returns an object that formats the document as XML.
    pub fn display_xml(&self) -> impl fmt::Display + '_ {
        DocumentDisplayXml(self)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Writer
////////////////////////////////////////////////////////////////////////////////////////////////////

struct Escaped<'a>(&'a str);

impl<'a> fmt::Display for Escaped<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                // attribute value normalization would turn these into spaces
                '\t' => f.write_str("&#9;")?,
                '\n' => f.write_str("&#10;")?,
                '\r' => f.write_str("&#13;")?,
                c => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}

struct ValueDisplay<'a>(&'a Value);

impl<'a> fmt::Display for ValueDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Float3(v) => write!(f, "{}, {}, {}", v.x, v.y, v.z),
            Value::String(v) => write!(f, "{}", Escaped(v)),
            Value::Token(v) => write!(f, "{}", Escaped(v)),
            Value::Asset(v) => write!(f, "{}", Escaped(&v.to_string_lossy())),
            Value::IntArray(v) => {
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                Ok(())
            }
            Value::Rel(v) => write!(f, "{}", v),
        }
    }
}

struct DocumentDisplayXml<'a>(&'a Document);

fn write_prim(f: &mut fmt::Formatter, prim: &Prim, indent: usize) -> fmt::Result {
    write!(
        f,
        "{:indent$}<prim name=\"{}\" type=\"{}\" spec=\"{}\"",
        "",
        prim.name(),
        Escaped(&prim.type_name),
        prim.specifier,
        indent = indent
    )?;
    for key in [metadata::KIND.name, metadata::API_SCHEMAS.name] {
        if let Some(Value::Token(token)) = prim.metadata.get(&Atom::from(key)) {
            write!(f, " {}=\"{}\"", key, Escaped(token))?;
        }
    }
    writeln!(f, ">")?;

    let inner = indent + 2;
    for attr in prim.attributes.values() {
        write!(f, "{:inner$}<{} name=\"{}\"", "", attr.ty, attr.name(), inner = inner)?;
        if let Some(ref value) = attr.value {
            write!(f, " value=\"{}\"", ValueDisplay(value))?;
        }
        if let Some(ref connection) = attr.connection {
            write!(f, " connect=\"{}\"", connection)?;
        }
        writeln!(f, "/>")?;
    }
    for child in prim.children.values() {
        write_prim(f, child, inner)?;
    }
    writeln!(f, "{:indent$}</prim>", "", indent = indent)
}

impl<'a> fmt::Display for DocumentDisplayXml<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(f, "<document>")?;
        for prim in self.0.root.children.values() {
            write_prim(f, prim, 2)?;
        }
        writeln!(f, "</document>")
    }
}
