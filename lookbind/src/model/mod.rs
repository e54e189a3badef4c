//! Scene document data model
mod atom;
mod attribute;
mod document;
mod error;
mod file;
pub mod metadata;
mod node;
mod parser;
mod path;
mod typedesc;
mod value;

pub use atom::Atom;
pub use attribute::Attribute;
pub use document::Document;
pub use error::Error;
pub use file::{DocumentBackend, DocumentFile, MemoryBackend, XmlFileBackend};
pub use metadata::Metadata;
pub use node::{types, Prim, Specifier};
pub use parser::ReadError;
pub use path::{is_valid_prim_name, is_valid_property_name, Path};
pub use typedesc::ValueType;
pub use value::{FromValue, Value};
