// macro support
#[macro_use]
extern crate tracing;

use serde_json as json;

pub mod bind;
pub mod config;
mod error;
pub mod library;
pub mod model;
pub mod stage;

pub use error::{Error, ErrorContextExt, PathProblem};
