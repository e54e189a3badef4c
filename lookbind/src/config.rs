//! Run configuration.
use crate::{
    bind::{default_slots, GraphConfig, ResolverConfig, DISPLACEMENT_SLOT},
    error::{Error, PathProblem},
    json,
};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, str::FromStr};

/// Default extension of scene document files.
pub const DOCUMENT_EXTENSION: &str = "scene";

/// Known asset library layouts.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum LibraryProfile {
    /// Kitbash3D kits: all textures in a shared `KB3DTextures` folder.
    Kitbash,
    /// Quixel Megascans: every asset folder carries its own textures, including displacement.
    Megascans,
}

impl LibraryProfile {
    pub const ALL: [LibraryProfile; 2] = [LibraryProfile::Kitbash, LibraryProfile::Megascans];

    pub fn name(&self) -> &'static str {
        match self {
            LibraryProfile::Kitbash => "Kitbash",
            LibraryProfile::Megascans => "Megascans",
        }
    }

    /// Binding configuration suited to this library.
    pub fn default_config(&self) -> BindConfig {
        let mut slots = default_slots();
        if *self == LibraryProfile::Megascans {
            slots.insert(DISPLACEMENT_SLOT.to_string(), "displacement".to_string());
        }
        BindConfig {
            resolver: ResolverConfig {
                slots,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl fmt::Display for LibraryProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LibraryProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LibraryProfile::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "unknown library `{}` (expected one of: Kitbash, Megascans)",
                    s
                ))
            })
    }
}

/// Everything the binding engine needs besides the document and the texture folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    pub resolver: ResolverConfig,
    pub graph: GraphConfig,
    /// Extension of the scene documents looked up in an asset library.
    pub document_extension: String,
}

impl Default for BindConfig {
    fn default() -> Self {
        BindConfig {
            resolver: ResolverConfig::default(),
            graph: GraphConfig::default(),
            document_extension: DOCUMENT_EXTENSION.to_string(),
        }
    }
}

impl BindConfig {
    pub fn from_json(text: &str) -> Result<BindConfig, Error> {
        json::from_str(text).map_err(|err| Error::configuration(format!("invalid configuration: {}", err)))
    }

    /// Loads a configuration file. Missing fields take their default value.
    pub fn load(path: &Path) -> Result<BindConfig, Error> {
        if !path.is_file() {
            let problem = if path.exists() {
                PathProblem::NotAFile
            } else {
                PathProblem::NotFound
            };
            return Err(Error::path(path, problem));
        }
        let text = fs::read_to_string(path)?;
        BindConfig::from_json(&text).map_err(|err| err.context(format!("loading `{}`", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::AmbiguityPolicy;

    #[test]
    fn profile_defaults() {
        let kitbash = LibraryProfile::Kitbash.default_config();
        assert_eq!(
            kitbash.resolver.slots.keys().collect::<Vec<_>>(),
            ["base_color", "normal", "specular"]
        );
        assert_eq!(kitbash.resolver.namespace_prefix_strip, 0);
        let megascans = LibraryProfile::Megascans.default_config();
        assert_eq!(megascans.resolver.slots["displacement"], "displacement");
        assert_eq!(megascans.resolver.slots.len(), 4);
    }

    #[test]
    fn parse_profile() {
        assert_eq!("kitbash".parse::<LibraryProfile>().unwrap(), LibraryProfile::Kitbash);
        assert_eq!("MEGASCANS".parse::<LibraryProfile>().unwrap(), LibraryProfile::Megascans);
        assert!(matches!(
            "poliigon".parse::<LibraryProfile>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn partial_json() {
        let config = BindConfig::from_json(
            r#"{ "resolver": { "namespace_prefix_strip": 4, "ambiguity": "strict" }, "graph": { "preview_surface": true } }"#,
        )
        .unwrap();
        assert_eq!(config.resolver.namespace_prefix_strip, 4);
        assert_eq!(config.resolver.ambiguity, AmbiguityPolicy::Strict);
        assert_eq!(config.resolver.slots, default_slots());
        assert!(config.graph.preview_surface);
        assert_eq!(config.document_extension, "scene");

        assert!(matches!(BindConfig::from_json("{ \"resolver\": 3 }"), Err(Error::Configuration(_))));
    }

    #[test]
    fn load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bind.json");
        fs::write(&path, r#"{ "document_extension": "xml" }"#).unwrap();
        assert_eq!(BindConfig::load(&path).unwrap().document_extension, "xml");
        assert!(matches!(
            BindConfig::load(&dir.path().join("missing.json")),
            Err(Error::Path {
                problem: PathProblem::NotFound,
                ..
            })
        ));
        assert!(matches!(
            BindConfig::load(dir.path()),
            Err(Error::Path {
                problem: PathProblem::NotAFile,
                ..
            })
        ));
    }
}
