//! Texture lookup by fuzzy file-name matching.
use crate::bind::normalize;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Texture file found for each shader slot (e.g. `base_color` → `.../rock_basecolor.png`).
pub type TextureMap = BTreeMap<String, PathBuf>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("texture folder `{0}` does not exist or is not a directory")]
    FolderNotFound(PathBuf),
    #[error("could not list texture folder `{path}`")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ambiguous textures for slot `{slot}` of `{namespace}`: {candidates:?}")]
    Ambiguous {
        namespace: String,
        slot: String,
        candidates: Vec<PathBuf>,
    },
    #[error("no texture for required slot `{slot}` of `{namespace}`")]
    MissingSlot { namespace: String, slot: String },
}

/// What to do when more than one file matches a slot.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Keep the last candidate in file name order, and report the others.
    #[default]
    LastMatch,
    /// Fail the resolution.
    Strict,
}

/// Matching rules for the texture resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Slot name → keyword that must appear in the file name.
    pub slots: BTreeMap<String, String>,
    /// Slots that must resolve to a texture.
    pub required: Vec<String>,
    /// Number of leading characters dropped from the normalized namespace before matching.
    pub namespace_prefix_strip: usize,
    pub ambiguity: AmbiguityPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            slots: default_slots(),
            required: vec![],
            namespace_prefix_strip: 0,
            ambiguity: AmbiguityPolicy::LastMatch,
        }
    }
}

/// The basic slot table: `base_color`, `specular` and `normal`.
pub fn default_slots() -> BTreeMap<String, String> {
    [("base_color", "basecolor"), ("specular", "specular"), ("normal", "normal")]
        .into_iter()
        .map(|(slot, keyword)| (slot.to_string(), keyword.to_string()))
        .collect()
}

/// Outcome of resolving a namespace against a texture folder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub textures: TextureMap,
    /// Slots that matched more than one file, with every candidate in file name order.
    pub ambiguous: BTreeMap<String, Vec<PathBuf>>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct TextureResolver {
    config: ResolverConfig,
}

impl TextureResolver {
    pub fn new(config: ResolverConfig) -> TextureResolver {
        TextureResolver { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Normalized namespace used for matching, after the configured prefix is dropped.
    pub fn namespace_key(&self, namespace: &str) -> String {
        normalize(namespace)
            .chars()
            .skip(self.config.namespace_prefix_strip)
            .collect()
    }

    /// Finds the textures of `namespace` in `folder`.
    ///
    /// A file matches a slot if its normalized stem contains both the slot keyword and the
    /// namespace key. Only regular files directly inside `folder` are considered.
    pub fn resolve(&self, namespace: &str, folder: &Path) -> Result<Resolution, ResolveError> {
        if !folder.is_dir() {
            return Err(ResolveError::FolderNotFound(folder.to_path_buf()));
        }

        let read_dir_error = |source| ResolveError::ReadDir {
            path: folder.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(folder).map_err(read_dir_error)? {
            let path = entry.map_err(read_dir_error)?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let key = self.namespace_key(namespace);
        let keywords: Vec<(&String, String)> = self
            .config
            .slots
            .iter()
            .map(|(slot, keyword)| (slot, normalize(keyword)))
            .collect();

        let mut candidates: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for file in files {
            let stem = match file.file_stem() {
                Some(stem) => normalize(&stem.to_string_lossy()),
                None => continue,
            };
            if !stem.contains(&key) {
                continue;
            }
            for (slot, keyword) in keywords.iter() {
                if stem.contains(keyword.as_str()) {
                    trace!("`{}` matches slot `{}` of `{}`", file.display(), slot, namespace);
                    candidates.entry(slot.to_string()).or_default().push(file.clone());
                }
            }
        }

        let mut resolution = Resolution::default();
        for (slot, files) in candidates {
            if files.len() > 1 {
                warn!(
                    "{} textures match slot `{}` of `{}`: {:?}",
                    files.len(),
                    slot,
                    namespace,
                    files
                );
                if self.config.ambiguity == AmbiguityPolicy::Strict {
                    return Err(ResolveError::Ambiguous {
                        namespace: namespace.to_string(),
                        slot,
                        candidates: files,
                    });
                }
                resolution.ambiguous.insert(slot.clone(), files.clone());
            }
            if let Some(last) = files.last() {
                debug!("slot `{}` of `{}` → `{}`", slot, namespace, last.display());
                resolution.textures.insert(slot, last.clone());
            }
        }

        for slot in self.config.required.iter() {
            if !resolution.textures.contains_key(slot) {
                return Err(ResolveError::MissingSlot {
                    namespace: namespace.to_string(),
                    slot: slot.clone(),
                });
            }
        }

        Ok(resolution)
    }
}

/// Resolves `namespace` in `folder` with the given slot table and default rules.
pub fn resolve(namespace: &str, folder: &Path, slots: &BTreeMap<String, String>) -> Result<TextureMap, ResolveError> {
    let resolver = TextureResolver::new(ResolverConfig {
        slots: slots.clone(),
        ..Default::default()
    });
    Ok(resolver.resolve(namespace, folder)?.textures)
}
