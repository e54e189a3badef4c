//! Asset library scanning.
//!
//! Finds the scene documents of an asset library and the folder holding the textures of each.
use crate::{
    config::LibraryProfile,
    error::{Error, PathProblem},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Name of the shared texture folder of Kitbash3D kits.
pub const KITBASH_TEXTURES: &str = "KB3DTextures";
/// Subfolder where converted scene documents are written next to their source geometry.
const CONVERTED_SUBFOLDER: &str = "usd";

/// Where to look for the textures of an asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureSource {
    /// Layout of a known library.
    Profile(LibraryProfile),
    /// A single folder for every asset.
    Folder(PathBuf),
    /// The folder of the asset itself.
    Adjacent,
}

impl TextureSource {
    /// Builds the texture source from command-line style options, which are mutually exclusive.
    pub fn from_options(profile: Option<LibraryProfile>, folder: Option<PathBuf>) -> Result<TextureSource, Error> {
        match (profile, folder) {
            (Some(_), Some(_)) => Err(Error::configuration(
                "a library profile and a texture folder cannot be given together",
            )),
            (Some(profile), None) => Ok(TextureSource::Profile(profile)),
            (None, Some(folder)) => Ok(TextureSource::Folder(folder)),
            (None, None) => Ok(TextureSource::Adjacent),
        }
    }
}

/// A scene document and the folder holding its textures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetEntry {
    pub document: PathBuf,
    pub textures: PathBuf,
}

fn check_dir(path: &Path) -> Result<(), Error> {
    if path.is_dir() {
        Ok(())
    } else if path.exists() {
        Err(Error::path(path, PathProblem::NotADirectory))
    } else {
        Err(Error::path(path, PathProblem::NotFound))
    }
}

fn find_documents(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<(), Error> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            find_documents(&path, extension, out)?;
        } else if path
            .extension()
            .map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Parses a resolution folder name like `4k`.
fn resolution(name: &str) -> Option<u32> {
    name.strip_suffix(['k', 'K'])?.parse().ok()
}

/// Texture folder of a Kitbash3D kit: the highest resolution subfolder of `KB3DTextures`, if
/// there is one, or `KB3DTextures` itself.
pub fn kitbash_texture_folder(root: &Path) -> Result<PathBuf, Error> {
    let mut folder = None;
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir()
            && path
                .file_name()
                .map_or(false, |n| n.to_string_lossy().eq_ignore_ascii_case(KITBASH_TEXTURES))
        {
            folder = Some(path);
            break;
        }
    }
    let folder = folder.ok_or_else(|| Error::path(root.join(KITBASH_TEXTURES), PathProblem::NotFound))?;

    let mut best: Option<(u32, PathBuf)> = None;
    for entry in fs::read_dir(&folder)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let res = match path.file_name().and_then(|n| resolution(&n.to_string_lossy())) {
            Some(res) => res,
            None => continue,
        };
        if best.as_ref().map_or(true, |(b, _)| res > *b) {
            best = Some((res, path));
        }
    }
    Ok(best.map(|(_, path)| path).unwrap_or(folder))
}

/// Folder of the asset a document belongs to, skipping the conversion output subfolder.
fn asset_folder(document: &Path) -> PathBuf {
    let parent = document.parent().unwrap_or_else(|| Path::new("."));
    let is_converted = parent
        .file_name()
        .map_or(false, |n| n.to_string_lossy().eq_ignore_ascii_case(CONVERTED_SUBFOLDER));
    match parent.parent() {
        Some(grandparent) if is_converted => grandparent.to_path_buf(),
        _ => parent.to_path_buf(),
    }
}

/// Finds the scene documents under `root` (recursively, sorted by path) with their texture folder.
pub fn collect_assets(root: &Path, source: &TextureSource, extension: &str) -> Result<Vec<AssetEntry>, Error> {
    check_dir(root)?;

    let shared = match source {
        TextureSource::Profile(LibraryProfile::Kitbash) => Some(kitbash_texture_folder(root)?),
        TextureSource::Folder(folder) => {
            check_dir(folder)?;
            Some(folder.clone())
        }
        TextureSource::Profile(LibraryProfile::Megascans) | TextureSource::Adjacent => None,
    };

    let mut documents = Vec::new();
    find_documents(root, extension, &mut documents)?;
    documents.sort();
    debug!("{} documents found under `{}`", documents.len(), root.display());

    Ok(documents
        .into_iter()
        .map(|document| {
            let textures = shared.clone().unwrap_or_else(|| asset_folder(&document));
            AssetEntry { document, textures }
        })
        .collect())
}
