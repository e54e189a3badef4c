use crate::model::{Document, Error};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{
    fs,
    path::{Path as FsPath, PathBuf},
    sync::Arc,
};

/// Storage for serialized scene documents.
pub trait DocumentBackend {
    /// Reads the serialized document.
    fn load(&mut self) -> Result<String>;

    /// Replaces the serialized document.
    fn store(&mut self, contents: &str) -> Result<()>;

    /// Human-readable location of the document, for diagnostics.
    fn location(&self) -> String;
}

/// Document stored in an XML file on disk.
#[derive(Debug)]
pub struct XmlFileBackend {
    path: PathBuf,
}

impl XmlFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> XmlFileBackend {
        XmlFileBackend { path: path.into() }
    }
}

impl DocumentBackend for XmlFileBackend {
    fn load(&mut self) -> Result<String> {
        fs::read_to_string(&self.path).with_context(|| format!("could not read `{}`", self.path.display()))
    }

    fn store(&mut self, contents: &str) -> Result<()> {
        // write to a sibling file first so that a failed write doesn't truncate the document
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents).with_context(|| format!("could not write `{}`", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("could not replace `{}`", self.path.display()))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Default)]
struct MemoryStorage {
    contents: String,
    store_count: usize,
}

/// In-memory document storage.
///
/// Clones share the same storage, so a handle kept outside of a `DocumentFile` observes what was
/// stored through it.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    storage: Arc<Mutex<MemoryStorage>>,
}

impl MemoryBackend {
    pub fn new(contents: impl Into<String>) -> MemoryBackend {
        MemoryBackend {
            storage: Arc::new(Mutex::new(MemoryStorage {
                contents: contents.into(),
                store_count: 0,
            })),
        }
    }

    /// Current serialized contents.
    pub fn contents(&self) -> String {
        self.storage.lock().contents.clone()
    }

    /// Number of times the document was stored.
    pub fn store_count(&self) -> usize {
        self.storage.lock().store_count
    }
}

impl DocumentBackend for MemoryBackend {
    fn load(&mut self) -> Result<String> {
        Ok(self.contents())
    }

    fn store(&mut self, contents: &str) -> Result<()> {
        let mut storage = self.storage.lock();
        storage.contents = contents.to_string();
        storage.store_count += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

/// A scene document opened from a backend.
///
/// Edits happen on the in-memory document; nothing reaches the backend until `save` is called.
pub struct DocumentFile {
    backend: Box<dyn DocumentBackend>,
    /// Revision of the in-memory document at the time of the last load or save.
    saved_revision: usize,
    document: Document,
}

impl DocumentFile {
    /// Opens a document from a backend.
    pub fn open(mut backend: Box<dyn DocumentBackend>) -> Result<DocumentFile, Error> {
        let contents = backend.load()?;
        let document = Document::from_xml(&contents)?;
        debug!("opened document `{}`", backend.location());
        Ok(DocumentFile {
            backend,
            saved_revision: document.revision,
            document,
        })
    }

    /// Opens a document stored in an XML file.
    pub fn open_path(path: impl AsRef<FsPath>) -> Result<DocumentFile, Error> {
        DocumentFile::open(Box::new(XmlFileBackend::new(path.as_ref())))
    }

    /// Wraps a new, empty document that will be written to `backend` on save.
    pub fn create(backend: Box<dyn DocumentBackend>) -> DocumentFile {
        DocumentFile {
            backend,
            saved_revision: 0,
            document: Document::new(),
        }
    }

    /// Returns the document model.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the document model for editing.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Returns whether the document was modified since it was last loaded or saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.document.revision != self.saved_revision
    }

    /// Location of the backing store.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Writes the document to the backend.
    pub fn save(&mut self) -> Result<(), Error> {
        let contents = self.document.display_xml().to_string();
        self.backend.store(&contents)?;
        self.saved_revision = self.document.revision;
        debug!("saved document `{}` (revision {})", self.backend.location(), self.saved_revision);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{types, Path};

    #[test]
    fn save_and_reopen() {
        let backend = MemoryBackend::new("<document/>");
        let mut file = DocumentFile::open(Box::new(backend.clone())).unwrap();
        file.document_mut()
            .define_prim(&Path::parse("/asset").unwrap(), types::XFORM)
            .unwrap();
        assert!(file.has_unsaved_changes());
        file.save().unwrap();
        assert!(!file.has_unsaved_changes());
        assert_eq!(backend.store_count(), 1);

        let reopened = DocumentFile::open(Box::new(backend)).unwrap();
        assert!(reopened
            .document()
            .find_prim(&Path::parse("/asset").unwrap())
            .is_some());
    }

    #[test]
    fn xml_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asset.scene");
        let mut file = DocumentFile::create(Box::new(XmlFileBackend::new(&path)));
        file.document_mut()
            .define_prim(&Path::parse("/asset").unwrap(), types::XFORM)
            .unwrap();
        file.save().unwrap();
        let reopened = DocumentFile::open_path(&path).unwrap();
        assert_eq!(reopened.document().root.children.len(), 1);
        assert!(DocumentFile::open_path(dir.path().join("missing.scene")).is_err());
    }
}
