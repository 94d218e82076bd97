//! File-backed Document - local implementations of the host traits

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::host::{DocumentHost, FileSystem, SavePrompt, SymbolLibrary};
use crate::model::{Layer, LayerKind, Page, PageId, SymbolId};
use crate::sanitize::usable_name;
use crate::SUPPORTED_DOCUMENT_FORMAT;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid format version: {0}")]
    InvalidVersion(String),

    #[error("Document format {found} is not supported (requires {supported})")]
    UnsupportedVersion { found: String, supported: String },
}

/// On-disk shape of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    pub format_version: String,
    pub name: String,
    #[serde(default)]
    pub current_page: usize,
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// Component definitions keyed by symbol id.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    masters: HashMap<SymbolId, Layer>,
}

impl SymbolIndex {
    /// Index every component master found on `pages`, at any depth.
    pub fn build(pages: &[Page]) -> Self {
        let mut masters = HashMap::new();
        let mut stack: Vec<&Layer> = pages.iter().flat_map(|p| p.layers.iter()).collect();
        while let Some(layer) = stack.pop() {
            if let LayerKind::ComponentMaster { symbol_id } = &layer.kind {
                masters.insert(symbol_id.clone(), layer.clone());
            }
            stack.extend(layer.children.iter());
        }
        Self { masters }
    }

    pub fn len(&self) -> usize {
        self.masters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masters.is_empty()
    }
}

impl SymbolLibrary for SymbolIndex {
    fn master(&self, symbol_id: &SymbolId) -> Option<&Layer> {
        self.masters.get(symbol_id)
    }
}

pub struct InMemoryDocument {
    name: String,
    pages: Vec<Page>,
    current: Option<PageId>,
    symbols: SymbolIndex,
}

impl InMemoryDocument {
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        let current = pages.first().map(|p| p.id.clone());
        let symbols = SymbolIndex::build(&pages);
        Self {
            name: name.into(),
            pages,
            current,
            symbols,
        }
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DocumentError> {
        let file: DocumentFile = serde_json::from_str(content)?;
        check_format_version(&file.format_version)?;

        let current = file.pages.get(file.current_page).map(|p| p.id.clone());
        let mut document = Self::new(file.name, file.pages);
        document.current = current;
        tracing::debug!(
            pages = document.pages.len(),
            symbols = document.symbols.len(),
            "Loaded document"
        );
        Ok(document)
    }

    pub fn symbols(&self) -> &SymbolIndex {
        &self.symbols
    }

    pub fn set_current_page(&mut self, id: &PageId) -> bool {
        if self.pages.iter().any(|p| &p.id == id) {
            self.current = Some(id.clone());
            true
        } else {
            false
        }
    }

    /// Find a layer anywhere in the document.
    pub fn find_layer(&self, id: &str) -> Option<&Layer> {
        self.pages.iter().find_map(|p| p.find_layer(id))
    }
}

fn check_format_version(found: &str) -> Result<(), DocumentError> {
    let version = Version::parse(found).map_err(|_| DocumentError::InvalidVersion(found.to_string()))?;
    let supported = VersionReq::parse(SUPPORTED_DOCUMENT_FORMAT)
        .map_err(|_| DocumentError::InvalidVersion(SUPPORTED_DOCUMENT_FORMAT.to_string()))?;

    if !supported.matches(&version) {
        return Err(DocumentError::UnsupportedVersion {
            found: found.to_string(),
            supported: SUPPORTED_DOCUMENT_FORMAT.to_string(),
        });
    }
    Ok(())
}

impl DocumentHost for InMemoryDocument {
    fn list_pages(&self) -> &[Page] {
        &self.pages
    }

    fn current_page(&self) -> Option<&Page> {
        let id = self.current.as_ref()?;
        self.pages.iter().find(|p| &p.id == id)
    }

    fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    fn remove_page(&mut self, id: &PageId) -> Option<Page> {
        let index = self.pages.iter().position(|p| &p.id == id)?;
        Some(self.pages.remove(index))
    }

    fn publisher_file_name(&self) -> String {
        self.name.clone()
    }

    fn page_with_symbols_mut(&mut self, id: &PageId) -> Option<(&mut Page, &dyn SymbolLibrary)> {
        let page = self.pages.iter_mut().find(|p| &p.id == id)?;
        let symbols: &dyn SymbolLibrary = &self.symbols;
        Some((page, symbols))
    }
}

/// Local file system. Missing files count as already deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn delete_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Non-interactive save prompt that always answers with a file in `dir`.
#[derive(Debug, Clone)]
pub struct DirectorySaveLocation {
    dir: PathBuf,
}

impl DirectorySaveLocation {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SavePrompt for DirectorySaveLocation {
    fn prompt_for_save_location(&self, suggested_name: &str, allowed_extensions: &[&str]) -> Option<PathBuf> {
        let stem = usable_name([suggested_name]);
        let file_name = match allowed_extensions.first() {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        };
        Some(self.dir.join(file_name))
    }
}
