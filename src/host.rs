//! Host Collaborators - the narrow boundary the core talks through
//!
//! Everything platform-specific (the document store, vector export,
//! rasterization, save dialogs, the file system) sits behind these traits.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ImageScale;
use crate::model::{Layer, Page, PageId, Rect, SymbolId};

/// Opaque failure reported by a host backend.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<io::Error> for BackendError {
    fn from(err: io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Resolves component definitions by id.
pub trait SymbolLibrary {
    fn master(&self, symbol_id: &SymbolId) -> Option<&Layer>;
}

/// The source document owning pages.
pub trait DocumentHost {
    fn list_pages(&self) -> &[Page];
    fn current_page(&self) -> Option<&Page>;
    fn add_page(&mut self, page: Page);
    fn remove_page(&mut self, id: &PageId) -> Option<Page>;
    /// Default output name for whole-document exports.
    fn publisher_file_name(&self) -> String;
    /// Mutable access to one attached page alongside the symbol library.
    fn page_with_symbols_mut(&mut self, id: &PageId) -> Option<(&mut Page, &dyn SymbolLibrary)>;

    fn page(&self, id: &PageId) -> Option<&Page> {
        self.list_pages().iter().find(|p| &p.id == id)
    }
}

/// Native multi-surface export. The backend owns the save dialog and the write.
pub trait VectorExporter {
    fn export_vector_document(&self, page: &Page, suggested_name: &str) -> Result<(), BackendError>;
}

/// A decoded raster image ready to become a page of the output document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
}

pub trait Rasterizer {
    /// Render `layer` clipped to `rect` at `scale`, writing a PNG to `path`.
    fn rasterize(&self, layer: &Layer, rect: Rect, scale: ImageScale, path: &Path) -> Result<(), BackendError>;
    fn read_image(&self, path: &Path) -> Result<ImageHandle, BackendError>;
}

/// Output document assembled from rasterized pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputDocument {
    pages: Vec<ImageHandle>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at `index`, clamped to the end.
    pub fn insert_page(&mut self, image: ImageHandle, index: usize) {
        let index = index.min(self.pages.len());
        self.pages.insert(index, image);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[ImageHandle] {
        &self.pages
    }
}

pub trait DocumentWriter {
    fn write(&self, document: &OutputDocument, url: &Path) -> Result<(), BackendError>;
}

/// Blocks until the user picks a location. `None` means cancelled.
pub trait SavePrompt {
    fn prompt_for_save_location(&self, suggested_name: &str, allowed_extensions: &[&str]) -> Option<PathBuf>;
}

pub trait FileSystem {
    /// Delete `path`. Deleting a file that is already gone succeeds.
    fn delete_file(&self, path: &Path) -> io::Result<()>;
}
