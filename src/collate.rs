//! Collation Orchestrator - temporary composite page lifecycle
//!
//! CRITICAL: the temporary page is removed from the document on every exit
//! path, including errors and panics raised by the export step.

use thiserror::Error;

use crate::config::ExportConfig;
use crate::detach::{detach_symbols, DetachError};
use crate::export::ExportError;
use crate::host::{DocumentHost, SymbolLibrary};
use crate::layout::lay_out;
use crate::model::{Layer, LayerKind, Page, PageId};
use crate::ordering::filter_sort;
use crate::sanitize::usable_name;

#[derive(Debug, Error)]
pub enum CollateError {
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Temporary page {0} is not attached to the document")]
    PageNotAttached(PageId),

    #[error("Detach failed: {0}")]
    Detach(#[from] DetachError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// A page attached to a document for the lifetime of this guard.
pub struct TemporaryPage<'a, D: DocumentHost + ?Sized> {
    document: &'a mut D,
    id: PageId,
}

impl<'a, D: DocumentHost + ?Sized> TemporaryPage<'a, D> {
    pub fn attach(document: &'a mut D, page: Page) -> Self {
        let id = page.id.clone();
        tracing::debug!(page_id = %id, name = %page.name, "Attaching temporary page");
        document.add_page(page);
        Self { document, id }
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn page(&self) -> Result<&Page, CollateError> {
        self.document
            .page(&self.id)
            .ok_or_else(|| CollateError::PageNotAttached(self.id.clone()))
    }

    pub fn page_with_symbols_mut(&mut self) -> Result<(&mut Page, &dyn SymbolLibrary), CollateError> {
        let id = self.id.clone();
        self.document
            .page_with_symbols_mut(&self.id)
            .ok_or(CollateError::PageNotAttached(id))
    }
}

impl<D: DocumentHost + ?Sized> Drop for TemporaryPage<'_, D> {
    fn drop(&mut self) {
        match self.document.remove_page(&self.id) {
            Some(_) => tracing::debug!(page_id = %self.id, "Removed temporary page"),
            None => tracing::warn!(page_id = %self.id, "Temporary page was already gone at teardown"),
        }
    }
}

/// Collates artboards into a temporary page and hands it to an export step.
pub struct Collator {
    config: ExportConfig,
}

impl Collator {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build the composite page, pass it to `consume`, then tear it down.
    ///
    /// Non-artboard input and malformed frames are rejected before the
    /// document is touched. An output name that sanitizes to nothing falls
    /// back to the document's publisher name.
    pub fn collate<D, T, F>(
        &self,
        document: &mut D,
        artboards: &[Layer],
        output_name: &str,
        consume: F,
    ) -> Result<T, CollateError>
    where
        D: DocumentHost + ?Sized,
        F: FnOnce(&Page) -> Result<T, CollateError>,
    {
        check_artboard_shaped(artboards)?;

        let publisher_name = document.publisher_file_name();
        let page = Page::new(usable_name([output_name, publisher_name.as_str()]));
        let mut temporary = TemporaryPage::attach(document, page);

        self.populate(&mut temporary, artboards)?;

        let page = temporary.page()?;
        consume(page)
    }

    fn populate<D: DocumentHost + ?Sized>(
        &self,
        temporary: &mut TemporaryPage<'_, D>,
        artboards: &[Layer],
    ) -> Result<(), CollateError> {
        let ordered = filter_sort(artboards, &self.config);
        let (page, symbols) = temporary.page_with_symbols_mut()?;

        page.layers.extend(ordered.into_iter().map(copy_for_collation));

        let mut detached = 0;
        for layer in page.layers.iter_mut() {
            detached += detach_symbols(layer, symbols)?;
        }
        let placed = lay_out(page.layers.iter_mut());

        tracing::info!(
            page = %page.name,
            artboards = placed,
            detached,
            order = %self.config.ordering,
            "Collated artboards"
        );
        Ok(())
    }
}

fn check_artboard_shaped(artboards: &[Layer]) -> Result<(), CollateError> {
    for layer in artboards {
        if !layer.is_artboard_shaped() {
            return Err(CollateError::InvalidSelection(format!(
                "'{}' is not an artboard or symbol master",
                layer.name
            )));
        }
        if !layer.frame.is_well_formed() {
            return Err(CollateError::InvalidSelection(format!(
                "'{}' has a malformed frame ({} x {} at {}, {})",
                layer.name, layer.frame.width, layer.frame.height, layer.frame.x, layer.frame.y
            )));
        }
    }
    Ok(())
}

/// Independent copy; a component master becomes a plain artboard so it can
/// be exported as its own surface.
fn copy_for_collation(artboard: &Layer) -> Layer {
    let mut copy = artboard.duplicate();
    if let LayerKind::ComponentMaster { .. } = copy.kind {
        copy.kind = LayerKind::Artboard;
    }
    copy
}
