//! Entry Points - which artboards to export and under what name

use crate::collate::{CollateError, Collator};
use crate::config::{ExportConfig, OrderingPolicy};
use crate::export::{ExportDispatcher, ExportOutcome};
use crate::host::DocumentHost;
use crate::model::{Layer, LayerId, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtboardScope {
    CurrentPage,
    AllPages,
    /// Explicit user selection, in the order it was made.
    Selection(Vec<LayerId>),
}

/// Everything one collation needs, detached from the document.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub artboards: Vec<Layer>,
    pub output_name: String,
    pub config: ExportConfig,
}

pub fn gather<D: DocumentHost + ?Sized>(
    document: &D,
    scope: &ArtboardScope,
    config: &ExportConfig,
) -> Result<ExportRequest, CollateError> {
    match scope {
        ArtboardScope::CurrentPage => {
            let page = document
                .current_page()
                .ok_or_else(|| CollateError::InvalidSelection("document has no current page".into()))?;
            Ok(ExportRequest {
                artboards: page.artboards().cloned().collect(),
                output_name: page.name.clone(),
                config: config.clone(),
            })
        }
        ArtboardScope::AllPages => {
            let artboards = document
                .list_pages()
                .iter()
                .filter(|page| {
                    let skip = config.excludes(&page.name);
                    if skip {
                        tracing::debug!(page = %page.name, "Skipping excluded page");
                    }
                    !skip
                })
                .flat_map(|page| page.artboards().cloned())
                .collect();
            Ok(ExportRequest {
                artboards,
                output_name: document.publisher_file_name(),
                config: config.clone(),
            })
        }
        ArtboardScope::Selection(ids) => {
            let artboards = resolve_selection(document.list_pages(), ids)?;
            let output_name = artboards[0].name.clone();
            Ok(ExportRequest {
                artboards,
                output_name,
                config: config.with_ordering(OrderingPolicy::Selection),
            })
        }
    }
}

/// Only artboards and symbol masters may be selected, and at least one must be.
fn resolve_selection(pages: &[Page], ids: &[LayerId]) -> Result<Vec<Layer>, CollateError> {
    if ids.is_empty() {
        return Err(CollateError::InvalidSelection("nothing is selected".into()));
    }

    ids.iter()
        .map(|id| {
            let layer = pages
                .iter()
                .find_map(|p| p.find_layer(id))
                .ok_or_else(|| CollateError::InvalidSelection(format!("layer {id} not found")))?;
            if !layer.is_artboard_shaped() {
                return Err(CollateError::InvalidSelection(
                    "only artboards can be exported to PDF".into(),
                ));
            }
            Ok(layer.clone())
        })
        .collect()
}

/// Gather, collate and export in one call.
pub fn run_export<D: DocumentHost + ?Sized>(
    document: &mut D,
    scope: &ArtboardScope,
    config: &ExportConfig,
    dispatcher: &ExportDispatcher<'_>,
) -> Result<ExportOutcome, CollateError> {
    let request = gather(document, scope, config)?;
    let collator = Collator::new(request.config.clone());

    collator.collate(document, &request.artboards, &request.output_name, |page| {
        Ok(dispatcher.export(page, collator.config())?)
    })
}

/// Collate without exporting; returns a snapshot of the composite page.
pub fn plan<D: DocumentHost + ?Sized>(
    document: &mut D,
    scope: &ArtboardScope,
    config: &ExportConfig,
) -> Result<Page, CollateError> {
    let request = gather(document, scope, config)?;
    Collator::new(request.config).collate(document, &request.artboards, &request.output_name, |page| {
        Ok(page.clone())
    })
}
