//! Export Dispatcher - native vector export or an image sequence
//!
//! One image export call walks
//! `Idle -> AwaitingSaveLocation -> {Cancelled | Building -> Writing -> CleaningUp -> Done}`.
//! Once Building starts, CleaningUp always runs.

use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::config::ExportConfig;
use crate::host::{
    BackendError, DocumentWriter, FileSystem, OutputDocument, Rasterizer, SavePrompt, VectorExporter,
};
use crate::model::{Layer, LayerKind, Page};

/// Extensions offered by the save prompt.
pub const OUTPUT_EXTENSIONS: &[&str] = &["pdf"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Vector export failed: {0}")]
    Vector(#[source] BackendError),

    #[error("Could not rasterize artboard '{artboard}': {source}")]
    Rasterization { artboard: String, source: BackendError },

    #[error("Could not read rendered image for '{artboard}': {source}")]
    ImageRead { artboard: String, source: BackendError },

    #[error("Could not write {}: {source}", .path.display())]
    Write { path: PathBuf, source: BackendError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    AwaitingSaveLocation,
    Cancelled,
    Building,
    Writing,
    CleaningUp,
    Done,
}

impl ExportState {
    pub fn can_advance_to(self, next: ExportState) -> bool {
        use ExportState::*;
        matches!(
            (self, next),
            (Idle, AwaitingSaveLocation)
                | (AwaitingSaveLocation, Cancelled)
                | (AwaitingSaveLocation, Building)
                | (Building, Writing)
                | (Building, CleaningUp)
                | (Writing, CleaningUp)
                | (CleaningUp, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExportState::Cancelled | ExportState::Done)
    }
}

#[derive(Debug)]
struct ExportRun {
    state: ExportState,
}

impl ExportRun {
    fn new() -> Self {
        Self { state: ExportState::Idle }
    }

    fn advance(&mut self, next: ExportState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal export transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(from = ?self.state, to = ?next, "Export state");
        self.state = next;
    }
}

/// A temporary file that could not be removed. Reported, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageExportReport {
    pub path: PathBuf,
    pub pages: usize,
    pub cleanup_failures: Vec<CleanupFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// Handed to the vector backend, which owns the rest.
    Vector,
    /// The user dismissed the save prompt. Nothing was written.
    Cancelled,
    Images(ImageExportReport),
}

/// Temporary files owned by one export call.
struct TempFiles<'a> {
    file_system: &'a dyn FileSystem,
    paths: Vec<PathBuf>,
}

impl<'a> TempFiles<'a> {
    fn new(file_system: &'a dyn FileSystem) -> Self {
        Self { file_system, paths: vec![] }
    }

    fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    fn cleanup(&mut self) -> Vec<CleanupFailure> {
        let mut failures = vec![];
        for path in self.paths.drain(..) {
            if let Err(err) = self.file_system.delete_file(&path) {
                tracing::warn!(path = %path.display(), error = %err, "Could not delete temporary file");
                failures.push(CleanupFailure { path, reason: err.to_string() });
            }
        }
        failures
    }
}

impl Drop for TempFiles<'_> {
    fn drop(&mut self) {
        if !self.paths.is_empty() {
            self.cleanup();
        }
    }
}

pub struct ExportBackends<'a> {
    pub vector: &'a dyn VectorExporter,
    pub rasterizer: &'a dyn Rasterizer,
    pub writer: &'a dyn DocumentWriter,
    pub prompt: &'a dyn SavePrompt,
    pub file_system: &'a dyn FileSystem,
}

pub struct ExportDispatcher<'a> {
    backends: ExportBackends<'a>,
    temp_dir: PathBuf,
}

impl<'a> ExportDispatcher<'a> {
    pub fn new(backends: ExportBackends<'a>) -> Self {
        Self {
            backends,
            temp_dir: env::temp_dir(),
        }
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Export a collated page. Called once per collation.
    pub fn export(&self, page: &Page, config: &ExportConfig) -> Result<ExportOutcome, ExportError> {
        if !config.as_images {
            tracing::info!(page = %page.name, "Exporting composite as vector document");
            self.backends
                .vector
                .export_vector_document(page, &page.name)
                .map_err(ExportError::Vector)?;
            return Ok(ExportOutcome::Vector);
        }
        self.export_as_images(page, config)
    }

    fn export_as_images(&self, page: &Page, config: &ExportConfig) -> Result<ExportOutcome, ExportError> {
        let mut run = ExportRun::new();

        run.advance(ExportState::AwaitingSaveLocation);
        let Some(url) = self.backends.prompt.prompt_for_save_location(&page.name, OUTPUT_EXTENSIONS) else {
            run.advance(ExportState::Cancelled);
            tracing::info!(page = %page.name, "Save cancelled");
            return Ok(ExportOutcome::Cancelled);
        };

        run.advance(ExportState::Building);
        let mut temp_files = TempFiles::new(self.backends.file_system);
        let written = self.build_and_write(page, config, &url, &mut temp_files, &mut run);

        run.advance(ExportState::CleaningUp);
        let cleanup_failures = temp_files.cleanup();
        run.advance(ExportState::Done);

        let pages = written?;
        tracing::info!(path = %url.display(), pages, "Wrote image document");
        Ok(ExportOutcome::Images(ImageExportReport {
            path: url,
            pages,
            cleanup_failures,
        }))
    }

    fn build_and_write(
        &self,
        page: &Page,
        config: &ExportConfig,
        url: &Path,
        temp_files: &mut TempFiles<'_>,
        run: &mut ExportRun,
    ) -> Result<usize, ExportError> {
        let rasterizer = self.backends.rasterizer;
        let mut document = OutputDocument::new();

        for artboard in page.layers.iter().filter(|l| l.is_artboard()) {
            let path = self.temp_path_for(artboard);
            temp_files.track(path.clone());

            let prepared = with_export_background(artboard);
            rasterizer
                .rasterize(&prepared, artboard.frame, config.image_scale, &path)
                .map_err(|source| ExportError::Rasterization {
                    artboard: artboard.name.clone(),
                    source,
                })?;
            let image = rasterizer.read_image(&path).map_err(|source| ExportError::ImageRead {
                artboard: artboard.name.clone(),
                source,
            })?;

            tracing::debug!(artboard = %artboard.name, scale = config.image_scale.factor(), "Rasterized artboard");
            let end = document.page_count();
            document.insert_page(image, end);
        }

        run.advance(ExportState::Writing);
        self.backends
            .writer
            .write(&document, url)
            .map_err(|source| ExportError::Write {
                path: url.to_path_buf(),
                source,
            })?;
        Ok(document.page_count())
    }

    fn temp_path_for(&self, artboard: &Layer) -> PathBuf {
        let unique = Uuid::new_v4().to_string().to_uppercase();
        self.temp_dir.join(format!("{} {}.png", artboard.id, unique))
    }
}

/// Artboard backgrounds are not part of the layer content, so a visible
/// one is drawn as a shape behind everything else before rasterizing.
pub fn with_export_background(artboard: &Layer) -> Cow<'_, Layer> {
    match artboard.background {
        Some(background) if background.include_in_export => {
            let mut prepared = artboard.clone();
            let shape = Layer::new(
                "Background",
                LayerKind::Shape { fill: Some(background.color) },
                artboard.frame.bounds(),
            );
            prepared.children.insert(0, shape);
            Cow::Owned(prepared)
        }
        _ => Cow::Borrowed(artboard),
    }
}
