//! Composite Manifest - a vector backend that records the collated page
//!
//! Writes `<dir>/<name>.json` describing the composite exactly as it would
//! be handed to a native PDF exporter, sealed with a content hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::hashing::compute_manifest_hash;
use crate::host::{BackendError, VectorExporter};
use crate::model::{LayerId, Page, Rect};
use crate::sanitize::usable_name;
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: LayerId,
    pub name: String,
    #[serde(default)]
    pub source_id: Option<LayerId>,
    pub frame: Rect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeManifest {
    pub name: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub artboards: Vec<ManifestEntry>,
    pub page: Page,
    pub manifest_hash: String,
}

impl CompositeManifest {
    pub fn from_page(page: &Page) -> Result<Self, serde_json::Error> {
        let artboards = page
            .layers
            .iter()
            .filter(|l| l.is_artboard())
            .map(|l| ManifestEntry {
                id: l.id.clone(),
                name: l.name.clone(),
                source_id: l.source_id.clone(),
                frame: l.frame,
            })
            .collect();

        let mut manifest = Self {
            name: page.name.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            artboards,
            page: page.clone(),
            manifest_hash: String::new(),
        };
        manifest.manifest_hash = manifest.content_hash()?;
        Ok(manifest)
    }

    /// Hash of every field except the hash itself.
    pub fn content_hash(&self) -> Result<String, serde_json::Error> {
        let unsealed = Self { manifest_hash: String::new(), ..self.clone() };
        compute_manifest_hash(&unsealed)
    }

    pub fn verify(&self) -> bool {
        matches!(self.content_hash(), Ok(hash) if hash == self.manifest_hash)
    }
}

pub struct ManifestExporter {
    out_dir: PathBuf,
}

impl ManifestExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }

    pub fn path_for(&self, suggested_name: &str) -> PathBuf {
        self.out_dir.join(format!("{}.json", usable_name([suggested_name])))
    }

    pub fn read(path: &Path) -> Result<CompositeManifest, BackendError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| BackendError::new(e.to_string()))
    }
}

impl VectorExporter for ManifestExporter {
    fn export_vector_document(&self, page: &Page, suggested_name: &str) -> Result<(), BackendError> {
        let manifest = CompositeManifest::from_page(page).map_err(|e| BackendError::new(e.to_string()))?;
        let json = serde_json::to_string_pretty(&manifest).map_err(|e| BackendError::new(e.to_string()))?;

        fs::create_dir_all(&self.out_dir)?;
        let path = self.path_for(suggested_name);
        fs::write(&path, json)?;
        tracing::info!(path = %path.display(), hash = %manifest.manifest_hash, "Wrote composite manifest");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Layer, LayerKind};

    fn page() -> Page {
        Page::new("Deck").with_layers(vec![
            Layer::artboard("One", Rect::new(0.0, 0.0, 10.0, 10.0)),
            Layer::new("loose", LayerKind::Group, Rect::default()),
            Layer::artboard("Two", Rect::new(11.0, 0.0, 10.0, 10.0)),
        ])
    }

    #[test]
    fn test_manifest_lists_artboards_only() {
        let manifest = CompositeManifest::from_page(&page()).unwrap();
        let names: Vec<_> = manifest.artboards.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two"]);
        assert!(manifest.verify());
    }

    #[test]
    fn test_tampered_manifest_fails_verify() {
        let mut manifest = CompositeManifest::from_page(&page()).unwrap();
        manifest.artboards[1].frame.x = 500.0;
        assert!(!manifest.verify());
    }

    #[test]
    fn test_empty_name_gets_default_file_name() {
        let exporter = ManifestExporter::new("/out");
        assert_eq!(exporter.path_for(""), PathBuf::from("/out/Untitled.json"));
    }

    #[test]
    fn test_export_writes_readable_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ManifestExporter::new(dir.path().join("out"));

        exporter.export_vector_document(&page(), "Deck").unwrap();

        let manifest = ManifestExporter::read(&exporter.path_for("Deck")).unwrap();
        assert_eq!(manifest.name, "Deck");
        assert!(manifest.verify());
    }
}
