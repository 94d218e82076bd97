//! PDF Export Core - Artboard Collation Engine
//!
//! # Guarantees
//! 1. Source artboards are never mutated; collation works on copies
//! 2. Ordering is deterministic for every policy
//! 3. No linked symbol survives into an exported composite
//! 4. The temporary page never outlives the export call
//! 5. Temporary image files are always cleaned up

pub mod model;
pub mod config;
pub mod sanitize;
pub mod ordering;
pub mod detach;
pub mod layout;
pub mod host;
pub mod collate;
pub mod export;
pub mod document;
pub mod commands;
pub mod hashing;
pub mod manifest;
pub mod logging;

pub use model::{Layer, LayerKind, Page, Rect};
pub use config::{ExportConfig, ImageScale, OrderingPolicy};
pub use collate::{Collator, CollateError};
pub use export::{ExportBackends, ExportDispatcher, ExportError, ExportOutcome};
pub use commands::{ArtboardScope, run_export, plan};
pub use document::InMemoryDocument;
pub use sanitize::sanitize;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SUPPORTED_DOCUMENT_FORMAT: &str = "^1";
