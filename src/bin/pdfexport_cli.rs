//! PDF Export CLI - collate artboards from a document file
//!
//! Commands: pages, plan, export
//! Outputs JSON to stdout, logs to stderr
//! Returns 1 on usage/load errors, 2 on collation/export failure

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pdfexport_core::{
    commands::{plan, run_export, ArtboardScope},
    document::{DirectorySaveLocation, InMemoryDocument, LocalFileSystem},
    export::{ExportBackends, ExportDispatcher, ExportOutcome},
    host::{BackendError, DocumentHost, DocumentWriter, ImageHandle, OutputDocument, Rasterizer},
    logging::init_logging,
    manifest::ManifestExporter,
    ExportConfig, ImageScale, Layer, OrderingPolicy, Rect,
};

#[derive(Parser)]
#[command(name = "pdfexport-cli")]
#[command(about = "PDF Export CLI - Artboard Collation Engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the document file
    #[arg(short, long)]
    document: PathBuf,

    /// Log level (RUST_LOG overrides)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Args)]
struct CollateArgs {
    /// Which artboards to collate
    #[arg(short, long, value_enum, default_value = "current-page")]
    scope: Scope,

    /// Artboard ids for --scope selection, in selection order
    #[arg(long = "select")]
    selection: Vec<String>,

    /// JSON export configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the ordering policy
    #[arg(long, value_enum)]
    order: Option<Order>,

    /// Override the exclusion prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Keep artboards whose names start with the prefix
    #[arg(long)]
    no_exclude: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List pages in the document
    Pages,

    /// Collate and print the laid-out composite without exporting
    Plan {
        #[command(flatten)]
        args: CollateArgs,
    },

    /// Collate and export
    Export {
        #[command(flatten)]
        args: CollateArgs,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Rasterize each artboard instead of exporting vectors
        #[arg(long)]
        as_images: bool,

        /// Image scale for --as-images (1, 2 or 3)
        #[arg(long)]
        scale: Option<u8>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    CurrentPage,
    AllPages,
    Selection,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    LeftRightTopBottom,
    TopBottomLeftRight,
    LayerList,
    LayerListReversed,
    Selection,
}

impl From<Order> for OrderingPolicy {
    fn from(order: Order) -> Self {
        match order {
            Order::LeftRightTopBottom => Self::LeftRightTopBottom,
            Order::TopBottomLeftRight => Self::TopBottomLeftRight,
            Order::LayerList => Self::LayerList,
            Order::LayerListReversed => Self::LayerListReversed,
            Order::Selection => Self::Selection,
        }
    }
}

/// This build has no renderer; image export reports a rasterization failure.
struct NoRasterizer;

impl Rasterizer for NoRasterizer {
    fn rasterize(&self, _layer: &Layer, _rect: Rect, _scale: ImageScale, _path: &Path) -> Result<(), BackendError> {
        Err(BackendError::new("no rasterizer is available in this build"))
    }

    fn read_image(&self, path: &Path) -> Result<ImageHandle, BackendError> {
        Err(BackendError::new(format!("cannot read {}", path.display())))
    }
}

impl DocumentWriter for NoRasterizer {
    fn write(&self, _document: &OutputDocument, url: &Path) -> Result<(), BackendError> {
        Err(BackendError::new(format!("cannot write {}", url.display())))
    }
}

fn fail(code: u8, error: impl std::fmt::Display) -> ExitCode {
    let output = serde_json::json!({ "success": false, "error": error.to_string() });
    println!("{}", output);
    ExitCode::from(code)
}

fn build_config(args: &CollateArgs) -> Result<ExportConfig, String> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path).map_err(|e| e.to_string())?,
        None => ExportConfig::default(),
    };
    if let Some(order) = args.order {
        config.ordering = order.into();
    }
    if let Some(prefix) = &args.prefix {
        config.prefix = prefix.clone();
    }
    if args.no_exclude {
        config.exclude_with_prefix = false;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn scope_of(args: &CollateArgs) -> ArtboardScope {
    match args.scope {
        Scope::CurrentPage => ArtboardScope::CurrentPage,
        Scope::AllPages => ArtboardScope::AllPages,
        Scope::Selection => ArtboardScope::Selection(args.selection.clone()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        return fail(1, e);
    }

    let mut document = match InMemoryDocument::load(&cli.document) {
        Ok(d) => d,
        Err(e) => return fail(1, format!("Failed to load document: {}", e)),
    };

    match cli.command {
        Commands::Pages => {
            let pages: Vec<_> = document
                .list_pages()
                .iter()
                .map(|p| serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "artboards": p.artboards().count(),
                }))
                .collect();
            println!("{}", serde_json::Value::Array(pages));
            ExitCode::SUCCESS
        }

        Commands::Plan { args } => {
            let config = match build_config(&args) {
                Ok(c) => c,
                Err(e) => return fail(1, e),
            };
            match plan(&mut document, &scope_of(&args), &config) {
                Ok(page) => {
                    let output = serde_json::json!({ "success": true, "page": page });
                    println!("{}", output);
                    ExitCode::SUCCESS
                }
                Err(e) => fail(2, e),
            }
        }

        Commands::Export { args, out_dir, as_images, scale } => {
            let mut config = match build_config(&args) {
                Ok(c) => c,
                Err(e) => return fail(1, e),
            };
            config.as_images |= as_images;
            if let Some(scale) = scale {
                config.image_scale = match ImageScale::try_from(scale) {
                    Ok(s) => s,
                    Err(e) => return fail(1, e),
                };
            }

            let manifests = ManifestExporter::new(&out_dir);
            let prompt = DirectorySaveLocation::new(&out_dir);
            let dispatcher = ExportDispatcher::new(ExportBackends {
                vector: &manifests,
                rasterizer: &NoRasterizer,
                writer: &NoRasterizer,
                prompt: &prompt,
                file_system: &LocalFileSystem,
            });

            match run_export(&mut document, &scope_of(&args), &config, &dispatcher) {
                Ok(outcome) => {
                    let output = match outcome {
                        ExportOutcome::Vector => serde_json::json!({ "success": true, "format": "vector" }),
                        ExportOutcome::Cancelled => serde_json::json!({ "success": true, "cancelled": true }),
                        ExportOutcome::Images(report) => serde_json::json!({
                            "success": true,
                            "format": "images",
                            "path": report.path,
                            "pages": report.pages,
                            "cleanupFailures": report.cleanup_failures.len(),
                        }),
                    };
                    println!("{}", output);
                    ExitCode::SUCCESS
                }
                Err(e) => fail(2, e),
            }
        }
    }
}
