#![deny(missing_docs)]

//! # Convert Command
//!
//! Walks an input directory for crawled `*.md` pages, converts them and writes
//! the OpenAPI document. Output format follows the file extension.

use log::{info, warn};
use mdoas_core::error::{AppError, AppResult};
use mdoas_core::{
    convert, CollisionPolicy, ConvertOptions, DocumentExt, OpenApiDocument, SidecarMetadata,
    SourceDocument, DEFAULT_SERVER_URL, DEFAULT_TITLE, SIDECAR_FILE_NAME,
};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default output file name inside the input directory.
const DEFAULT_OUTPUT_NAME: &str = "openapi.yaml";

/// Arguments for the convert command.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Directory holding the crawled Markdown pages.
    #[clap(long, short, env = "MDOAS_INPUT")]
    pub input: PathBuf,

    /// Output path. `.yaml`/`.yml` writes YAML, anything else JSON.
    /// Defaults to `<input>/openapi.yaml`.
    #[clap(long, short, env = "MDOAS_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Sidecar metadata file. Defaults to `<input>/info.md`.
    #[clap(long, env = "MDOAS_INFO")]
    pub info: Option<PathBuf>,

    /// Document title.
    #[clap(long, env = "MDOAS_TITLE", default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Server URL used when the sidecar has none.
    #[clap(long, env = "MDOAS_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Never borrow a response example as the request body example.
    #[clap(long, env = "MDOAS_NO_RESPONSE_EXAMPLE_FALLBACK")]
    pub no_response_example_fallback: bool,

    /// Fail instead of suffixing when two endpoints derive the same operationId.
    #[clap(long, env = "MDOAS_STRICT_NAMES")]
    pub strict_names: bool,
}

impl ConvertArgs {
    fn options(&self) -> ConvertOptions {
        let policy = if self.strict_names {
            CollisionPolicy::Fail
        } else {
            CollisionPolicy::Suffix
        };
        ConvertOptions::default()
            .with_title(self.title.clone())
            .with_default_server_url(self.server_url.clone())
            .with_response_example_fallback(!self.no_response_example_fallback)
            .with_collision_policy(policy)
    }

    fn info_path(&self) -> PathBuf {
        self.info
            .clone()
            .unwrap_or_else(|| self.input.join(SIDECAR_FILE_NAME))
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.join(DEFAULT_OUTPUT_NAME))
    }
}

/// Executes the conversion.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &ConvertArgs) -> AppResult<()> {
    if !args.input.is_dir() {
        return Err(AppError::General(format!(
            "Input directory not found: {:?}",
            args.input
        )));
    }

    let info_path = args.info_path();
    let pages = discover_pages(&args.input, &info_path)?;
    info!("Discovered {} Markdown pages in {:?}", pages.len(), args.input);

    let documents = pages
        .iter()
        .map(|path| read_page(path))
        .collect::<AppResult<Vec<_>>>()?;

    let metadata = SidecarMetadata::load_or_default(&info_path);
    let conversion = convert(documents, &metadata, &args.options())?;

    let summary = &conversion.summary;
    if !summary.skipped.is_empty() {
        warn!(
            "{} pages had no endpoint: {}",
            summary.skipped.len(),
            summary.skipped.join(", ")
        );
    }

    let output = args.output_path();
    write_document(&conversion.document, &output)?;
    println!(
        "Wrote {} operations from {} of {} pages to {:?}",
        conversion.document.operation_count(),
        summary.parsed,
        summary.discovered,
        output
    );
    Ok(())
}

/// `*.md` files directly inside `dir`, sorted by name, sidecar excluded.
fn discover_pages(dir: &Path, info_path: &Path) -> AppResult<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut pages = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| AppError::General(format!("Failed to list {:?}: {}", dir, e)))?;
        let path = entry.path();
        let is_markdown = path.extension().is_some_and(|ext| ext == "md");
        let is_sidecar = entry.file_name() == SIDECAR_FILE_NAME || path == info_path;
        if entry.file_type().is_file() && is_markdown && !is_sidecar {
            pages.push(path.to_path_buf());
        }
    }
    Ok(pages)
}

fn read_page(path: &Path) -> AppResult<SourceDocument> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::General(format!("Failed to read {:?}: {}", path, e)))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceDocument::new(name, content))
}

fn write_document(document: &OpenApiDocument, output: &Path) -> AppResult<()> {
    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("yaml");
    let rendered = match ext {
        "yaml" | "yml" => document.to_yaml()?,
        _ => document.to_json_pretty()?,
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, rendered)?;
    Ok(())
}
