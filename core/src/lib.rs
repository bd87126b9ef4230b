#![deny(missing_docs)]

//! # mdoas Core
//!
//! Converts a directory of crawled Zentao REST API Markdown pages into an
//! OpenAPI 3.0 document.

/// Shared error types.
pub mod error;

/// Run configuration.
pub mod options;

/// Markdown page and table parsing.
pub mod markdown;

/// Schema fragments, type inference and nested composition.
pub mod schema;

/// Operation extraction and document assembly.
pub mod oas;

/// End-to-end conversion over a set of pages.
pub mod pipeline;

pub use error::{AppError, AppResult};
pub use markdown::{parse_document, parse_table, FieldRow, MarkdownDocument, SectionKind};
pub use oas::{
    assemble, extract_operation, operation_id, schema_name, DocumentExt, HttpMethod, OpenApiDocument,
    Operation, OperationExtractor, SidecarMetadata, SIDECAR_FILE_NAME,
};
pub use options::{CollisionPolicy, ConvertOptions, DEFAULT_SERVER_URL, DEFAULT_TITLE};
pub use pipeline::{convert, Conversion, ConversionSummary, SourceDocument};
pub use schema::{infer_schema, ReferenceOr, Schema, SchemaExt, SchemaType};
