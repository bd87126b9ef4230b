#![deny(missing_docs)]

//! # OpenAPI Module
//!
//! - **models**: Intermediate Representation of one endpoint.
//! - **extractor**: crawled page -> `Operation`.
//! - **naming**: operation ids, schema names and tags.
//! - **registry**: unique operation id assignment.
//! - **info**: sidecar `info.md` metadata.
//! - **document**: IR -> `openapiv3` conversions and document rendering.
//! - **assembler**: operations -> `OpenApiDocument`.

pub mod assembler;
pub mod document;
pub mod extractor;
pub mod info;
pub mod models;
pub mod naming;
pub mod registry;

pub use assembler::{assemble, error_schema, token_security_scheme};
pub use document::{operation_slot, operation_slot_mut, DocumentExt, OpenApiDocument, OPENAPI_VERSION};
pub use extractor::{extract_operation, normalize_path, path_parameters, OperationExtractor};
pub use info::{SidecarMetadata, SIDECAR_FILE_NAME};
pub use models::{HttpMethod, Operation, ParamLocation, Parameter, RequestBody, Response};
pub use naming::{operation_id, schema_name, SchemaRole};
pub use registry::NameRegistry;
