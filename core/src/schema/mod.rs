#![deny(missing_docs)]

//! # Schema Module
//!
//! - **models**: constructors and accessors over `openapiv3::Schema`.
//! - **inference**: type tokens, enums and JSON examples to schemas.
//! - **compose**: nested sub-table composition.

pub mod compose;
pub mod inference;
pub mod models;

pub use compose::{compose_nested_schema, object_schema, SubTable, SubTableKind};
pub use inference::{extract_enum, infer_from_example, infer_schema, EnumValues};
pub use models::{
    array, component_ref, object, typed, SchemaExt, SchemaType, ENUM_DESCRIPTIONS_KEY, SCHEMAS_REF,
};
pub use openapiv3::{ReferenceOr, Schema};
