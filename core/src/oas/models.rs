#![deny(missing_docs)]

//! # Operation Models
//!
//! Intermediate Representation (IR) of one endpoint extracted from one crawled page.
//!
//! An `Operation` is built once by the extractor and handed to the assembler,
//! which may swap inline schemas for `$ref`s to named components.

use crate::error::AppError;
use crate::markdown::table::FieldRow;
use crate::schema::inference::infer_schema;
use crate::schema::models::{typed, SchemaExt, SchemaType};
use indexmap::IndexMap;
use openapiv3::{ReferenceOr, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Name of the shared error component.
pub const ERROR_SCHEMA_NAME: &str = "Error";

/// Name of the synthesized authentication header.
pub const TOKEN_HEADER: &str = "Token";

/// Content type used for every body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP verbs accepted on title lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl HttpMethod {
    /// Every supported verb.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Lowercase verb, as used for `paths` keys and identifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }

    /// POST, PUT and PATCH carry request bodies.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            "head" => Ok(HttpMethod::Head),
            "options" => Ok(HttpMethod::Options),
            other => Err(AppError::General(format!("Unknown HTTP method: {}", other))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Path template variable.
    Path,
    /// HTTP header.
    Header,
    /// Query string.
    Query,
}

/// A path, header or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Whether the parameter is mandatory.
    pub required: bool,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Value schema.
    pub schema: Schema,
}

impl Parameter {
    /// A required, string-typed path parameter.
    pub fn path(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("路径参数 {}", name),
            name,
            location: ParamLocation::Path,
            required: true,
            schema: typed(SchemaType::String),
        }
    }

    /// A parameter described by a table row.
    pub fn from_field(row: &FieldRow, location: ParamLocation) -> Self {
        Self {
            name: row.name.clone(),
            location,
            required: row.required,
            description: row.description.clone(),
            schema: infer_schema(&row.type_, &row.description, &row.name),
        }
    }

    /// The optional `Token` header added to pages that do not declare one.
    pub fn token_header() -> Self {
        let description = "认证Token";
        Self {
            name: TOKEN_HEADER.to_string(),
            location: ParamLocation::Header,
            required: false,
            description: description.to_string(),
            schema: typed(SchemaType::String).with_description(description),
        }
    }

    /// True for a header named `name` in any case.
    pub fn is_header(&self, name: &str) -> bool {
        self.location == ParamLocation::Header && self.name.eq_ignore_ascii_case(name)
    }

    /// True for a header named `token` in any case.
    pub fn is_token_header(&self) -> bool {
        self.is_header(TOKEN_HEADER)
    }
}

/// A JSON request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the body is mandatory.
    pub required: bool,
    /// Body schema (inline until the assembler names it).
    pub schema: ReferenceOr<Schema>,
    /// Literal example parsed from the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// A response for one status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Human readable description.
    pub description: String,
    /// JSON body schema.
    pub schema: ReferenceOr<Schema>,
}

/// One endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Path in `{param}` form.
    pub path: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// One-line description; may be empty.
    pub description: String,
    /// Path, header and query parameters in discovery order.
    pub parameters: Vec<Parameter>,
    /// Request body, if any strategy produced one.
    pub request_body: Option<RequestBody>,
    /// Status code -> response.
    pub responses: IndexMap<u16, Response>,
    /// The 200 body schema before the assembler extracts it; `None` when the
    /// page has no usable response table.
    pub response_schema: Option<Schema>,
}
