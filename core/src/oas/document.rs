#![deny(missing_docs)]

//! # OpenAPI Document
//!
//! The emitted document is an [`openapiv3::OpenAPI`]. This module converts IR
//! pieces into their `openapiv3` counterparts and renders the finished document.

use crate::error::AppResult;
use crate::oas::models::{HttpMethod, ParamLocation, Parameter, RequestBody, Response, JSON_CONTENT_TYPE};
use indexmap::IndexMap;
use openapiv3::{
    HeaderStyle, MediaType, Operation, ParameterData, ParameterSchemaOrContent, PathItem,
    PathStyle, QueryStyle, ReferenceOr, Schema,
};
use serde_json::Value;

pub use openapiv3::OpenAPI as OpenApiDocument;

/// Value of the top-level `openapi` field.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Rendering and lookup helpers for the assembled document.
pub trait DocumentExt {
    /// Renders as YAML with keys in model order.
    fn to_yaml(&self) -> AppResult<String>;

    /// Renders as indented JSON, non-ASCII text kept as-is.
    fn to_json_pretty(&self) -> AppResult<String>;

    /// Looks up an operation by path and verb.
    fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation>;

    /// Total number of operations across all paths.
    fn operation_count(&self) -> usize;
}

impl DocumentExt for OpenApiDocument {
    fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn to_json_pretty(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        match self.paths.paths.get(path)? {
            ReferenceOr::Item(item) => operation_slot(item, method).as_ref(),
            ReferenceOr::Reference { .. } => None,
        }
    }

    fn operation_count(&self) -> usize {
        self.paths
            .paths
            .values()
            .filter_map(|item| match item {
                ReferenceOr::Item(item) => Some(item),
                ReferenceOr::Reference { .. } => None,
            })
            .map(|item| {
                HttpMethod::ALL
                    .iter()
                    .filter(|m| operation_slot(item, **m).is_some())
                    .count()
            })
            .sum()
    }
}

/// The field of `item` holding the operation for `method`.
pub fn operation_slot(item: &PathItem, method: HttpMethod) -> &Option<Operation> {
    match method {
        HttpMethod::Get => &item.get,
        HttpMethod::Post => &item.post,
        HttpMethod::Put => &item.put,
        HttpMethod::Patch => &item.patch,
        HttpMethod::Delete => &item.delete,
        HttpMethod::Head => &item.head,
        HttpMethod::Options => &item.options,
    }
}

/// Mutable form of [`operation_slot`].
pub fn operation_slot_mut(item: &mut PathItem, method: HttpMethod) -> &mut Option<Operation> {
    match method {
        HttpMethod::Get => &mut item.get,
        HttpMethod::Post => &mut item.post,
        HttpMethod::Put => &mut item.put,
        HttpMethod::Patch => &mut item.patch,
        HttpMethod::Delete => &mut item.delete,
        HttpMethod::Head => &mut item.head,
        HttpMethod::Options => &mut item.options,
    }
}

fn json_content(schema: ReferenceOr<Schema>, example: Option<Value>) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(
        JSON_CONTENT_TYPE.to_string(),
        MediaType {
            schema: Some(schema),
            example,
            ..MediaType::default()
        },
    );
    content
}

impl From<RequestBody> for openapiv3::RequestBody {
    fn from(body: RequestBody) -> Self {
        Self {
            required: body.required,
            content: json_content(body.schema, body.example).into_iter().collect(),
            ..Self::default()
        }
    }
}

impl From<Response> for openapiv3::Response {
    fn from(response: Response) -> Self {
        Self {
            description: response.description,
            content: json_content(response.schema, None).into_iter().collect(),
            ..Self::default()
        }
    }
}

impl From<Parameter> for openapiv3::Parameter {
    fn from(parameter: Parameter) -> Self {
        let parameter_data = ParameterData {
            name: parameter.name,
            description: (!parameter.description.is_empty()).then_some(parameter.description),
            required: parameter.required,
            deprecated: None,
            format: ParameterSchemaOrContent::Schema(ReferenceOr::Item(parameter.schema)),
            example: None,
            examples: Default::default(),
            explode: None,
            extensions: Default::default(),
        };
        match parameter.location {
            ParamLocation::Path => openapiv3::Parameter::Path {
                parameter_data,
                style: PathStyle::Simple,
            },
            ParamLocation::Header => openapiv3::Parameter::Header {
                parameter_data,
                style: HeaderStyle::Simple,
            },
            ParamLocation::Query => openapiv3::Parameter::Query {
                parameter_data,
                allow_reserved: false,
                style: QueryStyle::Form,
                allow_empty_value: None,
            },
        }
    }
}
