#![deny(missing_docs)]

//! # Operation Extractor
//!
//! Turns one crawled Markdown page into an [`Operation`].
//!
//! The request body is resolved by the first strategy that yields a schema:
//!
//! 1. The `请求体` table, with its nested sub-tables.
//! 2. The `请求参数` table. For GET its rows become query parameters; for
//!    POST/PUT/PATCH they form the body, except auth-style names which become headers.
//! 3. The JSON in `请求示例`, inferred as a flat object.
//! 4. The JSON in `响应示例`, when it looks like an entity payload (POST/PUT/PATCH only).
//!
//! Malformed content never aborts the run: the extractor logs a warning that
//! names the page and moves on.

use crate::markdown::sections::{parse_document, MarkdownDocument, Section, SectionKind};
use crate::markdown::table::Table;
use crate::oas::models::{
    HttpMethod, Operation, ParamLocation, Parameter, RequestBody, Response, ERROR_SCHEMA_NAME,
};
use crate::options::ConvertOptions;
use crate::schema::compose::{compose_nested_schema, object_schema, SubTable};
use crate::schema::inference::infer_from_example;
use crate::schema::models::{component_ref, typed, SchemaExt, SchemaType};
use indexmap::IndexMap;
use log::{debug, info, warn};
use openapiv3::{ReferenceOr, Schema};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Request-parameter names that travel as headers rather than body fields.
const HEADER_FIELD_NAMES: [&str; 4] = ["token", "authorization", "cookie", "content-type"];

/// Keys that mark a response example as a plausible request payload.
const REQUEST_FIELD_HINTS: [&str; 9] = [
    "name",
    "title",
    "type",
    "status",
    "assignedTo",
    "date",
    "desc",
    "estStarted",
    "deadline",
];

const SOURCE_UNNAMED: &str = "<memory>";

/// Extracts operations from pages. Holds only the options that affect extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationExtractor {
    response_example_fallback: bool,
}

impl Default for OperationExtractor {
    fn default() -> Self {
        Self::from_options(&ConvertOptions::default())
    }
}

/// Extracts a page with default options.
pub fn extract_operation(markdown: &str) -> Option<Operation> {
    OperationExtractor::default().extract(SOURCE_UNNAMED, markdown)
}

impl OperationExtractor {
    /// Builds an extractor from run options.
    pub fn from_options(options: &ConvertOptions) -> Self {
        Self {
            response_example_fallback: options.response_example_fallback,
        }
    }

    /// Extracts the page `source`. Returns `None` when the page has no
    /// `### METHOD /path` title line.
    pub fn extract(&self, source: &str, markdown: &str) -> Option<Operation> {
        let doc = parse_document(markdown);

        let Some(title) = doc.title.as_ref() else {
            warn!("{}: no `### METHOD /path` title line; page skipped", source);
            return None;
        };
        let method = title.method;
        let path = normalize_path(&title.raw_path);
        debug!("{}: {} {}", source, method, path);

        let mut parameters = path_parameters(&path);
        for section in doc.sections_of(SectionKind::RequestHeader) {
            add_headers(source, &mut parameters, header_parameters(source, section));
        }

        let request_body = self.resolve_request_body(source, &doc, method, &mut parameters);
        let response_schema = response_schema(source, &doc);
        let responses = standard_responses(response_schema.as_ref());

        if !parameters.iter().any(Parameter::is_token_header) {
            parameters.push(Parameter::token_header());
        }

        Some(Operation {
            path,
            method,
            description: doc.description.clone(),
            parameters,
            request_body,
            responses,
            response_schema,
        })
    }

    fn resolve_request_body(
        &self,
        source: &str,
        doc: &MarkdownDocument,
        method: HttpMethod,
        parameters: &mut Vec<Parameter>,
    ) -> Option<RequestBody> {
        if let Some(body) = body_from_body_table(source, doc) {
            return Some(body);
        }
        if let Some(body) = body_from_parameter_table(source, doc, method, parameters) {
            return Some(body);
        }

        let request_block = doc
            .section(SectionKind::RequestExample)
            .and_then(Section::first_code_block);

        let example = match request_block {
            Some(block) => parse_example(source, "request example", block)?,
            None if self.response_example_fallback && method.carries_body() => {
                borrowed_response_example(source, doc)?
            }
            None => return None,
        };

        let Some(schema) = infer_from_example(&example) else {
            warn!(
                "{}: example JSON is not an object; no request body inferred",
                source
            );
            return None;
        };
        Some(RequestBody {
            required: true,
            schema: ReferenceOr::Item(schema),
            example: Some(example),
        })
    }
}

/// Strips a trailing `:` and rewrites `:name` segments to `{name}`.
pub fn normalize_path(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(':')
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{}}}", name),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// One required string parameter per distinct `{name}` placeholder, in order.
pub fn path_parameters(path: &str) -> Vec<Parameter> {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"));

    let mut seen: Vec<&str> = Vec::new();
    for caps in re.captures_iter(path) {
        if let Some(name) = caps.get(1).map(|m| m.as_str()) {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
    }
    seen.into_iter().map(Parameter::path).collect()
}

fn header_parameters(source: &str, section: &Section) -> Vec<Parameter> {
    let rows = section.root_table().map(Table::fields).unwrap_or_default();
    if rows.is_empty() {
        warn!("{}: `{}` section has no usable table", source, section.heading);
    }
    rows.iter()
        .map(|row| Parameter::from_field(row, ParamLocation::Header))
        .collect()
}

/// Appends `headers`, skipping any whose name (case-insensitive) is already
/// declared as a header. The first declaration wins.
fn add_headers(
    source: &str,
    parameters: &mut Vec<Parameter>,
    headers: impl IntoIterator<Item = Parameter>,
) {
    for header in headers {
        if parameters.iter().any(|p| p.is_header(&header.name)) {
            debug!(
                "{}: header `{}` already declared; later declaration ignored",
                source, header.name
            );
        } else {
            parameters.push(header);
        }
    }
}

fn is_header_field(name: &str) -> bool {
    HEADER_FIELD_NAMES
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name.trim()))
}

/// Composes a section's main table with its titled sub-tables. `None` unless
/// at least one property results.
fn section_schema(section: &Section) -> Option<Schema> {
    let root = section.root_table()?.fields();
    let sub_tables = section
        .sub_tables()
        .filter_map(|(title, table)| SubTable::from_table(title, table))
        .collect();
    let schema = compose_nested_schema(&root, sub_tables);
    schema.has_properties().then_some(schema)
}

fn request_example_value(source: &str, doc: &MarkdownDocument) -> Option<Value> {
    let block = doc
        .section(SectionKind::RequestExample)
        .and_then(Section::first_code_block)?;
    parse_example(source, "request example", block)
}

fn body_from_body_table(source: &str, doc: &MarkdownDocument) -> Option<RequestBody> {
    let section = doc.section(SectionKind::RequestBody)?;
    let Some(schema) = section_schema(section) else {
        warn!(
            "{}: `{}` section has no usable table; trying other strategies",
            source, section.heading
        );
        return None;
    };
    debug!("{}: request body from `{}` table", source, section.heading);
    Some(RequestBody {
        required: true,
        schema: ReferenceOr::Item(schema),
        example: request_example_value(source, doc),
    })
}

fn body_from_parameter_table(
    source: &str,
    doc: &MarkdownDocument,
    method: HttpMethod,
    parameters: &mut Vec<Parameter>,
) -> Option<RequestBody> {
    let section = doc.section(SectionKind::RequestParameters)?;
    let rows = section.root_table().map(Table::fields).unwrap_or_default();
    if rows.is_empty() {
        warn!("{}: `{}` section has no usable table", source, section.heading);
        return None;
    }

    if method == HttpMethod::Get {
        parameters.extend(
            rows.iter()
                .map(|row| Parameter::from_field(row, ParamLocation::Query)),
        );
        debug!("{}: {} query parameters", source, rows.len());
        return None;
    }

    if !method.carries_body() {
        debug!(
            "{}: `{}` ignored for {}",
            source, section.heading, method
        );
        return None;
    }

    let (headers, fields): (Vec<_>, Vec<_>) =
        rows.into_iter().partition(|row| is_header_field(&row.name));
    add_headers(
        source,
        parameters,
        headers
            .iter()
            .map(|row| Parameter::from_field(row, ParamLocation::Header)),
    );

    let schema = object_schema(&fields);
    if !schema.has_properties() {
        return None;
    }
    debug!("{}: request body from `{}` table", source, section.heading);
    Some(RequestBody {
        required: true,
        schema: ReferenceOr::Item(schema),
        example: request_example_value(source, doc),
    })
}

/// The response example, when its top-level keys look like an entity payload.
fn borrowed_response_example(source: &str, doc: &MarkdownDocument) -> Option<Value> {
    let block = doc
        .section(SectionKind::ResponseExample)
        .and_then(Section::first_code_block)?;
    let value = parse_example(source, "response example", block)?;
    let object = value.as_object()?;
    if !REQUEST_FIELD_HINTS.iter().any(|k| object.contains_key(*k)) {
        debug!("{}: response example does not resemble a request payload", source);
        return None;
    }
    info!("{}: using response example as request body example", source);
    Some(value)
}

fn parse_example(source: &str, what: &str, block: &str) -> Option<Value> {
    match serde_json::from_str(block.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: {} is not valid JSON: {}", source, what, e);
            None
        }
    }
}

fn response_schema(source: &str, doc: &MarkdownDocument) -> Option<Schema> {
    let Some(section) = doc.section(SectionKind::ResponseParameters) else {
        debug!("{}: no response parameter section", source);
        return None;
    };
    let schema = section_schema(section);
    if schema.is_none() {
        warn!("{}: `{}` section has no usable table", source, section.heading);
    }
    schema
}

/// The fixed response set: 200 plus the shared error responses.
fn standard_responses(response_schema: Option<&Schema>) -> IndexMap<u16, Response> {
    let success = response_schema
        .cloned()
        .unwrap_or_else(|| typed(SchemaType::Object));

    let mut responses = IndexMap::new();
    responses.insert(
        200,
        Response {
            description: "成功响应".to_string(),
            schema: ReferenceOr::Item(success),
        },
    );
    for (code, description) in [(400, "请求错误"), (401, "未授权"), (500, "服务器错误")] {
        responses.insert(
            code,
            Response {
                description: description.to_string(),
                schema: component_ref(ERROR_SCHEMA_NAME),
            },
        );
    }
    responses
}
