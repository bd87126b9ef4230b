#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Derives `operationId`s, component schema names and tags from a path and verb.
//!
//! e.g. `GET /executions/{id}/builds` -> `getExecutionsIdBuilds`

use crate::oas::models::HttpMethod;

/// Which side of an operation a component schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRole {
    /// The JSON request body.
    Request,
    /// The 200 response body.
    Response,
}

impl SchemaRole {
    fn suffix(self) -> &'static str {
        match self {
            SchemaRole::Request => "Request",
            SchemaRole::Response => "Response",
        }
    }
}

/// Lowercase verb followed by every non-empty path segment with its first
/// character upper-cased. Placeholder segments (`{x}`) contribute `Id`.
pub fn operation_id(path: &str, method: HttpMethod) -> String {
    let mut id = method.as_str().to_string();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment.starts_with('{') && segment.ends_with('}') {
            id.push_str("Id");
        } else {
            id.push_str(&capitalize_first(segment));
        }
    }
    id
}

/// Component name for an already-chosen operation id.
pub fn schema_name_for(operation_id: &str, role: SchemaRole) -> String {
    format!("{}{}", operation_id, role.suffix())
}

/// Component name derived straight from the path and verb.
pub fn schema_name(path: &str, method: HttpMethod, role: SchemaRole) -> String {
    schema_name_for(&operation_id(path, method), role)
}

/// First non-empty path segment, used as the operation's tag.
pub fn tag_for(path: &str) -> Option<&str> {
    path.split('/').find(|s| !s.is_empty())
}

fn capitalize_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_id_with_placeholders() {
        assert_eq!(operation_id("/bugs/{id}", HttpMethod::Delete), "deleteBugsId");
        assert_eq!(
            operation_id("/executions/{id}/builds", HttpMethod::Get),
            "getExecutionsIdBuilds"
        );
        assert_eq!(
            operation_id("/projects/{projectID}/stories", HttpMethod::Post),
            "postProjectsIdStories"
        );
    }

    #[test]
    fn test_operation_id_keeps_inner_case() {
        assert_eq!(operation_id("/testtasks", HttpMethod::Get), "getTesttasks");
        assert_eq!(operation_id("/productPlans", HttpMethod::Put), "putProductPlans");
        assert_eq!(operation_id("/", HttpMethod::Get), "get");
    }

    #[test]
    fn test_schema_names() {
        assert_eq!(
            schema_name("/bugs/{id}", HttpMethod::Delete, SchemaRole::Response),
            "deleteBugsIdResponse"
        );
        assert_eq!(
            schema_name("/tokens", HttpMethod::Post, SchemaRole::Request),
            "postTokensRequest"
        );
        assert_eq!(schema_name_for("getBugsId2", SchemaRole::Response), "getBugsId2Response");
    }

    #[test]
    fn test_tag_for() {
        assert_eq!(tag_for("/executions/{id}/builds"), Some("executions"));
        assert_eq!(tag_for("/"), None);
    }
}
