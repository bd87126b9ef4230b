#![deny(missing_docs)]

//! # Document Assembler
//!
//! Merges extracted operations into one [`OpenApiDocument`]:
//!
//! * Inline request and 200-response schemas move to `components.schemas`
//!   under `{operationId}Request` / `{operationId}Response` and are replaced by `$ref`s.
//! * The shared `Error` schema and the `TokenAuth` API-key scheme are always present.
//! * Tags come from the first path segment and are listed sorted.

use crate::error::AppResult;
use crate::oas::document::{operation_slot_mut, OpenApiDocument, OPENAPI_VERSION};
use crate::oas::info::SidecarMetadata;
use crate::oas::models::{HttpMethod, Operation, ERROR_SCHEMA_NAME, TOKEN_HEADER};
use crate::oas::naming::{schema_name_for, tag_for, SchemaRole};
use crate::oas::registry::NameRegistry;
use crate::options::ConvertOptions;
use crate::schema::models::{component_ref, object, typed, SchemaExt, SchemaType};
use indexmap::IndexMap;
use log::{debug, warn};
use openapiv3::{
    APIKeyLocation, Components, Info, PathItem, Paths, ReferenceOr, Responses, Schema,
    SecurityRequirement, SecurityScheme, Server, StatusCode, Tag,
};
use std::collections::{BTreeSet, HashSet};

/// Name of the API-key security scheme.
pub const SECURITY_SCHEME_NAME: &str = "TokenAuth";

/// Version reported when the sidecar has none.
pub const UNKNOWN_VERSION: &str = "unknown";

/// `{code: integer, message: string}`, both required.
pub fn error_schema() -> Schema {
    let mut properties = IndexMap::new();
    properties.insert(
        "code".to_string(),
        typed(SchemaType::Integer).with_description("错误代码"),
    );
    properties.insert(
        "message".to_string(),
        typed(SchemaType::String).with_description("错误信息"),
    );
    object(properties, vec!["code".to_string(), "message".to_string()])
}

/// The `Token` query API key.
pub fn token_security_scheme() -> SecurityScheme {
    SecurityScheme::APIKey {
        location: APIKeyLocation::Query,
        name: TOKEN_HEADER.to_string(),
        description: Some("禅道API认证Token".to_string()),
        extensions: Default::default(),
    }
}

fn token_requirement() -> SecurityRequirement {
    let mut requirement = SecurityRequirement::new();
    requirement.insert(SECURITY_SCHEME_NAME.to_string(), Vec::new());
    requirement
}

/// Builds the document. Accepts plain or optional operations; `None`s are skipped.
///
/// Fails only with `AppError::NameCollision` under `CollisionPolicy::Fail`.
pub fn assemble<I, T>(
    operations: I,
    metadata: &SidecarMetadata,
    options: &ConvertOptions,
) -> AppResult<OpenApiDocument>
where
    I: IntoIterator<Item = T>,
    T: Into<Option<Operation>>,
{
    let mut registry = NameRegistry::new(options.collision_policy);
    let mut schemas = IndexMap::new();
    schemas.insert(ERROR_SCHEMA_NAME.to_string(), error_schema());
    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    let mut seen: HashSet<(String, HttpMethod)> = HashSet::new();
    let mut tags = BTreeSet::new();

    for operation in operations
        .into_iter()
        .filter_map(Into::<Option<Operation>>::into)
    {
        let operation_id = registry.assign(&operation.path, operation.method)?;
        let Operation {
            path,
            method,
            description,
            parameters,
            mut request_body,
            mut responses,
            response_schema,
        } = operation;

        let request_name = schema_name_for(&operation_id, SchemaRole::Request);
        let response_name = schema_name_for(&operation_id, SchemaRole::Response);

        if !seen.insert((path.clone(), method)) {
            warn!(
                "Duplicate definition of {} {}; the later page replaces the earlier one",
                method, path
            );
            schemas.shift_remove(&request_name);
            schemas.shift_remove(&response_name);
        }

        if let Some(body) = request_body.as_mut() {
            let inline = std::mem::replace(&mut body.schema, component_ref(&request_name));
            match inline {
                ReferenceOr::Item(schema) => {
                    schemas.insert(request_name, schema);
                }
                reference @ ReferenceOr::Reference { .. } => body.schema = reference,
            }
        }

        if let Some(schema) = response_schema.filter(Schema::has_properties) {
            if let Some(success) = responses.get_mut(&200) {
                success.schema = component_ref(&response_name);
            }
            schemas.insert(response_name, schema);
        }

        let operation_tags: Vec<String> = tag_for(&path).map(str::to_string).into_iter().collect();
        tags.extend(operation_tags.iter().cloned());

        let built = openapiv3::Operation {
            tags: operation_tags,
            summary: Some(description),
            operation_id: Some(operation_id),
            parameters: parameters
                .into_iter()
                .map(|p| ReferenceOr::Item(p.into()))
                .collect(),
            request_body: request_body.map(|b| ReferenceOr::Item(b.into())),
            responses: Responses {
                responses: responses
                    .into_iter()
                    .map(|(code, r)| (StatusCode::Code(code), ReferenceOr::Item(r.into())))
                    .collect(),
                ..Responses::default()
            },
            security: Some(vec![token_requirement()]),
            ..openapiv3::Operation::default()
        };

        let item = paths.entry(path).or_default();
        *operation_slot_mut(item, method) = Some(built);
    }

    debug!(
        "Assembled {} operations and {} component schemas",
        registry.len(),
        schemas.len()
    );

    let version = match metadata.version.trim() {
        "" => UNKNOWN_VERSION.to_string(),
        v => v.to_string(),
    };
    let server_url = match metadata.source_url.trim() {
        "" => options.default_server_url.clone(),
        url => url.to_string(),
    };

    let components = Components {
        schemas: schemas
            .into_iter()
            .map(|(name, schema)| (name, ReferenceOr::Item(schema)))
            .collect(),
        security_schemes: [(
            SECURITY_SCHEME_NAME.to_string(),
            ReferenceOr::Item(token_security_scheme()),
        )]
        .into_iter()
        .collect(),
        ..Components::default()
    };

    Ok(OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: options.title.clone(),
            version,
            description: Some(metadata.description()),
            ..Info::default()
        },
        servers: vec![Server {
            url: server_url,
            ..Server::default()
        }],
        paths: Paths {
            paths: paths
                .into_iter()
                .map(|(path, item)| (path, ReferenceOr::Item(item)))
                .collect(),
            ..Paths::default()
        },
        components: Some(components),
        security: Some(vec![token_requirement()]),
        tags: tags
            .into_iter()
            .map(|name| Tag {
                description: Some(format!("{} 相关接口", name)),
                name,
                ..Tag::default()
            })
            .collect(),
        ..OpenApiDocument::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::oas::extractor::extract_operation;
    use crate::oas::document::DocumentExt;
    use crate::options::CollisionPolicy;
    use serde_json::json;

    fn schemas(doc: &OpenApiDocument) -> &IndexMap<String, ReferenceOr<Schema>> {
        &doc.components.as_ref().expect("components").schemas
    }

    fn schema_names(doc: &OpenApiDocument) -> Vec<&str> {
        schemas(doc).keys().map(String::as_str).collect()
    }

    fn op(md: &str) -> Operation {
        extract_operation(md).expect("operation")
    }

    const BUILDS: &str = "### GET /executions/:id/builds\n\n获取版本\n\n#### 响应参数\n\n| 名称 | 类型 | 必填 | 描述 |\n| --- | --- | --- | --- |\n| total | int | 是 | 总数 |\n";
    const TOKENS: &str = "### POST /tokens\n\n获取Token\n\n#### 请求体\n\n| 名称 | 类型 | 必填 | 描述 |\n| --- | --- | --- | --- |\n| account | string | 是 | 用户名 |\n";

    #[test]
    fn test_empty_input_is_a_valid_document() {
        let doc = assemble(
            Vec::<Operation>::new(),
            &SidecarMetadata::default(),
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.openapi, "3.0.0");
        assert_eq!(doc.info.title, "Zentao API");
        assert_eq!(doc.info.version, "unknown");
        assert_eq!(doc.servers[0].url, "http://192.168.0.72/zentao");
        assert!(doc.paths.paths.is_empty());
        assert_eq!(schema_names(&doc), vec!["Error"]);
        assert_eq!(schemas(&doc)["Error"], ReferenceOr::Item(error_schema()));
        assert!(doc.tags.is_empty());
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["security"], json!([{"TokenAuth": []}]));
        assert_eq!(
            v["components"]["securitySchemes"]["TokenAuth"],
            json!({"type": "apiKey", "in": "query", "name": "Token", "description": "禅道API认证Token"})
        );
    }

    #[test]
    fn test_none_operations_are_skipped() {
        let ops = vec![None, Some(op(BUILDS)), None];
        let doc = assemble(ops, &SidecarMetadata::default(), &ConvertOptions::default()).unwrap();
        assert_eq!(doc.operation_count(), 1);
    }

    #[test]
    fn test_schemas_are_extracted_and_referenced() {
        let doc = assemble(
            vec![op(BUILDS), op(TOKENS)],
            &SidecarMetadata::default(),
            &ConvertOptions::default(),
        )
        .unwrap();

        let get = doc.operation("/executions/{id}/builds", HttpMethod::Get).unwrap();
        assert_eq!(get.operation_id.as_deref(), Some("getExecutionsIdBuilds"));
        assert_eq!(get.tags, vec!["executions"]);
        let v = serde_json::to_value(get).unwrap();
        assert_eq!(
            v["responses"]["200"]["content"]["application/json"]["schema"],
            json!({"$ref": "#/components/schemas/getExecutionsIdBuildsResponse"})
        );
        assert_eq!(
            v["responses"]["400"]["content"]["application/json"]["schema"],
            json!({"$ref": "#/components/schemas/Error"})
        );

        let post = doc.operation("/tokens", HttpMethod::Post).unwrap();
        let v = serde_json::to_value(post).unwrap();
        assert_eq!(
            v["requestBody"]["content"]["application/json"]["schema"],
            json!({"$ref": "#/components/schemas/postTokensRequest"})
        );
        // No response table: inline empty object, no component.
        assert_eq!(
            v["responses"]["200"]["content"]["application/json"]["schema"],
            json!({"type": "object"})
        );

        assert_eq!(
            schema_names(&doc),
            vec!["Error", "getExecutionsIdBuildsResponse", "postTokensRequest"]
        );
        let tag_names: Vec<_> = doc.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tag_names, vec!["executions", "tokens"]);
        assert_eq!(doc.tags[0].description.as_deref(), Some("executions 相关接口"));
    }

    #[test]
    fn test_metadata_drives_info_and_server() {
        let meta = SidecarMetadata {
            version: "18.0".into(),
            crawled_at: "2024-01-01".into(),
            source_url: "http://zentao.local/api".into(),
            account: "admin".into(),
        };
        let options = ConvertOptions::default().with_title("My API");
        let doc = assemble(Vec::<Operation>::new(), &meta, &options).unwrap();
        assert_eq!(doc.info.title, "My API");
        assert_eq!(doc.info.version, "18.0");
        assert_eq!(doc.servers[0].url, "http://zentao.local/api");
        assert_eq!(
            doc.info.description.as_deref(),
            Some("禅道版本: 18.0\n爬取时间: 2024-01-01\nAPI文档URL: http://zentao.local/api\n账号: admin")
        );
    }

    #[test]
    fn test_collision_suffix_and_fail() {
        let a = op("### GET /bugs/{id}\n\nA\n\n#### 响应参数\n\n| 名称 | 类型 | 必填 | 描述 |\n| --- | --- | --- | --- |\n| id | int | 是 | x |\n");
        let b = op("### GET /bugs/:bugID\n\nB\n\n#### 响应参数\n\n| 名称 | 类型 | 必填 | 描述 |\n| --- | --- | --- | --- |\n| id | int | 是 | x |\n");

        let doc = assemble(
            vec![a.clone(), b.clone()],
            &SidecarMetadata::default(),
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(
            doc.operation("/bugs/{bugID}", HttpMethod::Get)
                .unwrap()
                .operation_id
                .as_deref(),
            Some("getBugsId2")
        );
        assert!(schemas(&doc).contains_key("getBugsIdResponse"));
        assert!(schemas(&doc).contains_key("getBugsId2Response"));

        let strict = ConvertOptions::default().with_collision_policy(CollisionPolicy::Fail);
        let err = assemble(vec![a, b], &SidecarMetadata::default(), &strict).unwrap_err();
        assert!(matches!(err, AppError::NameCollision(_)));
    }

    #[test]
    fn test_duplicate_endpoint_is_replaced() {
        let first = op("### DELETE /bugs/{id}\n\n第一\n");
        let second = op("### DELETE /bugs/{id}\n\n第二\n");
        let doc = assemble(
            vec![first, second],
            &SidecarMetadata::default(),
            &ConvertOptions::default().with_collision_policy(CollisionPolicy::Fail),
        )
        .unwrap();
        assert_eq!(doc.operation_count(), 1);
        let del = doc.operation("/bugs/{id}", HttpMethod::Delete).unwrap();
        assert_eq!(del.summary.as_deref(), Some("第二"));
        assert_eq!(del.operation_id.as_deref(), Some("deleteBugsId"));
    }

    #[test]
    fn test_replaced_endpoint_leaves_no_stale_components() {
        let first = op(&format!(
            "{}\n#### 响应参数\n\n| 名称 | 类型 | 必填 | 描述 |\n| --- | --- | --- | --- |\n| token | string | 是 | 凭证 |\n",
            TOKENS
        ));
        let second = op("### POST /tokens\n\n获取Token\n");
        let doc = assemble(
            vec![first.clone(), second],
            &SidecarMetadata::default(),
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.operation_count(), 1);
        assert_eq!(schema_names(&doc), vec!["Error"]);
        let v = serde_json::to_value(doc.operation("/tokens", HttpMethod::Post).unwrap()).unwrap();
        assert!(v.get("requestBody").is_none());

        let doc = assemble(
            vec![op("### POST /tokens\n\n旧\n"), first],
            &SidecarMetadata::default(),
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(
            schema_names(&doc),
            vec!["Error", "postTokensRequest", "postTokensResponse"]
        );
    }
}
