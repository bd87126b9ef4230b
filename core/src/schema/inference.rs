#![deny(missing_docs)]

//! # Schema Type Inference
//!
//! Maps the loose type tokens used in crawled tables (`int`, `user`, `datetime`)
//! to schema fragments, pulls enumerations out of descriptions such as
//! `状态(open 开启|closed 关闭)`, and derives flat object schemas from JSON examples.

use crate::schema::models::{array, object, typed, SchemaExt, SchemaType};
use openapiv3::Schema;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Description given to `desc` fields that arrive without one.
const DEFAULT_DESC_DESCRIPTION: &str = "任务描述";

/// An enumeration found in a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValues {
    /// First token of every entry.
    pub values: Vec<String>,
    /// Remaining text of every entry; `None` when all entries are bare values.
    pub descriptions: Option<Vec<String>>,
}

/// Maps a raw type token to a schema type and optional format.
/// Unknown tokens become plain strings.
pub fn map_type_token(raw_type: &str) -> (SchemaType, Option<&'static str>) {
    match raw_type.trim().to_lowercase().as_str() {
        "string" | "str" => (SchemaType::String, None),
        "int" | "integer" => (SchemaType::Integer, None),
        "float" | "double" | "number" => (SchemaType::Number, None),
        "bool" | "boolean" => (SchemaType::Boolean, None),
        "array" => (SchemaType::Array, None),
        // `user` is the portal's name for an embedded account object
        "object" | "user" => (SchemaType::Object, None),
        "date" => (SchemaType::String, Some("date")),
        "datetime" => (SchemaType::String, Some("date-time")),
        "time" => (SchemaType::String, Some("time")),
        "email" => (SchemaType::String, Some("email")),
        "uri" | "url" => (SchemaType::String, Some("uri")),
        _ => (SchemaType::String, None),
    }
}

/// Builds the schema for one table field.
///
/// `desc` fields are always free text, whatever type the table claims.
pub fn infer_schema(raw_type: &str, description: &str, field_name: &str) -> Schema {
    if field_name.eq_ignore_ascii_case("desc") {
        let description = if description.is_empty() {
            DEFAULT_DESC_DESCRIPTION
        } else {
            description
        };
        return typed(SchemaType::String).with_description(description);
    }

    let (schema_type, format) = map_type_token(raw_type);
    let mut schema = typed(schema_type);
    if let Some(format) = format {
        schema = schema.with_format(format);
    }
    if !description.is_empty() {
        schema = schema.with_description(description);
    }
    if let Some(found) = extract_enum(description) {
        schema = schema.with_enum(&found.values, found.descriptions);
    }
    schema
}

/// Finds the first parenthesized, pipe-separated list with at least two entries.
pub fn extract_enum(description: &str) -> Option<EnumValues> {
    static ENUM_RE: OnceLock<Regex> = OnceLock::new();
    let re = ENUM_RE.get_or_init(|| Regex::new(r"[(（]([^()（）]+)[)）]").expect("Invalid regex"));

    re.captures_iter(description).find_map(|caps| {
        let entries: Vec<&str> = caps[1].split(['|', '｜']).map(str::trim).collect();
        if entries.len() < 2 || entries.iter().any(|e| e.is_empty()) {
            return None;
        }

        let (values, descriptions): (Vec<String>, Vec<String>) = entries
            .iter()
            .map(|entry| match entry.split_once(char::is_whitespace) {
                Some((value, rest)) => (value.to_string(), rest.trim().to_string()),
                None => (entry.to_string(), String::new()),
            })
            .unzip();

        let has_descriptions = descriptions.iter().any(|d| !d.is_empty());
        Some(EnumValues {
            values,
            descriptions: has_descriptions.then_some(descriptions),
        })
    })
}

/// Derives a flat object schema from a JSON example. Non-objects yield `None`.
pub fn infer_from_example(example: &Value) -> Option<Schema> {
    let properties = example
        .as_object()?
        .iter()
        .map(|(key, value)| (key.clone(), schema_for_value(value)))
        .collect();
    Some(object(properties, Vec::new()))
}

fn value_type(value: &Value) -> SchemaType {
    match value {
        Value::Bool(_) => SchemaType::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => SchemaType::Integer,
        Value::Number(_) => SchemaType::Number,
        Value::Array(_) => SchemaType::Array,
        Value::Object(_) => SchemaType::Object,
        Value::String(_) | Value::Null => SchemaType::String,
    }
}

fn schema_for_value(value: &Value) -> Schema {
    match value {
        Value::Array(elements) => {
            let element_type = match elements.first().map(value_type) {
                Some(SchemaType::Array) | None => SchemaType::String,
                Some(other) => other,
            };
            array(typed(element_type))
        }
        other => typed(value_type(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_table() {
        assert_eq!(map_type_token("INT"), (SchemaType::Integer, None));
        assert_eq!(map_type_token("double"), (SchemaType::Number, None));
        assert_eq!(map_type_token("user"), (SchemaType::Object, None));
        assert_eq!(map_type_token("datetime"), (SchemaType::String, Some("date-time")));
        assert_eq!(map_type_token("mystery"), (SchemaType::String, None));
        assert_eq!(map_type_token(""), (SchemaType::String, None));
    }

    #[test]
    fn test_infer_copies_description_and_format() {
        let s = infer_schema("date", "预计开始日期", "estStarted");
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({"type": "string", "format": "date", "description": "预计开始日期"})
        );
        let s = infer_schema("time", "", "begin");
        assert_eq!(serde_json::to_value(&s).unwrap()["format"], "time");
    }

    #[test]
    fn test_desc_is_forced_to_string() {
        let s = infer_schema("int", "", "Desc");
        assert_eq!(s.schema_type(), Some(SchemaType::String));
        assert_eq!(s.description(), Some("任务描述"));
        let s = infer_schema("object", "版本描述", "desc");
        assert_eq!(s, typed(SchemaType::String).with_description("版本描述"));
    }

    #[test]
    fn test_enum_with_descriptions() {
        let s = infer_schema("string", "状态(open 开启|closed 关闭)", "status");
        assert_eq!(s.enum_values(), vec![json!("open"), json!("closed")]);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["x-enum-descriptions"], json!(["开启", "关闭"]));
    }

    #[test]
    fn test_enum_without_descriptions() {
        let found = extract_enum("类型（devel | test | design）").unwrap();
        assert_eq!(found.values, vec!["devel", "test", "design"]);
        assert!(found.descriptions.is_none());
        let s = infer_schema("string", "类型（devel | test）", "type");
        assert!(serde_json::to_value(&s).unwrap().get("x-enum-descriptions").is_none());
    }

    #[test]
    fn test_single_parenthesized_value_is_not_enum() {
        assert!(extract_enum("数量(可选)").is_none());
        assert!(extract_enum("no parens | here").is_none());
        let s = infer_schema("string", "数量(可选)", "count");
        assert!(s.enum_values().is_empty());
    }

    #[test]
    fn test_numeric_enum_values() {
        let s = infer_schema("int", "是否删除(0 否|1 是)", "deleted");
        assert_eq!(s.enum_values(), vec![json!(0), json!(1)]);
        let s = infer_schema("int", "级别(low 低|high 高)", "pri");
        assert_eq!(s.schema_type(), Some(SchemaType::Integer));
        assert_eq!(s.enum_values(), vec![json!("low"), json!("high")]);
        assert_eq!(s.description(), Some("级别(low 低|high 高)"));
    }

    #[test]
    fn test_infer_from_example() {
        let example = json!({"name": "x", "count": 3, "tags": ["a", "b"]});
        let s = infer_from_example(&example).unwrap();
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "count": {"type": "integer"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            })
        );
    }

    #[test]
    fn test_infer_from_example_value_kinds() {
        let example = json!({
            "ok": true,
            "ratio": 0.5,
            "ids": [1, 2],
            "owners": [{"id": 1}],
            "empty": [],
            "meta": {"a": 1},
            "gone": null
        });
        let s = infer_from_example(&example).unwrap();
        let kind = |name: &str| s.property(name).and_then(SchemaExt::schema_type);
        let item_kind = |name: &str| {
            s.property(name)
                .and_then(SchemaExt::items)
                .and_then(SchemaExt::schema_type)
        };
        assert_eq!(kind("ok"), Some(SchemaType::Boolean));
        assert_eq!(kind("ratio"), Some(SchemaType::Number));
        assert_eq!(item_kind("ids"), Some(SchemaType::Integer));
        assert_eq!(item_kind("owners"), Some(SchemaType::Object));
        assert_eq!(item_kind("empty"), Some(SchemaType::String));
        assert_eq!(kind("meta"), Some(SchemaType::Object));
        assert_eq!(kind("gone"), Some(SchemaType::String));
    }

    #[test]
    fn test_infer_from_non_object_example() {
        assert!(infer_from_example(&json!([1, 2])).is_none());
        assert!(infer_from_example(&json!("text")).is_none());
    }
}
