#![deny(missing_docs)]

//! # Schema Models
//!
//! Schemas are [`openapiv3::Schema`] values. This module adds the constructors
//! inference and composition need, plus [`SchemaExt`] for reading them back.
//!
//! Enumerations live on the typed variants when the tokens fit the declared type
//! (`string`, or numeric tokens on `integer`/`number`). Anything else falls back
//! to an `AnySchema` carrying the declared `type` and string values.

use indexmap::IndexMap;
use openapiv3::{
    AnySchema, ArrayType, BooleanType, IntegerType, NumberType, ObjectType, ReferenceOr, Schema,
    SchemaData, SchemaKind, StringFormat, StringType, Type, VariantOrUnknownOrEmpty,
};
use serde_json::Value;

/// Prefix for references into `components.schemas`.
pub const SCHEMAS_REF: &str = "#/components/schemas/";

/// Vendor extension holding per-value enum descriptions.
pub const ENUM_DESCRIPTIONS_KEY: &str = "x-enum-descriptions";

/// Primitive and structural schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaType {
    /// `string` (also the fallback for unknown tokens).
    #[default]
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
}

impl SchemaType {
    /// The `type` keyword value.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(SchemaType::String),
            "integer" => Some(SchemaType::Integer),
            "number" => Some(SchemaType::Number),
            "boolean" => Some(SchemaType::Boolean),
            "array" => Some(SchemaType::Array),
            "object" => Some(SchemaType::Object),
            _ => None,
        }
    }
}

fn from_kind(schema_kind: SchemaKind) -> Schema {
    Schema {
        schema_data: SchemaData::default(),
        schema_kind,
    }
}

fn empty_array() -> ArrayType {
    ArrayType {
        items: None,
        min_items: None,
        max_items: None,
        unique_items: false,
    }
}

/// A bare schema of the given type.
pub fn typed(schema_type: SchemaType) -> Schema {
    let ty = match schema_type {
        SchemaType::String => Type::String(StringType::default()),
        SchemaType::Integer => Type::Integer(IntegerType::default()),
        SchemaType::Number => Type::Number(NumberType::default()),
        SchemaType::Boolean => Type::Boolean(BooleanType::default()),
        SchemaType::Array => Type::Array(empty_array()),
        SchemaType::Object => Type::Object(ObjectType::default()),
    };
    from_kind(SchemaKind::Type(ty))
}

/// An object schema. `required` entries not present in `properties` are
/// dropped, duplicates collapse, and an empty list is omitted on output.
pub fn object(properties: IndexMap<String, Schema>, required: Vec<String>) -> Schema {
    let required = required
        .into_iter()
        .filter(|name| properties.contains_key(name))
        .fold(Vec::new(), |mut acc, name| {
            if !acc.contains(&name) {
                acc.push(name);
            }
            acc
        });

    from_kind(SchemaKind::Type(Type::Object(ObjectType {
        properties: properties
            .into_iter()
            .map(|(name, schema)| (name, ReferenceOr::Item(Box::new(schema))))
            .collect(),
        required,
        ..ObjectType::default()
    })))
}

/// An array schema with the given element schema.
pub fn array(items: Schema) -> Schema {
    from_kind(SchemaKind::Type(Type::Array(ArrayType {
        items: Some(ReferenceOr::Item(Box::new(items))),
        ..empty_array()
    })))
}

/// Reference to `#/components/schemas/{name}`.
pub fn component_ref<T>(name: &str) -> ReferenceOr<T> {
    ReferenceOr::Reference {
        reference: format!("{SCHEMAS_REF}{name}"),
    }
}

fn unbox(schema: &ReferenceOr<Box<Schema>>) -> Option<&Schema> {
    match schema {
        ReferenceOr::Item(boxed) => Some(boxed.as_ref()),
        ReferenceOr::Reference { .. } => None,
    }
}

/// Accessors and builders over [`Schema`].
pub trait SchemaExt: Sized {
    /// Declared type, if any.
    fn schema_type(&self) -> Option<SchemaType>;

    /// Sets the description.
    fn with_description(self, description: impl Into<String>) -> Self;

    /// Sets a string format. Ignored for non-string schemas.
    fn with_format(self, format: &str) -> Self;

    /// Sets enum values, plus their descriptions as `x-enum-descriptions`.
    fn with_enum(self, values: &[String], descriptions: Option<Vec<String>>) -> Self;

    /// The description, if set.
    fn description(&self) -> Option<&str>;

    /// Enum values as JSON, empty when none.
    fn enum_values(&self) -> Vec<Value>;

    /// Inline property by name.
    fn property(&self, name: &str) -> Option<&Schema>;

    /// Property names in declaration order.
    fn property_names(&self) -> Vec<&str>;

    /// Required property names.
    fn required(&self) -> &[String];

    /// Inline array element schema.
    fn items(&self) -> Option<&Schema>;

    /// Checks that `required` only names declared properties, recursively.
    fn required_is_consistent(&self) -> bool;

    /// True for `type: object`.
    fn is_object(&self) -> bool {
        self.schema_type() == Some(SchemaType::Object)
    }

    /// True for `type: array`.
    fn is_array(&self) -> bool {
        self.schema_type() == Some(SchemaType::Array)
    }

    /// True if this object declares at least one property.
    fn has_properties(&self) -> bool {
        !self.property_names().is_empty()
    }
}

impl SchemaExt for Schema {
    fn schema_type(&self) -> Option<SchemaType> {
        match &self.schema_kind {
            SchemaKind::Type(Type::String(_)) => Some(SchemaType::String),
            SchemaKind::Type(Type::Integer(_)) => Some(SchemaType::Integer),
            SchemaKind::Type(Type::Number(_)) => Some(SchemaType::Number),
            SchemaKind::Type(Type::Boolean(_)) => Some(SchemaType::Boolean),
            SchemaKind::Type(Type::Array(_)) => Some(SchemaType::Array),
            SchemaKind::Type(Type::Object(_)) => Some(SchemaType::Object),
            SchemaKind::Any(any) => any.typ.as_deref().and_then(SchemaType::from_keyword),
            _ => None,
        }
    }

    fn with_description(mut self, description: impl Into<String>) -> Self {
        self.schema_data.description = Some(description.into());
        self
    }

    fn with_format(mut self, format: &str) -> Self {
        if let SchemaKind::Type(Type::String(string)) = &mut self.schema_kind {
            string.format = match format {
                "date" => VariantOrUnknownOrEmpty::Item(StringFormat::Date),
                "date-time" => VariantOrUnknownOrEmpty::Item(StringFormat::DateTime),
                other => VariantOrUnknownOrEmpty::Unknown(other.to_string()),
            };
        }
        self
    }

    fn with_enum(mut self, values: &[String], descriptions: Option<Vec<String>>) -> Self {
        let fits = match &mut self.schema_kind {
            SchemaKind::Type(Type::String(string)) => {
                string.enumeration = values.iter().cloned().map(Some).collect();
                true
            }
            SchemaKind::Type(Type::Integer(integer)) => {
                match values.iter().map(|v| v.parse::<i64>().ok()).collect::<Option<Vec<_>>>() {
                    Some(parsed) => {
                        integer.enumeration = parsed.into_iter().map(Some).collect();
                        true
                    }
                    None => false,
                }
            }
            SchemaKind::Type(Type::Number(number)) => {
                let parsed = values
                    .iter()
                    .map(|v| v.parse::<f64>().ok().filter(|n| n.is_finite()))
                    .collect::<Option<Vec<_>>>();
                match parsed {
                    Some(parsed) => {
                        number.enumeration = parsed.into_iter().map(Some).collect();
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };

        if !fits {
            let typ = self.schema_type().map(|t| t.as_str().to_string());
            self.schema_kind = SchemaKind::Any(AnySchema {
                typ,
                enumeration: values.iter().map(|v| Value::String(v.clone())).collect(),
                ..AnySchema::default()
            });
        }

        if let Some(descriptions) = descriptions {
            self.schema_data
                .extensions
                .insert(ENUM_DESCRIPTIONS_KEY.to_string(), Value::from(descriptions));
        }
        self
    }

    fn description(&self) -> Option<&str> {
        self.schema_data.description.as_deref()
    }

    fn enum_values(&self) -> Vec<Value> {
        match &self.schema_kind {
            SchemaKind::Type(Type::String(t)) => {
                t.enumeration.iter().flatten().map(|v| Value::from(v.as_str())).collect()
            }
            SchemaKind::Type(Type::Integer(t)) => {
                t.enumeration.iter().flatten().map(|v| Value::from(*v)).collect()
            }
            SchemaKind::Type(Type::Number(t)) => {
                t.enumeration.iter().flatten().map(|v| Value::from(*v)).collect()
            }
            SchemaKind::Any(any) => any.enumeration.clone(),
            _ => Vec::new(),
        }
    }

    fn property(&self, name: &str) -> Option<&Schema> {
        match &self.schema_kind {
            SchemaKind::Type(Type::Object(obj)) => obj.properties.get(name).and_then(unbox),
            _ => None,
        }
    }

    fn property_names(&self) -> Vec<&str> {
        match &self.schema_kind {
            SchemaKind::Type(Type::Object(obj)) => obj.properties.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    fn required(&self) -> &[String] {
        match &self.schema_kind {
            SchemaKind::Type(Type::Object(obj)) => &obj.required,
            _ => &[],
        }
    }

    fn items(&self) -> Option<&Schema> {
        match &self.schema_kind {
            SchemaKind::Type(Type::Array(arr)) => arr.items.as_ref().and_then(unbox),
            _ => None,
        }
    }

    fn required_is_consistent(&self) -> bool {
        match &self.schema_kind {
            SchemaKind::Type(Type::Object(obj)) => {
                obj.required.iter().all(|r| obj.properties.contains_key(r))
                    && obj
                        .properties
                        .values()
                        .filter_map(unbox)
                        .all(Schema::required_is_consistent)
            }
            SchemaKind::Type(Type::Array(_)) => {
                self.items().map_or(true, Schema::required_is_consistent)
            }
            SchemaKind::Any(any) => any.required.is_empty(),
            _ => true,
        }
    }
}
