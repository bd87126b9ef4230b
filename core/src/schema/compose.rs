#![deny(missing_docs)]

//! # Nested Schema Composition
//!
//! Crawled pages flatten nested structures into a main table followed by
//! titled sub-tables (`**builds 数组元素**`, `**builder 对象**`). The title names
//! the field it expands, never its full path, so composition is driven by
//! field name: each row that has a matching sub-table is expanded depth-first.

use crate::markdown::table::{FieldRow, Table};
use crate::schema::inference::infer_schema;
use crate::schema::models::{array, object, SchemaExt, SchemaType};
use indexmap::IndexMap;
use log::debug;
use openapiv3::Schema;
use std::collections::VecDeque;

/// How a sub-table title says its rows attach to the parent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubTableKind {
    /// `对象` / `object`: the rows are the field's own properties.
    Object,
    /// `数组元素` / `array`: the rows describe each array element.
    ArrayElement,
}

/// A titled sub-table, already parsed into rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTable {
    /// Name of the field being expanded.
    pub field: String,
    /// Attachment marker from the title.
    pub kind: SubTableKind,
    /// Field rows.
    pub rows: Vec<FieldRow>,
}

impl SubTable {
    /// Parses a `"<field> <marker>"` title. Titles without a marker are rejected.
    pub fn from_title(title: &str, rows: Vec<FieldRow>) -> Option<Self> {
        let (field, marker) = title.trim().split_once(char::is_whitespace)?;
        let marker = marker.trim().to_lowercase();
        if field.is_empty() || marker.is_empty() {
            return None;
        }
        let kind = if marker.contains("数组") || marker.contains("array") {
            SubTableKind::ArrayElement
        } else {
            SubTableKind::Object
        };
        Some(Self {
            field: field.to_string(),
            kind,
            rows,
        })
    }

    /// Parses a titled table.
    pub fn from_table(title: &str, table: &Table) -> Option<Self> {
        Self::from_title(title, table.fields())
    }
}

/// Builds a flat object schema from table rows.
pub fn object_schema(rows: &[FieldRow]) -> Schema {
    let mut pending = IndexMap::new();
    build_object(rows, &mut pending)
}

/// Builds the root object from `root` rows and folds every sub-table onto the
/// property it names, at any depth.
///
/// Sub-tables sharing a field name are consumed in the order given; each is used
/// at most once. Sub-tables that match no field are ignored.
pub fn compose_nested_schema(root: &[FieldRow], sub_tables: Vec<SubTable>) -> Schema {
    let mut pending: IndexMap<String, VecDeque<SubTable>> = IndexMap::new();
    for sub in sub_tables {
        pending.entry(sub.field.clone()).or_default().push_back(sub);
    }

    let schema = build_object(root, &mut pending);

    for sub in pending.values().flatten() {
        debug!(
            "Sub-table for `{}` ({:?}) matched no field; ignored",
            sub.field, sub.kind
        );
    }
    schema
}

fn build_object(rows: &[FieldRow], pending: &mut IndexMap<String, VecDeque<SubTable>>) -> Schema {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();

    for row in rows {
        let mut field = infer_schema(&row.type_, &row.description, &row.name);

        let sub = pending.get_mut(&row.name).and_then(VecDeque::pop_front);
        if let Some(sub) = sub {
            let child = build_object(&sub.rows, pending);
            field = attach(field, child, sub.kind);
        }

        if row.required {
            required.push(row.name.clone());
        }
        properties.insert(row.name.clone(), field);
    }

    object(properties, required)
}

/// The parent's declared type wins; the title marker decides for untyped parents.
fn attach(parent: Schema, child: Schema, kind: SubTableKind) -> Schema {
    let as_items = match parent.schema_type() {
        Some(SchemaType::Array) => true,
        Some(SchemaType::Object) => false,
        _ => kind == SubTableKind::ArrayElement,
    };

    if as_items {
        Schema {
            schema_data: parent.schema_data,
            ..array(child)
        }
    } else {
        let mut child = child;
        child.schema_data.description = parent.schema_data.description;
        child
    }
}
