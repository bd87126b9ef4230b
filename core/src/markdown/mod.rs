#![deny(missing_docs)]

//! # Markdown Module
//!
//! - **sections**: single pre-pass splitting a crawled page into typed sections.
//! - **table**: pipe-table parsing into field rows.

pub mod sections;
pub mod table;

pub use sections::{parse_document, MarkdownDocument, Section, SectionKind, TitleLine};
pub use table::{parse_table, FieldRow, Table, REQUIRED_MARKER};
