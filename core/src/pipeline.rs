#![deny(missing_docs)]

//! # Conversion Pipeline
//!
//! Extracts every page, then assembles the document. IO stays with the caller:
//! pages arrive as already-read [`SourceDocument`]s.

use crate::error::AppResult;
use crate::oas::assembler::assemble;
use crate::oas::document::OpenApiDocument;
use crate::oas::extractor::OperationExtractor;
use crate::oas::info::SidecarMetadata;
use crate::options::ConvertOptions;
use log::info;

/// One page and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name or other label used in logs.
    pub name: String,
    /// Markdown text.
    pub content: String,
}

impl SourceDocument {
    /// Creates a source document.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Counts reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Pages offered.
    pub discovered: usize,
    /// Pages that produced an operation.
    pub parsed: usize,
    /// Names of pages without a usable title line.
    pub skipped: Vec<String>,
}

/// The document plus its summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Assembled document.
    pub document: OpenApiDocument,
    /// Run statistics.
    pub summary: ConversionSummary,
}

/// Converts a set of pages.
pub fn convert<I>(
    documents: I,
    metadata: &SidecarMetadata,
    options: &ConvertOptions,
) -> AppResult<Conversion>
where
    I: IntoIterator<Item = SourceDocument>,
{
    let extractor = OperationExtractor::from_options(options);
    let mut summary = ConversionSummary::default();
    let mut operations = Vec::new();

    for doc in documents {
        summary.discovered += 1;
        match extractor.extract(&doc.name, &doc.content) {
            Some(operation) => operations.push(operation),
            None => summary.skipped.push(doc.name),
        }
    }
    summary.parsed = operations.len();

    info!(
        "Parsed {} of {} Markdown pages",
        summary.parsed, summary.discovered
    );

    let document = assemble(operations, metadata, options)?;
    Ok(Conversion { document, summary })
}
