#![deny(missing_docs)]

//! # Inspect Command
//!
//! Extracts one page and prints the operation as JSON, for debugging a
//! single crawled file without assembling a whole document.

use mdoas_core::error::{AppError, AppResult};
use mdoas_core::{Operation, OperationExtractor};
use std::fs;
use std::path::PathBuf;

/// Arguments for the inspect command.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// Markdown page to extract.
    pub file: PathBuf,

    /// Never borrow a response example as the request body example.
    #[clap(long, env = "MDOAS_NO_RESPONSE_EXAMPLE_FALLBACK")]
    pub no_response_example_fallback: bool,
}

/// Executes the inspection.
pub fn execute(args: &InspectArgs) -> AppResult<()> {
    let operation = extract(args)?;
    println!("{}", serde_json::to_string_pretty(&operation)?);
    Ok(())
}

fn extract(args: &InspectArgs) -> AppResult<Operation> {
    let content = fs::read_to_string(&args.file)
        .map_err(|e| AppError::General(format!("Failed to read {:?}: {}", args.file, e)))?;

    let options = mdoas_core::ConvertOptions::default()
        .with_response_example_fallback(!args.no_response_example_fallback);
    let source = args.file.display().to_string();

    OperationExtractor::from_options(&options)
        .extract(&source, &content)
        .ok_or_else(|| {
            AppError::General(format!(
                "{:?} has no `### METHOD /path` title line",
                args.file
            ))
        })
}
