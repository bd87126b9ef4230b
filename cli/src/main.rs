#![deny(missing_docs)]

//! # mdoas CLI
//!
//! Command Line Interface for the Markdown -> OpenAPI converter.
//!
//! Supported Commands:
//! - `convert`: Directory of crawled pages -> one OpenAPI 3.0 document.
//! - `inspect`: One page -> its extracted operation, as JSON.

use clap::{Parser, Subcommand};
use log::LevelFilter;
use mdoas_core::AppResult;

mod convert;
mod inspect;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Crawled API Markdown to OpenAPI converter")]
struct Cli {
    /// Log at debug level (ignored when RUST_LOG is set).
    #[clap(long, short, global = true, env = "MDOAS_VERBOSE")]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a directory of Markdown pages into an OpenAPI document.
    Convert(convert::ConvertArgs),
    /// Print the operation extracted from a single Markdown page.
    Inspect(inspect::InspectArgs),
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            let level = if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            builder.filter_level(level);
        }
    }
    if let Err(e) = builder.try_init() {
        log::debug!("Logger already initialised: {}", e);
    }
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Convert(args) => convert::execute(args)?,
        Commands::Inspect(args) => inspect::execute(args)?,
    }

    Ok(())
}
