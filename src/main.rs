//! swapi - compiles route declaration manifests into a Swagger 2.0 document.
//!
//! # Usage
//!
//! ```bash
//! swapi [OPTIONS] <DECLARATIONS>
//! ```
//!
//! # Examples
//!
//! Generate YAML from a directory of manifests:
//! ```bash
//! swapi ./api -m package.json -o swagger.yaml
//! ```
//!
//! Generate JSON:
//! ```bash
//! swapi ./api -f json -o swagger.json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swapi::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("swapi starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
