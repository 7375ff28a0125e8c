use crate::compiler::DocumentCompiler;
use crate::declaration;
use crate::metadata::ProjectMetadata;
use crate::parser::{ManifestParser, ParsedManifest};
use crate::registry::Registry;
use crate::scanner::ManifestScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// swapi - Compile route declaration manifests into a Swagger 2.0 document
#[derive(Parser, Debug)]
#[command(name = "swapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Manifest file, or directory scanned recursively for manifests
    #[arg(value_name = "DECLARATIONS")]
    pub declarations_path: PathBuf,

    /// Project metadata file (YAML or JSON) used for the document header
    #[arg(short = 'm', long = "metadata", value_name = "FILE")]
    pub metadata_path: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.declarations_path.exists() {
        anyhow::bail!(
            "Declarations path does not exist: {}",
            args.declarations_path.display()
        );
    }

    if let Some(ref metadata) = args.metadata_path {
        if !metadata.is_file() {
            anyhow::bail!("Metadata file does not exist: {}", metadata.display());
        }
    }

    info!("Declarations: {}", args.declarations_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Builds the registry from every manifest under `args.declarations_path`
/// and renders the compiled document in the requested format.
pub fn generate(args: &CliArgs) -> Result<String> {
    // Step 1: Find manifests
    info!("Scanning declarations...");
    let scanner = ManifestScanner::new(args.declarations_path.clone());
    let scan_result = scanner.scan()?;

    info!("Found {} manifest files", scan_result.manifest_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }

    if scan_result.manifest_files.is_empty() {
        anyhow::bail!("No declaration manifests found");
    }

    // Step 2: Parse manifests
    let parsed: Vec<ParsedManifest> = ManifestParser::parse_files(&scan_result.manifest_files)
        .into_iter()
        .collect::<Result<_>>()?;

    // Step 3: Apply declarations in file order
    let mut registry = Registry::new();
    let mut declaration_count = 0;
    for manifest in parsed {
        debug!(
            "Applying {} declarations from {}",
            manifest.declarations.len(),
            manifest.path.display()
        );
        declaration_count += manifest.declarations.len();
        declaration::apply_all(&mut registry, manifest.declarations)
            .with_context(|| format!("Invalid declaration in {}", manifest.path.display()))?;
    }

    // Step 4: Header metadata
    let metadata = match &args.metadata_path {
        Some(path) => ProjectMetadata::load(path)?,
        None => {
            debug!("No metadata file given, using an empty header");
            ProjectMetadata::default()
        }
    };

    // Step 5: Compile
    let document = DocumentCompiler::new(&registry, &metadata).compile();

    // Step 6: Serialize
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    info!("Summary:");
    info!("  - Manifests: {}", scan_result.manifest_files.len());
    info!("  - Declarations: {}", declaration_count);
    info!("  - Groups: {}", registry.groups().count());
    info!("  - Paths: {}", document.paths.len());
    info!("  - Definitions: {}", document.definitions.len());

    Ok(content)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");
    let content = generate(&args)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote Swagger document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(declarations_path: PathBuf) -> CliArgs {
        CliArgs {
            declarations_path,
            metadata_path: None,
            output_format: OutputFormat::Yaml,
            output_path: None,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_parses_all_flags() {
        let args = CliArgs::try_parse_from([
            "swapi", "api", "-m", "package.json", "-f", "json", "-o", "out.json", "-v",
        ])
        .unwrap();

        assert_eq!(args.declarations_path, PathBuf::from("api"));
        assert_eq!(args.metadata_path, Some(PathBuf::from("package.json")));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.output_path, Some(PathBuf::from("out.json")));
        assert!(args.verbose);
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["swapi", "api"]).unwrap();

        assert_eq!(args.output_format, OutputFormat::Yaml);
        assert!(args.metadata_path.is_none());
        assert!(args.output_path.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_validation_rejects_missing_paths() {
        let temp_dir = TempDir::new().unwrap();
        assert!(parse_args_from_parsed(args(temp_dir.path().join("missing"))).is_err());

        let mut with_metadata = args(temp_dir.path().to_path_buf());
        with_metadata.metadata_path = Some(temp_dir.path().join("package.json"));
        assert!(parse_args_from_parsed(with_metadata).is_err());
    }

    #[test]
    fn test_generate_fails_without_manifests() {
        let temp_dir = TempDir::new().unwrap();
        assert!(generate(&args(temp_dir.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_generate_reports_invalid_declaration() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("api.yaml"),
            r#"
declarations:
  - declare: parameter
    group: Dog
    operation: createDog
    location: body
    name: { name: string }
    type: number
"#,
        )
        .unwrap();

        let err = generate(&args(temp_dir.path().to_path_buf())).unwrap_err();
        assert!(format!("{:#}", err).contains("api.yaml"));
    }

    #[test]
    fn test_run_writes_output_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("api.yaml"),
            r#"
declarations:
  - declare: group
    name: Dog
    path: dogs
  - declare: operation
    group: Dog
    name: getDogs
    method: get
"#,
        )
        .unwrap();

        let output = temp_dir.path().join("out").join("swagger.json");
        let mut cli = args(temp_dir.path().join("api.yaml"));
        cli.output_format = OutputFormat::Json;
        cli.output_path = Some(output.clone());
        run(cli).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert!(written["paths"]["/dogs/"]["get"].is_object());
    }
}
