use crate::declaration::Declaration;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser for declaration manifest files.
///
/// Manifests are YAML documents (JSON is accepted as well, being a subset of
/// YAML) with a top-level `declarations` list.
///
/// # Example
///
/// ```no_run
/// use swapi::parser::ManifestParser;
/// use std::path::Path;
///
/// let parsed = ManifestParser::parse_file(Path::new("api/dogs.yaml")).unwrap();
/// println!("Parsed {} declarations", parsed.declarations.len());
/// ```
pub struct ManifestParser;

/// On-disk layout of a manifest
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// A successfully parsed manifest file.
#[derive(Debug)]
pub struct ParsedManifest {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Declarations in file order
    pub declarations: Vec<Declaration>,
}

impl ManifestParser {
    /// Parses manifest text.
    ///
    /// An empty document is a manifest without declarations.
    pub fn parse_str(content: &str) -> Result<Vec<Declaration>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let manifest: Manifest =
            serde_yaml::from_str(content).context("Failed to parse declaration manifest")?;
        Ok(manifest.declarations)
    }

    /// Parses a single manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid manifest.
    pub fn parse_file(path: &Path) -> Result<ParsedManifest> {
        debug!("Parsing manifest: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let declarations = Self::parse_str(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;

        debug!(
            "Parsed {} declarations from {}",
            declarations.len(),
            path.display()
        );

        Ok(ParsedManifest {
            path: path.to_path_buf(),
            declarations,
        })
    }

    /// Parses multiple manifests, continuing even if some fail.
    ///
    /// Failures are logged as warnings and returned alongside the successes,
    /// one result per input path.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedManifest>> {
        debug!("Parsing {} manifests", paths.len());

        let results: Vec<Result<ParsedManifest>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).map_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(
            &temp_dir,
            "dogs.yaml",
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
        );

        let parsed = ManifestParser::parse_file(&path).unwrap();
        assert_eq!(parsed.path, path);
        assert_eq!(parsed.declarations.len(), 2);
    }

    #[test]
    fn test_parse_json_manifest() {
        let declarations = ManifestParser::parse_str(
            r#"{ "declarations": [ { "declare": "abstract", "name": "Entity" } ] }"#,
        )
        .unwrap();

        assert_eq!(
            declarations,
            vec![Declaration::Abstract {
                name: "Entity".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_empty_manifest() {
        assert!(ManifestParser::parse_str("").unwrap().is_empty());
        assert!(ManifestParser::parse_str("declarations: []").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(
            &temp_dir,
            "broken.yaml",
            "declarations:\n  - declare: nonsense\n    name: x\n",
        );

        let err = ManifestParser::parse_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.yaml"));
    }

    #[test]
    fn test_parse_files_continues_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_temp_file(&temp_dir, "good.yaml", "declarations: []");
        let bad = create_temp_file(&temp_dir, "bad.yaml", "declarations: 42");

        let results = ManifestParser::parse_files(&[good, bad]);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
