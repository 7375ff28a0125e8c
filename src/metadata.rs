//! Project metadata copied into the document header.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Name, version and serving settings of the documented project.
///
/// Every field is optional in the source file. The serving settings may sit at
/// the top level or under a `swapi` key, the way a package manifest carries
/// them; top-level values take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: String,
    /// Accepts npm's `"Name <email>"` string as well as its `{ name, email, url }` object
    #[serde(deserialize_with = "person_name")]
    pub author: String,
    #[serde(flatten)]
    pub settings: ServingSettings,
    #[serde(skip_serializing)]
    pub swapi: Option<ServingSettings>,
}

/// Host and content-type settings of the documented API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    pub schemes: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

impl ServingSettings {
    fn or(self, fallback: ServingSettings) -> ServingSettings {
        fn non_empty(values: Vec<String>, fallback: Vec<String>) -> Vec<String> {
            if values.is_empty() {
                fallback
            } else {
                values
            }
        }

        ServingSettings {
            host: self.host.or(fallback.host),
            base_path: self.base_path.or(fallback.base_path),
            schemes: non_empty(self.schemes, fallback.schemes),
            consumes: non_empty(self.consumes, fallback.consumes),
            produces: non_empty(self.produces, fallback.produces),
        }
    }
}

fn person_name<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Person {
        Name(String),
        Object {
            #[serde(default)]
            name: String,
        },
    }

    Ok(match Person::deserialize(deserializer)? {
        Person::Name(name) | Person::Object { name } => name,
    })
}

impl ProjectMetadata {
    /// Parses metadata from YAML (or JSON, which YAML accepts).
    pub fn parse(content: &str) -> Result<Self> {
        let raw: ProjectMetadata =
            serde_yaml::from_str(content).context("Failed to parse project metadata")?;
        Ok(raw.resolved())
    }

    /// Loads metadata from a file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading project metadata from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid metadata file: {}", path.display()))
    }

    /// Folds the nested `swapi` settings into the top-level ones.
    fn resolved(mut self) -> Self {
        if let Some(nested) = self.swapi.take() {
            self.settings = std::mem::take(&mut self.settings).or(nested);
        }
        self
    }
}
