//! Declared type strings and the parameters built from them.
//!
//! Declarations describe types with a compact string notation:
//!
//! - `string`, `number`, ... name a primitive type (anything unknown passes through as-is)
//! - `#/Name` references a named schema registered in the [`Registry`](crate::registry::Registry)
//! - a trailing `*` marks the value as required
//! - a trailing `[]` (before any `*`) marks the value as an array
//!
//! The notation is parsed once, here, into a [`TypeSpec`] plus independent
//! required/array flags. Nothing downstream looks at the suffixes again.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type assumed when a declaration does not state one.
pub const DEFAULT_TYPE: &str = "string";

/// Prefix that turns a type string into a schema reference.
pub const REFERENCE_PREFIX: &str = "#/";

const REQUIRED_SUFFIX: &str = "*";
const ARRAY_SUFFIX: &str = "[]";

/// The base type of a parameter, response or schema field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeSpec {
    /// A primitive type name, kept verbatim
    Primitive(String),
    /// A reference to a named schema (the name without the `#/` prefix)
    Reference(String),
}

impl TypeSpec {
    /// Parses a base type name that has already had its suffixes removed.
    pub fn parse(base: &str) -> Self {
        if let Some(name) = base.strip_prefix(REFERENCE_PREFIX) {
            TypeSpec::Reference(name.to_string())
        } else if base.is_empty() {
            TypeSpec::default()
        } else {
            TypeSpec::Primitive(base.to_string())
        }
    }

    /// Whether this is the type assumed for type-less declarations.
    pub fn is_default(&self) -> bool {
        matches!(self, TypeSpec::Primitive(name) if name == DEFAULT_TYPE)
    }

    /// JSON pointer into the document's `definitions` for a reference type.
    pub fn definition_ref(&self) -> Option<String> {
        match self {
            TypeSpec::Reference(name) => Some(format!("#/definitions/{}", name)),
            TypeSpec::Primitive(_) => None,
        }
    }
}

impl Default for TypeSpec {
    fn default() -> Self {
        TypeSpec::Primitive(DEFAULT_TYPE.to_string())
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Primitive(name) => write!(f, "{}", name),
            TypeSpec::Reference(name) => write!(f, "{}{}", REFERENCE_PREFIX, name),
        }
    }
}

/// Result of parsing a full type string such as `#/Dog[]*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    pub type_spec: TypeSpec,
    pub required: bool,
    pub is_array: bool,
}

/// Parses a type string, stripping the `*` and `[]` markers.
///
/// Explicit `required`/`is_array` values win over the markers; when neither
/// is given the flag defaults to `false`. Malformed strings are not rejected,
/// they simply end up as opaque primitive names.
pub fn parse_type(spec: &str, required: Option<bool>, is_array: Option<bool>) -> ParsedType {
    let mut base = spec.trim();
    let mut required = required;
    let mut is_array = is_array;

    if let Some(stripped) = base.strip_suffix(REQUIRED_SUFFIX) {
        base = stripped;
        required = required.or(Some(true));
    }
    if let Some(stripped) = base.strip_suffix(ARRAY_SUFFIX) {
        base = stripped;
        is_array = is_array.or(Some(true));
    }

    ParsedType {
        type_spec: TypeSpec::parse(base),
        required: required.unwrap_or(false),
        is_array: is_array.unwrap_or(false),
    }
}

/// A named parameter (or schema field) with its normalized type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_spec: TypeSpec,
    pub required: bool,
    pub is_array: bool,
    pub description: Option<String>,
}

impl Parameter {
    /// Builds a parameter from a declared type string.
    pub fn normalize(
        name: impl Into<String>,
        spec: &str,
        required: Option<bool>,
        is_array: Option<bool>,
    ) -> Self {
        let parsed = parse_type(spec, required, is_array);
        Self {
            name: name.into(),
            type_spec: parsed.type_spec,
            required: parsed.required,
            is_array: parsed.is_array,
            description: None,
        }
    }

    /// A parameter of the default type with no flags set.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::normalize(name, DEFAULT_TYPE, None, None)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
