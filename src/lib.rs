//! swapi - declarative route metadata compiled into Swagger 2.0 documents.
//!
//! Route groups, operations, parameters, responses and schemas are declared
//! one at a time, in any order and possibly spread over many files. Each
//! declaration is merged into a [`registry::Registry`]; once everything has
//! been declared the registry is compiled into a single document.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Finds declaration manifests on disk
//! 2. [`parser`] - Reads manifests into [`declaration::Declaration`]s
//! 3. [`declaration`] - Applies declarations to the registry
//! 4. [`registry`] - Groups, operations, schemas and their merge rules
//! 5. [`compiler`] - Turns the registry into a [`document::SwaggerDocument`]
//! 6. [`serializer`] - Serializes the document to YAML or JSON
//!
//! [`type_spec`] and [`paths`] hold the small grammars shared by the above,
//! [`schema_generator`] expands types into schemas, and [`metadata`] fills
//! the document header.
//!
//! # Example Usage
//!
//! ```
//! use swapi::compiler::compile;
//! use swapi::metadata::ProjectMetadata;
//! use swapi::registry::{HttpMethod, Operation, ParameterLocation, Registry, RouteGroup};
//! use swapi::type_spec::Parameter;
//!
//! let mut registry = Registry::new();
//! registry.upsert_group(RouteGroup::new("Owner").with_path("owner"));
//! registry.upsert_group(
//!     RouteGroup::new("Dog")
//!         .with_path("dog")
//!         .related_to("Owner")
//!         .with_combiner("/:ownerId/"),
//! );
//! registry.upsert_operation(
//!     "Dog",
//!     "getDogById",
//!     Operation::new("getDogById")
//!         .with_path("/:id")
//!         .with_method(HttpMethod::Get)
//!         .with_param(ParameterLocation::Query, Parameter::normalize("full", "boolean", None, None)),
//! );
//!
//! let document = compile(&registry, &ProjectMetadata::default());
//! assert!(document.paths.contains_key("/owner/{ownerId}/dog/{id}/"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod compiler;
pub mod declaration;
pub mod document;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod paths;
pub mod registry;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_spec;
