//! Compiles the registry into a Swagger 2.0 document.
//!
//! For every non-abstract group, in registry order, each operation is mounted
//! under the group's resolved path. URL parameters are recomputed from the
//! fully composed path, so a `:ownerId` segment contributed by a related
//! group's combiner is documented even when no operation declared it.

use crate::document::{
    Info, Named, OperationObject, ParameterIn, ParameterObject, ResponseObject, Schema,
    SwaggerDocument,
};
use crate::metadata::ProjectMetadata;
use crate::paths;
use crate::registry::{Operation, ParameterLocation, Registry, RouteGroup};
use crate::schema_generator::SchemaGenerator;
use crate::type_spec::Parameter;
use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use log::{debug, info, warn};

/// Reads a [`Registry`] and produces a [`SwaggerDocument`]
pub struct DocumentCompiler<'a> {
    registry: &'a Registry,
    metadata: &'a ProjectMetadata,
}

impl<'a> DocumentCompiler<'a> {
    pub fn new(registry: &'a Registry, metadata: &'a ProjectMetadata) -> Self {
        Self { registry, metadata }
    }

    /// Build the complete document
    ///
    /// Compilation never mutates the registry; compiling twice gives equal documents.
    pub fn compile(&self) -> SwaggerDocument {
        debug!("Compiling Swagger document");
        let mut document = self.header();
        let generator = SchemaGenerator::new(self.registry);

        for group in self.registry.groups().filter(|group| !group.is_abstract) {
            let mount_path = self.registry.resolve_mount_path(&group.name);
            debug!("Group '{}' mounted at {}", group.name, mount_path);

            for operation in &group.operations {
                let Some(method) = operation.method else {
                    warn!(
                        "Skipping operation '{}' of group '{}': no HTTP method declared",
                        operation.name, group.name
                    );
                    continue;
                };

                let full_path = paths::compose(&[mount_path.as_str(), operation.path.as_str()]);
                let url = paths::to_placeholder_syntax(&full_path);
                let object = self.operation_object(group, operation, &full_path, &generator);

                let previous = document.paths.entry(url.clone()).or_default().set(method, object);
                if previous.is_some() {
                    warn!("Operation {} {} declared twice, keeping the last one", method, url);
                }
            }
        }

        for schema in self.registry.schemas() {
            document
                .definitions
                .insert(schema.name.clone(), generator.definition_schema(schema));
        }

        info!(
            "Compiled {} paths and {} definitions",
            document.paths.len(),
            document.definitions.len()
        );
        document
    }

    fn header(&self) -> SwaggerDocument {
        let meta = self.metadata;
        let settings = &meta.settings;

        SwaggerDocument {
            swagger: "2.0".to_string(),
            info: Info {
                version: meta.version.clone(),
                title: meta.name.clone(),
                description: non_empty(&meta.description),
                license: Named {
                    name: meta.license.clone(),
                },
                contact: Named {
                    name: meta.author.clone(),
                },
            },
            host: settings.host.clone(),
            base_path: settings.base_path.clone(),
            schemes: settings.schemes.clone(),
            consumes: settings.consumes.clone(),
            produces: settings.produces.clone(),
            paths: IndexMap::new(),
            definitions: IndexMap::new(),
        }
    }

    fn operation_object(
        &self,
        group: &RouteGroup,
        operation: &Operation,
        full_path: &str,
        generator: &SchemaGenerator,
    ) -> OperationObject {
        let url_params = url_params(operation, full_path);

        let mut parameters: Vec<ParameterObject> = Vec::new();
        parameters.extend(
            operation
                .query_params
                .iter()
                .map(|p| simple_parameter(p, ParameterIn::Query, generator)),
        );
        parameters.extend(
            url_params
                .iter()
                .map(|p| simple_parameter(p, ParameterIn::Path, generator)),
        );
        parameters.extend(
            operation
                .header_params
                .iter()
                .map(|p| simple_parameter(p, ParameterIn::Header, generator)),
        );
        if operation.has_body() {
            parameters.push(ParameterObject {
                name: format!("{}Body", operation.name),
                location: ParameterIn::Body,
                description: None,
                required: None,
                param_type: None,
                items: None,
                schema: Some(generator.body_schema(operation)),
            });
        }

        OperationObject {
            description: non_empty(&operation.description),
            operation_id: format!("{} {}", group.name, operation.name).to_lower_camel_case(),
            produces: self.metadata.settings.produces.clone(),
            parameters,
            responses: responses(operation, generator),
        }
    }
}

/// Convenience wrapper around [`DocumentCompiler::compile`]
pub fn compile(registry: &Registry, metadata: &ProjectMetadata) -> SwaggerDocument {
    DocumentCompiler::new(registry, metadata).compile()
}

/// URL parameters of the composed path, in path order
///
/// Only segments present in the path are emitted; declared parameters supply
/// their types. A declared parameter naming no segment (left over from an
/// earlier path, or from an overridden inherited one) is dropped.
fn url_params(operation: &Operation, full_path: &str) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = Vec::new();
    for implied in paths::params_from_path(full_path) {
        if params.iter().any(|p| p.name == implied.name) {
            continue;
        }
        let param = operation
            .find_param(ParameterLocation::UrlPath, &implied.name)
            .cloned()
            .unwrap_or(implied);
        params.push(param);
    }

    for declared in &operation.url_params {
        if !params.iter().any(|p| p.name == declared.name) {
            debug!(
                "Dropping URL parameter '{}' of '{}': not in {}",
                declared.name, operation.name, full_path
            );
        }
    }
    params
}

fn simple_parameter(param: &Parameter, location: ParameterIn, generator: &SchemaGenerator) -> ParameterObject {
    let (param_type, items) = if param.is_array {
        (
            Some("array".to_string()),
            Some(generator.type_schema(&param.type_spec, false)),
        )
    } else {
        (Some(param.type_spec.to_string()), None)
    };

    ParameterObject {
        name: param.name.clone(),
        location,
        description: param.description.clone(),
        required: Some(param.required),
        param_type,
        items,
        schema: None,
    }
}

fn responses(operation: &Operation, generator: &SchemaGenerator) -> IndexMap<String, ResponseObject> {
    if operation.responses.is_empty() {
        let mut defaults = IndexMap::new();
        if let Some(method) = operation.method {
            defaults.insert(
                method.default_status().to_string(),
                ResponseObject {
                    description: "OK".to_string(),
                    schema: Schema::of_type("string"),
                },
            );
        }
        return defaults;
    }

    operation
        .responses
        .iter()
        .map(|response| {
            (
                response.status.to_string(),
                ResponseObject {
                    description: response.description.clone(),
                    schema: generator.response_schema(response),
                },
            )
        })
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
