//! Declaration events and how each one is recorded in the [`Registry`].
//!
//! A declaration carries already-parsed data about one group, operation,
//! parameter, response, body or schema. Declarations can be applied in any
//! order and repeated; the registry merges them.
//!
//! In a manifest file they appear as a list tagged by `declare`:
//!
//! ```yaml
//! declarations:
//!   - declare: group
//!     name: Dog
//!     path: dog
//!     relatedTo: Owner
//!     combiner: /:ownerId/
//!   - declare: operation
//!     group: Dog
//!     name: getDogById
//!     path: /:id
//!     method: get
//!   - declare: parameter
//!     group: Dog
//!     operation: getDogById
//!     location: query
//!     name: { token: string, page: number }
//!   - declare: response
//!     group: Dog
//!     operation: getDogById
//!     status: 200
//!     type: "#/Dog"
//!   - declare: schema
//!     name: Dog
//!     fields: { id: number, name: "string*", toys: "string[]" }
//! ```

use crate::error::{Error, Result};
use crate::paths;
use crate::registry::{
    BodyKind, HttpMethod, Operation, ParameterLocation, Registry, Response, RouteGroup,
    SchemaKind,
};
use crate::type_spec::{Parameter, DEFAULT_TYPE, REFERENCE_PREFIX};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// A single declaration event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "declare", rename_all = "camelCase")]
pub enum Declaration {
    /// A route group, optionally mounted under a related group
    #[serde(rename_all = "camelCase")]
    Group {
        name: String,
        #[serde(default)]
        path: String,
        #[serde(default)]
        related_to: Option<String>,
        #[serde(default)]
        combiner: Option<String>,
        #[serde(default, rename = "abstract")]
        is_abstract: bool,
    },
    /// Marks a group abstract
    Abstract { name: String },
    /// An operation (HTTP handler) of a group
    Operation {
        group: String,
        name: String,
        #[serde(default)]
        path: String,
        method: HttpMethod,
        #[serde(default)]
        description: String,
    },
    /// One parameter, or several given as a `name -> type` map
    Parameter {
        group: String,
        operation: String,
        location: ParameterLocation,
        name: ParameterNames,
        #[serde(default, rename = "type")]
        type_spec: Option<String>,
        #[serde(default)]
        required: Option<bool>,
        #[serde(default)]
        description: Option<String>,
    },
    /// A response of an operation
    #[serde(rename_all = "camelCase")]
    Response {
        group: String,
        operation: String,
        status: u16,
        #[serde(default, rename = "type")]
        response_type: Option<String>,
        #[serde(default, rename = "array")]
        is_array: Option<bool>,
        #[serde(default)]
        description: Option<String>,
    },
    /// The shape of an operation's request body
    Body {
        group: String,
        operation: String,
        #[serde(default)]
        kind: Option<String>,
        #[serde(default, rename = "array")]
        is_array: Option<bool>,
    },
    /// A named schema built from a `field -> type` map
    Schema {
        name: String,
        #[serde(default)]
        fields: IndexMap<String, String>,
        #[serde(default, rename = "array")]
        is_array: bool,
    },
}

/// Parameter name(s) of a parameter declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterNames {
    Single(String),
    Map(IndexMap<String, String>),
}

impl Declaration {
    /// Records this declaration in `registry`.
    pub fn apply(self, registry: &mut Registry) -> Result<()> {
        match self {
            Declaration::Group {
                name,
                path,
                related_to,
                combiner,
                is_abstract,
            } => {
                debug!("Declaring group '{}'", name);
                let mut group = RouteGroup::new(name).with_path(path);
                group.related_group = related_to;
                group.path_combiner = combiner;
                group.is_abstract = is_abstract;
                registry.upsert_group(group);
            }
            Declaration::Abstract { name } => {
                debug!("Declaring abstract group '{}'", name);
                registry.mark_abstract(&name);
            }
            Declaration::Operation {
                group,
                name,
                path,
                method,
                description,
            } => {
                debug!("Declaring operation {} '{}' in group '{}'", method, name, group);
                let path = paths::normalize(&path).to_string();
                let mut operation = Operation::new(name.as_str())
                    .with_method(method)
                    .with_description(description);
                for param in paths::params_from_path(&path) {
                    operation = operation.with_param(ParameterLocation::UrlPath, param);
                }
                operation.path = path;
                registry.upsert_operation(&group, &name, operation);
            }
            Declaration::Parameter {
                group,
                operation,
                location,
                name,
                type_spec,
                required,
                description,
            } => match name {
                ParameterNames::Single(name) => {
                    if location == ParameterLocation::Body
                        && type_spec.is_none()
                        && name.starts_with(REFERENCE_PREFIX)
                    {
                        let kind: BodyKind = name.parse()?;
                        registry.set_body_kind(&group, &operation, Some(kind), None);
                        return Ok(());
                    }

                    let spec = type_spec.as_deref().unwrap_or(DEFAULT_TYPE);
                    let mut param = Parameter::normalize(name, spec, required, None);
                    if let Some(description) = description {
                        param = param.with_description(description);
                    }
                    registry.upsert_parameter(&group, &operation, location, param);
                }
                ParameterNames::Map(fields) => {
                    if type_spec.is_some() {
                        return Err(Error::InvalidDeclaration(format!(
                            "parameter map of {}.{} cannot also carry a type",
                            group, operation
                        )));
                    }
                    for (field, spec) in fields {
                        let param = Parameter::normalize(field, &spec, required, None);
                        registry.upsert_parameter(&group, &operation, location, param);
                    }
                }
            },
            Declaration::Response {
                group,
                operation,
                status,
                response_type,
                is_array,
                description,
            } => {
                let mut response = Response::new(status)
                    .with_type(response_type.as_deref().unwrap_or(DEFAULT_TYPE));
                if let Some(is_array) = is_array {
                    response = response.with_array(is_array);
                }
                if let Some(description) = description {
                    response = response.with_description(description);
                }
                registry.upsert_response(&group, &operation, response);
            }
            Declaration::Body {
                group,
                operation,
                kind,
                is_array,
            } => {
                let kind = kind.map(|kind| kind.parse::<BodyKind>()).transpose()?;
                registry.set_body_kind(&group, &operation, kind, is_array);
            }
            Declaration::Schema {
                name,
                fields,
                is_array,
            } => {
                let kind = if is_array {
                    SchemaKind::Array
                } else {
                    SchemaKind::Object
                };
                registry.register_schema(&name, fields, kind);
            }
        }
        Ok(())
    }
}

/// Applies declarations in order, stopping at the first invalid one.
pub fn apply_all<I>(registry: &mut Registry, declarations: I) -> Result<()>
where
    I: IntoIterator<Item = Declaration>,
{
    declarations
        .into_iter()
        .try_for_each(|declaration| declaration.apply(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_spec::TypeSpec;
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str) -> Vec<Declaration> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_deserialize_declarations() {
        let declarations = parse(
            r##"
- declare: group
  name: Dog
  path: dog
  relatedTo: Owner
  combiner: /:ownerId/
- declare: abstract
  name: Entity
- declare: operation
  group: Dog
  name: getDogs
  path: /
  method: get
- declare: parameter
  group: Dog
  operation: getDogs
  location: urlPath
  name: id
  type: "number*"
- declare: response
  group: Dog
  operation: getDogs
  status: 200
  type: "#/Dog"
  array: true
"##,
        );

        assert_eq!(declarations.len(), 5);
        assert_eq!(
            declarations[0],
            Declaration::Group {
                name: "Dog".to_string(),
                path: "dog".to_string(),
                related_to: Some("Owner".to_string()),
                combiner: Some("/:ownerId/".to_string()),
                is_abstract: false,
            }
        );
        assert!(matches!(
            &declarations[3],
            Declaration::Parameter { name: ParameterNames::Single(n), location: ParameterLocation::UrlPath, .. } if n == "id"
        ));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let result: std::result::Result<Vec<Declaration>, _> = serde_yaml::from_str(
            r#"
- declare: operation
  group: Dog
  name: trace
  method: trace
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_operation_declares_path_params() {
        let mut registry = Registry::new();
        apply_all(
            &mut registry,
            parse(
                r#"
- declare: operation
  group: Owner
  name: getOwnerById
  path: /:id/
  method: get
"#,
            ),
        )
        .unwrap();

        let op = registry.find_operation("Owner", "getOwnerById").unwrap();
        assert_eq!(op.path, ":id");
        assert_eq!(op.method, Some(HttpMethod::Get));
        let id = op.find_param(ParameterLocation::UrlPath, "id").unwrap();
        assert!(id.required);
        assert!(id.type_spec.is_default());
    }

    #[test]
    fn test_param_type_survives_operation_redeclaration() {
        let mut registry = Registry::new();
        apply_all(
            &mut registry,
            parse(
                r#"
- declare: parameter
  group: Owner
  operation: getOwnerById
  location: urlPath
  name: id
  type: number
- declare: operation
  group: Owner
  name: getOwnerById
  path: /:id
  method: get
"#,
            ),
        )
        .unwrap();

        let id = registry
            .find_parameter("Owner", "getOwnerById", ParameterLocation::UrlPath, "id")
            .unwrap();
        assert_eq!(id.type_spec, TypeSpec::Primitive("number".to_string()));
    }

    #[test]
    fn test_parameter_map() {
        let mut registry = Registry::new();
        apply_all(
            &mut registry,
            parse(
                r#"
- declare: parameter
  group: Dog
  operation: createDog
  location: body
  name: { name: "string*", toys: "string[]*" }
"#,
            ),
        )
        .unwrap();

        let op = registry.find_operation("Dog", "createDog").unwrap();
        assert_eq!(op.body_params.len(), 2);
        assert_eq!(op.body_kind, Some(BodyKind::Object));
        assert!(op.body_params.iter().all(|p| p.required));
        assert!(op.body_params[1].is_array);
    }

    #[test]
    fn test_parameter_description() {
        let mut registry = Registry::new();
        apply_all(
            &mut registry,
            parse(
                r#"
- declare: parameter
  group: Dog
  operation: getDogs
  location: query
  name: page
  type: number
  description: Page to return, starting at 1
- declare: parameter
  group: Dog
  operation: getDogs
  location: query
  name: size
"#,
            ),
        )
        .unwrap();

        let op = registry.find_operation("Dog", "getDogs").unwrap();
        let page = op.find_param(ParameterLocation::Query, "page").unwrap();
        assert_eq!(page.description.as_deref(), Some("Page to return, starting at 1"));
        let size = op.find_param(ParameterLocation::Query, "size").unwrap();
        assert!(size.description.is_none());
    }

    #[test]
    fn test_parameter_map_with_type_is_invalid() {
        let mut registry = Registry::new();
        let result = apply_all(
            &mut registry,
            parse(
                r#"
- declare: parameter
  group: Dog
  operation: createDog
  location: body
  name: { name: string }
  type: number
"#,
            ),
        );
        assert!(matches!(result, Err(Error::InvalidDeclaration(_))));
    }

    #[test]
    fn test_reference_body() {
        let mut registry = Registry::new();
        apply_all(
            &mut registry,
            parse(
                r##"
- declare: parameter
  group: Dog
  operation: findOrCreate
  location: body
  name: "#/Dog"
"##,
            ),
        )
        .unwrap();

        let op = registry.find_operation("Dog", "findOrCreate").unwrap();
        assert_eq!(op.body_kind, Some(BodyKind::Reference("Dog".to_string())));
        assert!(op.body_params.is_empty());
    }

    #[test]
    fn test_body_declaration() {
        let mut registry = Registry::new();
        apply_all(
            &mut registry,
            parse(
                r#"
- declare: body
  group: Dog
  operation: deleteDogs
  array: true
- declare: body
  group: Dog
  operation: deleteDogs
  kind: string
"#,
            ),
        )
        .unwrap();

        let op = registry.find_operation("Dog", "deleteDogs").unwrap();
        assert_eq!(op.body_kind, Some(BodyKind::String));
        assert!(op.body_is_array);
    }

    #[test]
    fn test_invalid_body_kind() {
        let mut registry = Registry::new();
        let result = Declaration::Body {
            group: "Dog".to_string(),
            operation: "upload".to_string(),
            kind: Some("blob".to_string()),
            is_array: None,
        }
        .apply(&mut registry);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_defaults() {
        let mut registry = Registry::new();
        apply_all(
            &mut registry,
            parse(
                r#"
- declare: response
  group: Dog
  operation: updateDog
  status: 403
  description: FORBIDDEN
- declare: response
  group: Dog
  operation: updateDog
  status: 204
"#,
            ),
        )
        .unwrap();

        let forbidden = registry.find_response("Dog", "updateDog", 403).unwrap();
        assert_eq!(forbidden.description, "FORBIDDEN");
        assert!(forbidden.response_type.is_default());
        assert!(!forbidden.is_array);

        let ok = registry.find_response("Dog", "updateDog", 204).unwrap();
        assert_eq!(ok.description, "OK");
    }

    #[test]
    fn test_schema_declaration() {
        let mut registry = Registry::new();
        apply_all(
            &mut registry,
            parse(
                r##"
- declare: schema
  name: Owner
  fields: { id: string, dogs: "#/Dog[]" }
- declare: schema
  name: Dogs
  fields: { name: string }
  array: true
"##,
            ),
        )
        .unwrap();

        let owner = registry.find_schema("Owner").unwrap();
        assert_eq!(owner.kind, SchemaKind::Object);
        assert_eq!(owner.fields[1].type_spec, TypeSpec::Reference("Dog".to_string()));
        assert!(owner.fields[1].is_array);
        assert_eq!(registry.find_schema("Dogs").unwrap().kind, SchemaKind::Array);
    }

    #[test]
    fn test_abstract_declaration_order_independent() {
        let abstract_first = parse(
            r#"
- declare: abstract
  name: Entity
- declare: operation
  group: Entity
  name: getById
  path: /:id/
  method: get
- declare: group
  name: Student
  path: /students/
  relatedTo: Entity
"#,
        );
        let abstract_last = vec![
            abstract_first[2].clone(),
            abstract_first[1].clone(),
            abstract_first[0].clone(),
        ];

        for declarations in [abstract_first, abstract_last] {
            let mut registry = Registry::new();
            apply_all(&mut registry, declarations).unwrap();

            let op = registry.find_operation("Student", "getById").unwrap();
            assert_eq!(op.path, ":id");
            assert_eq!(op.method, Some(HttpMethod::Get));
        }
    }
}
