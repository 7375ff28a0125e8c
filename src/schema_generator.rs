use crate::document::Schema;
use crate::registry::{BodyKind, NamedSchema, Operation, Registry, Response, SchemaKind};
use crate::type_spec::{Parameter, TypeSpec};
use indexmap::IndexMap;
use log::{debug, warn};

/// Schema generator - expands declared types into document schemas
///
/// Every type ends up as either a `$ref` into `definitions` or a primitive
/// `type`, wrapped in an array schema when the declaration says so.
pub struct SchemaGenerator<'a> {
    /// Registry used to check that referenced schemas exist
    registry: &'a Registry,
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Schema for a single type, optionally array-wrapped
    pub fn type_schema(&self, type_spec: &TypeSpec, is_array: bool) -> Schema {
        let schema = match type_spec.definition_ref() {
            Some(pointer) => {
                if self.registry.find_schema(&type_spec.to_string()).is_none() {
                    warn!("Reference to unregistered schema '{}'", type_spec);
                }
                Schema::reference(pointer)
            }
            None => Schema::of_type(type_spec.to_string()),
        };

        if is_array {
            Schema::array_of(schema)
        } else {
            schema
        }
    }

    /// Schema for a parameter or schema field
    pub fn field_schema(&self, field: &Parameter) -> Schema {
        self.type_schema(&field.type_spec, field.is_array)
    }

    /// Object schema built from a list of fields
    ///
    /// Fields flagged required are listed in `required`.
    pub fn object_schema(&self, fields: &[Parameter]) -> Schema {
        let properties: IndexMap<String, Schema> = fields
            .iter()
            .map(|field| (field.name.clone(), self.field_schema(field)))
            .collect();

        let required: Vec<String> = fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.clone())
            .collect();

        Schema {
            schema_type: Some("object".to_string()),
            required: if required.is_empty() { None } else { Some(required) },
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// Schema of an operation's request body
    pub fn body_schema(&self, operation: &Operation) -> Schema {
        debug!("Generating body schema for operation: {}", operation.name);

        match &operation.body_kind {
            Some(BodyKind::String) => self.type_schema(
                &TypeSpec::Primitive("string".to_string()),
                operation.body_is_array,
            ),
            Some(BodyKind::Number) => self.type_schema(
                &TypeSpec::Primitive("number".to_string()),
                operation.body_is_array,
            ),
            Some(BodyKind::Reference(name)) => self.type_schema(
                &TypeSpec::Reference(name.clone()),
                operation.body_is_array,
            ),
            Some(BodyKind::Array) => Schema::array_of(self.object_schema(&operation.body_params)),
            Some(BodyKind::Object) | None => {
                let object = self.object_schema(&operation.body_params);
                if operation.body_is_array {
                    Schema::array_of(object)
                } else {
                    object
                }
            }
        }
    }

    /// Schema of a declared response
    pub fn response_schema(&self, response: &Response) -> Schema {
        self.type_schema(&response.response_type, response.is_array)
    }

    /// `definitions` entry for a named schema
    pub fn definition_schema(&self, schema: &NamedSchema) -> Schema {
        debug!("Generating definition for schema: {}", schema.name);

        match schema.kind {
            SchemaKind::Object => self.object_schema(&schema.fields),
            SchemaKind::Array => Schema::array_of(self.object_schema(&schema.fields)),
            SchemaKind::String | SchemaKind::Number => Schema::of_type(schema.kind.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ParameterLocation;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn to_json(schema: &Schema) -> serde_json::Value {
        serde_json::to_value(schema).unwrap()
    }

    fn body_op(fields: &[(&str, &str)]) -> Operation {
        fields.iter().fold(Operation::new("createDog"), |op, (name, spec)| {
            op.with_param(
                ParameterLocation::Body,
                Parameter::normalize(*name, spec, None, None),
            )
        })
    }

    #[test]
    fn test_primitive_and_reference_types() {
        let mut registry = Registry::new();
        registry.register_schema("Dog", [("id", "string")], SchemaKind::Object);
        let generator = SchemaGenerator::new(&registry);

        assert_eq!(
            to_json(&generator.type_schema(&TypeSpec::Primitive("number".to_string()), false)),
            json!({ "type": "number" })
        );
        assert_eq!(
            to_json(&generator.type_schema(&TypeSpec::Reference("Dog".to_string()), true)),
            json!({ "type": "array", "items": { "$ref": "#/definitions/Dog" } })
        );
    }

    #[test]
    fn test_object_body_with_required_fields() {
        let registry = Registry::new();
        let generator = SchemaGenerator::new(&registry);
        let op = body_op(&[("name", "string*"), ("toys", "string[]*"), ("age", "number")]);

        assert_eq!(
            to_json(&generator.body_schema(&op)),
            json!({
                "type": "object",
                "required": ["name", "toys"],
                "properties": {
                    "name": { "type": "string" },
                    "toys": { "type": "array", "items": { "type": "string" } },
                    "age": { "type": "number" }
                }
            })
        );
    }

    #[test]
    fn test_object_body_without_required_fields() {
        let registry = Registry::new();
        let generator = SchemaGenerator::new(&registry);
        let schema = generator.body_schema(&body_op(&[("owner", "#/Owner")]));

        assert!(schema.required.is_none());
        assert_eq!(
            to_json(&schema)["properties"]["owner"],
            json!({ "$ref": "#/definitions/Owner" })
        );
    }

    #[test]
    fn test_scalar_array_body() {
        let registry = Registry::new();
        let generator = SchemaGenerator::new(&registry);
        let op = Operation::new("deleteDogs").with_body_kind(BodyKind::String, true);

        assert_eq!(
            to_json(&generator.body_schema(&op)),
            json!({ "type": "array", "items": { "type": "string" } })
        );

        let op = Operation::new("setAge").with_body_kind(BodyKind::Number, false);
        assert_eq!(to_json(&generator.body_schema(&op)), json!({ "type": "number" }));
    }

    #[test]
    fn test_reference_body() {
        let registry = Registry::new();
        let generator = SchemaGenerator::new(&registry);

        let op = Operation::new("findOrCreate").with_body_kind(BodyKind::Reference("Dog".to_string()), false);
        assert_eq!(
            to_json(&generator.body_schema(&op)),
            json!({ "$ref": "#/definitions/Dog" })
        );

        let op = Operation::new("importDogs").with_body_kind(BodyKind::Reference("Dog".to_string()), true);
        assert_eq!(
            to_json(&generator.body_schema(&op)),
            json!({ "type": "array", "items": { "$ref": "#/definitions/Dog" } })
        );
    }

    #[test]
    fn test_array_of_objects_body() {
        let registry = Registry::new();
        let generator = SchemaGenerator::new(&registry);
        let mut op = body_op(&[("name", "string")]);
        op.body_is_array = true;

        assert_eq!(
            to_json(&generator.body_schema(&op)),
            json!({
                "type": "array",
                "items": { "type": "object", "properties": { "name": { "type": "string" } } }
            })
        );
    }

    #[test]
    fn test_response_schema() {
        let registry = Registry::new();
        let generator = SchemaGenerator::new(&registry);

        let response = Response::new(200).with_type("#/Dog").with_array(true);
        assert_eq!(
            to_json(&generator.response_schema(&response)),
            json!({ "type": "array", "items": { "$ref": "#/definitions/Dog" } })
        );
        assert_eq!(
            to_json(&generator.response_schema(&Response::new(403))),
            json!({ "type": "string" })
        );
    }

    #[test]
    fn test_definitions() {
        let mut registry = Registry::new();
        registry.register_schema(
            "Owner",
            [("id", "string"), ("dogs", "#/Dog[]")],
            SchemaKind::Object,
        );
        registry.register_schema("Dogs", [("name", "string")], SchemaKind::Array);
        registry.register_schema("Name", Vec::<(String, String)>::new(), SchemaKind::String);
        let generator = SchemaGenerator::new(&registry);

        let owner = generator.definition_schema(&registry.schemas()[0]);
        assert_eq!(
            to_json(&owner),
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "dogs": { "type": "array", "items": { "$ref": "#/definitions/Dog" } }
                }
            })
        );

        let dogs = generator.definition_schema(&registry.schemas()[1]);
        assert_eq!(
            to_json(&dogs),
            json!({
                "type": "array",
                "items": { "type": "object", "properties": { "name": { "type": "string" } } }
            })
        );

        let name = generator.definition_schema(&registry.schemas()[2]);
        assert_eq!(to_json(&name), json!({ "type": "string" }));
    }
}
