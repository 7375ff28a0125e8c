//! Swagger 2.0 document object model.
//!
//! These types only describe the output shape; [`DocumentCompiler`](crate::compiler::DocumentCompiler)
//! fills them in. Maps are insertion-ordered so that compiling the same
//! registry twice yields byte-identical text.

use crate::registry::HttpMethod;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerDocument {
    /// Swagger version, always `2.0`
    pub swagger: String,
    /// API info
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    /// API paths (composed URL -> operations)
    pub paths: IndexMap<String, PathItem>,
    /// Named schemas
    pub definitions: IndexMap<String, Schema>,
}

/// Swagger Info object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub version: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub license: Named,
    pub contact: Named,
}

/// A `{ name }` object, used for license and contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

/// All operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<OperationObject>,
}

impl PathItem {
    /// Stores `operation` under `method`, replacing any previous one.
    pub fn set(&mut self, method: HttpMethod, operation: OperationObject) -> Option<OperationObject> {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
        };
        slot.replace(operation)
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&OperationObject> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
        }
    }
}

/// A single documented operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterObject>,
    /// Responses keyed by status code
    pub responses: IndexMap<String, ResponseObject>,
}

/// Where a documented parameter is located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    Path,
    Query,
    Header,
    Body,
}

/// Swagger Parameter object
///
/// Non-body parameters carry `type` (and `items` for arrays); the body
/// parameter carries `schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterObject {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterIn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Swagger Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseObject {
    pub description: String,
    pub schema: Schema,
}

/// Swagger Schema object (the subset this tool emits)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    pub fn of_type(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Default::default()
        }
    }

    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    /// An array schema whose items are `items`.
    pub fn array_of(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_serialization_skips_empty_fields() {
        let schema = Schema::array_of(Schema::reference("#/definitions/Dog"));
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "type": "array", "items": { "$ref": "#/definitions/Dog" } })
        );
    }

    #[test]
    fn test_path_item_set_replaces() {
        let op = |id: &str| OperationObject {
            description: None,
            operation_id: id.to_string(),
            produces: vec![],
            parameters: vec![],
            responses: IndexMap::new(),
        };

        let mut item = PathItem::default();
        assert!(item.set(HttpMethod::Get, op("first")).is_none());
        let replaced = item.set(HttpMethod::Get, op("second")).unwrap();

        assert_eq!(replaced.operation_id, "first");
        assert_eq!(item.operation(HttpMethod::Get).unwrap().operation_id, "second");
        assert!(item.operation(HttpMethod::Post).is_none());
    }

    #[test]
    fn test_parameter_location_names() {
        let param = ParameterObject {
            name: "id".to_string(),
            location: ParameterIn::Path,
            description: None,
            required: Some(true),
            param_type: Some("number".to_string()),
            items: None,
            schema: None,
        };
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["in"], "path");
        assert_eq!(json["type"], "number");
        assert!(json.get("schema").is_none());
    }
}
