//! In-memory store of route groups, operations and named schemas.
//!
//! Declarations may arrive in any order and may describe the same record more
//! than once. Every mutating entry point therefore finds or creates its target
//! by name and merges the incoming data into it:
//!
//! - scalar fields follow a "non-empty wins" rule: an empty string, `None` or
//!   `false` never overwrites a stored value
//! - parameters are keyed by name within their list and responses by status
//! - a parameter whose stored type is not the default type is never reset to
//!   the default type by a later, type-less declaration
//!
//! Records refer to each other by name only. A group that names a related
//! group which does not exist yet gets an empty placeholder for it, filled in
//! when the related group is declared.
//!
//! # Abstract groups
//!
//! An abstract group has no documented paths of its own; it donates its
//! operations to the groups related to it. Donation always goes through
//! [`Registry::complement_operation`], which only adds what the receiving
//! group lacks:
//!
//! - when a group declares a relation to an abstract group, every operation
//!   currently stored on the abstract group is copied down by value
//! - when an operation is later upserted on an abstract group (or a group is
//!   later marked abstract), the operation is complemented into every group
//!   already related to it, recursively through abstract intermediates

use crate::error::{Error, Result};
use crate::paths;
use crate::type_spec::{parse_type, Parameter, TypeSpec, REFERENCE_PREFIX};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// HTTP methods an operation can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Status code of the response synthesized for operations that declare none.
    pub fn default_status(&self) -> u16 {
        match self {
            HttpMethod::Get => 200,
            HttpMethod::Post => 201,
            HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete => 204,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a declared parameter travels in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    UrlPath,
    Query,
    Header,
    Body,
}

impl ParameterLocation {
    pub const ALL: [ParameterLocation; 4] = [
        ParameterLocation::UrlPath,
        ParameterLocation::Query,
        ParameterLocation::Header,
        ParameterLocation::Body,
    ];
}

/// Shape of an operation's request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyKind {
    Object,
    Array,
    String,
    Number,
    /// The whole body is a named schema
    Reference(String),
}

impl FromStr for BodyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(name) = s.strip_prefix(REFERENCE_PREFIX) {
            return Ok(BodyKind::Reference(name.to_string()));
        }
        match s {
            "object" => Ok(BodyKind::Object),
            "array" => Ok(BodyKind::Array),
            "string" => Ok(BodyKind::String),
            "number" => Ok(BodyKind::Number),
            other => Err(Error::UnknownBodyKind(other.to_string())),
        }
    }
}

/// Kind of a named schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Number,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
        }
    }
}

/// A declared response of an operation, keyed by status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub description: String,
    pub response_type: TypeSpec,
    pub is_array: bool,
}

impl Response {
    /// A plain `string` response described as `OK`.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            description: "OK".to_string(),
            response_type: TypeSpec::default(),
            is_array: false,
        }
    }

    /// Sets the response type from a type string; `#/Dog[]` yields an array of `Dog`.
    pub fn with_type(mut self, spec: &str) -> Self {
        let parsed = parse_type(spec, None, None);
        self.response_type = parsed.type_spec;
        self.is_array = self.is_array || parsed.is_array;
        self
    }

    pub fn with_array(mut self, is_array: bool) -> Self {
        self.is_array = is_array;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn merge(&mut self, incoming: Response) {
        if !incoming.description.is_empty() {
            self.description = incoming.description;
        }
        if !(incoming.response_type.is_default() && !self.response_type.is_default()) {
            self.response_type = incoming.response_type;
        }
        if incoming.is_array {
            self.is_array = true;
        }
    }
}

/// A reusable schema, referenced from types as `#/Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSchema {
    pub name: String,
    pub kind: SchemaKind,
    pub fields: Vec<Parameter>,
}

/// One HTTP handler within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub path: String,
    pub method: Option<HttpMethod>,
    pub description: String,
    pub url_params: Vec<Parameter>,
    pub query_params: Vec<Parameter>,
    pub header_params: Vec<Parameter>,
    pub body_params: Vec<Parameter>,
    pub body_kind: Option<BodyKind>,
    pub body_is_array: bool,
    pub responses: Vec<Response>,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_param(mut self, location: ParameterLocation, param: Parameter) -> Self {
        self.params_mut(location).push(param);
        self
    }

    pub fn with_body_kind(mut self, kind: BodyKind, is_array: bool) -> Self {
        self.body_kind = Some(kind);
        self.body_is_array = is_array;
        self
    }

    pub fn with_response(mut self, response: Response) -> Self {
        self.responses.push(response);
        self
    }

    pub fn params(&self, location: ParameterLocation) -> &[Parameter] {
        match location {
            ParameterLocation::UrlPath => &self.url_params,
            ParameterLocation::Query => &self.query_params,
            ParameterLocation::Header => &self.header_params,
            ParameterLocation::Body => &self.body_params,
        }
    }

    fn params_mut(&mut self, location: ParameterLocation) -> &mut Vec<Parameter> {
        match location {
            ParameterLocation::UrlPath => &mut self.url_params,
            ParameterLocation::Query => &mut self.query_params,
            ParameterLocation::Header => &mut self.header_params,
            ParameterLocation::Body => &mut self.body_params,
        }
    }

    pub fn find_param(&self, location: ParameterLocation, name: &str) -> Option<&Parameter> {
        self.params(location).iter().find(|p| p.name == name)
    }

    pub fn find_response(&self, status: u16) -> Option<&Response> {
        self.responses.iter().find(|r| r.status == status)
    }

    /// Whether the operation carries a request body at all.
    pub fn has_body(&self) -> bool {
        !self.body_params.is_empty() || self.body_kind.is_some()
    }

    /// Creates or refines a parameter.
    ///
    /// Returns `false` when the update was skipped because it would reset a
    /// typed parameter to the default type.
    pub fn upsert_param(&mut self, location: ParameterLocation, param: Parameter) -> bool {
        let always_required = location == ParameterLocation::UrlPath;
        let list = self.params_mut(location);

        match list.iter_mut().find(|p| p.name == param.name) {
            Some(stored) => {
                if !stored.type_spec.is_default() && param.type_spec.is_default() {
                    debug!(
                        "Keeping type '{}' of parameter '{}'",
                        stored.type_spec, stored.name
                    );
                    return false;
                }
                stored.type_spec = param.type_spec;
                stored.required = param.required || always_required;
                stored.is_array = param.is_array;
                if let Some(description) = param.description.filter(|d| !d.is_empty()) {
                    stored.description = Some(description);
                }
            }
            None => {
                let mut param = param;
                param.required = param.required || always_required;
                list.push(param);
            }
        }

        if location == ParameterLocation::Body && self.body_kind.is_none() {
            self.body_kind = Some(BodyKind::Object);
        }
        true
    }

    pub fn upsert_response(&mut self, response: Response) {
        match self.responses.iter_mut().find(|r| r.status == response.status) {
            Some(stored) => stored.merge(response),
            None => self.responses.push(response),
        }
    }

    /// Merges `incoming` into this operation; non-empty incoming values win.
    pub fn merge(&mut self, mut incoming: Operation) {
        if !incoming.path.is_empty() {
            self.path = std::mem::take(&mut incoming.path);
        }
        if incoming.method.is_some() {
            self.method = incoming.method;
        }
        if !incoming.description.is_empty() {
            self.description = std::mem::take(&mut incoming.description);
        }
        if incoming.body_kind.is_some() {
            self.body_kind = incoming.body_kind.take();
        }
        if incoming.body_is_array {
            self.body_is_array = true;
        }

        for location in ParameterLocation::ALL {
            for param in std::mem::take(incoming.params_mut(location)) {
                self.upsert_param(location, param);
            }
        }
        for response in incoming.responses {
            self.upsert_response(response);
        }
    }

    /// Adds whatever this operation lacks from `donor`, never touching what it has.
    pub fn complement(&mut self, donor: &Operation) {
        if self.path.is_empty() {
            self.path = donor.path.clone();
        }
        if self.method.is_none() {
            self.method = donor.method;
        }
        if self.description.is_empty() {
            self.description = donor.description.clone();
        }
        if self.body_kind.is_none() {
            self.body_kind = donor.body_kind.clone();
        }
        if !self.body_is_array {
            self.body_is_array = donor.body_is_array;
        }

        for location in ParameterLocation::ALL {
            for param in donor.params(location) {
                let list = self.params_mut(location);
                match list.iter_mut().find(|p| p.name == param.name) {
                    // an untyped parameter has not been declared yet, only implied
                    Some(stored) if stored.type_spec.is_default() && !param.type_spec.is_default() => {
                        stored.type_spec = param.type_spec.clone();
                        stored.is_array = param.is_array;
                        stored.required = stored.required || param.required;
                    }
                    Some(_) => {}
                    None => list.push(param.clone()),
                }
            }
        }
        for response in &donor.responses {
            match self.responses.iter_mut().find(|r| r.status == response.status) {
                // same rule as upserts: a default-typed response never hides a typed one
                Some(stored)
                    if stored.response_type.is_default() && !response.response_type.is_default() =>
                {
                    stored.response_type = response.response_type.clone();
                    stored.is_array = stored.is_array || response.is_array;
                }
                Some(_) => {}
                None => self.responses.push(response.clone()),
            }
        }
    }
}

/// A named mount point holding operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGroup {
    pub name: String,
    pub mount_path: String,
    pub related_group: Option<String>,
    pub path_combiner: Option<String>,
    pub is_abstract: bool,
    pub operations: Vec<Operation>,
}

impl RouteGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.mount_path = path.into();
        self
    }

    pub fn related_to(mut self, group: impl Into<String>) -> Self {
        self.related_group = Some(group.into());
        self
    }

    pub fn with_combiner(mut self, combiner: impl Into<String>) -> Self {
        self.path_combiner = Some(combiner.into());
        self
    }

    pub fn abstract_group(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn find_operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }
}

/// The metadata graph every declaration writes into and the compiler reads from.
///
/// Groups keep their insertion order, which is also the order the compiler
/// processes them in.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    groups: IndexMap<String, RouteGroup>,
    schemas: Vec<NamedSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> impl Iterator<Item = &RouteGroup> {
        self.groups.values()
    }

    pub fn schemas(&self) -> &[NamedSchema] {
        &self.schemas
    }

    pub fn find_group(&self, name: &str) -> Option<&RouteGroup> {
        self.groups.get(name)
    }

    pub fn find_operation(&self, group: &str, operation: &str) -> Option<&Operation> {
        self.find_group(group)?.find_operation(operation)
    }

    pub fn find_response(&self, group: &str, operation: &str, status: u16) -> Option<&Response> {
        self.find_operation(group, operation)?.find_response(status)
    }

    pub fn find_parameter(
        &self,
        group: &str,
        operation: &str,
        location: ParameterLocation,
        name: &str,
    ) -> Option<&Parameter> {
        self.find_operation(group, operation)?.find_param(location, name)
    }

    /// Looks a schema up by name, with or without the `#/` prefix.
    ///
    /// When a name was registered twice the first registration is returned.
    pub fn find_schema(&self, name: &str) -> Option<&NamedSchema> {
        let name = name.strip_prefix(REFERENCE_PREFIX).unwrap_or(name);
        self.schemas.iter().find(|schema| schema.name == name)
    }

    pub fn find_or_create_group(&mut self, name: &str) -> &mut RouteGroup {
        self.groups.entry(name.to_string()).or_insert_with(|| {
            debug!("Creating group '{}'", name);
            RouteGroup::new(name)
        })
    }

    pub fn find_or_create_operation(&mut self, group: &str, operation: &str) -> &mut Operation {
        let stored = self.find_or_create_group(group);
        let index = match stored.operations.iter().position(|op| op.name == operation) {
            Some(index) => index,
            None => {
                debug!("Creating operation '{}' in group '{}'", operation, group);
                stored.operations.push(Operation::new(operation));
                stored.operations.len() - 1
            }
        };
        &mut stored.operations[index]
    }

    /// Creates or refines a group, together with any operations it carries.
    pub fn upsert_group(&mut self, group: RouteGroup) {
        let RouteGroup {
            name,
            mount_path,
            related_group,
            path_combiner,
            is_abstract,
            operations,
        } = group;
        let related_group = related_group.filter(|related| !related.is_empty());

        if let Some(related) = &related_group {
            self.find_or_create_group(related);
        }

        let stored = self.find_or_create_group(&name);
        if !mount_path.is_empty() {
            stored.mount_path = mount_path;
        }
        if let Some(related) = &related_group {
            stored.related_group = Some(related.clone());
        }
        if let Some(combiner) = path_combiner.filter(|c| !c.is_empty()) {
            stored.path_combiner = Some(combiner);
        }

        for operation in operations {
            let operation_name = operation.name.clone();
            self.upsert_operation(&name, &operation_name, operation);
        }

        if is_abstract {
            self.mark_abstract(&name);
        }
        if let Some(related) = related_group {
            self.inherit_operations(&name, &related);
        }
    }

    /// Creates or refines an operation, then passes it on if the group is abstract.
    pub fn upsert_operation(&mut self, group: &str, operation: &str, incoming: Operation) {
        self.find_or_create_operation(group, operation).merge(incoming);
        self.propagate(group, operation, &mut HashSet::new());
    }

    /// Adds to an operation only what it does not hold yet.
    pub fn complement_operation(&mut self, group: &str, operation: &str, donor: &Operation) {
        self.find_or_create_operation(group, operation).complement(donor);
        self.propagate(group, operation, &mut HashSet::new());
    }

    /// Creates or refines a single parameter of an operation.
    pub fn upsert_parameter(
        &mut self,
        group: &str,
        operation: &str,
        location: ParameterLocation,
        param: Parameter,
    ) {
        let incoming = Operation::new(operation).with_param(location, param);
        self.upsert_operation(group, operation, incoming);
    }

    pub fn upsert_response(&mut self, group: &str, operation: &str, response: Response) {
        let incoming = Operation::new(operation).with_response(response);
        self.upsert_operation(group, operation, incoming);
    }

    /// Sets the body kind of an operation; `is_array` is only applied when given.
    pub fn set_body_kind(
        &mut self,
        group: &str,
        operation: &str,
        kind: Option<BodyKind>,
        is_array: Option<bool>,
    ) {
        let stored = self.find_or_create_operation(group, operation);
        if let Some(kind) = kind {
            stored.body_kind = Some(kind);
        }
        if let Some(is_array) = is_array {
            stored.body_is_array = is_array;
        }
        self.propagate(group, operation, &mut HashSet::new());
    }

    /// Marks a group abstract and hands its operations to groups related to it.
    pub fn mark_abstract(&mut self, name: &str) {
        let stored = self.find_or_create_group(name);
        stored.is_abstract = true;

        let operations: Vec<String> = stored.operations.iter().map(|op| op.name.clone()).collect();
        for operation in operations {
            self.propagate(name, &operation, &mut HashSet::new());
        }
    }

    /// Registers a named schema from a `field -> type string` map.
    ///
    /// Names are not de-duplicated: registering a name twice stores two records.
    pub fn register_schema<I, K, V>(&mut self, name: &str, fields: I, kind: SchemaKind)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let fields: Vec<Parameter> = fields
            .into_iter()
            .map(|(field, spec)| Parameter::normalize(field, spec.as_ref(), None, None))
            .collect();

        let name = name.strip_prefix(REFERENCE_PREFIX).unwrap_or(name);
        debug!("Registering schema '{}' with {} fields", name, fields.len());
        self.schemas.push(NamedSchema {
            name: name.to_string(),
            kind,
            fields,
        });
    }

    /// Full mount path of a group, following its relation chain.
    ///
    /// Relation cycles are not detected and recurse without bound.
    pub fn resolve_mount_path(&self, name: &str) -> String {
        let Some(group) = self.find_group(name) else {
            return "/".to_string();
        };

        match &group.related_group {
            None => {
                let local = paths::normalize(&group.mount_path);
                if local == "/" || local == "//" {
                    "/".to_string()
                } else {
                    format!("/{}", local)
                }
            }
            Some(related) => {
                let mut segments = vec![self.resolve_mount_path(related)];
                if let Some(combiner) = &group.path_combiner {
                    segments.push(combiner.clone());
                }
                segments.push(group.mount_path.clone());
                paths::compose(&segments)
            }
        }
    }

    /// Names of the groups whose relation points at `name`.
    pub fn related_groups(&self, name: &str) -> Vec<String> {
        self.groups
            .values()
            .filter(|group| group.related_group.as_deref() == Some(name))
            .map(|group| group.name.clone())
            .collect()
    }

    fn inherit_operations(&mut self, child: &str, parent: &str) {
        let donors = match self.find_group(parent) {
            Some(group) if group.is_abstract => group.operations.clone(),
            _ => return,
        };

        debug!(
            "Copying {} operations from abstract group '{}' to '{}'",
            donors.len(),
            parent,
            child
        );
        for donor in &donors {
            self.complement_operation(child, &donor.name, donor);
        }
    }

    fn propagate(&mut self, source: &str, operation: &str, visited: &mut HashSet<String>) {
        if !visited.insert(source.to_string()) {
            return;
        }
        let donor = match self.find_group(source) {
            Some(group) if group.is_abstract => match group.find_operation(operation) {
                Some(op) => op.clone(),
                None => return,
            },
            _ => return,
        };

        for child in self.related_groups(source) {
            self.find_or_create_operation(&child, operation).complement(&donor);
            self.propagate(&child, operation, visited);
        }
    }
}
