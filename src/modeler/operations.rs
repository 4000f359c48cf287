//! Operation/Parameter Builder
//!
//! Maps every path item operation onto a [`Method`], resolving parameter and
//! response schemas through the Type Resolver.

use indexmap::IndexMap;
use tracing::debug;

use super::errors::ResolutionError;
use super::resolver::{TypeResolver, pointer_segment};
use crate::core::utils::{nested_type_name, to_proper_case};
use crate::infrastructure::swagger::{
    HttpMethod, OperationNode, ParameterNode, PathItem, Reference, ReferenceKind,
};
use crate::model::{CollectionFormat, Method, Parameter, ParameterLocation, Response};

/// Splits a `Group_Name` operation id
pub(crate) fn split_operation_id(operation_id: &str) -> (Option<String>, String) {
    match operation_id.split_once('_') {
        Some((group, name)) if !group.is_empty() && !name.is_empty() => {
            (Some(group.to_string()), name.to_string())
        }
        _ => (None, operation_id.to_string()),
    }
}

impl<'a> TypeResolver<'a> {
    /// Builds the methods of every operation selected by the configuration
    pub(crate) fn build_methods(&mut self) -> Vec<Method> {
        let document = self.document;
        let mut methods = Vec::new();

        for (path, item) in &document.paths {
            for (http_method, operation) in item.operations() {
                if let Some(method) = self.build_method(path, item, http_method, operation) {
                    methods.push(method);
                }
            }
        }
        methods
    }

    fn build_method(
        &mut self,
        path: &str,
        item: &'a PathItem,
        http_method: HttpMethod,
        operation: &'a OperationNode,
    ) -> Option<Method> {
        let document = self.document;
        let path_pointer = format!("#/paths/{}", pointer_segment(path));
        let pointer = format!("{path_pointer}/{http_method}");

        let Some(operation_id) = operation.operation_id.as_deref() else {
            return self.fail(ResolutionError::schema(
                format!("{} {path}", http_method.to_string().to_uppercase()),
                format!("operation at '{pointer}' has no operationId"),
            ));
        };
        if !self.config.includes_operation(operation_id) {
            debug!("Skipping operation '{operation_id}' excluded by configuration");
            return None;
        }

        let (group, name) = split_operation_id(operation_id);
        let type_prefix = to_proper_case(operation_id);

        let mut parameters = Vec::new();
        let declared =
            self.merged_parameters(item, operation, &path_pointer, &pointer, operation_id);
        for (node, node_pointer) in declared {
            if let Some(parameter) =
                self.build_parameter(node, &node_pointer, operation_id, &type_prefix)
            {
                parameters.push(parameter);
            }
        }

        let mut responses = IndexMap::new();
        let mut default_response = None;
        let mut inline_bodies = 0;
        for (status, response) in &operation.responses {
            let body = match &response.schema {
                None => None,
                Some(schema) => {
                    let suggested = if schema.reference.is_some() || inline_bodies == 0 {
                        nested_type_name(&type_prefix, "Response")
                    } else {
                        nested_type_name(&type_prefix, &format!("Response_{status}"))
                    };
                    if schema.reference.is_none() {
                        inline_bodies += 1;
                    }
                    let schema_pointer =
                        format!("{pointer}/responses/{}/schema", pointer_segment(status));
                    let Some(body) = self.resolve(schema, &suggested, &schema_pointer, operation_id)
                    else {
                        continue;
                    };
                    Some(body)
                }
            };

            let response = Response {
                description: response.description.clone(),
                body,
            };
            if status == "default" {
                default_response = Some(response);
            } else {
                responses.insert(status.clone(), response);
            }
        }

        debug!(
            "Modeled operation '{operation_id}' ({} {path}) with {} parameters",
            http_method.to_string().to_uppercase(),
            parameters.len()
        );

        Some(Method {
            operation_id: operation_id.to_string(),
            group,
            name,
            http_method,
            url: path.to_string(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            deprecated: operation.deprecated,
            consumes: operation
                .consumes
                .clone()
                .unwrap_or_else(|| document.consumes.clone()),
            produces: operation
                .produces
                .clone()
                .unwrap_or_else(|| document.produces.clone()),
            parameters,
            responses,
            default_response,
        })
    }

    /// Path-level parameters followed by operation parameters; an operation
    /// parameter replaces a path-level one with the same name and location
    fn merged_parameters(
        &mut self,
        item: &'a PathItem,
        operation: &'a OperationNode,
        path_pointer: &str,
        pointer: &str,
        operation_id: &str,
    ) -> Vec<(&'a ParameterNode, String)> {
        let declared = item
            .parameters
            .iter()
            .enumerate()
            .map(|(index, node)| (node, format!("{path_pointer}/parameters/{index}")))
            .chain(
                operation
                    .parameters
                    .iter()
                    .enumerate()
                    .map(|(index, node)| (node, format!("{pointer}/parameters/{index}"))),
            );

        let mut merged: Vec<(&'a ParameterNode, String)> = Vec::new();
        for (node, node_pointer) in declared {
            let Some(node) = self.dereference_parameter(node, &node_pointer, operation_id) else {
                continue;
            };
            let key = (node.name.as_deref(), node.location.as_deref());
            match merged
                .iter()
                .position(|(p, _)| (p.name.as_deref(), p.location.as_deref()) == key)
            {
                Some(index) => merged[index] = (node, node_pointer),
                None => merged.push((node, node_pointer)),
            }
        }
        merged
    }

    fn dereference_parameter(
        &mut self,
        node: &'a ParameterNode,
        pointer: &str,
        owner: &str,
    ) -> Option<&'a ParameterNode> {
        let Some(reference) = node.reference.as_deref() else {
            return Some(node);
        };
        let document = self.document;

        match Reference::parse(reference) {
            Some(Reference {
                kind: ReferenceKind::Parameter,
                name,
            }) => match document.parameters.get(&name) {
                Some(shared) if shared.reference.is_none() => Some(shared),
                Some(_) => self.fail(ResolutionError::schema(
                    owner,
                    format!("shared parameter '{name}' must not itself be a reference"),
                )),
                None => self.fail(ResolutionError::schema(
                    owner,
                    format!("parameter reference '{reference}' at '{pointer}' names no shared parameter"),
                )),
            },
            _ => self.fail(ResolutionError::schema(
                owner,
                format!("unsupported parameter reference '{reference}' at '{pointer}'"),
            )),
        }
    }

    fn build_parameter(
        &mut self,
        node: &ParameterNode,
        pointer: &str,
        operation_id: &str,
        type_prefix: &str,
    ) -> Option<Parameter> {
        let Some(name) = node.name.as_deref() else {
            return self.fail(ResolutionError::schema(
                operation_id,
                format!("parameter at '{pointer}' has no name"),
            ));
        };
        let Some(location) = node.location.as_deref().and_then(ParameterLocation::parse) else {
            return self.fail(ResolutionError::schema(
                operation_id,
                format!(
                    "parameter '{name}' has unsupported location '{}'",
                    node.location.as_deref().unwrap_or("<none>")
                ),
            ));
        };
        let suggested = nested_type_name(type_prefix, name);

        let (model_type, constraints, collection_format) = if location == ParameterLocation::Body
        {
            let Some(schema) = node.schema.as_ref() else {
                return self.fail(ResolutionError::schema(
                    operation_id,
                    format!("body parameter '{name}' has no schema"),
                ));
            };
            let schema_pointer = format!("{pointer}/schema");
            let model_type = self.resolve(schema, &suggested, &schema_pointer, operation_id)?;
            let constraints = self.constraints(schema, &schema_pointer, operation_id)?;
            (model_type, constraints, None)
        } else {
            if node.schema_type.is_none() {
                return self.fail(ResolutionError::schema(
                    operation_id,
                    format!("{location} parameter '{name}' declares no type"),
                ));
            }
            let schema = node.as_schema();
            let model_type = self.resolve(&schema, &suggested, pointer, operation_id)?;
            let constraints = self.constraints(&schema, pointer, operation_id)?;
            let collection_format = match node.collection_format.as_deref() {
                None => None,
                Some(format) => match CollectionFormat::parse(format) {
                    Some(collection_format) => Some(collection_format),
                    None => {
                        return self.fail(ResolutionError::schema(
                            operation_id,
                            format!("parameter '{name}' has unsupported collectionFormat '{format}'"),
                        ));
                    }
                },
            };
            (model_type, constraints, collection_format)
        };

        Some(Parameter {
            name: name.to_string(),
            location,
            required: node.required || location == ParameterLocation::Path,
            model_type,
            collection_format,
            description: node.description.clone(),
            default_value: node.default.clone(),
            constraints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelerConfig;
    use crate::infrastructure::swagger::{SwaggerDocument, SwaggerParser};
    use crate::model::{ModelType, PrimaryType};
    use serde_json::json;

    fn document(paths: serde_json::Value) -> SwaggerDocument {
        SwaggerParser::new(json!({
            "swagger": "2.0",
            "info": { "title": "Pet Store", "version": "1.0" },
            "produces": ["application/json"],
            "parameters": {
                "ApiVersion": { "name": "api-version", "in": "query", "required": true, "type": "string" }
            },
            "definitions": {
                "Pet": { "properties": { "name": { "type": "string" } } },
                "Error": { "properties": { "message": { "type": "string" } } }
            },
            "paths": paths
        }))
        .parse()
        .unwrap()
    }

    #[test]
    fn test_split_operation_id() {
        assert_eq!(
            split_operation_id("Pets_List"),
            (Some("Pets".to_string()), "List".to_string())
        );
        assert_eq!(split_operation_id("listPets"), (None, "listPets".to_string()));
        assert_eq!(split_operation_id("_List"), (None, "_List".to_string()));
    }

    #[test]
    fn test_build_method_with_shared_and_overridden_parameters() {
        let document = document(json!({
            "/pets/{petId}": {
                "parameters": [
                    { "name": "petId", "in": "path", "type": "string" },
                    { "name": "verbose", "in": "query", "type": "boolean" }
                ],
                "get": {
                    "operationId": "Pets_Get",
                    "parameters": [
                        { "$ref": "#/parameters/ApiVersion" },
                        { "name": "verbose", "in": "query", "type": "integer" }
                    ],
                    "responses": {
                        "200": { "description": "OK", "schema": { "$ref": "#/definitions/Pet" } },
                        "default": { "description": "Error", "schema": { "$ref": "#/definitions/Error" } }
                    }
                }
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        let methods = resolver.build_methods();
        assert!(resolver.errors.is_empty(), "{:?}", resolver.errors);
        let method = &methods[0];
        assert_eq!(method.group.as_deref(), Some("Pets"));
        assert_eq!(method.name, "Get");
        assert_eq!(method.produces, vec!["application/json".to_string()]);

        let names: Vec<_> = method.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["petId", "verbose", "api-version"]);
        assert!(method.parameter("petId").unwrap().required);
        assert_eq!(
            method.parameter("verbose").unwrap().model_type,
            ModelType::Primary(PrimaryType::Int)
        );

        let pet = resolver.registry().find_composite("Pet").unwrap();
        assert_eq!(method.responses["200"].body, Some(ModelType::Composite(pet)));
        let error = resolver.registry().find_composite("Error").unwrap();
        assert_eq!(
            method.default_response.as_ref().and_then(|r| r.body.clone()),
            Some(ModelType::Composite(error))
        );
    }

    #[test]
    fn test_inline_body_and_response_names() {
        let document = document(json!({
            "/pets": {
                "post": {
                    "operationId": "Pets_Create",
                    "parameters": [{
                        "name": "body",
                        "in": "body",
                        "required": true,
                        "schema": { "properties": { "name": { "type": "string" } } }
                    }],
                    "responses": {
                        "200": { "description": "OK", "schema": { "properties": { "id": { "type": "string" } } } },
                        "201": { "description": "Created", "schema": { "properties": { "id": { "type": "string" } } } }
                    }
                }
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        let methods = resolver.build_methods();
        assert!(resolver.errors.is_empty(), "{:?}", resolver.errors);
        let registry = resolver.registry();
        assert!(registry.find_composite("PetsCreateBody").is_some());
        assert!(registry.find_composite("PetsCreateResponse").is_some());
        assert!(registry.find_composite("PetsCreateResponse201").is_some());
        assert_eq!(methods[0].parameter("body").unwrap().location, ParameterLocation::Body);
    }

    #[test]
    fn test_array_query_parameter_with_collection_format() {
        let document = document(json!({
            "/pets": {
                "get": {
                    "operationId": "Pets_List",
                    "parameters": [{
                        "name": "tags",
                        "in": "query",
                        "type": "array",
                        "items": { "type": "string" },
                        "collectionFormat": "pipes"
                    }],
                    "responses": {}
                }
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        let methods = resolver.build_methods();
        let tags = methods[0].parameter("tags").unwrap();
        assert_eq!(tags.collection_format, Some(CollectionFormat::Pipes));
        assert_eq!(
            tags.model_type,
            ModelType::Sequence(Box::new(ModelType::Primary(PrimaryType::String)))
        );
    }

    #[test]
    fn test_operation_errors_and_filtering() {
        let document = document(json!({
            "/pets": {
                "get": { "responses": {} },
                "post": {
                    "operationId": "Pets_Create",
                    "parameters": [{ "name": "body", "in": "body" }],
                    "responses": {}
                },
                "delete": { "operationId": "Pets_Delete", "responses": {} }
            }
        }));
        let config = ModelerConfig {
            exclude_operations: vec!["Pets_Delete".to_string()],
            ..Default::default()
        };
        let mut resolver = TypeResolver::new(&document, &config);

        let methods = resolver.build_methods();
        let ids: Vec<_> = methods.iter().map(|m| m.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["Pets_Create"]);
        assert_eq!(resolver.errors.len(), 2);
        assert_eq!(resolver.errors[0].definition(), "GET /pets");
        assert!(resolver.errors[1].to_string().contains("body parameter 'body' has no schema"));
    }
}
