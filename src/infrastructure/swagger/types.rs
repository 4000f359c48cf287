//! Swagger 2.0 schema graph.
//!
//! These types are a faithful, read-only picture of the parsed document. The
//! modeler never mutates them; every model type is derived from them.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

static LOCAL_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#/(definitions|parameters)/(.+)$").expect("reference pattern is valid")
});

/// Keeps the `x-` specification extensions out of a node's unrecognized
/// fields and drops the rest (`xml`, `externalDocs`, ...)
fn deserialize_extensions<'de, D>(deserializer: D) -> Result<IndexMap<String, JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut fields = IndexMap::<String, JsonValue>::deserialize(deserializer)?;
    fields.retain(|key, _| key.starts_with("x-"));
    Ok(fields)
}

/// Target section of a local `$ref`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `#/definitions/<Name>`
    Definition,
    /// `#/parameters/<Name>`
    Parameter,
}

/// A parsed local reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub name: String,
}

impl Reference {
    /// Parses a `$ref` string, returning `None` for anything that is not a
    /// local definition or parameter reference.
    pub fn parse(reference: &str) -> Option<Self> {
        let captures = LOCAL_REFERENCE.captures(reference)?;
        let kind = match &captures[1] {
            "definitions" => ReferenceKind::Definition,
            _ => ReferenceKind::Parameter,
        };
        Some(Self {
            kind,
            name: captures[2].to_string(),
        })
    }
}

/// The whole Swagger 2.0 document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerDocument {
    /// The `swagger` version marker, always "2.0" after parsing
    pub swagger: String,
    #[serde(default)]
    pub info: ApiInfo,
    pub host: Option<String>,
    pub base_path: Option<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub definitions: IndexMap<String, SchemaNode>,
    /// Definitions that could not be read as a schema, with the reason.
    /// Filled by the parser so one bad definition does not hide the others.
    #[serde(skip)]
    pub malformed_definitions: IndexMap<String, String>,
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterNode>,
    /// Specification extensions (fields starting with `x-`)
    #[serde(flatten, deserialize_with = "deserialize_extensions")]
    pub vendor_extensions: IndexMap<String, JsonValue>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    pub description: Option<String>,
}

/// The `additionalProperties` keyword.
///
/// Anything that is neither a flag nor a schema object is kept as
/// `Malformed` so the resolver can report it against the owning node instead
/// of rejecting the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Flag(bool),
    Schema(Box<SchemaNode>),
    Malformed(JsonValue),
}

/// One schema fragment: a definition, a property, array items or a
/// dictionary value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<JsonValue>>,
    pub items: Option<Box<SchemaNode>>,
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default)]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub all_of: Vec<SchemaNode>,
    /// Swagger 2.0 discriminator: the name of the discriminating property
    pub discriminator: Option<String>,
    pub read_only: Option<bool>,
    pub default: Option<JsonValue>,
    pub example: Option<JsonValue>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<bool>,
    pub exclusive_maximum: Option<bool>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
    pub multiple_of: Option<f64>,
    /// Specification extensions (fields starting with `x-`)
    #[serde(flatten, deserialize_with = "deserialize_extensions")]
    pub vendor_extensions: IndexMap<String, JsonValue>,
}

impl SchemaNode {
    /// Shorthand for a `$ref` node
    pub fn reference_to(definition: &str) -> Self {
        Self {
            reference: Some(format!("#/definitions/{definition}")),
            ..Default::default()
        }
    }

    /// Shorthand for a node with a type and optional format
    pub fn typed(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Default::default()
        }
    }

    /// True when the node declares any object structure of its own
    pub fn has_object_structure(&self) -> bool {
        !self.properties.is_empty() || !self.all_of.is_empty() || self.discriminator.is_some()
    }

    /// Reads a vendor extension
    pub fn extension(&self, name: &str) -> Option<&JsonValue> {
        self.vendor_extensions.get(name)
    }
}

/// HTTP methods a path item can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    /// Get all HTTP methods in document order
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Options,
            HttpMethod::Head,
            HttpMethod::Patch,
        ]
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "get"),
            HttpMethod::Put => write!(f, "put"),
            HttpMethod::Post => write!(f, "post"),
            HttpMethod::Delete => write!(f, "delete"),
            HttpMethod::Options => write!(f, "options"),
            HttpMethod::Head => write!(f, "head"),
            HttpMethod::Patch => write!(f, "patch"),
        }
    }
}

/// Operations and shared parameters under one path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    pub get: Option<OperationNode>,
    pub put: Option<OperationNode>,
    pub post: Option<OperationNode>,
    pub delete: Option<OperationNode>,
    pub options: Option<OperationNode>,
    pub head: Option<OperationNode>,
    pub patch: Option<OperationNode>,
    #[serde(default)]
    pub parameters: Vec<ParameterNode>,
}

impl PathItem {
    /// The operation declared for `method`, if any
    pub fn operation(&self, method: HttpMethod) -> Option<&OperationNode> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    /// Iterates the declared operations in document method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &OperationNode)> {
        HttpMethod::all()
            .iter()
            .filter_map(|method| self.operation(*method).map(|op| (*method, op)))
    }
}

/// A single operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationNode {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    #[serde(default)]
    pub parameters: Vec<ParameterNode>,
    #[serde(default)]
    pub responses: IndexMap<String, ResponseNode>,
    #[serde(default)]
    pub deprecated: bool,
    /// Specification extensions (fields starting with `x-`)
    #[serde(flatten, deserialize_with = "deserialize_extensions")]
    pub vendor_extensions: IndexMap<String, JsonValue>,
}

/// A parameter, either inline or a `$ref` into the document's `parameters`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterNode {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Body parameters only
    pub schema: Option<SchemaNode>,
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    pub format: Option<String>,
    pub items: Option<Box<SchemaNode>>,
    pub collection_format: Option<String>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<JsonValue>>,
    pub default: Option<JsonValue>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<bool>,
    pub exclusive_maximum: Option<bool>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
    pub multiple_of: Option<f64>,
    /// Specification extensions (fields starting with `x-`)
    #[serde(flatten, deserialize_with = "deserialize_extensions")]
    pub vendor_extensions: IndexMap<String, JsonValue>,
}

impl ParameterNode {
    /// Views a non-body parameter as a schema node so it can be resolved like
    /// any other schema fragment.
    pub fn as_schema(&self) -> SchemaNode {
        SchemaNode {
            schema_type: self.schema_type.clone(),
            format: self.format.clone(),
            description: self.description.clone(),
            enum_values: self.enum_values.clone(),
            items: self.items.clone(),
            default: self.default.clone(),
            minimum: self.minimum,
            maximum: self.maximum,
            exclusive_minimum: self.exclusive_minimum,
            exclusive_maximum: self.exclusive_maximum,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern.clone(),
            min_items: self.min_items,
            max_items: self.max_items,
            unique_items: self.unique_items,
            multiple_of: self.multiple_of,
            vendor_extensions: self.vendor_extensions.clone(),
            ..Default::default()
        }
    }
}

/// A response declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseNode {
    #[serde(default)]
    pub description: String,
    pub schema: Option<SchemaNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_parse() {
        assert_eq!(
            Reference::parse("#/definitions/Fish"),
            Some(Reference {
                kind: ReferenceKind::Definition,
                name: "Fish".to_string()
            })
        );
        assert_eq!(
            Reference::parse("#/parameters/ApiVersion").map(|r| r.kind),
            Some(ReferenceKind::Parameter)
        );
        assert_eq!(Reference::parse("other.json#/definitions/Fish"), None);
        assert_eq!(Reference::parse("#/responses/Error"), None);
    }

    #[test]
    fn test_schema_node_keeps_property_order_and_extensions() {
        let node: SchemaNode = serde_json::from_value(json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "integer" }
            },
            "x-ms-discriminator-value": "salmon"
        }))
        .unwrap();

        let names: Vec<_> = node.properties.keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(
            node.extension("x-ms-discriminator-value"),
            Some(&json!("salmon"))
        );
        assert!(node.has_object_structure());
    }

    #[test]
    fn test_additional_properties_variants() {
        let flag: SchemaNode =
            serde_json::from_value(json!({ "additionalProperties": true })).unwrap();
        assert!(matches!(
            flag.additional_properties,
            Some(AdditionalProperties::Flag(true))
        ));

        let schema: SchemaNode =
            serde_json::from_value(json!({ "additionalProperties": { "type": "string" } }))
                .unwrap();
        assert!(matches!(
            schema.additional_properties,
            Some(AdditionalProperties::Schema(_))
        ));

        let malformed: SchemaNode =
            serde_json::from_value(json!({ "additionalProperties": "string" })).unwrap();
        assert!(matches!(
            malformed.additional_properties,
            Some(AdditionalProperties::Malformed(_))
        ));
    }

    #[test]
    fn test_path_item_operations_in_method_order() {
        let item: PathItem = serde_json::from_value(json!({
            "post": { "operationId": "Pets_Create" },
            "get": { "operationId": "Pets_List" }
        }))
        .unwrap();

        let methods: Vec<_> = item.operations().map(|(method, _)| method).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn test_parameter_as_schema() {
        let param: ParameterNode = serde_json::from_value(json!({
            "name": "status",
            "in": "query",
            "type": "string",
            "enum": ["available", "sold"],
            "x-ms-enum": "PetStatus"
        }))
        .unwrap();

        let schema = param.as_schema();
        assert_eq!(schema.schema_type.as_deref(), Some("string"));
        assert_eq!(schema.enum_values.as_ref().map(Vec::len), Some(2));
        assert_eq!(schema.extension("x-ms-enum"), Some(&json!("PetStatus")));
    }
}
