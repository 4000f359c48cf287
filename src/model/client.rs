//! The completed client model handed to emission backends.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

use super::registry::ModelRegistry;
use super::types::{CompositeId, CompositeType, Constraints, ModelType, Property};
use crate::infrastructure::swagger::HttpMethod;

/// Where a parameter travels in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
}

impl ParameterLocation {
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "body" => Some(ParameterLocation::Body),
            "formData" => Some(ParameterLocation::FormData),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Body => write!(f, "body"),
            ParameterLocation::FormData => write!(f, "formData"),
        }
    }
}

/// Serialization of array-valued non-body parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionFormat {
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

impl CollectionFormat {
    pub fn parse(format: &str) -> Option<Self> {
        match format {
            "csv" => Some(CollectionFormat::Csv),
            "ssv" => Some(CollectionFormat::Ssv),
            "tsv" => Some(CollectionFormat::Tsv),
            "pipes" => Some(CollectionFormat::Pipes),
            "multi" => Some(CollectionFormat::Multi),
            _ => None,
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub model_type: ModelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<CollectionFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
    #[serde(skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
}

/// A response of a method; `body` is `None` for empty responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ModelType>,
}

/// One API operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub operation_id: String,
    /// Group taken from a `Group_Name` operation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub name: String,
    pub http_method: HttpMethod,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deprecated: bool,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code
    pub responses: IndexMap<String, Response>,
    /// The `default` response, describing the error body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_response: Option<Response>,
}

impl Method {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// The complete, internally consistent model of one API document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientModel {
    pub name: String,
    pub api_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub registry: ModelRegistry,
    pub methods: Vec<Method>,
}

impl ClientModel {
    pub fn composite(&self, id: CompositeId) -> &CompositeType {
        self.registry.composite(id)
    }

    /// Case-insensitive lookup of a composite by name
    pub fn find_composite(&self, name: &str) -> Option<CompositeId> {
        self.registry.find_composite(name)
    }

    pub fn method(&self, operation_id: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.operation_id == operation_id)
    }

    /// Methods of one operation group, in document order
    pub fn methods_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Method> {
        self.methods
            .iter()
            .filter(move |m| m.group.as_deref() == Some(group))
    }

    /// Base chain of `id`, nearest ancestor first
    pub fn ancestors(&self, id: CompositeId) -> Vec<CompositeId> {
        let mut chain = Vec::new();
        let mut current = self.composite(id).base;
        while let Some(base) = current {
            // A finished model has acyclic chains; the bound only guards misuse
            if chain.len() > self.registry.composite_count() {
                break;
            }
            chain.push(base);
            current = self.composite(base).base;
        }
        chain
    }

    /// Own and inherited properties, root ancestor's first
    pub fn all_properties(&self, id: CompositeId) -> Vec<&Property> {
        let mut lineage = self.ancestors(id);
        lineage.reverse();
        lineage.push(id);

        let mut properties: Vec<&Property> = Vec::new();
        for member in lineage {
            for property in &self.composite(member).properties {
                match properties.iter().position(|p| p.name == property.name) {
                    Some(index) => properties[index] = property,
                    None => properties.push(property),
                }
            }
        }
        properties
    }

    /// The root of the polymorphic hierarchy `id` belongs to, if any
    pub fn polymorphic_root(&self, id: CompositeId) -> Option<CompositeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|member| self.composite(*member).is_polymorphic_root())
    }

    /// Picks the concrete type of a polymorphic payload.
    ///
    /// Reads the hierarchy's discriminator from `payload` and returns the
    /// most-derived known type below `static_type` carrying that value. Falls
    /// back to `static_type` when the type is not polymorphic, the payload has
    /// no discriminator, or the value is unknown.
    pub fn dispatch(&self, static_type: CompositeId, payload: &JsonValue) -> CompositeId {
        let Some(root) = self.polymorphic_root(static_type) else {
            return static_type;
        };
        let Some(discriminator) = self.composite(root).polymorphic_discriminator.as_deref() else {
            return static_type;
        };
        let Some(value) = payload.get(discriminator).and_then(JsonValue::as_str) else {
            return static_type;
        };

        let declared = self.composite(static_type);
        if declared.discriminator_value == value {
            return static_type;
        }
        declared
            .derived
            .iter()
            .copied()
            .find(|derived| self.composite(*derived).discriminator_value == value)
            .unwrap_or(static_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{CompositeState, PrimaryType};
    use serde_json::json;

    fn property(name: &str, primary: PrimaryType) -> Property {
        Property {
            name: name.to_string(),
            model_type: ModelType::Primary(primary),
            required: false,
            read_only: false,
            is_constant: false,
            description: None,
            default_value: None,
            constraints: Constraints::default(),
        }
    }

    /// Fish <- Salmon <- SmartSalmon, Fish <- Shark
    fn fish_model() -> ClientModel {
        let mut registry = ModelRegistry::new();
        let mut ids = Vec::new();
        for (name, value) in [
            ("Fish", "Fish"),
            ("Salmon", "salmon"),
            ("SmartSalmon", "smart_salmon"),
            ("Shark", "shark"),
        ] {
            let id = registry
                .intern_composite(name, || {
                    let mut composite = CompositeType::stub(name, "");
                    composite.discriminator_value = value.to_string();
                    composite.state = CompositeState::HierarchyResolved;
                    composite
                })
                .id();
            ids.push(id);
        }
        let (fish, salmon, smart, shark) = (ids[0], ids[1], ids[2], ids[3]);

        let root = registry.composite_mut(fish);
        root.polymorphic_discriminator = Some("fishtype".to_string());
        root.properties = vec![
            property("fishtype", PrimaryType::String),
            property("length", PrimaryType::Float),
        ];
        root.derived.extend([salmon, smart, shark]);

        let salmon_type = registry.composite_mut(salmon);
        salmon_type.base = Some(fish);
        salmon_type.properties = vec![property("location", PrimaryType::String)];
        salmon_type.derived.insert(smart);

        let smart_type = registry.composite_mut(smart);
        smart_type.base = Some(salmon);
        smart_type.properties = vec![property("length", PrimaryType::Float)];

        registry.composite_mut(shark).base = Some(fish);

        ClientModel {
            name: "Fishery".to_string(),
            api_version: "2016-02-29".to_string(),
            base_url: None,
            description: None,
            registry,
            methods: Vec::new(),
        }
    }

    #[test]
    fn test_dispatch_picks_most_derived_type() {
        let model = fish_model();
        let fish = model.find_composite("Fish").unwrap();
        let salmon = model.find_composite("Salmon").unwrap();
        let smart = model.find_composite("SmartSalmon").unwrap();
        let shark = model.find_composite("Shark").unwrap();

        assert_eq!(model.dispatch(fish, &json!({ "fishtype": "shark" })), shark);
        assert_eq!(model.dispatch(fish, &json!({ "fishtype": "smart_salmon" })), smart);
        assert_eq!(model.dispatch(salmon, &json!({ "fishtype": "smart_salmon" })), smart);
    }

    #[test]
    fn test_dispatch_falls_back_to_static_type() {
        let model = fish_model();
        let fish = model.find_composite("Fish").unwrap();
        let salmon = model.find_composite("Salmon").unwrap();

        assert_eq!(model.dispatch(fish, &json!({ "fishtype": "whale" })), fish);
        assert_eq!(model.dispatch(fish, &json!({ "length": 1.0 })), fish);
        // A shark is not below Salmon
        assert_eq!(model.dispatch(salmon, &json!({ "fishtype": "shark" })), salmon);
    }

    #[test]
    fn test_all_properties_applies_overrides() {
        let model = fish_model();
        let smart = model.find_composite("SmartSalmon").unwrap();

        let names: Vec<_> = model
            .all_properties(smart)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["fishtype", "length", "location"]);
        assert_eq!(
            model.polymorphic_root(smart),
            model.find_composite("Fish")
        );
    }

    #[test]
    fn test_parameter_location_and_collection_format_parse() {
        assert_eq!(ParameterLocation::parse("formData"), Some(ParameterLocation::FormData));
        assert_eq!(ParameterLocation::parse("cookie"), None);
        assert_eq!(CollectionFormat::parse("pipes"), Some(CollectionFormat::Pipes));
        assert_eq!(CollectionFormat::parse("json"), None);
    }
}
