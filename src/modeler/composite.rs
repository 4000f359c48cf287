//! Composite Builder
//!
//! Fills in a registered composite stub: own properties, `allOf` members and
//! the single base type. Checks that need the full hierarchy run later in
//! [`hierarchy`](super::hierarchy).

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::errors::ResolutionError;
use super::hierarchy::{describe_type, types_compatible};
use super::resolver::{Frame, TypeResolver, pointer_segment};
use crate::core::utils::nested_type_name;
use crate::infrastructure::swagger::{Reference, ReferenceKind, SchemaNode};
use crate::model::{
    CompositeId, CompositeState, Constraints, ModelType, PrimaryType, Property,
};

/// A property declaration waiting to be resolved
struct Member<'n> {
    name: &'n str,
    schema: &'n SchemaNode,
    pointer: String,
}

fn members_of<'n>(node: &'n SchemaNode, pointer: &str) -> impl Iterator<Item = Member<'n>> {
    let pointer = pointer.to_string();
    node.properties.iter().map(move |(name, schema)| Member {
        name: name.as_str(),
        schema,
        pointer: format!("{pointer}/properties/{}", pointer_segment(name)),
    })
}

/// Validation keywords of a node; fails when `pattern` does not compile
pub(crate) fn constraints_of(schema: &SchemaNode) -> Result<Constraints, String> {
    if let Some(pattern) = schema.pattern.as_deref() {
        Regex::new(pattern)
            .map_err(|e| format!("pattern '{pattern}' is not a valid regular expression: {e}"))?;
    }

    Ok(Constraints {
        minimum: schema.minimum,
        maximum: schema.maximum,
        exclusive_minimum: schema.exclusive_minimum.unwrap_or(false),
        exclusive_maximum: schema.exclusive_maximum.unwrap_or(false),
        min_length: schema.min_length,
        max_length: schema.max_length,
        pattern: schema.pattern.clone(),
        min_items: schema.min_items,
        max_items: schema.max_items,
        unique_items: schema.unique_items.unwrap_or(false),
        multiple_of: schema.multiple_of,
    })
}

impl<'a> TypeResolver<'a> {
    pub(super) fn constraints(
        &mut self,
        schema: &SchemaNode,
        pointer: &str,
        owner: &str,
    ) -> Option<Constraints> {
        match constraints_of(schema) {
            Ok(constraints) => Some(constraints),
            Err(detail) => self.fail(ResolutionError::schema(owner, format!("{detail} at '{pointer}'"))),
        }
    }

    /// Whether the schema, or the definition it references, allows one value
    fn has_single_value(&self, schema: &SchemaNode) -> bool {
        let single = |node: &SchemaNode| node.enum_values.as_ref().is_some_and(|v| v.len() == 1);
        if single(schema) {
            return true;
        }
        match schema.reference.as_deref().and_then(Reference::parse) {
            Some(Reference {
                kind: ReferenceKind::Definition,
                name,
            }) => self.document.definitions.get(&name).is_some_and(single),
            _ => false,
        }
    }

    /// Resolves the members of the stub `id` declared by `node`
    pub(super) fn populate_composite(&mut self, id: CompositeId, node: &SchemaNode, pointer: &str) {
        self.stack.push(Frame::Composite);
        let config = self.config;
        let name = self.registry.composite(id).name.clone();

        let mut members: Vec<Member<'_>> = members_of(node, pointer).collect();
        let mut required: Vec<&str> = node.required.iter().map(String::as_str).collect();
        let mut discriminator = node.discriminator.clone();
        let mut base: Option<CompositeId> = None;
        let mut saw_base_reference = false;

        for (index, part) in node.all_of.iter().enumerate() {
            let part_pointer = format!("{pointer}/allOf/{index}");
            let Some(reference) = part.reference.as_deref() else {
                members.extend(members_of(part, &part_pointer));
                required.extend(part.required.iter().map(String::as_str));
                if discriminator.is_none() {
                    discriminator = part.discriminator.clone();
                }
                continue;
            };

            if saw_base_reference {
                self.errors.push(ResolutionError::schema(
                    &name,
                    format!(
                        "'{reference}' at '{part_pointer}' declares a second base type; only single inheritance is supported"
                    ),
                ));
                continue;
            }
            saw_base_reference = true;

            match self.resolve_reference(reference, &part_pointer, &name) {
                Some(ModelType::Composite(base_id)) => base = Some(base_id),
                Some(ModelType::Primary(PrimaryType::Object)) => {
                    self.errors.push(ResolutionError::schema(
                        &name,
                        format!(
                            "base type '{reference}' at '{part_pointer}' declares no properties, allOf or discriminator, so it is not an object type"
                        ),
                    ))
                }
                Some(_) => self.errors.push(ResolutionError::schema(
                    &name,
                    format!("base type '{reference}' at '{part_pointer}' is not an object type"),
                )),
                None => {}
            }
        }

        let mut properties: Vec<Property> = Vec::with_capacity(members.len());
        for member in &members {
            let suggested = nested_type_name(&name, member.name);
            let Some(model_type) = self.resolve(member.schema, &suggested, &member.pointer, &name)
            else {
                continue;
            };
            let Some(constraints) = self.constraints(member.schema, &member.pointer, &name) else {
                continue;
            };

            let is_required = required.contains(&member.name);
            let property = Property {
                name: member.name.to_string(),
                model_type,
                required: is_required,
                read_only: member.schema.read_only.unwrap_or(false),
                is_constant: is_required && self.has_single_value(member.schema),
                description: member.schema.description.clone(),
                default_value: member.schema.default.clone(),
                constraints,
            };

            let Some(index) = properties.iter().position(|p| p.name == property.name) else {
                properties.push(property);
                continue;
            };
            let existing = &properties[index];
            if types_compatible(&self.registry, &existing.model_type, &property.model_type) {
                debug!("Collapsing repeated property '{}' of '{name}'", property.name);
            } else {
                let detail = format!(
                    "property '{}' is declared twice with different types ({} and {})",
                    property.name,
                    describe_type(&self.registry, &existing.model_type),
                    describe_type(&self.registry, &property.model_type)
                );
                self.errors.push(ResolutionError::property_conflict(&name, detail));
            }
        }

        for required_name in &required {
            if !members.iter().any(|m| m.name == *required_name) {
                warn!("Required property '{required_name}' of '{name}' is not declared; ignoring it");
            }
        }

        let discriminator_value = match node.extension(&config.discriminator_value_extension) {
            None => name.clone(),
            Some(JsonValue::String(value)) => value.clone(),
            Some(other) => {
                self.errors.push(ResolutionError::schema(
                    &name,
                    format!(
                        "{} must be a string, got {other}",
                        config.discriminator_value_extension
                    ),
                ));
                name.clone()
            }
        };

        debug!(
            "Populated composite '{name}' with {} properties{}",
            properties.len(),
            base.map(|b| format!(", base '{}'", self.registry.composite(b).name))
                .unwrap_or_default()
        );

        let composite = self.registry.composite_mut(id);
        composite.description = node.description.clone();
        composite.properties = properties;
        composite.base = base;
        composite.polymorphic_discriminator = discriminator;
        composite.discriminator_value = discriminator_value;
        composite.state = CompositeState::PropertiesResolved;
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelerConfig;
    use crate::infrastructure::swagger::{SwaggerDocument, SwaggerParser};
    use crate::modeler::errors::ErrorKind;
    use serde_json::json;

    fn document(definitions: JsonValue) -> SwaggerDocument {
        SwaggerParser::new(json!({
            "swagger": "2.0",
            "info": { "title": "Test", "version": "1.0" },
            "definitions": definitions
        }))
        .parse()
        .unwrap()
    }

    #[test]
    fn test_properties_keep_declaration_order_and_flags() {
        let document = document(json!({
            "Widget": {
                "required": ["id", "kind"],
                "properties": {
                    "id": { "type": "integer", "format": "int64", "readOnly": true },
                    "kind": { "type": "string", "enum": ["widget"] },
                    "name": { "type": "string", "maxLength": 64, "pattern": "^[a-z]+$" }
                }
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        let id = resolver.resolve_definition("Widget").unwrap().as_composite().unwrap();
        let widget = resolver.registry().composite(id);
        let names: Vec<_> = widget.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "kind", "name"]);

        let id_property = widget.property("id").unwrap();
        assert!(id_property.required);
        assert!(id_property.read_only);
        assert_eq!(id_property.model_type, ModelType::Primary(PrimaryType::Long));

        assert!(widget.property("kind").unwrap().is_constant);
        let name = widget.property("name").unwrap();
        assert!(!name.required);
        assert_eq!(name.constraints.max_length, Some(64));
        assert_eq!(widget.state, CompositeState::PropertiesResolved);
    }

    #[test]
    fn test_all_of_base_and_inline_members() {
        let document = document(json!({
            "Fish": {
                "discriminator": "fishtype",
                "required": ["fishtype"],
                "properties": { "fishtype": { "type": "string" } }
            },
            "Salmon": {
                "x-ms-discriminator-value": "salmon",
                "allOf": [
                    { "$ref": "#/definitions/Fish" },
                    { "properties": { "location": { "type": "string" } }, "required": ["location"] }
                ]
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        let salmon = resolver.resolve_definition("Salmon").unwrap().as_composite().unwrap();
        let fish = resolver.registry().find_composite("Fish").unwrap();
        let salmon = resolver.registry().composite(salmon);
        assert_eq!(salmon.base, Some(fish));
        assert_eq!(salmon.discriminator_value, "salmon");
        assert!(salmon.property("location").unwrap().required);
        assert!(salmon.polymorphic_discriminator.is_none());
        assert_eq!(
            resolver.registry().composite(fish).polymorphic_discriminator.as_deref(),
            Some("fishtype")
        );
    }

    #[test]
    fn test_second_base_is_schema_error() {
        let document = document(json!({
            "A": { "properties": { "a": { "type": "string" } } },
            "B": { "properties": { "b": { "type": "string" } } },
            "C": { "allOf": [ { "$ref": "#/definitions/A" }, { "$ref": "#/definitions/B" } ] }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        resolver.resolve_definition("C");
        assert_eq!(resolver.errors.len(), 1);
        assert!(resolver.errors[0].to_string().contains("single inheritance"));
    }

    #[test]
    fn test_empty_object_base_is_explained() {
        let document = document(json!({
            "Anything": { "type": "object" },
            "Widget": {
                "allOf": [
                    { "$ref": "#/definitions/Anything" },
                    { "properties": { "id": { "type": "string" } } }
                ]
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        resolver.resolve_definition("Widget");
        assert_eq!(resolver.errors.len(), 1);
        assert_eq!(resolver.errors[0].definition(), "Widget");
        assert!(resolver.errors[0].to_string().contains("declares no properties"));
    }

    #[test]
    fn test_repeated_property_rules() {
        let document = document(json!({
            "Same": {
                "allOf": [
                    { "properties": { "size": { "type": "integer" } } },
                    { "properties": { "size": { "type": "integer" } } }
                ]
            },
            "Clash": {
                "allOf": [
                    { "properties": { "size": { "type": "integer" } } },
                    { "properties": { "size": { "type": "string" } } }
                ]
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        let same = resolver.resolve_definition("Same").unwrap().as_composite().unwrap();
        assert_eq!(resolver.registry().composite(same).properties.len(), 1);
        assert!(resolver.errors.is_empty());

        resolver.resolve_definition("Clash");
        assert_eq!(resolver.errors.len(), 1);
        assert_eq!(resolver.errors[0].kind(), ErrorKind::PropertyConflict);
        assert_eq!(resolver.errors[0].definition(), "Clash");
    }

    #[test]
    fn test_invalid_pattern_drops_property() {
        let document = document(json!({
            "Widget": {
                "properties": {
                    "code": { "type": "string", "pattern": "([a-z" },
                    "name": { "type": "string" }
                }
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        let id = resolver.resolve_definition("Widget").unwrap().as_composite().unwrap();
        assert!(resolver.registry().composite(id).property("name").is_some());
        assert!(resolver.registry().composite(id).property("code").is_none());
        assert_eq!(resolver.errors.len(), 1);
        assert!(resolver.errors[0].to_string().contains("not a valid regular expression"));
    }

    #[test]
    fn test_inline_property_object_is_named_after_owner() {
        let document = document(json!({
            "Widget": {
                "properties": {
                    "dimensions": { "properties": { "width": { "type": "number" } } }
                }
            }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        let id = resolver.resolve_definition("Widget").unwrap().as_composite().unwrap();
        let dimensions = resolver
            .registry()
            .composite(id)
            .property("dimensions")
            .and_then(|p| p.model_type.as_composite())
            .unwrap();
        let dimensions = resolver.registry().composite(dimensions);
        assert_eq!(dimensions.name, "WidgetDimensions");
        assert_eq!(dimensions.origin, "#/definitions/Widget/properties/dimensions");
    }

    #[test]
    fn test_synthesized_name_collision() {
        let document = document(json!({
            "Widget": {
                "properties": {
                    "dimensions": { "properties": { "width": { "type": "number" } } }
                }
            },
            "WidgetDimensions": { "properties": { "depth": { "type": "number" } } }
        }));
        let config = ModelerConfig::default();
        let mut resolver = TypeResolver::new(&document, &config);

        resolver.resolve_definition("Widget");
        assert!(resolver.resolve_definition("WidgetDimensions").is_none());
        assert_eq!(resolver.errors.len(), 1);
        assert!(resolver.errors[0].to_string().contains("collides"));
    }
}
