//! Type Resolver
//!
//! Walks schema nodes and turns them into [`ModelType`]s. Named definitions are
//! memoized by their lowercase name, so every reference to a definition yields
//! the same type. Composites are registered as stubs before their members are
//! resolved, which is what lets self- and mutually-referencing definitions
//! terminate.
//!
//! Failures never abort the walk: they are pushed onto the resolver's error
//! list and the failing branch yields `None`, leaving siblings to resolve.

use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::errors::{ResolutionError, ResolutionErrors};
use super::primitives::{self, UnknownPrimitive};
use crate::core::ModelerConfig;
use crate::core::utils::{nested_type_name, to_proper_case};
use crate::infrastructure::swagger::{
    AdditionalProperties, Reference, ReferenceKind, SchemaNode, SwaggerDocument,
};
use crate::model::{
    CompositeId, CompositeType, EnumType, EnumValue, Interned, ModelRegistry, ModelType,
    PrimaryType,
};

/// Escapes one JSON pointer segment
pub(crate) fn pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

pub(crate) fn definition_pointer(name: &str) -> String {
    format!("#/definitions/{}", pointer_segment(name))
}

fn is_string_enum(node: &SchemaNode) -> bool {
    node.enum_values.is_some() && matches!(node.schema_type.as_deref(), None | Some("string"))
}

fn is_array(node: &SchemaNode) -> bool {
    node.schema_type.as_deref() == Some("array") || node.items.is_some()
}

fn has_dictionary_marker(node: &SchemaNode) -> bool {
    !matches!(
        node.additional_properties,
        None | Some(AdditionalProperties::Flag(false))
    )
}

/// Whether [`TypeResolver::resolve`] routes the node to the Composite Builder
pub(crate) fn is_composite_shaped(node: &SchemaNode) -> bool {
    node.reference.is_none()
        && !is_string_enum(node)
        && !is_array(node)
        && !has_dictionary_marker(node)
        && node.has_object_structure()
}

/// Symbol for `wire` that no earlier value of the enum uses: the proper-cased
/// value, else the raw value, else the raw value with a numeric suffix
fn unique_symbol(values: &[EnumValue], wire: &str) -> String {
    let taken = |symbol: &str| values.iter().any(|v| v.name == symbol);
    let symbol = to_proper_case(wire);
    if !symbol.is_empty() && !taken(&symbol) {
        return symbol;
    }
    if !taken(wire) {
        return wire.to_string();
    }
    (2..)
        .map(|suffix| format!("{wire}{suffix}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| wire.to_string())
}

/// Entry of the resolution stack
#[derive(Debug)]
pub(super) enum Frame {
    /// A non-composite definition being resolved, by lowercase name
    Definition(String),
    /// A composite whose members are being resolved
    Composite,
}

/// Recursive schema-to-model-type resolver for one document
pub struct TypeResolver<'a> {
    pub(super) document: &'a SwaggerDocument,
    pub(super) config: &'a ModelerConfig,
    pub(super) registry: ModelRegistry,
    resolved: HashMap<String, ModelType>,
    failed: HashSet<String>,
    /// Definition name that first claimed each lowercase key
    claimed: HashMap<String, String>,
    pub(super) stack: Vec<Frame>,
    pub(super) errors: Vec<ResolutionError>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(document: &'a SwaggerDocument, config: &'a ModelerConfig) -> Self {
        Self {
            document,
            config,
            registry: ModelRegistry::new(),
            resolved: HashMap::new(),
            failed: HashSet::new(),
            claimed: HashMap::new(),
            stack: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Resolves one schema node outside of any definition.
    ///
    /// Errors recorded while resolving this node are returned and cleared.
    pub fn resolve_schema(
        &mut self,
        node: &SchemaNode,
        suggested_name: &str,
    ) -> Result<ModelType, ResolutionErrors> {
        let pointer = format!("#/{}", pointer_segment(suggested_name));
        let resolved = self.resolve(node, suggested_name, &pointer, suggested_name);
        let errors = std::mem::take(&mut self.errors);

        match (resolved, ResolutionErrors::from_accumulated(errors)) {
            (_, Some(errors)) => Err(errors),
            (Some(model_type), None) => Ok(model_type),
            (None, None) => Err(ResolutionErrors::new(vec![ResolutionError::schema(
                suggested_name,
                "schema depends on a definition that failed to resolve",
            )])),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub(super) fn into_parts(self) -> (ModelRegistry, Vec<ResolutionError>) {
        (self.registry, self.errors)
    }

    pub(super) fn fail<T>(&mut self, error: ResolutionError) -> Option<T> {
        debug!("Recorded {}: {}", error.kind(), error);
        self.errors.push(error);
        None
    }

    /// Resolves `node`. `suggested_name` names any anonymous type the node
    /// synthesizes, `pointer` locates the node and `owner` is the definition
    /// errors are reported against.
    pub(super) fn resolve(
        &mut self,
        node: &SchemaNode,
        suggested_name: &str,
        pointer: &str,
        owner: &str,
    ) -> Option<ModelType> {
        if let Some(reference) = node.reference.as_deref() {
            return self.resolve_reference(reference, pointer, owner);
        }

        if is_string_enum(node) {
            return self.build_enum(node, pointer, owner);
        }

        let dictionary_value = match &node.additional_properties {
            None | Some(AdditionalProperties::Flag(false)) => None,
            Some(AdditionalProperties::Flag(true)) => Some(None),
            Some(AdditionalProperties::Schema(schema)) => Some(Some(schema.as_ref())),
            Some(AdditionalProperties::Malformed(value)) => {
                return self.fail(ResolutionError::schema(
                    owner,
                    format!(
                        "additionalProperties at '{pointer}' must be a boolean or a schema, got {value}"
                    ),
                ));
            }
        };

        if is_array(node) {
            if dictionary_value.is_some() {
                self.errors.push(ResolutionError::schema(
                    owner,
                    format!(
                        "'{pointer}' declares both array items and additionalProperties; treating it as an array"
                    ),
                ));
            }
            return self.build_sequence(node, suggested_name, pointer, owner);
        }

        if let Some(value) = dictionary_value {
            return self.build_dictionary(value, suggested_name, pointer, owner);
        }

        if node.has_object_structure() {
            return self.build_inline_composite(node, suggested_name, pointer);
        }

        self.build_primary(node, pointer, owner)
    }

    pub(super) fn resolve_reference(
        &mut self,
        reference: &str,
        pointer: &str,
        owner: &str,
    ) -> Option<ModelType> {
        match Reference::parse(reference) {
            Some(Reference {
                kind: ReferenceKind::Definition,
                name,
            }) => self.resolve_definition_from(&name, pointer, owner),
            _ => self.fail(ResolutionError::schema(
                owner,
                format!(
                    "unsupported reference '{reference}' at '{pointer}'; only '#/definitions/' references are allowed here"
                ),
            )),
        }
    }

    /// Resolves a top-level definition by name
    pub(crate) fn resolve_definition(&mut self, name: &str) -> Option<ModelType> {
        self.resolve_definition_from(name, &definition_pointer(name), name)
    }

    /// Exact match first, then a case-insensitive one
    fn lookup_definition(&self, name: &str) -> Option<(&'a str, &'a SchemaNode)> {
        let document: &'a SwaggerDocument = self.document;
        let definitions = &document.definitions;
        definitions
            .get_key_value(name)
            .or_else(|| {
                definitions
                    .iter()
                    .find(|(key, _)| key.to_lowercase() == name.to_lowercase())
            })
            .map(|(key, node)| (key.as_str(), node))
    }

    /// Whether `name` was dropped at parse time; its error is already
    /// reported against the definition itself
    fn is_malformed_definition(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.document
            .malformed_definitions
            .keys()
            .any(|key| key.to_lowercase() == name)
    }

    fn resolve_definition_from(
        &mut self,
        name: &str,
        pointer: &str,
        owner: &str,
    ) -> Option<ModelType> {
        let Some((canonical, node)) = self.lookup_definition(name) else {
            if self.is_malformed_definition(name) {
                debug!("Skipping reference at '{pointer}' to malformed definition '{name}'");
                return None;
            }
            return self.fail(ResolutionError::schema(
                owner,
                format!("reference at '{pointer}' names undefined definition '{name}'"),
            ));
        };

        let key = canonical.to_lowercase();
        match self.claimed.get(&key) {
            Some(first) if first != canonical => {
                let detail = format!(
                    "definition '{canonical}' differs from '{first}' only in case; type names are case-insensitive"
                );
                return self.fail(ResolutionError::schema(canonical, detail));
            }
            Some(_) => {}
            None => {
                self.claimed.insert(key.clone(), canonical.to_string());
            }
        }
        if let Some(resolved) = self.resolved.get(&key) {
            return Some(resolved.clone());
        }
        if self.failed.contains(&key) {
            return None;
        }

        let origin = definition_pointer(canonical);
        if is_composite_shaped(node) {
            let Some(interned) = self.register_composite(canonical, &origin) else {
                self.failed.insert(key);
                return None;
            };
            let model_type = ModelType::Composite(interned.id());
            // Memoize before populating so members can refer back to the stub
            self.resolved.insert(key, model_type.clone());
            if interned.is_created() {
                self.populate_composite(interned.id(), node, &origin);
            }
            debug!("Resolved definition '{canonical}' as a composite type");
            return Some(model_type);
        }

        // Re-entering a non-composite definition only terminates when an
        // already registered composite sits between the two visits
        if let Some(position) = self
            .stack
            .iter()
            .rposition(|frame| matches!(frame, Frame::Definition(k) if *k == key))
        {
            let through_composite = self.stack[position + 1..]
                .iter()
                .any(|frame| matches!(frame, Frame::Composite));
            if !through_composite {
                self.failed.insert(key);
                return self.fail(ResolutionError::schema(
                    canonical,
                    format!(
                        "definition '{canonical}' refers to itself without an object type in between"
                    ),
                ));
            }
        }

        self.stack.push(Frame::Definition(key.clone()));
        let resolved = self.resolve(node, canonical, &origin, canonical);
        self.stack.pop();

        match resolved {
            Some(model_type) => {
                debug!("Resolved definition '{canonical}'");
                self.resolved.insert(key, model_type.clone());
                Some(model_type)
            }
            None => {
                self.failed.insert(key);
                None
            }
        }
    }

    /// Registers a composite stub, rejecting a name already taken by a
    /// different node
    pub(super) fn register_composite(
        &mut self,
        name: &str,
        origin: &str,
    ) -> Option<Interned<CompositeId>> {
        let interned = self
            .registry
            .intern_composite(name, || CompositeType::stub(name, origin));
        if interned.is_created() {
            return Some(interned);
        }

        let existing = self.registry.composite(interned.id());
        if existing.origin == origin {
            return Some(interned);
        }
        let detail = format!(
            "type name '{name}' for '{origin}' collides with the type declared at '{}'",
            existing.origin
        );
        self.fail(ResolutionError::schema(name, detail))
    }

    fn build_inline_composite(
        &mut self,
        node: &SchemaNode,
        name: &str,
        pointer: &str,
    ) -> Option<ModelType> {
        let interned = self.register_composite(name, pointer)?;
        if interned.is_created() {
            self.populate_composite(interned.id(), node, pointer);
        }
        Some(ModelType::Composite(interned.id()))
    }

    fn build_enum(&mut self, node: &SchemaNode, pointer: &str, owner: &str) -> Option<ModelType> {
        let config = self.config;
        let wire_values = node.enum_values.as_deref().unwrap_or_default();

        let mut values = Vec::with_capacity(wire_values.len());
        for value in wire_values {
            let Some(wire) = value.as_str() else {
                return self.fail(ResolutionError::schema(
                    owner,
                    format!("enum value {value} at '{pointer}' is not a string"),
                ));
            };
            if values.iter().any(|v: &EnumValue| v.serialized_name == wire) {
                return self.fail(ResolutionError::schema(
                    owner,
                    format!("enum at '{pointer}' lists the value '{wire}' more than once"),
                ));
            }
            values.push(EnumValue {
                name: unique_symbol(&values, wire),
                serialized_name: wire.to_string(),
            });
        }

        let Some(extension) = node.extension(&config.enum_extension) else {
            let id = self.registry.add_anonymous_enum(EnumType {
                name: None,
                values,
                expandable: true,
                origin: pointer.to_string(),
            });
            return Some(ModelType::Enum(id));
        };

        let name = match extension {
            JsonValue::String(name) => name.as_str(),
            JsonValue::Object(settings) => settings
                .get("name")
                .and_then(JsonValue::as_str)
                .unwrap_or_default(),
            _ => "",
        };
        if name.trim().is_empty() {
            return self.fail(ResolutionError::schema(
                owner,
                format!(
                    "{} extension at '{pointer}' needs to specify an enum name",
                    config.enum_extension
                ),
            ));
        }

        let candidate = EnumType {
            name: Some(name.to_string()),
            values,
            expandable: false,
            origin: pointer.to_string(),
        };
        match self.registry.intern_enum(candidate) {
            Ok(interned) => {
                if interned.is_created() {
                    debug!("Registered enum '{name}' from {pointer}");
                }
                Some(ModelType::Enum(interned.id()))
            }
            Err(conflict) => self.fail(ResolutionError::EnumConflict {
                name: conflict.name,
                first: conflict.existing_origin,
                second: conflict.conflicting_origin,
            }),
        }
    }

    fn build_sequence(
        &mut self,
        node: &SchemaNode,
        suggested_name: &str,
        pointer: &str,
        owner: &str,
    ) -> Option<ModelType> {
        let Some(items) = node.items.as_deref() else {
            return self.fail(ResolutionError::schema(
                owner,
                format!("array at '{pointer}' has no items schema"),
            ));
        };
        let element = self.resolve(
            items,
            &nested_type_name(suggested_name, "Item"),
            &format!("{pointer}/items"),
            owner,
        )?;
        Some(ModelType::Sequence(Box::new(element)))
    }

    fn build_dictionary(
        &mut self,
        value: Option<&SchemaNode>,
        suggested_name: &str,
        pointer: &str,
        owner: &str,
    ) -> Option<ModelType> {
        let value_type = match value {
            // `additionalProperties: true`
            None => ModelType::Primary(PrimaryType::Object),
            Some(schema) => self.resolve(
                schema,
                &nested_type_name(suggested_name, "Value"),
                &format!("{pointer}/additionalProperties"),
                owner,
            )?,
        };
        Some(ModelType::Dictionary(Box::new(value_type)))
    }

    fn build_primary(&mut self, node: &SchemaNode, pointer: &str, owner: &str) -> Option<ModelType> {
        match primitives::primary_type(node.schema_type.as_deref(), node.format.as_deref()) {
            Ok(kind) => Some(ModelType::Primary(kind)),
            Err(UnknownPrimitive::Format {
                schema_type,
                format,
                fallback,
            }) if self.config.allow_unknown_formats => {
                warn!(
                    "Ignoring unsupported format '{format}' for type '{schema_type}' at '{pointer}', using {fallback}"
                );
                Some(ModelType::Primary(fallback))
            }
            Err(error) => self.fail(ResolutionError::schema(owner, format!("{error} at '{pointer}'"))),
        }
    }
}
