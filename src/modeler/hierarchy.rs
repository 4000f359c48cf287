//! Polymorphic Hierarchy Resolver
//!
//! Runs once every composite of the document is registered and has its own
//! properties. Walks base chains, fills derived sets, and validates
//! discriminators and inherited property types.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::errors::ResolutionError;
use crate::model::{CompositeId, CompositeState, ModelRegistry, ModelType};

/// Whether a property of type `b` may redeclare one of type `a`
pub(crate) fn types_compatible(registry: &ModelRegistry, a: &ModelType, b: &ModelType) -> bool {
    match (a, b) {
        (ModelType::Primary(a), ModelType::Primary(b)) => a == b,
        (ModelType::Enum(a), ModelType::Enum(b)) => {
            a == b || registry.enum_type(*a).same_values(registry.enum_type(*b))
        }
        (ModelType::Composite(a), ModelType::Composite(b)) => a == b,
        (ModelType::Sequence(a), ModelType::Sequence(b))
        | (ModelType::Dictionary(a), ModelType::Dictionary(b)) => types_compatible(registry, a, b),
        _ => false,
    }
}

/// Short human readable form of a type for diagnostics
pub(crate) fn describe_type(registry: &ModelRegistry, model_type: &ModelType) -> String {
    match model_type {
        ModelType::Primary(kind) => kind.to_string(),
        ModelType::Enum(id) => match registry.enum_type(*id).name.as_deref() {
            Some(name) => format!("enum {name}"),
            None => "anonymous enum".to_string(),
        },
        ModelType::Sequence(element) => format!("array<{}>", describe_type(registry, element)),
        ModelType::Dictionary(value) => format!("map<{}>", describe_type(registry, value)),
        ModelType::Composite(id) => registry.composite(*id).name.clone(),
    }
}

fn is_string_compatible(model_type: &ModelType) -> bool {
    match model_type {
        ModelType::Primary(kind) => kind.is_string_compatible(),
        ModelType::Enum(_) => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Pending,
    Acyclic,
    Broken,
}

/// Ancestors (nearest first) of every composite whose base chain terminates.
/// Each cycle is reported once; composites on or above a cycle are left out.
fn walk_base_chains(
    registry: &ModelRegistry,
    errors: &mut Vec<ResolutionError>,
) -> BTreeMap<CompositeId, Vec<CompositeId>> {
    let mut status = vec![Walk::Pending; registry.composite_count()];

    for start in registry.composite_ids() {
        if status[start.index()] != Walk::Pending {
            continue;
        }

        let mut path = Vec::new();
        let mut current = start;
        let outcome = loop {
            path.push(current);
            let Some(base) = registry.composite(current).base else {
                break Walk::Acyclic;
            };
            match status[base.index()] {
                Walk::Pending => {}
                settled => break settled,
            }
            if let Some(position) = path.iter().position(|id| *id == base) {
                let mut chain: Vec<String> = path[position..]
                    .iter()
                    .map(|id| registry.composite(*id).name.clone())
                    .collect();
                chain.push(registry.composite(base).name.clone());
                errors.push(ResolutionError::Cycle {
                    definition: registry.composite(base).name.clone(),
                    chain,
                });
                break Walk::Broken;
            }
            current = base;
        };

        for id in path {
            status[id.index()] = outcome;
        }
    }

    registry
        .composite_ids()
        .into_iter()
        .filter(|id| status[id.index()] == Walk::Acyclic)
        .map(|id| {
            let mut ancestors = Vec::new();
            let mut current = registry.composite(id).base;
            while let Some(base) = current {
                ancestors.push(base);
                current = registry.composite(base).base;
            }
            (id, ancestors)
        })
        .collect()
}

fn check_property_overrides(
    registry: &ModelRegistry,
    chains: &BTreeMap<CompositeId, Vec<CompositeId>>,
    errors: &mut Vec<ResolutionError>,
) {
    for (id, ancestors) in chains {
        let composite = registry.composite(*id);
        for property in &composite.properties {
            let inherited = ancestors.iter().find_map(|ancestor| {
                registry
                    .composite(*ancestor)
                    .property(&property.name)
                    .map(|p| (*ancestor, p))
            });
            let Some((ancestor, inherited)) = inherited else {
                continue;
            };
            if !types_compatible(registry, &inherited.model_type, &property.model_type) {
                errors.push(ResolutionError::property_conflict(
                    &composite.name,
                    format!(
                        "property '{}' of type {} overrides '{}.{}' of incompatible type {}",
                        property.name,
                        describe_type(registry, &property.model_type),
                        registry.composite(ancestor).name,
                        inherited.name,
                        describe_type(registry, &inherited.model_type)
                    ),
                ));
            }
        }
    }
}

fn check_discriminators(
    registry: &ModelRegistry,
    chains: &BTreeMap<CompositeId, Vec<CompositeId>>,
    errors: &mut Vec<ResolutionError>,
) {
    for (id, ancestors) in chains {
        let root = registry.composite(*id);
        let Some(discriminator) = root.polymorphic_discriminator.as_deref() else {
            continue;
        };

        let property = std::iter::once(id)
            .chain(ancestors)
            .find_map(|member| registry.composite(*member).property(discriminator));
        match property {
            None => {
                errors.push(ResolutionError::discriminator(
                    &root.name,
                    format!(
                        "discriminator property '{discriminator}' is not declared on '{}' or its ancestors",
                        root.name
                    ),
                ));
                continue;
            }
            Some(property) if !is_string_compatible(&property.model_type) => {
                errors.push(ResolutionError::discriminator(
                    &root.name,
                    format!(
                        "discriminator property '{discriminator}' must be a string, found {}",
                        describe_type(registry, &property.model_type)
                    ),
                ));
                continue;
            }
            Some(_) => {}
        }

        let mut seen: HashMap<&str, CompositeId> = HashMap::new();
        for member in std::iter::once(*id).chain(root.derived.iter().copied()) {
            let value = registry.composite(member).discriminator_value.as_str();
            if let Some(previous) = seen.insert(value, member) {
                errors.push(ResolutionError::discriminator(
                    &root.name,
                    format!(
                        "discriminator value '{value}' is used by both '{}' and '{}'",
                        registry.composite(previous).name,
                        registry.composite(member).name
                    ),
                ));
            }
        }
        debug!(
            "Validated hierarchy '{}' with {} derived types",
            root.name,
            root.derived.len()
        );
    }
}

/// Resolves every hierarchy in the registry, appending defects to `errors`
pub(crate) fn resolve_hierarchies(registry: &mut ModelRegistry, errors: &mut Vec<ResolutionError>) {
    let chains = walk_base_chains(registry, errors);

    for (id, ancestors) in &chains {
        for ancestor in ancestors {
            registry.composite_mut(*ancestor).derived.insert(*id);
        }
    }

    check_property_overrides(registry, &chains, errors);
    check_discriminators(registry, &chains, errors);

    for id in chains.keys() {
        registry.composite_mut(*id).state = CompositeState::HierarchyResolved;
    }
}
