//! Canonical store of named model types.
//!
//! The registry owns every enum and composite of a resolution run in two
//! arenas and hands out [`EnumId`] / [`CompositeId`] handles. Names are
//! compared case-insensitively, so `Fish` and `fish` intern to the same
//! instance.

use serde::Serialize;
use std::collections::HashMap;

use super::types::{CompositeId, CompositeType, EnumId, EnumType};

/// Outcome of an intern call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interned<T> {
    /// The builder ran and the value was stored under a fresh handle
    Created(T),
    /// A value with the same name was already registered
    Existing(T),
}

impl<T: Copy> Interned<T> {
    pub fn id(&self) -> T {
        match self {
            Interned::Created(id) | Interned::Existing(id) => *id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Interned::Created(_))
    }
}

/// A named enum registered twice with different values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConflict {
    pub name: String,
    /// Origin of the first registration
    pub existing_origin: String,
    /// Origin of the rejected candidate
    pub conflicting_origin: String,
}

/// Arena-backed registry of named enums and composites
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelRegistry {
    composites: Vec<CompositeType>,
    enums: Vec<EnumType>,
    #[serde(skip)]
    composite_names: HashMap<String, CompositeId>,
    #[serde(skip)]
    enum_names: HashMap<String, EnumId>,
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the composite registered under `name`, running `build` to
    /// create it when the name is new. `build` is never invoked for a name
    /// that is already registered.
    pub fn intern_composite<F>(&mut self, name: &str, build: F) -> Interned<CompositeId>
    where
        F: FnOnce() -> CompositeType,
    {
        let key = name_key(name);
        if let Some(id) = self.composite_names.get(&key) {
            return Interned::Existing(*id);
        }

        let id = CompositeId(self.composites.len());
        self.composites.push(build());
        self.composite_names.insert(key, id);
        Interned::Created(id)
    }

    /// Interns a named enum.
    ///
    /// The first registration of a name wins. Later candidates with the same
    /// name must carry exactly the same values in the same order, otherwise
    /// the candidate is rejected and the stored enum is left untouched.
    pub fn intern_enum(&mut self, candidate: EnumType) -> Result<Interned<EnumId>, EnumConflict> {
        let Some(name) = candidate.name.as_deref() else {
            return Ok(Interned::Created(self.add_anonymous_enum(candidate)));
        };

        let key = name_key(name);
        if let Some(id) = self.enum_names.get(&key) {
            let existing = &self.enums[id.0];
            if existing.same_values(&candidate) {
                return Ok(Interned::Existing(*id));
            }
            return Err(EnumConflict {
                name: existing.name.clone().unwrap_or_else(|| name.to_string()),
                existing_origin: existing.origin.clone(),
                conflicting_origin: candidate.origin,
            });
        }

        let id = EnumId(self.enums.len());
        self.enums.push(candidate);
        self.enum_names.insert(key, id);
        Ok(Interned::Created(id))
    }

    /// Stores an anonymous enum. Anonymous enums are never looked up by name.
    pub fn add_anonymous_enum(&mut self, enum_type: EnumType) -> EnumId {
        let id = EnumId(self.enums.len());
        self.enums.push(enum_type);
        id
    }

    pub fn composite(&self, id: CompositeId) -> &CompositeType {
        &self.composites[id.0]
    }

    pub(crate) fn composite_mut(&mut self, id: CompositeId) -> &mut CompositeType {
        &mut self.composites[id.0]
    }

    pub fn enum_type(&self, id: EnumId) -> &EnumType {
        &self.enums[id.0]
    }

    /// Case-insensitive lookup of a composite
    pub fn find_composite(&self, name: &str) -> Option<CompositeId> {
        self.composite_names.get(&name_key(name)).copied()
    }

    /// Case-insensitive lookup of a named enum
    pub fn find_enum(&self, name: &str) -> Option<EnumId> {
        self.enum_names.get(&name_key(name)).copied()
    }

    /// All composites in registration order
    pub fn composites(&self) -> impl Iterator<Item = (CompositeId, &CompositeType)> {
        self.composites
            .iter()
            .enumerate()
            .map(|(index, composite)| (CompositeId(index), composite))
    }

    /// All enums, named and anonymous, in registration order
    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &EnumType)> {
        self.enums
            .iter()
            .enumerate()
            .map(|(index, enum_type)| (EnumId(index), enum_type))
    }

    pub fn composite_ids(&self) -> Vec<CompositeId> {
        (0..self.composites.len()).map(CompositeId).collect()
    }

    pub fn composite_count(&self) -> usize {
        self.composites.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }
}
