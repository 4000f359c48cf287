//! Model types of the client model.
//!
//! Named enums and composites live in the [`ModelRegistry`](super::ModelRegistry)
//! arena; [`ModelType`] refers to them through [`EnumId`] / [`CompositeId`]
//! handles, so two references to the same definition compare equal by
//! identity and cyclic graphs need no owning pointers.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use std::fmt;

/// Handle of a composite type in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CompositeId(pub(crate) usize);

impl CompositeId {
    /// Arena index of the composite
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of an enum type in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EnumId(pub(crate) usize);

impl EnumId {
    /// Arena index of the enum
    pub fn index(self) -> usize {
        self.0
    }
}

/// Canonical scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimaryType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Char,
    ByteArray,
    Base64Url,
    Date,
    DateTime,
    DateTimeRfc1123,
    TimeSpan,
    Uuid,
    UnixTime,
    Stream,
    Object,
}

impl PrimaryType {
    /// Whether wire values of this kind are JSON strings
    pub fn is_string_compatible(self) -> bool {
        matches!(self, PrimaryType::String | PrimaryType::Char)
    }
}

impl fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimaryType::Boolean => "boolean",
            PrimaryType::Int => "int",
            PrimaryType::Long => "long",
            PrimaryType::Float => "float",
            PrimaryType::Double => "double",
            PrimaryType::Decimal => "decimal",
            PrimaryType::String => "string",
            PrimaryType::Char => "char",
            PrimaryType::ByteArray => "byteArray",
            PrimaryType::Base64Url => "base64Url",
            PrimaryType::Date => "date",
            PrimaryType::DateTime => "dateTime",
            PrimaryType::DateTimeRfc1123 => "dateTimeRfc1123",
            PrimaryType::TimeSpan => "timeSpan",
            PrimaryType::Uuid => "uuid",
            PrimaryType::UnixTime => "unixTime",
            PrimaryType::Stream => "stream",
            PrimaryType::Object => "object",
        };
        write!(f, "{name}")
    }
}

/// A resolved type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelType {
    Primary(PrimaryType),
    Enum(EnumId),
    Sequence(Box<ModelType>),
    /// Keys are always strings
    Dictionary(Box<ModelType>),
    Composite(CompositeId),
}

impl ModelType {
    /// Element type of a sequence
    pub fn element_type(&self) -> Option<&ModelType> {
        match self {
            ModelType::Sequence(element) => Some(element),
            _ => None,
        }
    }

    /// Value type of a dictionary
    pub fn value_type(&self) -> Option<&ModelType> {
        match self {
            ModelType::Dictionary(value) => Some(value),
            _ => None,
        }
    }

    /// The composite handle, when this is a composite
    pub fn as_composite(&self) -> Option<CompositeId> {
        match self {
            ModelType::Composite(id) => Some(*id),
            _ => None,
        }
    }

    /// The enum handle, when this is an enum
    pub fn as_enum(&self) -> Option<EnumId> {
        match self {
            ModelType::Enum(id) => Some(*id),
            _ => None,
        }
    }
}

/// One enum member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    /// Symbolic name backends emit
    pub name: String,
    /// Value on the wire
    pub serialized_name: String,
}

/// An enumeration of string values
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumType {
    /// `None` for anonymous enums
    pub name: Option<String>,
    pub values: Vec<EnumValue>,
    /// Expandable enums accept unknown wire values; closed ones reject them
    pub expandable: bool,
    /// JSON pointer of the node that declared the enum
    pub origin: String,
}

impl EnumType {
    pub fn is_closed(&self) -> bool {
        !self.expandable
    }

    /// Whether two enums declare the same values in the same order
    pub fn same_values(&self, other: &EnumType) -> bool {
        self.values == other.values
    }
}

/// Validation keywords carried over from the schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub exclusive_minimum: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// A property of a composite
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Name on the wire
    pub name: String,
    pub model_type: ModelType,
    pub required: bool,
    pub read_only: bool,
    /// Required with a single allowed value
    pub is_constant: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
    #[serde(skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
}

/// Resolution progress of a composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositeState {
    /// Registered, properties not resolved yet
    Stub,
    PropertiesResolved,
    HierarchyResolved,
}

/// A named record type, possibly part of a polymorphic hierarchy
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeType {
    pub name: String,
    /// JSON pointer of the node that declared the type
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<CompositeId>,
    /// Discriminating property, set on hierarchy roots only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polymorphic_discriminator: Option<String>,
    /// Discriminator value identifying this type on the wire
    pub discriminator_value: String,
    /// Every transitive descendant
    pub derived: BTreeSet<CompositeId>,
    pub state: CompositeState,
}

impl CompositeType {
    /// A freshly registered, empty composite
    pub fn stub(name: &str, origin: &str) -> Self {
        Self {
            name: name.to_string(),
            origin: origin.to_string(),
            description: None,
            properties: Vec::new(),
            base: None,
            polymorphic_discriminator: None,
            discriminator_value: name.to_string(),
            derived: BTreeSet::new(),
            state: CompositeState::Stub,
        }
    }

    /// Own (non-inherited) property by wire name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_polymorphic_root(&self) -> bool {
        self.polymorphic_discriminator.is_some()
    }
}
