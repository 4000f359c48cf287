//! Error taxonomy of the resolution pass

use std::fmt;
use thiserror::Error;

/// Kind tag of a [`ResolutionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Schema,
    EnumConflict,
    Cycle,
    Discriminator,
    PropertyConflict,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Schema => write!(f, "SchemaError"),
            ErrorKind::EnumConflict => write!(f, "EnumConflictError"),
            ErrorKind::Cycle => write!(f, "CycleError"),
            ErrorKind::Discriminator => write!(f, "DiscriminatorError"),
            ErrorKind::PropertyConflict => write!(f, "PropertyConflictError"),
        }
    }
}

/// One defect found while resolving a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Malformed or unsupported node shape
    #[error("SchemaError in '{definition}': {detail}")]
    Schema { definition: String, detail: String },

    /// The same named enum declared with different values
    #[error(
        "EnumConflictError for enum '{name}': values declared at '{first}' differ from '{second}'"
    )]
    EnumConflict {
        name: String,
        first: String,
        second: String,
    },

    /// An inheritance chain revisits itself
    #[error("CycleError in '{definition}': inheritance chain {}", chain.join(" -> "))]
    Cycle {
        definition: String,
        chain: Vec<String>,
    },

    /// Discriminator property missing, mistyped or ambiguous
    #[error("DiscriminatorError in '{definition}': {detail}")]
    Discriminator { definition: String, detail: String },

    /// A property redeclared with an incompatible type
    #[error("PropertyConflictError in '{definition}': {detail}")]
    PropertyConflict { definition: String, detail: String },
}

impl ResolutionError {
    pub fn schema(definition: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Schema {
            definition: definition.into(),
            detail: detail.into(),
        }
    }

    pub fn discriminator(definition: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Discriminator {
            definition: definition.into(),
            detail: detail.into(),
        }
    }

    pub fn property_conflict(definition: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::PropertyConflict {
            definition: definition.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema { .. } => ErrorKind::Schema,
            Self::EnumConflict { .. } => ErrorKind::EnumConflict,
            Self::Cycle { .. } => ErrorKind::Cycle,
            Self::Discriminator { .. } => ErrorKind::Discriminator,
            Self::PropertyConflict { .. } => ErrorKind::PropertyConflict,
        }
    }

    /// The offending definition (the enum name for enum conflicts)
    pub fn definition(&self) -> &str {
        match self {
            Self::Schema { definition, .. }
            | Self::Cycle { definition, .. }
            | Self::Discriminator { definition, .. }
            | Self::PropertyConflict { definition, .. } => definition,
            Self::EnumConflict { name, .. } => name,
        }
    }
}

/// Every defect of a failed run, in discovery order. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ResolutionErrors {
    errors: Vec<ResolutionError>,
}

impl ResolutionErrors {
    /// Wraps accumulated errors; `errors` must not be empty
    pub fn new(errors: Vec<ResolutionError>) -> Self {
        debug_assert!(!errors.is_empty(), "a failed resolution has at least one error");
        Self { errors }
    }

    /// `None` when nothing went wrong
    pub fn from_accumulated(errors: Vec<ResolutionError>) -> Option<Self> {
        (!errors.is_empty()).then_some(Self { errors })
    }

    pub fn errors(&self) -> &[ResolutionError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolutionError> {
        self.errors.iter()
    }

    /// Errors of one kind
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &ResolutionError> {
        self.errors.iter().filter(move |e| e.kind() == kind)
    }
}

impl fmt::Display for ResolutionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resolution failed with {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ResolutionErrors {
    type Item = &'a ResolutionError;
    type IntoIter = std::slice::Iter<'a, ResolutionError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_definition() {
        let error = ResolutionError::schema("Widget", "unsupported format 'int8'");
        assert_eq!(
            error.to_string(),
            "SchemaError in 'Widget': unsupported format 'int8'"
        );
        assert_eq!(error.kind(), ErrorKind::Schema);
        assert_eq!(error.definition(), "Widget");
    }

    #[test]
    fn test_cycle_display_shows_chain() {
        let error = ResolutionError::Cycle {
            definition: "A".to_string(),
            chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(error.to_string(), "CycleError in 'A': inheritance chain A -> B -> A");
    }

    #[test]
    fn test_aggregate_lists_every_error() {
        let errors = ResolutionErrors::new(vec![
            ResolutionError::schema("Widget", "bad format"),
            ResolutionError::EnumConflict {
                name: "Color".to_string(),
                first: "#/definitions/A".to_string(),
                second: "#/definitions/B".to_string(),
            },
        ]);

        let text = errors.to_string();
        assert!(text.starts_with("resolution failed with 2 error(s)"));
        assert!(text.contains("Widget"));
        assert!(text.contains("#/definitions/B"));
        assert_eq!(errors.of_kind(ErrorKind::EnumConflict).count(), 1);
        assert_eq!(errors.errors()[1].definition(), "Color");
    }

    #[test]
    fn test_from_accumulated() {
        assert!(ResolutionErrors::from_accumulated(Vec::new()).is_none());
        let errors =
            ResolutionErrors::from_accumulated(vec![ResolutionError::discriminator("Fish", "x")])
                .unwrap();
        assert_eq!(errors.len(), 1);
    }
}
