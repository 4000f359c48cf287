//! Data Transfer Objects for application layer

use serde::Serialize;

use crate::application::ValidationError;
use crate::core::ModelerConfig;
use crate::model::ClientModel;

/// Request to build the client model of one document
#[derive(Debug, Clone)]
pub struct BuildModelRequest {
    /// File path or HTTP(S) URL of the Swagger document
    pub source: String,
    pub config: ModelerConfig,
}

impl BuildModelRequest {
    pub fn new(source: impl Into<String>, config: ModelerConfig) -> Self {
        Self {
            source: source.into(),
            config,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source.trim().is_empty() {
            return Err(ValidationError::EmptySource);
        }
        Ok(())
    }
}

/// Counts reported after a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub client_name: String,
    pub composite_types: usize,
    pub enum_types: usize,
    pub methods: usize,
    /// Names of the composites that root a polymorphic hierarchy
    pub polymorphic_roots: Vec<String>,
}

impl ModelSummary {
    pub fn of(model: &ClientModel) -> Self {
        Self {
            client_name: model.name.clone(),
            composite_types: model.registry.composite_count(),
            enum_types: model.registry.enum_count(),
            methods: model.methods.len(),
            polymorphic_roots: model
                .registry
                .composites()
                .filter(|(_, composite)| composite.is_polymorphic_root())
                .map(|(_, composite)| composite.name.clone())
                .collect(),
        }
    }
}

impl std::fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} composite types, {} enums, {} methods",
            self.client_name, self.composite_types, self.enum_types, self.methods
        )?;
        if !self.polymorphic_roots.is_empty() {
            write!(
                f,
                ", polymorphic roots: {}",
                self.polymorphic_roots.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Response from a model build
#[derive(Debug, Clone)]
pub struct BuildModelResponse {
    pub model: ClientModel,
    pub summary: ModelSummary,
}
