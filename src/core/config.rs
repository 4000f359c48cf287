//! Configuration options for a resolution run.
//!
//! [`ModelerConfig`] controls the policy knobs of the modeler:
//!
//! - which vendor extensions name enums and discriminator values
//! - whether unknown `format` values are tolerated
//! - which operations are modeled
//! - the client name override
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```rust
//! use swagger_modeler::core::ModelerConfig;
//!
//! let config = ModelerConfig {
//!     allow_unknown_formats: true,
//!     exclude_operations: vec!["Pets_Delete".to_string()],
//!     ..Default::default()
//! };
//! assert!(config.includes_operation("Pets_List"));
//! assert!(!config.includes_operation("Pets_Delete"));
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::core::error::{Error, Result};

/// Default vendor extension naming a closed enum
pub const DEFAULT_ENUM_EXTENSION: &str = "x-ms-enum";

/// Default vendor extension carrying a derived type's discriminator value
pub const DEFAULT_DISCRIMINATOR_VALUE_EXTENSION: &str = "x-ms-discriminator-value";

/// Configuration struct for a single resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelerConfig {
    /// Overrides the client name derived from `info.title`
    pub client_name: Option<String>,

    /// Vendor extension that turns a string enumeration into a named, closed enum
    pub enum_extension: String,

    /// Vendor extension holding the discriminator value of a derived type
    pub discriminator_value_extension: String,

    /// Ignore unknown `format` values instead of failing the node
    pub allow_unknown_formats: bool,

    /// Operation ids to model (all operations when empty)
    pub include_operations: Vec<String>,

    /// Operation ids to leave out
    pub exclude_operations: Vec<String>,
}

impl Default for ModelerConfig {
    fn default() -> Self {
        Self {
            client_name: None,
            enum_extension: DEFAULT_ENUM_EXTENSION.to_string(),
            discriminator_value_extension: DEFAULT_DISCRIMINATOR_VALUE_EXTENSION.to_string(),
            allow_unknown_formats: false,
            include_operations: Vec::new(),
            exclude_operations: Vec::new(),
        }
    }
}

impl ModelerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, picking the format from its extension
    pub async fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading modeler configuration from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(Error::config(format!(
                "Unsupported configuration format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    /// Whether the operation with the given id should be modeled
    pub fn includes_operation(&self, operation_id: &str) -> bool {
        let included = self.include_operations.is_empty()
            || self.include_operations.iter().any(|id| id == operation_id);
        included && !self.exclude_operations.iter().any(|id| id == operation_id)
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("enum_extension", &self.enum_extension),
            (
                "discriminator_value_extension",
                &self.discriminator_value_extension,
            ),
        ] {
            if !value.starts_with("x-") {
                return Err(Error::config(format!(
                    "{field} must name a vendor extension starting with 'x-', got '{value}'"
                )));
            }
        }
        Ok(())
    }
}
