//! Schema resolution engine.
//!
//! [`Modeler`] runs one resolution pass over a parsed [`SwaggerDocument`]:
//!
//! 1. every definition is resolved by the [`TypeResolver`], registering
//!    composites as stubs before populating them
//! 2. every selected operation is mapped to a method
//! 3. the hierarchy pass walks base chains, fills derived sets and validates
//!    discriminators and property overrides
//!
//! The pass returns either a complete [`ClientModel`] or every error it found.
//!
//! # Example
//!
//! ```rust
//! use swagger_modeler::core::ModelerConfig;
//! use swagger_modeler::infrastructure::swagger::SwaggerParser;
//! use swagger_modeler::modeler::Modeler;
//!
//! let document = SwaggerParser::new(serde_json::json!({
//!     "swagger": "2.0",
//!     "info": { "title": "widget service", "version": "1.0" },
//!     "definitions": {
//!         "Widget": { "properties": { "name": { "type": "string" } } }
//!     }
//! }))
//! .parse()
//! .unwrap();
//!
//! let config = ModelerConfig::default();
//! let model = Modeler::new(&document, &config).build().unwrap();
//! assert_eq!(model.name, "WidgetService");
//! assert!(model.find_composite("widget").is_some());
//! ```

pub mod composite;
pub mod errors;
pub mod hierarchy;
pub mod operations;
pub mod primitives;
pub mod resolver;

pub use errors::{ErrorKind, ResolutionError, ResolutionErrors};
pub use resolver::TypeResolver;

use tracing::{info, warn};

use crate::core::ModelerConfig;
use crate::core::utils::to_proper_case;
use crate::infrastructure::swagger::SwaggerDocument;
use crate::model::ClientModel;

/// One resolution pass over a document
pub struct Modeler<'a> {
    document: &'a SwaggerDocument,
    config: &'a ModelerConfig,
}

impl<'a> Modeler<'a> {
    pub fn new(document: &'a SwaggerDocument, config: &'a ModelerConfig) -> Self {
        Self { document, config }
    }

    /// Resolves the whole document. No model is returned if any error was
    /// recorded.
    pub fn build(&self) -> Result<ClientModel, ResolutionErrors> {
        let mut resolver = TypeResolver::new(self.document, self.config);
        for (name, detail) in &self.document.malformed_definitions {
            resolver.fail::<()>(ResolutionError::schema(
                name,
                format!("definition is malformed: {detail}"),
            ));
        }
        for name in self.document.definitions.keys() {
            resolver.resolve_definition(name);
        }
        let methods = resolver.build_methods();

        let (mut registry, mut errors) = resolver.into_parts();
        hierarchy::resolve_hierarchies(&mut registry, &mut errors);

        let base_url = self.base_url().unwrap_or_else(|error| {
            errors.push(error);
            None
        });

        let name = self.client_name();
        if let Some(errors) = ResolutionErrors::from_accumulated(errors) {
            warn!(
                "Resolution of '{name}' failed with {} error(s)",
                errors.len()
            );
            return Err(errors);
        }

        info!(
            "Resolved '{name}': {} composite types, {} enums, {} methods",
            registry.composite_count(),
            registry.enum_count(),
            methods.len()
        );
        Ok(ClientModel {
            name,
            api_version: self.document.info.version.clone(),
            base_url,
            description: self.document.info.description.clone(),
            registry,
            methods,
        })
    }

    fn client_name(&self) -> String {
        if let Some(name) = &self.config.client_name {
            return name.clone();
        }
        match to_proper_case(&self.document.info.title) {
            name if name.is_empty() => "Client".to_string(),
            name => name,
        }
    }

    /// `<scheme>://<host><basePath>`, preferring the first declared scheme
    fn base_url(&self) -> Result<Option<String>, ResolutionError> {
        let Some(host) = self.document.host.as_deref() else {
            return Ok(None);
        };
        let scheme = self
            .document
            .schemes
            .first()
            .map(String::as_str)
            .unwrap_or("https");
        let base_url = format!(
            "{scheme}://{host}{}",
            self.document.base_path.as_deref().unwrap_or_default()
        );

        url::Url::parse(&base_url).map_err(|e| {
            ResolutionError::schema("host", format!("base URL '{base_url}' is invalid: {e}"))
        })?;
        Ok(Some(base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::swagger::SwaggerParser;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> SwaggerDocument {
        SwaggerParser::new(value).parse().unwrap()
    }

    #[test]
    fn test_client_metadata() {
        let document = parse(json!({
            "swagger": "2.0",
            "info": { "title": "pet store api", "version": "2016-02-29" },
            "host": "petstore.example.com",
            "basePath": "/v1",
            "schemes": ["http"]
        }));
        let config = ModelerConfig::default();

        let model = Modeler::new(&document, &config).build().unwrap();
        assert_eq!(model.name, "PetStoreApi");
        assert_eq!(model.api_version, "2016-02-29");
        assert_eq!(model.base_url.as_deref(), Some("http://petstore.example.com/v1"));
    }

    #[test]
    fn test_client_name_override_and_default_scheme() {
        let document = parse(json!({
            "swagger": "2.0",
            "info": { "title": "", "version": "1" },
            "host": "localhost:3000"
        }));
        let config = ModelerConfig {
            client_name: Some("AutoRestClient".to_string()),
            ..Default::default()
        };

        let model = Modeler::new(&document, &config).build().unwrap();
        assert_eq!(model.name, "AutoRestClient");
        assert_eq!(model.base_url.as_deref(), Some("https://localhost:3000"));
    }

    #[test]
    fn test_invalid_host_fails_the_run() {
        let document = parse(json!({
            "swagger": "2.0",
            "info": { "title": "t", "version": "1" },
            "host": "bad host"
        }));
        let config = ModelerConfig::default();

        let errors = Modeler::new(&document, &config).build().unwrap_err();
        assert_eq!(errors.errors()[0].definition(), "host");
    }

    #[test]
    fn test_malformed_definition_is_reported_beside_its_siblings() {
        let document = parse(json!({
            "swagger": "2.0",
            "info": { "title": "t", "version": "1" },
            "definitions": {
                "Bad": { "properties": { "id": { "type": "string", "required": true } } },
                "Holder": { "properties": { "bad": { "$ref": "#/definitions/Bad" } } },
                "Worse": { "type": "string", "format": "moonphase" }
            }
        }));
        let config = ModelerConfig::default();

        let errors = Modeler::new(&document, &config).build().unwrap_err();
        let definitions: Vec<_> = errors.iter().map(ResolutionError::definition).collect();
        assert_eq!(definitions, vec!["Bad", "Worse"]);
        assert!(errors.errors()[0].to_string().contains("definition is malformed"));
    }

    #[test]
    fn test_definitions_differing_only_in_case_are_rejected() {
        let document = parse(json!({
            "swagger": "2.0",
            "info": { "title": "t", "version": "1" },
            "definitions": {
                "Pet": { "properties": { "name": { "type": "string" } } },
                "pet": { "properties": { "legs": { "type": "integer" } } }
            }
        }));
        let config = ModelerConfig::default();

        let errors = Modeler::new(&document, &config).build().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].definition(), "pet");
        assert!(errors.errors()[0].to_string().contains("differs from 'Pet' only in case"));
    }

    #[test]
    fn test_errors_accumulate_across_definitions() {
        let document = parse(json!({
            "swagger": "2.0",
            "info": { "title": "t", "version": "1" },
            "definitions": {
                "A": { "type": "integer", "format": "int8" },
                "B": { "properties": { "ok": { "type": "string" } } },
                "C": { "type": "string", "format": "color" }
            }
        }));
        let config = ModelerConfig::default();

        let errors = Modeler::new(&document, &config).build().unwrap_err();
        let definitions: Vec<_> = errors.iter().map(ResolutionError::definition).collect();
        assert_eq!(definitions, vec!["A", "C"]);
    }
}
