//! Swagger document parser
//!
//! Turns an already decoded JSON value into the [`SwaggerDocument`] schema
//! graph. Parsing is synchronous and performs no I/O; loaders hand it the
//! decoded document.

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::types::{SchemaNode, SwaggerDocument};
use crate::core::error::{Error, Result};

/// Swagger document parser
pub struct SwaggerParser {
    /// The raw JSON value of the document
    pub json: JsonValue,
}

impl SwaggerParser {
    /// Create a new parser from JSON content
    pub fn new(json: JsonValue) -> Self {
        Self { json }
    }

    /// Decode text that is either JSON or YAML.
    ///
    /// `hint` is the source path or URL; a `.json`/`.yaml`/`.yml` suffix picks
    /// the decoder, otherwise JSON is tried first, then YAML.
    pub fn decode(content: &str, hint: &str) -> Result<JsonValue> {
        if hint.ends_with(".json") {
            Ok(serde_json::from_str(content)?)
        } else if hint.ends_with(".yaml") || hint.ends_with(".yml") {
            Ok(serde_yaml::from_str(content)?)
        } else {
            serde_json::from_str(content)
                .or_else(|_| serde_yaml::from_str(content))
                .map_err(|e| Error::load(format!("Failed to parse Swagger document: {e}")))
        }
    }

    /// Parse the document into the schema graph
    pub fn parse(&self) -> Result<SwaggerDocument> {
        if let Some(version) = self.json.get("openapi").and_then(JsonValue::as_str) {
            return Err(Error::load(format!(
                "OpenAPI {version} documents are not supported; expected a Swagger 2.0 document"
            )));
        }

        // Unquoted YAML `swagger: 2.0` decodes as a number
        let version = match self.json.get("swagger") {
            Some(JsonValue::String(version)) => version.clone(),
            Some(JsonValue::Number(version)) => version.to_string(),
            _ => return Err(Error::load("Missing 'swagger' version marker")),
        };
        if version != "2.0" {
            return Err(Error::load(format!(
                "Unsupported Swagger version '{version}', expected '2.0'"
            )));
        }

        let mut json = self.json.clone();
        json["swagger"] = JsonValue::String(version);
        let definitions = json
            .as_object_mut()
            .and_then(|document| document.remove("definitions"));

        let mut document: SwaggerDocument = serde_json::from_value(json)?;
        match definitions {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::Object(definitions)) => {
                for (name, node) in definitions {
                    match serde_json::from_value::<SchemaNode>(node) {
                        Ok(node) => {
                            document.definitions.insert(name, node);
                        }
                        Err(e) => {
                            warn!("Definition '{name}' is malformed: {e}");
                            document.malformed_definitions.insert(name, e.to_string());
                        }
                    }
                }
            }
            Some(_) => return Err(Error::load("'definitions' must be an object")),
        }
        debug!(
            "Parsed Swagger document '{}' with {} definitions and {} paths",
            document.info.title,
            document.definitions.len(),
            document.paths.len()
        );
        Ok(document)
    }
}
