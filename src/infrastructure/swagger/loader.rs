//! Port interface for loading Swagger documents

use async_trait::async_trait;

use super::types::SwaggerDocument;
use crate::core::error::Result;

/// Loads Swagger documents from a source (path or URL)
#[async_trait]
pub trait SpecLoader: Send + Sync {
    /// Load and parse a document
    async fn load(&self, source: &str) -> Result<SwaggerDocument>;
}
