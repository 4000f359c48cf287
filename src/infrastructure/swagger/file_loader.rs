//! File-based Swagger document loader
//!
//! This loader handles only file I/O. The actual parsing is done by the
//! SwaggerParser.

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::loader::SpecLoader;
use super::parser::SwaggerParser;
use super::types::SwaggerDocument;
use crate::core::error::Result;

/// Loads Swagger documents from local files
pub struct FileSpecLoader;

impl FileSpecLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSpecLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpecLoader for FileSpecLoader {
    async fn load(&self, source: &str) -> Result<SwaggerDocument> {
        debug!("FileSpecLoader: reading {source}");
        let content = fs::read_to_string(source).await?;
        let value = SwaggerParser::decode(&content, source)?;
        SwaggerParser::new(value).parse()
    }
}
