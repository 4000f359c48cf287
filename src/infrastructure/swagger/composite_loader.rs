//! Composite loader that picks a loading strategy from the source

use async_trait::async_trait;
use tracing::debug;

use super::file_loader::FileSpecLoader;
use super::http_loader::HttpSpecLoader;
use super::loader::SpecLoader;
use super::types::SwaggerDocument;
use crate::core::error::Result;

/// Dispatches to the HTTP loader for URLs and the file loader otherwise
pub struct CompositeSpecLoader {
    http: HttpSpecLoader,
    file: FileSpecLoader,
}

impl CompositeSpecLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpSpecLoader::new()?,
            file: FileSpecLoader::new(),
        })
    }
}

#[async_trait]
impl SpecLoader for CompositeSpecLoader {
    async fn load(&self, source: &str) -> Result<SwaggerDocument> {
        if source.starts_with("http://") || source.starts_with("https://") {
            debug!("CompositeSpecLoader: using HTTP loader for {source}");
            self.http.load(source).await
        } else {
            debug!("CompositeSpecLoader: using file loader for {source}");
            self.file.load(source).await
        }
    }
}
