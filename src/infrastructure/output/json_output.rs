//! JSON output of the finished client model

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::{ApplicationError, ModelOutput};
use crate::model::ClientModel;

/// Writes the model as pretty-printed JSON to a file or to stdout
pub struct JsonModelOutput {
    destination: Option<PathBuf>,
}

impl JsonModelOutput {
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            destination: Some(path.into()),
        }
    }

    pub fn to_stdout() -> Self {
        Self { destination: None }
    }
}

#[async_trait]
impl ModelOutput for JsonModelOutput {
    async fn write_model(&self, model: &ClientModel) -> Result<(), ApplicationError> {
        let mut json = serde_json::to_string_pretty(model).map_err(|e| {
            ApplicationError::OutputError(format!("Failed to serialize model: {e}"))
        })?;
        json.push('\n');

        let Some(path) = &self.destination else {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(json.as_bytes()).await.map_err(|e| {
                ApplicationError::OutputError(format!("Failed to write to stdout: {e}"))
            })?;
            stdout.flush().await.map_err(|e| {
                ApplicationError::OutputError(format!("Failed to flush stdout: {e}"))
            })?;
            return Ok(());
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                ApplicationError::OutputError(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = fs::File::create(path).await.map_err(|e| {
            ApplicationError::OutputError(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        file.write_all(json.as_bytes()).await.map_err(|e| {
            ApplicationError::OutputError(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        file.flush().await.map_err(|e| {
            ApplicationError::OutputError(format!("Failed to flush file {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}
