//! Port interfaces for the application layer

use async_trait::async_trait;

use crate::application::ApplicationError;
use crate::model::ClientModel;

/// Destination of a finished client model
#[async_trait]
pub trait ModelOutput: Send + Sync {
    /// Write the model to the output destination
    async fn write_model(&self, model: &ClientModel) -> Result<(), ApplicationError>;
}
