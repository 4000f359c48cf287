//! Use case for building the client model of a Swagger document

use std::sync::Arc;
use tracing::info;

use crate::application::{ApplicationError, BuildModelRequest, BuildModelResponse, ModelSummary};
use crate::infrastructure::swagger::SpecLoader;
use crate::modeler::Modeler;

/// Use case for building a client model
pub struct BuildModelUseCase {
    loader: Arc<dyn SpecLoader>,
}

impl BuildModelUseCase {
    pub fn new(loader: Arc<dyn SpecLoader>) -> Self {
        Self { loader }
    }

    pub async fn execute(
        &self,
        request: BuildModelRequest,
    ) -> Result<BuildModelResponse, ApplicationError> {
        // 1. Validate request
        request.validate()?;

        // 2. Load the document; no I/O happens after this point
        info!("Loading Swagger document from {}", request.source);
        let document = self.loader.load(&request.source).await?;

        // 3. Run the resolution pass
        let model = Modeler::new(&document, &request.config).build()?;

        let summary = ModelSummary::of(&model);
        info!("Built client model {summary}");
        Ok(BuildModelResponse { model, summary })
    }
}
