use std::sync::Arc;

use gsearch_core::api::{AnswerEngine, AppConfig, EngineError};

use crate::backend::GeminiEngine;

pub fn build_engine(cfg: &AppConfig) -> Result<Arc<dyn AnswerEngine>, EngineError> {
    match cfg.backend.provider.as_str() {
        "gemini" => {
            let engine = GeminiEngine::new(&cfg.search, &cfg.backend)?;
            tracing::debug!(target: "gsearch.engine", model = engine.model(), "gemini engine ready");
            Ok(Arc::new(engine))
        }
        other => Err(EngineError::UnsupportedProvider(other.to_string())),
    }
}
