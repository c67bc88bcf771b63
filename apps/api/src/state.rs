use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::recommendation::reasons::ReasonWriter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Present only when an API key is configured.
    pub llm: Option<LlmClient>,
    /// Pluggable reason writer. Default: TemplateReasonWriter. Swap via ENABLE_LLM_REASONS.
    pub reason_writer: Arc<dyn ReasonWriter>,
}
