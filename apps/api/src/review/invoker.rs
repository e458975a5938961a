//! Model Invoker: pluggable seam between the review pipeline and the LLM.
//!
//! `AppState` holds an `Arc<dyn ReviewModel>`. Production uses `LlmClient`;
//! tests swap in a canned implementation without touching the handler.

use async_trait::async_trait;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait ReviewModel: Send + Sync {
    /// Sends one prompt and returns the raw, untrusted completion text.
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl ReviewModel for LlmClient {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        self.complete(prompt, JSON_ONLY_SYSTEM).await
    }
}
