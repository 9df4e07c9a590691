use async_trait::async_trait;
use quill_core::Result;
use tokio_util::sync::CancellationToken;

/// "Ask the model a short question, get back text."
///
/// The only text-generation capability the core needs. Reflection and the
/// research planner use it for short internal prompts; transcript wording
/// (summaries, titles) lives outside this crate.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Send a prompt and return the generated text.
    async fn query(
        &self,
        prompt: &str,
        max_tokens: u32,
        cancel: &CancellationToken,
    ) -> Result<String>;

    /// Provider name, for logging.
    fn name(&self) -> &str;
}
