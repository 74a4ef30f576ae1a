pub mod demo;
pub mod gemini;
pub mod mock;
pub mod retry;

use async_trait::async_trait;

use crate::error::Result;
use crate::report::ReportRequest;

/// Per-call settings for a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Hosted model variant, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Output is truncated by the model past this many tokens.
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: crate::consts::DEFAULT_MODEL.to_string(),
            max_output_tokens: crate::consts::DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Token usage from a single model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Total tokens (input + output).
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Raw text returned by a generator, plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub text: String,
    /// Model variant that actually answered.
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Prompt in, text out. Could be a hosted model, canned demo content, or a test script.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<GeneratedText>;

    /// Generate the content for `request`, whose prompt is `prompt`.
    ///
    /// Models only need the prompt. Generators that answer from the
    /// structured request instead override this.
    async fn generate_report(
        &self,
        _request: &ReportRequest,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedText> {
        self.generate(prompt, options).await
    }
}
