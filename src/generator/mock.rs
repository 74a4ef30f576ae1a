use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{GeneratedText, GenerationOptions, Generator};
use crate::error::{ReportError, Result};

/// A scripted generator for tests. Returns pre-defined outcomes in order
/// and remembers every prompt it was given.
pub struct MockGenerator {
    outcomes: Vec<Result<String>>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockGenerator {
    pub fn new(outcomes: Vec<Result<String>>) -> Self {
        Self {
            outcomes,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Every call answers with the same text.
    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string()); 64])
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `generate` was called.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<GeneratedText> {
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.outcomes.get(i).ok_or_else(|| {
            ReportError::UpstreamUnavailable(format!(
                "MockGenerator: no more outcomes (called {} times)",
                i + 1
            ))
        })?;

        outcome.clone().map(|text| GeneratedText {
            text,
            model: options.model.clone(),
            usage: None,
        })
    }
}
