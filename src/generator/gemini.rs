use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{GeneratedText, GenerationOptions, Generator, TokenUsage};
use crate::error::{ReportError, Result};

const API_VERSION: &str = "v1beta";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const RESPONSE_MIME_TYPE: &str = "application/json";

/// A generator that calls the Gemini `generateContent` REST API.
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{API_VERSION}/models/{model}:generateContent",
            self.base_url
        )
    }

    fn build_request<'a>(prompt: &'a str, options: &GenerationOptions) -> ApiRequest<'a> {
        ApiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: options.max_output_tokens,
                response_mime_type: RESPONSE_MIME_TYPE,
            },
        }
    }

    /// Map a non-success HTTP status to the error taxonomy.
    fn classify_status(status: StatusCode, body: &str) -> ReportError {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    trimmed.chars().take(500).collect()
                }
            });

        if status.is_server_error() {
            ReportError::UpstreamUnavailable(format!("Gemini API error ({status}): {message}"))
        } else {
            ReportError::UpstreamRejected {
                status: status.as_u16(),
                message,
            }
        }
    }

    fn parse_response(body: &str, requested_model: &str) -> Result<GeneratedText> {
        let api_resp: ApiResponse = serde_json::from_str(body).map_err(|e| {
            ReportError::UpstreamMalformed(format!("failed to decode Gemini response: {e}"))
        })?;

        if api_resp.candidates.is_empty()
            && let Some(reason) = api_resp
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
        {
            return Err(ReportError::UpstreamRejected {
                status: StatusCode::OK.as_u16(),
                message: format!("prompt blocked: {reason}"),
            });
        }

        // Skip "thought" parts; only the answer text is report content.
        let text: String = api_resp
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = api_resp
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("no candidates");
            return Err(ReportError::UpstreamMalformed(format!(
                "Gemini returned no text (finish reason: {reason})"
            )));
        }

        let usage = api_resp.usage_metadata.map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        Ok(GeneratedText {
            text,
            model: api_resp
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
            usage,
        })
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<GeneratedText> {
        let body = Self::build_request(prompt, options);

        let resp = self
            .client
            .post(self.endpoint(&options.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReportError::UpstreamUnavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            ReportError::UpstreamUnavailable(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &text));
        }

        let generated = Self::parse_response(&text, &options.model)?;
        if let Some(usage) = generated.usage {
            tracing::info!(
                model = %generated.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "gemini usage"
            );
        }
        Ok(generated)
    }
}

// --- API types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let options = GenerationOptions {
            model: "gemini-2.5-flash".into(),
            max_output_tokens: 2048,
        };
        let body = serde_json::to_value(GeminiGenerator::build_request("hello", &options)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn endpoint_includes_model_and_trims_slash() {
        let generator = GeminiGenerator::new("k", "http://localhost:9999/").unwrap();
        assert_eq!(
            generator.endpoint("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn parse_text_and_usage() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"summary\": "}, {"text": "\"ok\"}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40, "totalTokenCount": 160},
            "modelVersion": "gemini-2.5-flash-001"
        }"#;
        let generated = GeminiGenerator::parse_response(body, "gemini-2.5-flash").unwrap();
        assert_eq!(generated.text, r#"{"summary": "ok"}"#);
        assert_eq!(generated.model, "gemini-2.5-flash-001");
        let usage = generated.usage.unwrap();
        assert_eq!(usage.input_tokens, 120);
        assert_eq!(usage.output_tokens, 40);
        assert_eq!(usage.total(), 160);
    }

    #[test]
    fn parse_skips_thought_parts() {
        let body = r#"{"candidates": [{"content": {"parts": [
            {"text": "thinking...", "thought": true},
            {"text": "answer"}
        ]}}]}"#;
        let generated = GeminiGenerator::parse_response(body, "m").unwrap();
        assert_eq!(generated.text, "answer");
        assert_eq!(generated.model, "m");
        assert!(generated.usage.is_none());
    }

    #[test]
    fn parse_blocked_prompt_is_rejected() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = GeminiGenerator::parse_response(body, "m").unwrap_err();
        assert!(
            matches!(err, ReportError::UpstreamRejected { ref message, .. } if message.contains("SAFETY"))
        );
    }

    #[test]
    fn parse_empty_candidates_is_malformed() {
        let err = GeminiGenerator::parse_response(r#"{"candidates": []}"#, "m").unwrap_err();
        assert!(matches!(err, ReportError::UpstreamMalformed(_)));
    }

    #[test]
    fn parse_truncated_candidate_reports_finish_reason() {
        let body = r#"{"candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]}"#;
        let err = GeminiGenerator::parse_response(body, "m").unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn parse_non_json_is_malformed() {
        let err = GeminiGenerator::parse_response("<html>oops</html>", "m").unwrap_err();
        assert!(matches!(err, ReportError::UpstreamMalformed(_)));
    }

    #[test]
    fn client_errors_are_rejections() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let err = GeminiGenerator::classify_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err,
            ReportError::UpstreamRejected {
                status: 400,
                message: "API key not valid.".into()
            }
        );
    }

    #[test]
    fn quota_is_a_rejection() {
        let err = GeminiGenerator::classify_status(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, ReportError::UpstreamRejected { status: 429, .. }));
    }

    #[test]
    fn server_errors_are_unavailable() {
        let err = GeminiGenerator::classify_status(StatusCode::SERVICE_UNAVAILABLE, "overloaded");
        assert!(matches!(err, ReportError::UpstreamUnavailable(ref m) if m.contains("overloaded")));
    }
}
