//! Report orchestration: validate, prompt, generate, parse, store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::consts::MAX_LIST_LIMIT;
use crate::error::{ReportError, Result};
use crate::generator::{GenerationOptions, Generator};
use crate::prompts::report::build_report_prompt;
use crate::report::validate::normalize;
use crate::report::{
    ReportContent, ReportId, ReportRecord, ReportRequest, ReportSection, SectionBody,
    section_title,
};
use crate::store::ReportStore;

/// Wires together a Generator and a ReportStore.
pub struct ReportService {
    generator: Arc<dyn Generator>,
    store: Arc<dyn ReportStore>,
    options: GenerationOptions,
}

impl ReportService {
    pub fn new(
        generator: Arc<dyn Generator>,
        store: Arc<dyn ReportStore>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            generator,
            store,
            options,
        }
    }

    /// Generate and store a new report.
    ///
    /// Validation happens before the model is called, and nothing is stored
    /// unless generation and parsing both succeed.
    pub async fn create_report(&self, request: ReportRequest) -> Result<ReportRecord> {
        let request = normalize(request)?;
        let prompt = build_report_prompt(&request);

        tracing::info!(
            company = %request.company,
            period = %request.period,
            sections = request.sections.len(),
            model = %self.options.model,
            "generating report"
        );

        let generated = self
            .generator
            .generate_report(&request, &prompt, &self.options)
            .await?;
        let content = parse_content(&generated.text, &request.sections)?;

        let title = request
            .title
            .clone()
            .unwrap_or_else(|| format!("{} Financial Report {}", request.company, request.period));

        let record = ReportRecord {
            id: ReportId::new(),
            company: request.company.clone(),
            period: request.period.clone(),
            title,
            model: generated.model,
            request,
            content,
            created_at: Utc::now(),
        };

        self.store.save(&record).await.inspect_err(|err| {
            tracing::error!(id = %record.id, error = %err, "failed to store report");
        })?;

        tracing::info!(id = %record.id, company = %record.company, "report stored");
        Ok(record)
    }

    pub async fn get_report(&self, id: &ReportId) -> Result<ReportRecord> {
        self.store.get_by_id(id).await
    }

    /// Newest reports first. `limit` is clamped to `1..=MAX_LIST_LIMIT`.
    pub async fn list_reports(&self, limit: usize) -> Result<Vec<ReportRecord>> {
        self.store.list(limit.clamp(1, MAX_LIST_LIMIT)).await
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }
}

/// Turn generated text into the requested sections, in order.
///
/// A requested key the model skipped gets a placeholder; an answer that has
/// none of them is treated as unusable.
pub fn parse_content(text: &str, sections: &[String]) -> Result<ReportContent> {
    let json_str = extract_json(text);
    let value: Value = serde_json::from_str(json_str).map_err(|e| {
        ReportError::UpstreamMalformed(format!("generated text is not JSON: {e}"))
    })?;
    let Value::Object(object) = value else {
        return Err(ReportError::UpstreamMalformed(
            "generated JSON is not an object".to_string(),
        ));
    };

    let mut found = 0;
    let sections = sections
        .iter()
        .map(|key| {
            let title = section_title(key);
            let body = match object.get(key).and_then(section_body) {
                Some(body) => {
                    found += 1;
                    body
                }
                None => SectionBody::Text(format!("Analysis for {title} not available.")),
            };
            ReportSection {
                key: key.clone(),
                title,
                body,
            }
        })
        .collect::<Vec<_>>();

    if found == 0 {
        return Err(ReportError::UpstreamMalformed(
            "generated JSON has none of the requested sections".to_string(),
        ));
    }
    Ok(ReportContent { sections })
}

fn section_body(value: &Value) -> Option<SectionBody> {
    let body = match value {
        Value::Null => return None,
        Value::String(text) => SectionBody::Text(text.trim().to_string()),
        Value::Array(items) => SectionBody::List(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        other => SectionBody::Text(other.to_string()),
    };
    (!body.is_empty()).then_some(body)
}

/// Extract JSON from text that may be wrapped in markdown code fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(after) = trimmed.strip_prefix("```json")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }
    if let Some(after) = trimmed.strip_prefix("```")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }

    trimmed
}
