//! Canned content for running without an API key.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{GeneratedText, GenerationOptions, Generator};
use crate::consts::format_amount;
use crate::error::{ReportError, Result};
use crate::report::{ReportRequest, is_list_section, section_title};

pub const DEMO_MODEL: &str = "demo";

const TOP_RISKS: [&str; 3] = [
    "Market volatility and economic uncertainty",
    "Competitive pressure and market share erosion",
    "Operational inefficiencies and cost escalation",
];

const TOP_RECOMMENDATIONS: [&str; 3] = [
    "Diversify revenue streams and market presence",
    "Implement advanced analytics for decision making",
    "Strengthen operational risk management processes",
];

const IMPROVEMENT_PLAN: &str = "1. Implement enhanced financial controls and monitoring systems\n\
     2. Diversify revenue streams to reduce market concentration risk\n\
     3. Invest in technology infrastructure to improve operational efficiency\n\
     4. Develop a comprehensive risk management framework\n\
     5. Strengthen market position through strategic partnerships";

/// Writes offline analysis from the request's own figures and notes.
///
/// Works from the structured request, so [`Generator::generate`] with a
/// bare prompt has nothing to answer from.
pub struct DemoGenerator;

#[async_trait]
impl Generator for DemoGenerator {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<GeneratedText> {
        Err(ReportError::UpstreamMalformed(
            "demo generator answers report requests only".to_string(),
        ))
    }

    async fn generate_report(
        &self,
        request: &ReportRequest,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<GeneratedText> {
        let mut object = Map::new();
        for key in &request.sections {
            object.insert(key.clone(), demo_section(request, key));
        }

        Ok(GeneratedText {
            text: Value::Object(object).to_string(),
            model: DEMO_MODEL.to_string(),
            usage: None,
        })
    }
}

fn demo_section(request: &ReportRequest, key: &str) -> Value {
    let company = &request.company;
    match key {
        "executive_summary" => Value::String(format!(
            "{}\n\nKey sector trends and strategic positioning require attention to maintain \
             competitive advantage. Management should focus on operational efficiency while \
             addressing identified risks to keep growth sustainable.",
            performance(request)
        )),
        "key_trends" => Value::String(format!(
            "{}\n\nSector trends: {}\n\nKey performance metrics: {}\n\nRevenue diversification \
             and market expansion should be evaluated to strengthen {company}'s competitive \
             position.",
            growth(request),
            noted(&request.sector_trends),
            noted(&request.key_metrics),
        )),
        "risks" => Value::String(format!(
            "Primary risk factors identified: {}\n\nOperational risks from supply chain \
             dependencies and competitive pressure need proactive management. Regulatory \
             change and economic uncertainty could affect future performance if not \
             addressed through strategic planning.",
            noted(&request.risks)
        )),
        "recommendations" => Value::String(format!(
            "Strategic recommendations for {company}: {}\n\n{IMPROVEMENT_PLAN}\n\nPrioritize \
             these initiatives by resource availability and strategic impact.",
            noted(&request.recommendations)
        )),
        "top_risks" => list(&TOP_RISKS),
        "top_recommendations" => list(&TOP_RECOMMENDATIONS),
        other if is_list_section(other) => {
            let title = section_title(other);
            Value::Array(
                (1..=3)
                    .map(|i| Value::String(format!("{title} point {i} for {company}")))
                    .collect(),
            )
        }
        other => Value::String(format!(
            "{} for {company}, {}. {}",
            section_title(other),
            request.period,
            performance(request)
        )),
    }
}

/// Headline figures as a sentence, margin included when it can be computed.
fn performance(request: &ReportRequest) -> String {
    let mut figures = Vec::new();
    if let Some(revenue) = request.revenue {
        figures.push(format!("revenue of {}", format_amount(revenue)));
    }
    if let Some(profit) = request.profit {
        figures.push(format!("profit of {}", format_amount(profit)));
    }
    let mut sentence = if figures.is_empty() {
        format!("{} reported no headline figures for {}.", request.company, request.period)
    } else {
        format!(
            "{} reports {} for {}",
            request.company,
            figures.join(" and "),
            request.period
        )
    };
    if !figures.is_empty() {
        match request.profit_margin() {
            Some(margin) => sentence.push_str(&format!(", a profit margin of {margin:.1}%.")),
            None => sentence.push('.'),
        }
    }
    sentence.push(' ');
    sentence.push_str(&growth(request));
    sentence
}

fn growth(request: &ReportRequest) -> String {
    match request.growth_percentage {
        Some(growth) => format!("Growth stands at {growth}%."),
        None => "No growth rate was supplied.".to_string(),
    }
}

fn noted(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("none supplied")
}

fn list(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|item| Value::String(item.to_string())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> ReportRequest {
        ReportRequest {
            company: "Acme Corp".into(),
            period: "2024-Q4".into(),
            sections: vec![
                "executive_summary".into(),
                "key_trends".into(),
                "top_recommendations".into(),
            ],
            revenue: Some(1_250_000.0),
            profit: Some(250_000.0),
            growth_percentage: Some(12.5),
            key_metrics: Some("EBITDA 12%".into()),
            ..Default::default()
        }
    }

    async fn answer(request: &ReportRequest) -> Value {
        let generated = DemoGenerator
            .generate_report(request, "ignored", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(generated.model, DEMO_MODEL);
        serde_json::from_str(&generated.text).unwrap()
    }

    #[tokio::test]
    async fn summary_carries_figures_and_margin() {
        let value = answer(&acme()).await;
        let summary = value["executive_summary"].as_str().unwrap();
        assert!(summary.contains("Acme Corp"));
        assert!(summary.contains("revenue of 1,250,000.00"));
        assert!(summary.contains("profit of 250,000.00"));
        assert!(summary.contains("profit margin of 20.0%"));
        assert!(summary.contains("Growth stands at 12.5%"));
    }

    #[tokio::test]
    async fn trends_carry_request_notes() {
        let value = answer(&acme()).await;
        let trends = value["key_trends"].as_str().unwrap();
        assert!(trends.contains("Key performance metrics: EBITDA 12%"));
        assert!(trends.contains("Sector trends: none supplied"));
    }

    #[tokio::test]
    async fn answers_exactly_the_requested_keys() {
        let value = answer(&acme()).await;
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(
            value["top_recommendations"],
            serde_json::json!(TOP_RECOMMENDATIONS)
        );
    }

    #[tokio::test]
    async fn custom_keys_get_content() {
        let request = ReportRequest {
            sections: vec!["outlook".into(), "top_opportunities".into()],
            ..acme()
        };
        let value = answer(&request).await;
        assert!(value["outlook"].as_str().unwrap().starts_with("Outlook for Acme Corp"));
        assert_eq!(value["top_opportunities"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn no_margin_without_revenue() {
        let request = ReportRequest {
            revenue: None,
            ..acme()
        };
        let value = answer(&request).await;
        let summary = value["executive_summary"].as_str().unwrap();
        assert!(summary.contains("profit of 250,000.00"));
        assert!(!summary.contains("margin"));
    }

    #[tokio::test]
    async fn bare_prompt_is_malformed() {
        let err = DemoGenerator
            .generate("hello", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::UpstreamMalformed(_)));
    }
}
