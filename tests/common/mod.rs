#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use finreport::error::{ReportError, Result};
use finreport::generator::GenerationOptions;
use finreport::generator::mock::MockGenerator;
use finreport::report::{
    ReportContent, ReportId, ReportRecord, ReportRequest, ReportSection, SectionBody,
};
use finreport::service::ReportService;
use finreport::store::ReportStore;
use finreport::store::sqlite::SqliteStore;

pub const SUMMARY_JSON: &str = r#"{"summary": "Acme Corp closed 2024-Q4 with record revenue."}"#;

pub fn acme_request() -> ReportRequest {
    ReportRequest {
        company: "Acme Corp".to_string(),
        period: "2024-Q4".to_string(),
        sections: vec!["summary".to_string()],
        ..Default::default()
    }
}

pub fn sample_record(company: &str) -> ReportRecord {
    ReportRecord {
        id: ReportId::new(),
        company: company.to_string(),
        period: "2024-Q4".to_string(),
        title: format!("{company} Financial Report 2024-Q4"),
        model: "gemini-2.5-flash".to_string(),
        request: ReportRequest {
            company: company.to_string(),
            period: "2024-Q4".to_string(),
            sections: vec!["summary".to_string(), "top_risks".to_string()],
            revenue: Some(1_250_000.0),
            growth_percentage: Some(12.5),
            ..Default::default()
        },
        content: ReportContent {
            sections: vec![
                ReportSection {
                    key: "summary".to_string(),
                    title: "Summary".to_string(),
                    body: SectionBody::Text("Solid quarter.".to_string()),
                },
                ReportSection {
                    key: "top_risks".to_string(),
                    title: "Top Risks".to_string(),
                    body: SectionBody::List(vec!["FX".to_string(), "Churn".to_string()]),
                },
            ],
        },
        created_at: Utc::now(),
    }
}

/// A service over an in-memory database and a scripted generator.
pub fn build_service(mock: MockGenerator) -> (ReportService, Arc<MockGenerator>, Arc<SqliteStore>) {
    let mock = Arc::new(mock);
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let service = ReportService::new(mock.clone(), store.clone(), GenerationOptions::default());
    (service, mock, store)
}

/// A store whose writes always fail.
pub struct BrokenStore;

#[async_trait]
impl ReportStore for BrokenStore {
    async fn save(&self, _record: &ReportRecord) -> Result<ReportId> {
        Err(ReportError::Storage("database is locked".to_string()))
    }

    async fn get_by_id(&self, id: &ReportId) -> Result<ReportRecord> {
        Err(ReportError::NotFound(id.to_string()))
    }

    async fn list(&self, _limit: usize) -> Result<Vec<ReportRecord>> {
        Ok(Vec::new())
    }
}
