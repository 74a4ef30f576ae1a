use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::sync::Mutex;

use super::ReportStore;
use crate::error::{ReportError, Result};
use crate::report::{ReportId, ReportRecord};

const COLUMNS: &str = "id, company, period, title, model, request_json, content_json, created_at";

/// SQLite-backed report storage.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the reports table at `path`. Use `":memory:"` for tests.
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reports (
                id           TEXT PRIMARY KEY,
                company      TEXT NOT NULL,
                period       TEXT NOT NULL,
                title        TEXT NOT NULL,
                model        TEXT NOT NULL,
                request_json TEXT NOT NULL,
                content_json TEXT NOT NULL,
                created_at   TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports (created_at);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }
}

/// Raw column values, decoded outside the rusqlite row callback so that
/// JSON and timestamp failures keep their own messages.
struct StoredRow {
    id: String,
    company: String,
    period: String,
    title: String,
    model: String,
    request_json: String,
    content_json: String,
    created_at: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            company: row.get(1)?,
            period: row.get(2)?,
            title: row.get(3)?,
            model: row.get(4)?,
            request_json: row.get(5)?,
            content_json: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn decode(self) -> Result<ReportRecord> {
        let id: ReportId = self
            .id
            .parse()
            .map_err(|e| corrupt(&self.id, format!("bad id: {e}")))?;
        let request = serde_json::from_str(&self.request_json)
            .map_err(|e| corrupt(&self.id, format!("bad request_json: {e}")))?;
        let content = serde_json::from_str(&self.content_json)
            .map_err(|e| corrupt(&self.id, format!("bad content_json: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| corrupt(&self.id, format!("bad created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(ReportRecord {
            id,
            company: self.company,
            period: self.period,
            title: self.title,
            model: self.model,
            request,
            content,
            created_at,
        })
    }
}

fn corrupt(id: &str, detail: String) -> ReportError {
    ReportError::Storage(format!("stored report {id} is unreadable: {detail}"))
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| ReportError::Storage(e.to_string()))
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn save(&self, record: &ReportRecord) -> Result<ReportId> {
        let request_json = encode_json(&record.request)?;
        let content_json = encode_json(&record.content)?;
        let created_at = record
            .created_at
            .to_rfc3339_opts(SecondsFormat::Nanos, true);

        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("INSERT INTO reports ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                record.id.to_string(),
                record.company,
                record.period,
                record.title,
                record.model,
                request_json,
                content_json,
                created_at,
            ],
        )?;
        Ok(record.id)
    }

    async fn get_by_id(&self, id: &ReportId) -> Result<ReportRecord> {
        let row = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM reports WHERE id = ?1"),
                [id.to_string()],
                StoredRow::from_row,
            )
            .optional()?
        };
        row.ok_or_else(|| ReportError::NotFound(id.to_string()))?
            .decode()
    }

    async fn list(&self, limit: usize) -> Result<Vec<ReportRecord>> {
        let rows = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM reports ORDER BY created_at DESC, id DESC LIMIT ?1"
            ))?;
            let rows = stmt
                .query_map([limit as i64], StoredRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        rows.into_iter().map(StoredRow::decode).collect()
    }
}
