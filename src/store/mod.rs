pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::report::{ReportId, ReportRecord};

/// Where report records live. Records are written once and never changed.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a new record. Fails with `Storage` on any database error,
    /// including an id that is already taken.
    async fn save(&self, record: &ReportRecord) -> Result<ReportId>;

    /// Fetch one record. Fails with `NotFound` when no record has this id.
    async fn get_by_id(&self, id: &ReportId) -> Result<ReportRecord>;

    /// Newest records first, at most `limit` of them.
    async fn list(&self, limit: usize) -> Result<Vec<ReportRecord>>;
}
