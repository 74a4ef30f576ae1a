//! The error taxonomy shared by every layer.
//!
//! The store, the generators, and the service all return [`ReportError`];
//! only the HTTP layer turns it into a status code.

/// Everything that can go wrong while creating or reading a report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportError {
    /// The caller sent a request we cannot act on.
    #[error("invalid request: {0}")]
    Validation(String),

    /// No stored report has this id.
    #[error("report {0} not found")]
    NotFound(String),

    /// The model API could not be reached, or timed out, or failed on its side.
    #[error("generation service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The model API answered with an error of its own (bad key, quota, blocked prompt).
    #[error("generation service rejected the request ({status}): {message}")]
    UpstreamRejected { status: u16, message: String },

    /// The model API answered, but not with anything we can turn into a report.
    #[error("generation service returned an unusable response: {0}")]
    UpstreamMalformed(String),

    /// The database failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ReportError {
    /// Stable machine-readable code, used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "VALIDATION_ERROR",
            ReportError::NotFound(_) => "NOT_FOUND",
            ReportError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            ReportError::UpstreamRejected { .. } => "UPSTREAM_REJECTED",
            ReportError::UpstreamMalformed(_) => "UPSTREAM_MALFORMED",
            ReportError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Worth another attempt against the model API.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReportError::UpstreamUnavailable(_))
    }
}

impl From<rusqlite::Error> for ReportError {
    fn from(err: rusqlite::Error) -> Self {
        ReportError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_is_transient() {
        assert!(ReportError::UpstreamUnavailable("timeout".into()).is_transient());
        assert!(
            !ReportError::UpstreamRejected {
                status: 429,
                message: "quota".into()
            }
            .is_transient()
        );
        assert!(!ReportError::UpstreamMalformed("x".into()).is_transient());
        assert!(!ReportError::Storage("x".into()).is_transient());
    }

    #[test]
    fn rejected_message_carries_status() {
        let err = ReportError::UpstreamRejected {
            status: 403,
            message: "API key not valid".into(),
        };
        let text = err.to_string();
        assert!(text.contains("403"));
        assert!(text.contains("API key not valid"));
    }

    #[test]
    fn sqlite_errors_become_storage() {
        let err: ReportError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}
