use thiserror::Error;

pub type Result<T> = std::result::Result<T, RtError>;

#[derive(Debug, Error)]
pub enum RtError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("solver answered with status {0}")]
    Status(u16),

    #[error("solver response carried no data")]
    MissingData,

    #[error("solver reported an error: {0}")]
    Service(String),

    #[error("unknown direction code {0}")]
    UnknownDirection(i64),

    #[error("running offline, no solver available")]
    Offline,
}

impl RtError {
    /// Failures that happened before the service could answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Offline)
    }
}
