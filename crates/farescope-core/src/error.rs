use thiserror::Error;

pub type Result<T> = std::result::Result<T, FarescopeError>;

#[derive(Debug, Error)]
pub enum FarescopeError {
    /// Bad request shape or range. Surfaced to the caller as a 4xx.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid chart type: {0}")]
    InvalidChartType(String),

    /// A live provider or language model could not be used. Always
    /// recovered by a fallback path, never shown to the caller.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FarescopeError {
    /// Short machine-readable tag used in HTTP error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            FarescopeError::Validation(_) => "validation",
            FarescopeError::InvalidChartType(_) => "invalid_chart_type",
            FarescopeError::UpstreamUnavailable(_) => "upstream_unavailable",
            FarescopeError::Json(_) => "json",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FarescopeError::Validation(_) | FarescopeError::InvalidChartType(_)
        )
    }
}
