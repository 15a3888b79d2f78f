use prism_core::Error;
use thiserror::Error;

/// Errors emitted by the rating pipeline, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("metric {metric:?}: {source}")]
    Metric {
        metric: String,
        #[source]
        source: Error,
    },
    #[error("sector {sector:?} ({method}): {source}")]
    Sector {
        sector: String,
        method: String,
        #[source]
        source: Error,
    },
    #[error("final rating ({method}): {source}")]
    Final {
        method: String,
        #[source]
        source: Error,
    },
}

impl RatingError {
    /// The underlying engine error.
    pub fn core(&self) -> &Error {
        match self {
            RatingError::Metric { source, .. }
            | RatingError::Sector { source, .. }
            | RatingError::Final { source, .. } => source,
        }
    }
}

/// Result type for rating operations.
pub type Result<T> = std::result::Result<T, RatingError>;
