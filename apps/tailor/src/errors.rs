use thiserror::Error;

/// Failure of a single exchange with the generation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    #[error("Invalid JSON response from server")]
    InvalidResponse,

    /// Error reported by the service in an otherwise readable body.
    #[error("{0}")]
    Service(String),
}

/// Failure of a pipeline action. Every variant ends up as exactly one
/// Process Log entry and never aborts the session.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ActionError {
    /// Text appended to the Process Log for this failure.
    pub fn log_message(&self) -> String {
        match self {
            ActionError::Service(ServiceError::Network(e)) => {
                tracing::error!("Transport error: {e:?}");
                self.to_string()
            }
            _ => self.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::Validation(_))
    }
}
