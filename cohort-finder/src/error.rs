use shared_types::InvalidAgeRange;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CohortError {
    /// Transport failure or non-success status from the FHIR server
    #[error("FHIR service unavailable at {endpoint}: {message}")]
    ServiceUnavailable { endpoint: String, message: String },

    /// Response body that does not match the expected resource schema
    #[error("Malformed FHIR response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error(transparent)]
    InvalidAgeRange(#[from] InvalidAgeRange),

    #[error("Condition text must not be empty")]
    EmptyCondition,
}

impl CohortError {
    pub fn unavailable(endpoint: impl Into<String>, message: impl ToString) -> Self {
        CohortError::ServiceUnavailable {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(endpoint: impl Into<String>, message: impl ToString) -> Self {
        CohortError::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Errors that come from the caller's arguments rather than the server
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CohortError::InvalidAgeRange(_) | CohortError::EmptyCondition
        )
    }
}
