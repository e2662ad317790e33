use std::time::Duration;
use thiserror::Error;

/// Habitat domain errors.
#[derive(Debug, Error)]
pub enum HabitatError {
    #[error("step '{step}' not found for negotiation '{negotiation_id}'")]
    StepNotFound {
        negotiation_id: String,
        step: String,
    },

    #[error("process lookup failed: {0}")]
    LookupFailed(String),

    #[error("process lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid payment source: {0}")]
    InvalidPaymentSource(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HabitatError {
    pub fn step_not_found(negotiation_id: impl Into<String>, step: impl Into<String>) -> Self {
        Self::StepNotFound {
            negotiation_id: negotiation_id.into(),
            step: step.into(),
        }
    }

    /// Transport-level failures the gate treats as "could not verify".
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::LookupFailed(_) | Self::Timeout(_))
    }
}
