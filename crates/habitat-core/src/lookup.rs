use crate::error::HabitatError;
use crate::types::ProcessStep;
use async_trait::async_trait;

/// Read access to a negotiation's process tracker.
///
/// Implementations return [`HabitatError::StepNotFound`] when the negotiation's
/// workflow has no step with that name. Any other error is treated as a
/// transport failure.
#[async_trait]
pub trait ProcessStepLookup: Send + Sync {
    async fn process_step(
        &self,
        negotiation_id: &str,
        step_name: &str,
    ) -> Result<ProcessStep, HabitatError>;
}
