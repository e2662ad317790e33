use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::HabitatError;
use crate::lookup::ProcessStepLookup;
use crate::types::{ProcessStep, StepStatus};

#[derive(Debug, Clone)]
enum MockResponse {
    Status(StepStatus),
    NotFound,
    Fail(String),
}

/// Mock step lookup for testing.
///
/// Answers every query the same way and counts how often it was asked.
#[derive(Debug)]
pub struct MockStepLookup {
    response: MockResponse,
    calls: AtomicUsize,
}

impl MockStepLookup {
    /// Every step exists with the given status.
    pub fn with_status(status: StepStatus) -> Self {
        Self::from_response(MockResponse::Status(status))
    }

    /// No step exists for any negotiation.
    pub fn not_found() -> Self {
        Self::from_response(MockResponse::NotFound)
    }

    /// Every query fails at the transport level.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::from_response(MockResponse::Fail(reason.into()))
    }

    fn from_response(response: MockResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessStepLookup for MockStepLookup {
    async fn process_step(
        &self,
        negotiation_id: &str,
        step_name: &str,
    ) -> Result<ProcessStep, HabitatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            MockResponse::Status(status) => Ok(ProcessStep::new(
                format!("step-{negotiation_id}"),
                negotiation_id,
                step_name,
                *status,
            )),
            MockResponse::NotFound => Err(HabitatError::step_not_found(negotiation_id, step_name)),
            MockResponse::Fail(reason) => Err(HabitatError::LookupFailed(reason.clone())),
        }
    }
}
