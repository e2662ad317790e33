//! Process tracker adapters for habitat.

#![deny(unsafe_code)]

use async_trait::async_trait;
use chrono::Utc;
use habitat_core::error::HabitatError;
use habitat_core::lookup::ProcessStepLookup;
use habitat_core::types::{ProcessStep, StepStatus};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory process tracker keyed by negotiation and step name.
#[derive(Debug, Default)]
pub struct InMemoryProcessTracker {
    steps: RwLock<BTreeMap<(String, String), ProcessStep>>,
}

impl InMemoryProcessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, step: ProcessStep) {
        let key = (step.negotiation_id.clone(), step.name.clone());
        self.steps.write().await.insert(key, step);
    }

    /// Move a step to `status`, stamping the completion time when it becomes completed.
    pub async fn set_status(
        &self,
        negotiation_id: &str,
        step_name: &str,
        status: StepStatus,
    ) -> Result<(), HabitatError> {
        let mut steps = self.steps.write().await;
        let step = steps
            .get_mut(&(negotiation_id.to_string(), step_name.to_string()))
            .ok_or_else(|| HabitatError::step_not_found(negotiation_id, step_name))?;
        step.status = status;
        step.completed_at = (status == StepStatus::Completed).then(Utc::now);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.steps.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.steps.read().await.is_empty()
    }
}

#[async_trait]
impl ProcessStepLookup for InMemoryProcessTracker {
    async fn process_step(
        &self,
        negotiation_id: &str,
        step_name: &str,
    ) -> Result<ProcessStep, HabitatError> {
        self.steps
            .read()
            .await
            .get(&(negotiation_id.to_string(), step_name.to_string()))
            .cloned()
            .ok_or_else(|| HabitatError::step_not_found(negotiation_id, step_name))
    }
}

/// Deterministic failing lookup useful for exercising fail-open handling.
#[derive(Debug, Clone)]
pub struct AlwaysFailLookup {
    reason: String,
}

impl AlwaysFailLookup {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ProcessStepLookup for AlwaysFailLookup {
    async fn process_step(
        &self,
        _negotiation_id: &str,
        _step_name: &str,
    ) -> Result<ProcessStep, HabitatError> {
        Err(HabitatError::LookupFailed(self.reason.clone()))
    }
}

/// Bounds an inner lookup by a deadline. An elapsed deadline surfaces as
/// [`HabitatError::Timeout`], which the gate treats as a lookup failure.
#[derive(Clone)]
pub struct TimeoutLookup {
    inner: Arc<dyn ProcessStepLookup>,
    timeout: Duration,
}

impl TimeoutLookup {
    pub fn new(inner: Arc<dyn ProcessStepLookup>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ProcessStepLookup for TimeoutLookup {
    async fn process_step(
        &self,
        negotiation_id: &str,
        step_name: &str,
    ) -> Result<ProcessStep, HabitatError> {
        match tokio::time::timeout(
            self.timeout,
            self.inner.process_step(negotiation_id, step_name),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                debug!(negotiation_id, step = step_name, "process lookup timed out");
                Err(HabitatError::Timeout(self.timeout))
            }
        }
    }
}
