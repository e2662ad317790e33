use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::HabitatError;
use crate::lookup::ProcessStepLookup;
use crate::types::{PaymentSourceKind, ProcessStep};

/// Status reported for a required step the negotiation's workflow does not have.
pub const STEP_NOT_FOUND_STATUS: &str = "NotFound";

pub const MORTGAGE_CREDIT_STEP: &str = "Solicitud desembolso de Crédito hipotecario";
pub const HOUSING_SUBSIDY_STEP: &str = "Solicitud desembolso de subsidio de vivienda Mi Casa Ya";
pub const EMPLOYER_SUBSIDY_STEP: &str =
    "Solicitud desembolso de subsidio de caja de compensación familiar";

/// Which process step must be complete before each source kind may be disbursed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub required_steps: BTreeMap<PaymentSourceKind, String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            required_steps: BTreeMap::from([
                (
                    PaymentSourceKind::MortgageCredit,
                    MORTGAGE_CREDIT_STEP.to_string(),
                ),
                (
                    PaymentSourceKind::HousingSubsidy,
                    HOUSING_SUBSIDY_STEP.to_string(),
                ),
                (
                    PaymentSourceKind::EmployerSubsidy,
                    EMPLOYER_SUBSIDY_STEP.to_string(),
                ),
            ]),
        }
    }
}

impl GateConfig {
    pub fn from_json(raw: &str) -> Result<Self, HabitatError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| HabitatError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HabitatError> {
        if self
            .required_steps
            .contains_key(&PaymentSourceKind::DownPayment)
        {
            return Err(HabitatError::Config(
                "down payments are never gated on a process step".to_string(),
            ));
        }
        if let Some((kind, _)) = self
            .required_steps
            .iter()
            .find(|(_, step)| step.trim().is_empty())
        {
            return Err(HabitatError::Config(format!(
                "empty step name configured for {}",
                kind.name()
            )));
        }
        Ok(())
    }
}

/// How a decision should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateOutcome {
    /// No gating applies or the required step is complete.
    Allowed,
    /// The tracker could not be read; allowed with a warning.
    AllowedUnverified,
    /// The required step exists but is not complete.
    Denied,
    /// The negotiation's workflow lacks the required step.
    Misconfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredStep {
    pub id: Option<String>,
    pub name: String,
    pub status: String,
}

impl RequiredStep {
    fn found(step: &ProcessStep) -> Self {
        Self {
            id: Some(step.id.clone()),
            name: step.name.clone(),
            status: step.status.to_string(),
        }
    }

    fn missing(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            status: STEP_NOT_FOUND_STATUS.to_string(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.status == STEP_NOT_FOUND_STATUS
    }
}

/// Whether a disbursement may be registered, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    pub required_step: Option<RequiredStep>,
    pub outcome: GateOutcome,
}

impl GateDecision {
    fn ungated() -> Self {
        Self {
            allowed: true,
            reason: None,
            required_step: None,
            outcome: GateOutcome::Allowed,
        }
    }

    fn completed(step: &ProcessStep) -> Self {
        Self {
            allowed: true,
            reason: None,
            required_step: Some(RequiredStep::found(step)),
            outcome: GateOutcome::Allowed,
        }
    }

    fn incomplete(step_name: &str, step: &ProcessStep) -> Self {
        Self {
            allowed: false,
            reason: Some(format!(
                "complete step '{}' (currently: {}) before registering this disbursement",
                step_name, step.status
            )),
            required_step: Some(RequiredStep::found(step)),
            outcome: GateOutcome::Denied,
        }
    }

    fn step_missing(step_name: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(format!(
                "step '{step_name}' does not exist in this negotiation's process; contact an administrator"
            )),
            required_step: Some(RequiredStep::missing(step_name)),
            outcome: GateOutcome::Misconfigured,
        }
    }

    fn unverified() -> Self {
        Self {
            allowed: true,
            reason: Some("could not verify process status; proceed with caution".to_string()),
            required_step: None,
            outcome: GateOutcome::AllowedUnverified,
        }
    }

    pub fn is_unverified(&self) -> bool {
        self.outcome == GateOutcome::AllowedUnverified
    }
}

/// Gates disbursement registration on the negotiation's process tracker.
///
/// Lookup failures never block a disbursement: an unreadable tracker yields an
/// allowed decision flagged as unverified. Only a step that exists and is not
/// complete, or a step missing from the workflow, denies.
#[derive(Clone)]
pub struct DisbursementGate {
    lookup: Arc<dyn ProcessStepLookup>,
    config: GateConfig,
}

impl DisbursementGate {
    pub fn new(lookup: Arc<dyn ProcessStepLookup>) -> Self {
        Self::with_config(lookup, GateConfig::default())
    }

    pub fn with_config(lookup: Arc<dyn ProcessStepLookup>, config: GateConfig) -> Self {
        Self { lookup, config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn required_step_name(&self, kind: PaymentSourceKind) -> Option<&str> {
        if kind == PaymentSourceKind::DownPayment {
            return None;
        }
        self.config.required_steps.get(&kind).map(String::as_str)
    }

    pub fn requires_step_validation(&self, kind: PaymentSourceKind) -> bool {
        self.required_step_name(kind).is_some()
    }

    /// Decide whether a disbursement for `kind` may be registered.
    ///
    /// Performs at most one tracker read and never returns an error.
    pub async fn evaluate(&self, negotiation_id: &str, kind: PaymentSourceKind) -> GateDecision {
        if kind == PaymentSourceKind::DownPayment {
            return GateDecision::ungated();
        }

        let Some(step_name) = self.required_step_name(kind) else {
            warn!(
                negotiation_id,
                source = kind.name(),
                "no process step configured for payment source; allowing"
            );
            return GateDecision::ungated();
        };

        debug!(negotiation_id, source = kind.name(), step = step_name, "checking process step");

        match self.lookup.process_step(negotiation_id, step_name).await {
            Ok(step) if step.is_completed() => GateDecision::completed(&step),
            Ok(step) => {
                warn!(
                    negotiation_id,
                    step = step_name,
                    status = step.status.name(),
                    "disbursement blocked by incomplete step"
                );
                GateDecision::incomplete(step_name, &step)
            }
            Err(HabitatError::StepNotFound { .. }) => {
                error!(
                    negotiation_id,
                    step = step_name,
                    "required step missing from negotiation process"
                );
                GateDecision::step_missing(step_name)
            }
            Err(err) => {
                warn!(
                    negotiation_id,
                    step = step_name,
                    error = %err,
                    "process lookup failed; allowing disbursement unverified"
                );
                GateDecision::unverified()
            }
        }
    }

    /// Read the required step for display, without deciding anything.
    pub async fn required_step_info(
        &self,
        negotiation_id: &str,
        kind: PaymentSourceKind,
    ) -> Option<ProcessStep> {
        let step_name = self.required_step_name(kind)?;
        match self.lookup.process_step(negotiation_id, step_name).await {
            Ok(step) => Some(step),
            Err(HabitatError::StepNotFound { .. }) => None,
            Err(err) => {
                warn!(negotiation_id, step = step_name, error = %err, "process lookup failed");
                None
            }
        }
    }
}
