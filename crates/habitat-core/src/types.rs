use crate::error::HabitatError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Funding source attached to a negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSourceKind {
    DownPayment,
    MortgageCredit,
    HousingSubsidy,
    EmployerSubsidy,
}

impl PaymentSourceKind {
    pub const ALL: [PaymentSourceKind; 4] = [
        Self::DownPayment,
        Self::MortgageCredit,
        Self::HousingSubsidy,
        Self::EmployerSubsidy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DownPayment => "down_payment",
            Self::MortgageCredit => "mortgage_credit",
            Self::HousingSubsidy => "housing_subsidy",
            Self::EmployerSubsidy => "employer_subsidy",
        }
    }

    /// Display label used by the abonos screens.
    pub fn label(self) -> &'static str {
        match self {
            Self::DownPayment => "Cuota Inicial",
            Self::MortgageCredit => "Crédito Hipotecario",
            Self::HousingSubsidy => "Subsidio Mi Casa Ya",
            Self::EmployerSubsidy => "Subsidio Caja Compensación",
        }
    }

    /// Down payments are paid in partial abonos; everything else is a one-time disbursement.
    pub fn allows_multiple_payments(self) -> bool {
        matches!(self, Self::DownPayment)
    }

    pub fn is_disbursement(self) -> bool {
        !self.allows_multiple_payments()
    }
}

impl fmt::Display for PaymentSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentSourceKind {
    type Err = HabitatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == trimmed || kind.label() == trimmed)
            .ok_or_else(|| HabitatError::InvalidPaymentSource(trimmed.to_string()))
    }
}

/// One funding source of a negotiation. Amounts are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSource {
    pub id: String,
    pub negotiation_id: String,
    pub kind: PaymentSourceKind,
    pub approved_minor: u64,
    pub received_minor: u64,
}

impl PaymentSource {
    pub fn new(
        id: impl Into<String>,
        negotiation_id: impl Into<String>,
        kind: PaymentSourceKind,
        approved_minor: u64,
    ) -> Self {
        Self {
            id: id.into(),
            negotiation_id: negotiation_id.into(),
            kind,
            approved_minor,
            received_minor: 0,
        }
    }

    pub fn with_received(mut self, received_minor: u64) -> Self {
        self.received_minor = received_minor;
        self
    }

    pub fn pending_minor(&self) -> u64 {
        self.approved_minor.saturating_sub(self.received_minor)
    }

    /// Share of the approved amount already received, 0..=100.
    pub fn completion_percent(&self) -> f64 {
        if self.approved_minor == 0 {
            return 0.0;
        }
        let ratio = self.received_minor as f64 / self.approved_minor as f64;
        (ratio * 100.0).min(100.0)
    }

    pub fn allows_multiple_payments(&self) -> bool {
        self.kind.allows_multiple_payments()
    }

    pub fn is_disbursement(&self) -> bool {
        self.kind.is_disbursement()
    }
}

/// Status of a step in the negotiation's process tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl StepStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named milestone in the external process tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub id: String,
    pub negotiation_id: String,
    pub name: String,
    pub status: StepStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProcessStep {
    pub fn new(
        id: impl Into<String>,
        negotiation_id: impl Into<String>,
        name: impl Into<String>,
        status: StepStatus,
    ) -> Self {
        Self {
            id: id.into(),
            negotiation_id: negotiation_id.into(),
            name: name.into(),
            status,
            completed_at: None,
        }
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}
