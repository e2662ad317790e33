//! Habitat core decision logic for housing negotiations and project edits.
//!
//! Two independent components live here:
//!
//! - [`DisbursementGate`] decides whether a credit or subsidy disbursement may be
//!   registered, based on a single read of the negotiation's process tracker.
//!   Tracker failures fail open.
//! - [`ChangeDetector`] diffs an original and an edited [`ProjectSnapshot`] into a
//!   reviewable [`ChangeSet`].
//!
//! Persistence is reached only through the injected [`ProcessStepLookup`].

#![deny(unsafe_code)]

pub mod changes;
pub mod error;
pub mod gate;
pub mod lookup;
pub mod mocks;
pub mod types;

pub use changes::{
    Block, BlockChange, BlockChangeDetails, BlockChangeKind, ChangeDetector, ChangeSet,
    FieldChange, ProjectSnapshot, ProjectStatus,
};
pub use error::HabitatError;
pub use gate::{
    DisbursementGate, GateConfig, GateDecision, GateOutcome, RequiredStep, STEP_NOT_FOUND_STATUS,
};
pub use lookup::ProcessStepLookup;
pub use mocks::MockStepLookup;
pub use types::{PaymentSource, PaymentSourceKind, ProcessStep, StepStatus};
