//! Enrollment workflow.
//!
//! Sequences one enrollment session through its steps — identity, profile,
//! proximity credential, biometric credential, review — committing each
//! step's result to the Employee Directory immediately on success. Nothing
//! is buffered for a final write: progress up to the last committed step
//! survives interruption, and a failed step is retried by the operator
//! without discarding what came before it.
//!
//! # States
//!
//! - `Identity`: collect and commit the account identity
//! - `Profile`: collect and commit the employment profile
//! - `Proximity`: write and attach the proximity card credential
//! - `Biometric`: capture and attach the facial credential (skippable)
//! - `Review`: operator confirmation
//! - `Committed` / `Cancelled`: terminal
//!
//! # Valid Transitions
//!
//! - Identity → Profile → Proximity → Biometric → Review → Committed
//! - Proximity → Proximity and Biometric → Biometric (operator retry)
//! - Biometric → Review (operator skip)
//! - any non-terminal state → Cancelled

pub mod session;
pub mod state;
pub mod workflow;

pub use session::{EnrollmentSession, MAX_HISTORY_SIZE};
pub use state::{EnrollmentStep, StepTransition};
pub use workflow::{EnrollmentSummary, EnrollmentWorkflow, WorkflowConfig};
