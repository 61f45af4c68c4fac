//! In-memory state of one enrollment session.

use crate::state::{EnrollmentStep, StepTransition};
use enrollkit_core::{
    AccountRef, CredentialRecord, EmployeeRef, Error, Identity, Profile, Result,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Maximum number of step transitions kept in the session history.
///
/// One enrollment takes six transitions on the happy path; the cap leaves
/// room for a long run of operator retries without unbounded growth.
pub const MAX_HISTORY_SIZE: usize = 32;

/// State of one enrollment, from open to commit or cancellation.
///
/// The session lives in memory only. Durable state is whatever the workflow
/// has already committed to the Employee Directory; the references returned
/// by those commits are kept here for the steps that follow.
#[derive(Debug)]
pub struct EnrollmentSession {
    current_step: EnrollmentStep,
    step_entered_at: Instant,
    history: VecDeque<StepTransition>,

    identity: Option<Identity>,
    profile: Option<Profile>,
    account: Option<AccountRef>,
    employee: Option<EmployeeRef>,
    proximity_credential: Option<CredentialRecord>,
    face_credential: Option<CredentialRecord>,
}

impl EnrollmentSession {
    /// Open a new session at the identity step.
    pub fn new() -> Self {
        Self {
            current_step: EnrollmentStep::Identity,
            step_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            identity: None,
            profile: None,
            account: None,
            employee: None,
            proximity_credential: None,
            face_credential: None,
        }
    }

    /// The step the session is currently on.
    pub fn current_step(&self) -> EnrollmentStep {
        self.current_step
    }

    /// Time spent on the current step.
    pub fn time_in_current_step(&self) -> Duration {
        self.step_entered_at.elapsed()
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StepTransition> {
        &self.history
    }

    /// Move to a new step, validating the edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStepTransition` for an edge the state machine
    /// does not allow.
    pub fn transition_to(&mut self, step: EnrollmentStep) -> Result<StepTransition> {
        if !self.current_step.can_transition_to(&step) {
            return Err(Error::InvalidStepTransition {
                from: self.current_step.to_string(),
                to: step.to_string(),
            });
        }

        let transition = StepTransition::new(self.current_step, step);
        self.current_step = step;
        self.step_entered_at = Instant::now();

        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }

    /// Committed identity, if the identity step completed.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Committed profile, if the profile step completed.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Account reference returned by the identity commit.
    pub fn account_ref(&self) -> Option<&AccountRef> {
        self.account.as_ref()
    }

    /// Employee reference returned by the profile commit.
    pub fn employee_ref(&self) -> Option<&EmployeeRef> {
        self.employee.as_ref()
    }

    /// Provisioned proximity credential, if any.
    pub fn proximity_credential(&self) -> Option<&CredentialRecord> {
        self.proximity_credential.as_ref()
    }

    /// Provisioned facial credential, if any.
    pub fn face_credential(&self) -> Option<&CredentialRecord> {
        self.face_credential.as_ref()
    }

    pub(crate) fn record_identity(&mut self, identity: Identity, account: AccountRef) {
        self.identity = Some(identity);
        self.account = Some(account);
    }

    pub(crate) fn record_profile(&mut self, profile: Profile, employee: EmployeeRef) {
        self.profile = Some(profile);
        self.employee = Some(employee);
    }

    pub(crate) fn record_proximity(&mut self, credential: CredentialRecord) {
        self.proximity_credential = Some(credential);
    }

    pub(crate) fn record_face(&mut self, credential: CredentialRecord) {
        self.face_credential = Some(credential);
    }
}

impl Default for EnrollmentSession {
    fn default() -> Self {
        Self::new()
    }
}
