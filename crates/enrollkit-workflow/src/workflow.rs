//! Step handlers for the enrollment workflow.
//!
//! Each handler validates its input, performs the step's work, commits the
//! result to the Employee Directory, and only then advances the session. A
//! failure of any kind leaves the session on the current step with every
//! previously committed result intact, so the operator can retry just the
//! failed step. Hardware resources (serial link, video stream) are bound to
//! their step and released on every exit path.

use crate::{
    session::EnrollmentSession,
    state::EnrollmentStep,
};
use enrollkit_biometric::{
    BiometricCaptureService, CaptureConstraints, FaceDescriptor, SamplerConfig, sample_descriptor,
};
use enrollkit_core::{
    AccountRef, CredentialRecord, EmployeeRef, Error, Identity, Profile, Result,
    constants::{CREDENTIAL_BLOCK, CREDENTIAL_SECTOR, DEFAULT_READ_TIMEOUT_MS},
};
use enrollkit_credential::{generate_face_id, generate_proximity_id};
use enrollkit_directory::EmployeeDirectory;
use enrollkit_protocol::CardProtocolEngine;
use enrollkit_serial::SerialTransport;
use std::time::Duration;
use tracing::{info, warn};

/// Station-level workflow configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Card sector holding the proximity credential.
    pub sector: u8,

    /// Card block holding the proximity credential.
    pub block: u8,

    /// Response window for card commands.
    pub read_timeout: Duration,

    /// Video constraints for the biometric step.
    pub capture: CaptureConstraints,

    /// Sampling loop configuration for the biometric step.
    pub sampler: SamplerConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            sector: CREDENTIAL_SECTOR,
            block: CREDENTIAL_BLOCK,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            capture: CaptureConstraints::default(),
            sampler: SamplerConfig::default(),
        }
    }
}

/// Result of a committed enrollment.
#[derive(Debug, Clone)]
pub struct EnrollmentSummary {
    pub account: AccountRef,
    pub employee: EmployeeRef,
    pub proximity: CredentialRecord,
    pub face: Option<CredentialRecord>,
}

/// Workflow driving one enrollment session against an Employee Directory.
///
/// # Examples
///
/// ```no_run
/// use enrollkit_directory::{DirectoryConfig, HttpDirectory};
/// use enrollkit_workflow::EnrollmentWorkflow;
///
/// # fn main() -> enrollkit_core::Result<()> {
/// let directory = HttpDirectory::new(DirectoryConfig::default())?;
/// let workflow = EnrollmentWorkflow::new(directory);
/// # let _ = workflow;
/// # Ok(())
/// # }
/// ```
pub struct EnrollmentWorkflow<D: EmployeeDirectory> {
    directory: D,
    session: EnrollmentSession,
    config: WorkflowConfig,
}

impl<D: EmployeeDirectory> EnrollmentWorkflow<D> {
    /// Open a workflow with default configuration.
    pub fn new(directory: D) -> Self {
        Self::with_config(directory, WorkflowConfig::default())
    }

    /// Open a workflow with explicit configuration.
    pub fn with_config(directory: D, config: WorkflowConfig) -> Self {
        Self {
            directory,
            session: EnrollmentSession::new(),
            config,
        }
    }

    /// The session state.
    pub fn session(&self) -> &EnrollmentSession {
        &self.session
    }

    /// The step the session is currently on.
    pub fn current_step(&self) -> EnrollmentStep {
        self.session.current_step()
    }

    /// The directory this workflow commits to.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    fn require_step(&self, expected: EnrollmentStep) -> Result<()> {
        let current = self.session.current_step();
        if current != expected {
            return Err(Error::InvalidStepTransition {
                from: current.to_string(),
                to: expected.to_string(),
            });
        }
        Ok(())
    }

    /// Identity step: validate, create the directory account, advance.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` for malformed identity fields
    /// - `Error::Directory` if the account commit fails; the session stays
    ///   on the identity step for retry
    pub async fn submit_identity(&mut self, identity: Identity) -> Result<AccountRef> {
        self.require_step(EnrollmentStep::Identity)?;
        identity.validate()?;

        let account = self.directory.create_account(&identity).await?;
        info!(%account, username = %identity.username, "account created");

        self.session.record_identity(identity, account.clone());
        self.session.transition_to(EnrollmentStep::Profile)?;
        Ok(account)
    }

    /// Profile step: validate, create the employee record, advance.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` for malformed profile fields
    /// - `Error::Directory` if the record commit fails; the session stays on
    ///   the profile step for retry
    pub async fn submit_profile(&mut self, profile: Profile) -> Result<EmployeeRef> {
        self.require_step(EnrollmentStep::Profile)?;
        profile.validate()?;

        let account = self
            .session
            .account_ref()
            .cloned()
            .ok_or_else(|| Error::validation("account", "identity step was not committed"))?;

        let employee = self
            .directory
            .create_employee_record(&account, &profile)
            .await?;
        info!(%employee, number = %profile.employee_number, "employee record created");

        self.session.record_profile(profile, employee.clone());
        self.session.transition_to(EnrollmentStep::Proximity)?;
        Ok(employee)
    }

    /// Proximity step: generate an ID, write it to the card, attach it.
    ///
    /// The workflow takes ownership of the opened link for the duration of
    /// the step and closes it on every exit path. A retry is a new call with
    /// a freshly opened link and generates a fresh credential ID.
    ///
    /// # Errors
    ///
    /// - `Error::Auth` / `Error::Write` / `Error::Timeout` /
    ///   `Error::Connection` from the card protocol
    /// - `Error::Directory` if attaching the credential fails
    ///
    /// In every case the session stays on the proximity step.
    pub async fn provision_proximity<T: SerialTransport>(
        &mut self,
        transport: T,
    ) -> Result<CredentialRecord> {
        self.require_step(EnrollmentStep::Proximity)?;

        let employee = self
            .session
            .employee_ref()
            .cloned()
            .ok_or_else(|| Error::validation("employee", "profile step was not committed"))?;

        let mut engine = CardProtocolEngine::with_timeout(transport, self.config.read_timeout);
        let outcome = self.write_proximity_credential(&mut engine, &employee).await;

        // The link belongs to this step alone: release it on success and
        // failure alike before surfacing the outcome.
        if let Err(close_error) = engine.shutdown().await {
            warn!(%close_error, "serial link close failed");
        }

        let record = outcome?;
        self.session.record_proximity(record.clone());
        self.session.transition_to(EnrollmentStep::Biometric)?;
        Ok(record)
    }

    async fn write_proximity_credential<T: SerialTransport>(
        &self,
        engine: &mut CardProtocolEngine<T>,
        employee: &EmployeeRef,
    ) -> Result<CredentialRecord> {
        let id = generate_proximity_id()?;

        engine
            .write_block(self.config.sector, self.config.block, id.as_str().as_bytes())
            .await?;
        info!(%id, sector = self.config.sector, block = self.config.block, "credential written to card");

        self.directory
            .attach_proximity_credential(employee, &id)
            .await?;
        info!(%employee, "proximity credential attached");

        Ok(CredentialRecord::proximity(&id))
    }

    /// Biometric step: sample to convergence, derive the ID, attach it.
    ///
    /// The video stream is released on every exit path, including sampling
    /// errors and a failed directory commit.
    ///
    /// # Errors
    ///
    /// - `Error::ModelLoad` / `Error::Device` / `Error::Timeout` from the
    ///   capture pipeline
    /// - `Error::Directory` if attaching the credential fails
    ///
    /// In every case the session stays on the biometric step.
    pub async fn capture_biometric<S: BiometricCaptureService>(
        &mut self,
        service: &mut S,
    ) -> Result<CredentialRecord> {
        self.require_step(EnrollmentStep::Biometric)?;

        let employee = self
            .session
            .employee_ref()
            .cloned()
            .ok_or_else(|| Error::validation("employee", "profile step was not committed"))?;

        let sampled = self.sample_stable_descriptor(service).await;

        // Stream teardown runs on success and failure alike.
        if let Err(stop_error) = service.stop_capture().await {
            warn!(%stop_error, "video stream release failed");
        }

        let descriptor = sampled?;
        let id = generate_face_id(descriptor.as_slice())?;

        self.directory
            .attach_biometric_credential(&employee, &id)
            .await?;
        info!(%employee, components = descriptor.len(), "biometric credential attached");

        let record = CredentialRecord::face(&id);
        self.session.record_face(record.clone());
        self.session.transition_to(EnrollmentStep::Review)?;
        Ok(record)
    }

    async fn sample_stable_descriptor<S: BiometricCaptureService>(
        &self,
        service: &mut S,
    ) -> Result<FaceDescriptor> {
        service.initialize().await?;
        service.start_capture(&self.config.capture).await?;
        sample_descriptor(service, &self.config.sampler).await
    }

    /// Operator skip of the biometric step.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStepTransition` outside the biometric step.
    pub fn skip_biometric(&mut self) -> Result<()> {
        self.require_step(EnrollmentStep::Biometric)?;
        info!("biometric step skipped by operator");
        self.session.transition_to(EnrollmentStep::Review)?;
        Ok(())
    }

    /// Review step: confirm the enrollment and seal the session.
    ///
    /// All data was already committed per step; this verifies the required
    /// steps actually committed and moves the session to its terminal state.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidStepTransition` outside the review step
    /// - `Error::Validation` if a required commit is missing from the
    ///   session
    pub fn commit_review(&mut self) -> Result<EnrollmentSummary> {
        self.require_step(EnrollmentStep::Review)?;

        let account = self
            .session
            .account_ref()
            .cloned()
            .ok_or_else(|| Error::validation("account", "identity step was not committed"))?;
        let employee = self
            .session
            .employee_ref()
            .cloned()
            .ok_or_else(|| Error::validation("employee", "profile step was not committed"))?;
        let proximity = self
            .session
            .proximity_credential()
            .cloned()
            .ok_or_else(|| Error::validation("proximity", "proximity step was not completed"))?;
        let face = self.session.face_credential().cloned();

        self.session.transition_to(EnrollmentStep::Committed)?;
        info!(%account, %employee, with_biometric = face.is_some(), "enrollment committed");

        Ok(EnrollmentSummary {
            account,
            employee,
            proximity,
            face,
        })
    }

    /// Abandon the session from any non-terminal step.
    ///
    /// Steps that were already committed to the directory remain committed;
    /// cancellation only discards the in-memory session.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStepTransition` once the session is terminal.
    pub fn cancel(&mut self) -> Result<()> {
        let from = self.session.current_step();
        self.session.transition_to(EnrollmentStep::Cancelled)?;
        info!(%from, "enrollment cancelled");
        Ok(())
    }
}
