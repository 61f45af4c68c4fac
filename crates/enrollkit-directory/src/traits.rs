//! Employee Directory trait definition.

use enrollkit_core::{
    AccountRef, Department, EmployeeRef, FaceId, Identity, Profile, ProximityId, Result,
};

/// External Employee Directory service, consumed at its interface boundary.
///
/// Each operation corresponds to one per-step commit of the enrollment
/// workflow. Commits are independent: a failed call leaves everything
/// previously committed in place, which is what makes operator-driven retry
/// of a single step possible.
pub trait EmployeeDirectory: Send + Sync {
    /// Create the account for a new workforce member.
    ///
    /// # Errors
    ///
    /// Returns `Error::Directory` if the directory rejects the identity or
    /// is unreachable.
    async fn create_account(&self, identity: &Identity) -> Result<AccountRef>;

    /// Create the employee record bound to an account.
    ///
    /// # Errors
    ///
    /// Returns `Error::Directory` if the account is unknown, the record is
    /// rejected, or the directory is unreachable.
    async fn create_employee_record(
        &self,
        account: &AccountRef,
        profile: &Profile,
    ) -> Result<EmployeeRef>;

    /// Attach a proximity credential to an employee record.
    ///
    /// # Errors
    ///
    /// Returns `Error::Directory` if the employee is unknown or the
    /// directory is unreachable.
    async fn attach_proximity_credential(
        &self,
        employee: &EmployeeRef,
        id: &ProximityId,
    ) -> Result<()>;

    /// Attach a facial biometric credential to an employee record.
    ///
    /// # Errors
    ///
    /// Returns `Error::Directory` if the employee is unknown or the
    /// directory is unreachable.
    async fn attach_biometric_credential(
        &self,
        employee: &EmployeeRef,
        id: &FaceId,
    ) -> Result<()>;

    /// List the departments an employee record may reference.
    ///
    /// # Errors
    ///
    /// Returns `Error::Directory` if the directory is unreachable.
    async fn list_departments(&self) -> Result<Vec<Department>>;
}
