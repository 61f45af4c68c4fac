//! In-memory Employee Directory for testing and development.
//!
//! Behaves like the real service at the trait boundary: it mints references,
//! enforces uniqueness, and rejects operations against unknown references.
//! Scripted failures (`fail_next_requests`) simulate an unreachable or
//! overloaded directory so that step-retry semantics can be exercised.

use crate::traits::EmployeeDirectory;
use enrollkit_core::{
    AccountRef, Department, EmployeeRef, Error, FaceId, Identity, Profile, ProximityId, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct DirectoryState {
    /// account ref -> username
    accounts: HashMap<String, String>,

    /// employee ref -> (account ref, employee number)
    employees: HashMap<String, (String, String)>,

    /// employee ref -> proximity credential id
    proximity: HashMap<String, String>,

    /// employee ref -> biometric credential id
    biometric: HashMap<String, String>,

    departments: Vec<Department>,

    /// Remaining requests that fail with a scripted 503.
    fail_remaining: u32,
}

impl DirectoryState {
    fn take_scripted_failure(&mut self) -> Result<()> {
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            return Err(Error::directory_status(503, "scripted directory failure"));
        }
        Ok(())
    }
}

/// In-memory directory double.
///
/// Clones share state, so a test can keep a handle while the workflow owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the department list.
    pub async fn set_departments(&self, departments: Vec<Department>) {
        self.state.lock().await.departments = departments;
    }

    /// Make the next `count` requests fail with a 503.
    pub async fn fail_next_requests(&self, count: u32) {
        self.state.lock().await.fail_remaining = count;
    }

    /// Number of accounts created so far.
    pub async fn account_count(&self) -> usize {
        self.state.lock().await.accounts.len()
    }

    /// Number of employee records created so far.
    pub async fn employee_count(&self) -> usize {
        self.state.lock().await.employees.len()
    }

    /// Proximity credential attached to an employee, if any.
    pub async fn proximity_credential(&self, employee: &EmployeeRef) -> Option<String> {
        self.state
            .lock()
            .await
            .proximity
            .get(employee.as_str())
            .cloned()
    }

    /// Biometric credential attached to an employee, if any.
    pub async fn biometric_credential(&self, employee: &EmployeeRef) -> Option<String> {
        self.state
            .lock()
            .await
            .biometric
            .get(employee.as_str())
            .cloned()
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    async fn create_account(&self, identity: &Identity) -> Result<AccountRef> {
        let mut state = self.state.lock().await;
        state.take_scripted_failure()?;

        if state
            .accounts
            .values()
            .any(|username| username == &identity.username)
        {
            return Err(Error::directory_status(
                409,
                format!("username '{}' already exists", identity.username),
            ));
        }

        let account = AccountRef::new(Uuid::new_v4().to_string())?;
        state
            .accounts
            .insert(account.as_str().to_string(), identity.username.clone());
        Ok(account)
    }

    async fn create_employee_record(
        &self,
        account: &AccountRef,
        profile: &Profile,
    ) -> Result<EmployeeRef> {
        let mut state = self.state.lock().await;
        state.take_scripted_failure()?;

        if !state.accounts.contains_key(account.as_str()) {
            return Err(Error::directory_status(
                404,
                format!("unknown account '{account}'"),
            ));
        }
        if state
            .employees
            .values()
            .any(|(_, number)| number == &profile.employee_number)
        {
            return Err(Error::directory_status(
                409,
                format!("employee number '{}' already exists", profile.employee_number),
            ));
        }

        let employee = EmployeeRef::new(Uuid::new_v4().to_string())?;
        state.employees.insert(
            employee.as_str().to_string(),
            (account.as_str().to_string(), profile.employee_number.clone()),
        );
        Ok(employee)
    }

    async fn attach_proximity_credential(
        &self,
        employee: &EmployeeRef,
        id: &ProximityId,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_scripted_failure()?;

        if !state.employees.contains_key(employee.as_str()) {
            return Err(Error::directory_status(
                404,
                format!("unknown employee '{employee}'"),
            ));
        }

        state
            .proximity
            .insert(employee.as_str().to_string(), id.as_str().to_string());
        Ok(())
    }

    async fn attach_biometric_credential(
        &self,
        employee: &EmployeeRef,
        id: &FaceId,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_scripted_failure()?;

        if !state.employees.contains_key(employee.as_str()) {
            return Err(Error::directory_status(
                404,
                format!("unknown employee '{employee}'"),
            ));
        }

        state
            .biometric
            .insert(employee.as_str().to_string(), id.as_str().to_string());
        Ok(())
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        let mut state = self.state.lock().await;
        state.take_scripted_failure()?;
        Ok(state.departments.clone())
    }
}
