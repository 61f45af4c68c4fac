//! HTTP client for the Employee Directory REST service.
//!
//! The workflow never sees HTTP: non-success statuses and transport faults
//! are both mapped onto `Error::Directory`, and references returned by the
//! service are normalized to strings (the service reports numeric IDs for
//! employee records and opaque strings for accounts).
//!
//! The bearer token is explicit configuration; this client never manages or
//! refreshes sessions.

use crate::traits::EmployeeDirectory;
use enrollkit_core::{
    AccountRef, Department, EmployeeRef, Error, FaceId, Identity, Profile, ProximityId, Result,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};

/// Wire date format for profile dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// How much of an error body to keep in the error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Directory client configuration.
///
/// Ambient state from the operator station (service location, bearer token)
/// is passed here explicitly at construction.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Base URL of the directory API, e.g. `https://directory.example.com/api`.
    pub base_url: String,

    /// Bearer token presented on every request, when the deployment
    /// requires one.
    pub bearer_token: Option<String>,

    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            bearer_token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// REST-backed Employee Directory client.
pub struct HttpDirectory {
    config: DirectoryConfig,
    http: reqwest::Client,
}

impl HttpDirectory {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Directory` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: DirectoryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::directory(format!("HTTP client construction failed: {e}")))?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = self.url(path);
        debug!(%url, "directory POST");

        let response = self
            .authorize(self.http.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::directory(format!("POST {url} failed: {e}")))?;

        Self::decode(url, response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = self.url(path);
        debug!(%url, "directory GET");

        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(|e| Error::directory(format!("GET {url} failed: {e}")))?;

        Self::decode(url, response).await
    }

    /// Acknowledge-only POST: the status decides, any body is discarded.
    async fn post_ack<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!(%url, "directory POST");

        let response = self
            .authorize(self.http.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::directory(format!("POST {url} failed: {e}")))?;

        Self::ensure_success(&url, response).await?;
        Ok(())
    }

    async fn ensure_success(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();
        warn!(%url, status = status.as_u16(), "directory request rejected");
        Err(Error::directory_status(
            status.as_u16(),
            format!("{url}: {snippet}"),
        ))
    }

    async fn decode<R: DeserializeOwned>(url: String, response: reqwest::Response) -> Result<R> {
        let response = Self::ensure_success(&url, response).await?;

        response
            .json::<R>()
            .await
            .map_err(|e| Error::directory(format!("{url}: malformed response: {e}")))
    }
}

/// Normalize a JSON reference value to a string.
///
/// The directory reports account references as strings and employee record
/// IDs as numbers.
fn value_to_ref(value: &serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::directory(format!(
            "unexpected reference shape: {other}"
        ))),
    }
}

#[derive(Serialize)]
struct CreateAccountRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    confirm_password: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    is_admin: bool,
    is_employee: bool,
}

#[derive(Deserialize)]
struct CreateAccountResponse {
    user_id: serde_json::Value,
}

#[derive(Serialize)]
struct CreateEmployeeRequest<'a> {
    user_id: &'a str,
    employee_id: &'a str,
    department: &'a str,
    position: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    date_of_birth: String,
    date_joined: String,
}

#[derive(Deserialize)]
struct CreateEmployeeResponse {
    id: serde_json::Value,
}

#[derive(Serialize)]
struct AttachProximityRequest<'a> {
    nfc_id: &'a str,
}

#[derive(Serialize)]
struct AttachBiometricRequest<'a> {
    face_id: &'a str,
}

#[derive(Deserialize)]
struct DepartmentEntry {
    id: serde_json::Value,
    name: String,
}

impl EmployeeDirectory for HttpDirectory {
    async fn create_account(&self, identity: &Identity) -> Result<AccountRef> {
        let request = CreateAccountRequest {
            username: &identity.username,
            email: &identity.email,
            password: &identity.password,
            confirm_password: &identity.confirm_password,
            first_name: &identity.first_name,
            last_name: &identity.last_name,
            is_admin: identity.is_admin,
            is_employee: true,
        };

        let response: CreateAccountResponse =
            self.post_json("/employees/create/user/", &request).await?;

        AccountRef::new(value_to_ref(&response.user_id)?)
    }

    async fn create_employee_record(
        &self,
        account: &AccountRef,
        profile: &Profile,
    ) -> Result<EmployeeRef> {
        let request = CreateEmployeeRequest {
            user_id: account.as_str(),
            employee_id: &profile.employee_number,
            department: &profile.department,
            position: &profile.position,
            gender: profile.gender.as_deref(),
            date_of_birth: profile.date_of_birth.format(DATE_FORMAT).to_string(),
            date_joined: profile.date_joined.format(DATE_FORMAT).to_string(),
        };

        let response: CreateEmployeeResponse = self
            .post_json("/employees/create/basic-info/", &request)
            .await?;

        EmployeeRef::new(value_to_ref(&response.id)?)
    }

    async fn attach_proximity_credential(
        &self,
        employee: &EmployeeRef,
        id: &ProximityId,
    ) -> Result<()> {
        let path = format!("/employees/{}/nfc/", employee.as_str());
        let request = AttachProximityRequest { nfc_id: id.as_str() };

        self.post_ack(&path, &request).await
    }

    async fn attach_biometric_credential(
        &self,
        employee: &EmployeeRef,
        id: &FaceId,
    ) -> Result<()> {
        let path = format!("/employees/{}/face-id/", employee.as_str());
        let request = AttachBiometricRequest { face_id: id.as_str() };

        self.post_ack(&path, &request).await
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        let entries: Vec<DepartmentEntry> = self.get_json("/department-management/").await?;

        entries
            .iter()
            .map(|entry| {
                Ok(Department {
                    id: value_to_ref(&entry.id)?,
                    name: entry.name.clone(),
                })
            })
            .collect()
    }
}
