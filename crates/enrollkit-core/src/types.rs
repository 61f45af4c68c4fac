use crate::{
    Result,
    constants::{FACE_ID_PREFIX, MIN_PASSWORD_LENGTH, PROXIMITY_ID_PREFIX},
    error::Error,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of credential attached to a workforce member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Contactless proximity card credential.
    Proximity,
    /// Facial biometric credential.
    Face,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CredentialKind::Proximity => write!(f, "proximity"),
            CredentialKind::Face => write!(f, "face"),
        }
    }
}

/// Proximity credential identifier: `NFC-` followed by 16 lowercase hex
/// characters (8 random bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProximityId(String);

impl ProximityId {
    /// Create a proximity ID with format validation.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the value does not match
    /// `NFC-[0-9a-f]{16}`.
    pub fn new(id: &str) -> Result<Self> {
        let hex_part = id
            .strip_prefix(PROXIMITY_ID_PREFIX)
            .ok_or_else(|| Error::validation("proximity_id", "missing NFC- prefix"))?;

        if hex_part.len() != 16 {
            return Err(Error::validation(
                "proximity_id",
                format!("expected 16 hex chars, got {}", hex_part.len()),
            ));
        }

        if !hex_part
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(Error::validation(
                "proximity_id",
                "expected lowercase hex characters",
            ));
        }

        Ok(ProximityId(id.to_string()))
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProximityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProximityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ProximityId::new(s)
    }
}

/// Facial credential identifier: `FACE-` followed by one two-hex-digit byte
/// per descriptor component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceId(String);

impl FaceId {
    /// Create a face ID with format validation.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the value has no `FACE-` prefix or the
    /// remainder is not a non-empty, even-length lowercase hex string.
    pub fn new(id: &str) -> Result<Self> {
        let hex_part = id
            .strip_prefix(FACE_ID_PREFIX)
            .ok_or_else(|| Error::validation("face_id", "missing FACE- prefix"))?;

        if hex_part.is_empty() || hex_part.len() % 2 != 0 {
            return Err(Error::validation(
                "face_id",
                format!("expected non-empty even hex length, got {}", hex_part.len()),
            ));
        }

        if !hex_part
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(Error::validation(
                "face_id",
                "expected lowercase hex characters",
            ));
        }

        Ok(FaceId(id.to_string()))
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of descriptor components encoded in this ID.
    #[must_use]
    pub fn component_count(&self) -> usize {
        (self.0.len() - FACE_ID_PREFIX.len()) / 2
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FaceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FaceId::new(s)
    }
}

/// Opaque reference to an account created in the Employee Directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef(String);

impl AccountRef {
    /// Create an account reference.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the reference is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::validation("account_ref", "must not be empty"));
        }
        Ok(AccountRef(id))
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to an employee record in the Employee Directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeRef(String);

impl EmployeeRef {
    /// Create an employee reference.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the reference is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::validation("employee_ref", "must not be empty"));
        }
        Ok(EmployeeRef(id))
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A provisioned credential, as committed to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Kind of credential.
    pub kind: CredentialKind,

    /// Textual credential identifier.
    pub id: String,

    /// When the credential was provisioned.
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Create a proximity credential record stamped with the current time.
    #[must_use]
    pub fn proximity(id: &ProximityId) -> Self {
        Self {
            kind: CredentialKind::Proximity,
            id: id.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Create a facial credential record stamped with the current time.
    #[must_use]
    pub fn face(id: &FaceId) -> Self {
        Self {
            kind: CredentialKind::Face,
            id: id.as_str().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Account identity captured in the first enrollment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl Identity {
    /// Validate the identity fields.
    ///
    /// # Errors
    /// Returns `Error::Validation` naming the first offending field:
    /// - names and username must be non-empty
    /// - username restricted to letters, digits, `.`, `_`, `-`
    /// - email must have a non-empty local part and a dotted domain
    /// - password must be at least [`MIN_PASSWORD_LENGTH`] characters and
    ///   match its confirmation
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(Error::validation("first_name", "must not be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::validation("last_name", "must not be empty"));
        }

        if self.username.is_empty() {
            return Err(Error::validation("username", "must not be empty"));
        }
        if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(Error::validation(
                "username",
                "only letters, digits, '.', '_' and '-' are allowed",
            ));
        }

        validate_email(&self.email)?;

        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::validation(
                "password",
                format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }
        if self.password != self.confirm_password {
            return Err(Error::validation(
                "confirm_password",
                "passwords do not match",
            ));
        }

        Ok(())
    }
}

fn validate_email(email: &str) -> Result<()> {
    let invalid = || Error::validation("email", "invalid address shape");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() {
        return Err(invalid());
    }
    // Domain needs at least one dot with content on both sides.
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.len() < 2 {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

/// Employment profile captured in the second enrollment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Employee number, e.g. `EMP-001`.
    pub employee_number: String,
    /// Directory department identifier.
    pub department: String,
    /// Job position label.
    pub position: String,
    pub gender: Option<String>,
    pub date_of_birth: NaiveDate,
    pub date_joined: NaiveDate,
}

impl Profile {
    /// Validate the profile fields.
    ///
    /// # Errors
    /// Returns `Error::Validation` if:
    /// - the employee number is empty or contains characters outside
    ///   uppercase letters, digits, and `-`
    /// - department or position is empty
    /// - the joining date precedes the date of birth
    pub fn validate(&self) -> Result<()> {
        if self.employee_number.is_empty() {
            return Err(Error::validation("employee_number", "must not be empty"));
        }
        if !self
            .employee_number
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(Error::validation(
                "employee_number",
                "only uppercase letters, digits and '-' are allowed",
            ));
        }
        if self.department.trim().is_empty() {
            return Err(Error::validation("department", "must not be empty"));
        }
        if self.position.trim().is_empty() {
            return Err(Error::validation("position", "must not be empty"));
        }
        if self.date_joined < self.date_of_birth {
            return Err(Error::validation(
                "date_joined",
                "cannot precede date of birth",
            ));
        }
        Ok(())
    }
}

/// Department entry as listed by the Employee Directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn identity() -> Identity {
        Identity {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            confirm_password: "hunter2hunter2".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            is_admin: false,
        }
    }

    fn profile() -> Profile {
        Profile {
            employee_number: "EMP-001".to_string(),
            department: "7".to_string(),
            position: "Developer".to_string(),
            gender: None,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
            date_joined: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        }
    }

    #[rstest]
    #[case("NFC-0123456789abcdef")]
    #[case("NFC-ffffffffffffffff")]
    fn test_proximity_id_valid(#[case] input: &str) {
        let id = ProximityId::new(input).unwrap();
        assert_eq!(id.as_str(), input);
    }

    #[rstest]
    #[case("0123456789abcdef")] // missing prefix
    #[case("NFC-0123456789abcde")] // 15 chars
    #[case("NFC-0123456789ABCDEF")] // uppercase
    #[case("NFC-0123456789abcdeg")] // non-hex
    fn test_proximity_id_invalid(#[case] input: &str) {
        assert!(ProximityId::new(input).is_err());
    }

    #[test]
    fn test_face_id_valid() {
        let id = FaceId::new("FACE-0a1b2c").unwrap();
        assert_eq!(id.component_count(), 3);
    }

    #[rstest]
    #[case("0a1b2c")] // missing prefix
    #[case("FACE-")] // empty
    #[case("FACE-0a1")] // odd length
    #[case("FACE-0a1Z")] // non-hex
    fn test_face_id_invalid(#[case] input: &str) {
        assert!(FaceId::new(input).is_err());
    }

    #[test]
    fn test_refs_reject_empty() {
        assert!(AccountRef::new("").is_err());
        assert!(AccountRef::new("   ").is_err());
        assert!(EmployeeRef::new("").is_err());
        assert!(AccountRef::new("u-42").is_ok());
    }

    #[test]
    fn test_credential_record_constructors() {
        let nfc = ProximityId::new("NFC-00112233445566aa").unwrap();
        let record = CredentialRecord::proximity(&nfc);
        assert_eq!(record.kind, CredentialKind::Proximity);
        assert_eq!(record.id, "NFC-00112233445566aa");

        let face = FaceId::new("FACE-0a1b").unwrap();
        let record = CredentialRecord::face(&face);
        assert_eq!(record.kind, CredentialKind::Face);
    }

    #[test]
    fn test_identity_valid() {
        assert!(identity().validate().is_ok());
    }

    #[rstest]
    #[case(|i: &mut Identity| i.username = "j doe".to_string())]
    #[case(|i: &mut Identity| i.username = String::new())]
    #[case(|i: &mut Identity| i.email = "not-an-email".to_string())]
    #[case(|i: &mut Identity| i.email = "a@b".to_string())]
    #[case(|i: &mut Identity| i.password = "short".to_string())]
    #[case(|i: &mut Identity| i.confirm_password = "different-pass".to_string())]
    #[case(|i: &mut Identity| i.first_name = "  ".to_string())]
    fn test_identity_invalid(#[case] mutate: fn(&mut Identity)) {
        let mut id = identity();
        mutate(&mut id);
        assert!(id.validate().is_err());
    }

    #[test]
    fn test_profile_valid() {
        assert!(profile().validate().is_ok());
    }

    #[rstest]
    #[case(|p: &mut Profile| p.employee_number = String::new())]
    #[case(|p: &mut Profile| p.employee_number = "emp-001".to_string())]
    #[case(|p: &mut Profile| p.department = String::new())]
    #[case(|p: &mut Profile| p.position = "  ".to_string())]
    fn test_profile_invalid(#[case] mutate: fn(&mut Profile)) {
        let mut p = profile();
        mutate(&mut p);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_profile_dates_ordered() {
        let mut p = profile();
        p.date_joined = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_credential_kind_serialization() {
        let json = serde_json::to_string(&CredentialKind::Proximity).unwrap();
        assert_eq!(json, "\"proximity\"");
        let kind: CredentialKind = serde_json::from_str("\"face\"").unwrap();
        assert_eq!(kind, CredentialKind::Face);
    }
}
