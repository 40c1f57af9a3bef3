//! Authentication payloads.
//!
//! Login, registration and refresh all answer with the same token pair
//! shape, so one [`TokenPair`] type covers every credential-issuing call.

use serde::{Deserialize, Serialize};

/// Maximum length of an email address (RFC 5321).
const MAX_EMAIL_LENGTH: usize = 254;

/// Minimum password length accepted before a request is sent.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors raised while validating credentials locally.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthInputError {
    /// The email is empty, too long, or lacks a local part or domain.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    /// The password is shorter than the minimum length.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// A display name is required for registration.
    #[error("name cannot be empty")]
    EmptyName,
}

/// Access/refresh token pair issued by the auth endpoints.
///
/// The raw strings only live here long enough to be handed to the session
/// manager, which wraps them in `SecretString`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Long-lived credential used to obtain a new access token.
    pub refresh_token: String,
}

impl core::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Stable identifier of this installation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl core::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("device_id", &self.device_id)
            .finish()
    }
}

impl LoginRequest {
    /// Build a login request after validating the inputs locally.
    ///
    /// # Errors
    ///
    /// Returns `AuthInputError` if the email is malformed or the password
    /// is too short.
    pub fn new(email: &str, password: &str) -> Result<Self, AuthInputError> {
        validate_email(email)?;
        validate_password(password)?;
        Ok(Self {
            email: email.trim().to_owned(),
            password: password.to_owned(),
            device_id: None,
        })
    }

    /// Attach the installation's device identifier.
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Stable identifier of this installation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl core::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("device_id", &self.device_id)
            .finish()
    }
}

impl RegisterRequest {
    /// Build a registration request after validating the inputs locally.
    ///
    /// # Errors
    ///
    /// Returns `AuthInputError` if any field is invalid.
    pub fn new(name: &str, email: &str, password: &str) -> Result<Self, AuthInputError> {
        if name.trim().is_empty() {
            return Err(AuthInputError::EmptyName);
        }
        validate_email(email)?;
        validate_password(password)?;
        Ok(Self {
            name: name.trim().to_owned(),
            email: email.trim().to_owned(),
            password: password.to_owned(),
            device_id: None,
        })
    }

    /// Attach the installation's device identifier.
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}

fn validate_email(email: &str) -> Result<(), AuthInputError> {
    let email = email.trim();
    let invalid = || AuthInputError::InvalidEmail(email.to_owned());

    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() {
        return Err(invalid());
    }

    Ok(())
}

const fn validate_password(password: &str) -> Result<(), AuthInputError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthInputError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}
