//! Sign-in, registration and sign-out.

use serde::de::IgnoredAny;
use stockpile_core::{LoginRequest, RegisterRequest, TokenPair};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::ApiClient;
use crate::pipeline::{ApiError, RequestSpec};
use crate::storage::StorageError;

/// Errors from credential-issuing calls.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server issued tokens but they could not be stored.
    #[error("Failed to store session: {0}")]
    Storage(#[from] StorageError),
}

impl ApiClient {
    /// Sign in and persist the returned session.
    ///
    /// A device id is attached to the request, generated on first use.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` wrapping a 401 `Server` error for bad
    /// credentials, or `AuthError::Storage` if the session cannot be saved.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<(), AuthError> {
        let device_id = self.device_id();
        let request = match &device_id {
            Some(id) => request.with_device_id(id.as_str()),
            None => request,
        };

        let spec = RequestSpec::post("auth/login")
            .unauthenticated()
            .json(&request)?;
        let tokens: TokenPair = self.pipeline().execute(spec).await?;

        self.session().save(&tokens, device_id.as_deref())?;
        debug!("Signed in");
        Ok(())
    }

    /// Create an account and persist the returned session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the server rejects the registration, or
    /// `AuthError::Storage` if the session cannot be saved.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<(), AuthError> {
        let device_id = self.device_id();
        let request = match &device_id {
            Some(id) => request.with_device_id(id.as_str()),
            None => request,
        };

        let spec = RequestSpec::post("auth/register")
            .unauthenticated()
            .json(&request)?;
        let tokens: TokenPair = self.pipeline().execute(spec).await?;

        self.session().save(&tokens, device_id.as_deref())?;
        debug!("Registered");
        Ok(())
    }

    /// Revoke the session server-side. Does not touch local credentials.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error if the call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let spec = RequestSpec::post("auth/logout").without_refresh_retry();
        let _: Option<IgnoredAny> = self.pipeline().execute(spec).await?;
        debug!("Server session revoked");
        Ok(())
    }

    fn device_id(&self) -> Option<String> {
        self.session()
            .device_id()
            .inspect_err(|e| warn!(error = %e, "Failed to resolve device id"))
            .ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::test_support::client_for;

    #[tokio::test]
    async fn test_login_persists_tokens_and_device_id() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        client.session().clear().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_partial_json(json!({ "email": "ana@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "a-new",
                "refreshToken": "r-new"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client
            .login(LoginRequest::new("ana@example.com", "correct horse").unwrap())
            .await
            .unwrap();

        let session = client.session().load().unwrap();
        assert_eq!(session.access_token.unwrap().expose_secret(), "a-new");
        assert_eq!(session.refresh_token.unwrap().expose_secret(), "r-new");

        let sent = &server.received_requests().await.unwrap()[0];
        let body: serde_json::Value = serde_json::from_slice(&sent.body).unwrap();
        assert_eq!(body["deviceId"].as_str(), session.device_id.as_deref());
        assert!(sent.headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        client.session().clear().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let err = client
            .login(LoginRequest::new("ana@example.com", "wrong password").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Api(ref e) if e.status() == Some(401)));
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_sends_bearer() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(header("Authorization", "Bearer a1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client.logout().await.unwrap();
        assert!(client.session().is_authenticated());
    }
}
