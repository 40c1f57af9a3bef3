//! Authenticated request pipeline.
//!
//! Executes one logical request against the Stockpile REST service:
//!
//! 1. Build the request and attach `Authorization: Bearer <token>` when the
//!    [`RequestSpec`] requires auth and a token is stored.
//! 2. Send it. Transport failures become [`ApiError::Network`] and are never
//!    retried here.
//! 3. Classify the response: `< 400` decodes the expected type, a 401 on an
//!    authenticated request drives the refresh protocol, anything else
//!    decodes the `{ error }` envelope into [`ApiError::Server`].
//!
//! # Refresh protocol
//!
//! A 401 on a request with `allow_refresh_retry` triggers one refresh
//! through the single-flight [`RefreshGate`], then exactly one retry with
//! refresh disabled. If the stored token already changed while the request
//! was in flight, another caller has refreshed and the retry goes out
//! without a second refresh.

mod error;
mod refresh;
mod request;

pub use error::{ApiError, UNKNOWN_SERVER_ERROR};
pub use request::{GROUP_SCOPE_PARAM, RequestBody, RequestSpec};

use std::sync::Arc;

use futures::FutureExt;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stockpile_core::TokenPair;
use tracing::{debug, instrument, warn};
use url::Url;

use self::refresh::RefreshGate;
use crate::config::ClientConfig;
use crate::session::SessionManager;

/// Unauthenticated endpoint that trades a refresh token for a new pair.
pub const REFRESH_PATH: &str = "auth/refresh";

/// Error envelope returned with 4xx/5xx responses.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Result of one send, before refresh handling.
enum Attempt<T> {
    Complete(T),
    /// 401 on an authenticated request.
    Unauthorized,
}

/// Executes requests with bearer auth and single-flight refresh.
#[derive(Clone)]
pub struct RequestPipeline {
    inner: Arc<RequestPipelineInner>,
}

struct RequestPipelineInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionManager,
    refresh: RefreshGate,
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RequestPipeline {
    /// Create a pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionManager) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(RequestPipelineInner {
                http,
                base_url: config.base_url.clone(),
                session,
                refresh: RefreshGate::new(config.refresh_policy),
            }),
        })
    }

    /// The session manager this pipeline authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Execute a request and decode the response body as `T`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` for every failure mode; none are retried
    /// beyond the single refresh-retry.
    #[instrument(skip(self, spec), fields(method = %spec.method, path = %spec.path))]
    pub async fn execute<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, ApiError> {
        let url = spec.url(&self.inner.base_url)?;

        let sent_token = self.bearer_token(&spec);
        match self.attempt(&spec, &url, sent_token.as_ref()).await? {
            Attempt::Complete(value) => return Ok(value),
            Attempt::Unauthorized if !spec.allow_refresh_retry => {
                debug!("401 with refresh-retry disabled");
                return Err(ApiError::Unauthorized);
            }
            Attempt::Unauthorized => {}
        }

        if !self.recover_session(sent_token.as_ref()).await {
            return Err(ApiError::Unauthorized);
        }

        let retry_token = self.bearer_token(&spec);
        match self.attempt(&spec, &url, retry_token.as_ref()).await? {
            Attempt::Complete(value) => Ok(value),
            Attempt::Unauthorized => {
                warn!("Request still unauthorized after refresh; clearing session");
                self.clear_session();
                Err(ApiError::Unauthorized)
            }
        }
    }

    fn bearer_token(&self, spec: &RequestSpec) -> Option<SecretString> {
        if spec.requires_auth {
            self.inner.session.access_token()
        } else {
            None
        }
    }

    /// Send once and classify the response.
    async fn attempt<T: DeserializeOwned>(
        &self,
        spec: &RequestSpec,
        url: &Url,
        token: Option<&SecretString>,
    ) -> Result<Attempt<T>, ApiError> {
        let mut request = self
            .inner
            .http
            .request(spec.method.clone(), url.clone())
            .header(ACCEPT, "application/json");

        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }

        request = match &spec.body {
            Some(RequestBody::Json(value)) => request.json(value),
            Some(RequestBody::Image {
                file_name,
                content_type,
                bytes,
            }) => {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(content_type)
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                request.multipart(Form::new().part("image", part))
            }
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!(error = %e, "Request timed out");
            } else {
                warn!(error = %e, "Request failed before a response arrived");
            }
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && spec.requires_auth {
            debug!("Received 401");
            return Ok(Attempt::Unauthorized);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status.as_u16() < 400 {
            debug!(status = status.as_u16(), "Request succeeded");
            return decode_body(&body).map(Attempt::Complete);
        }

        let message = serde_json::from_slice::<ErrorEnvelope>(&body)
            .map_or_else(|_| UNKNOWN_SERVER_ERROR.to_string(), |envelope| envelope.error);

        debug!(status = status.as_u16(), %message, "Server returned an error");
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Make the session usable again after a 401. Returns whether a retry
    /// is worthwhile.
    async fn recover_session(&self, sent_token: Option<&SecretString>) -> bool {
        if let Some(current) = self.inner.session.access_token() {
            let changed = sent_token.is_none_or(|sent| sent.expose_secret() != current.expose_secret());
            if changed {
                debug!("Access token changed since the request was sent; retrying without refresh");
                return true;
            }
        }

        self.inner
            .refresh
            .run(|| {
                let pipeline = self.clone();
                async move { pipeline.perform_refresh().await }.boxed()
            })
            .await
    }

    /// Trade the refresh token for a new pair. Any failure clears the session.
    #[instrument(skip(self))]
    async fn perform_refresh(self) -> bool {
        let Some(refresh_token) = self.inner.session.refresh_token() else {
            warn!("No refresh token stored; session cannot be recovered");
            self.clear_session();
            return false;
        };

        let spec = match RequestSpec::post(REFRESH_PATH)
            .unauthenticated()
            .json(&RefreshRequest {
                refresh_token: refresh_token.expose_secret(),
            }) {
            Ok(spec) => spec,
            Err(e) => {
                warn!(error = %e, "Failed to build refresh request");
                self.clear_session();
                return false;
            }
        };

        let result = match spec.url(&self.inner.base_url) {
            Ok(url) => self.attempt::<TokenPair>(&spec, &url, None).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Attempt::Complete(tokens)) => match self.inner.session.save(&tokens, None) {
                Ok(()) => {
                    debug!("Token refresh succeeded");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "Failed to persist refreshed tokens");
                    self.clear_session();
                    false
                }
            },
            Ok(Attempt::Unauthorized) => {
                self.clear_session();
                false
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.clear_session();
                false
            }
        }
    }

    fn clear_session(&self) {
        if let Err(e) = self.inner.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
    }
}

/// Decode a success body. Empty bodies only satisfy unit-like targets.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"null").map_err(|_| ApiError::NoResponseBody);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Decoding(e.to_string()))
}
